use chrono::{DateTime, Datelike, TimeZone};
use std::fmt::Display;

use crate::utils::local_time;

/// Where `now` falls relative to an alert's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPhase {
    Upcoming,
    Active,
    Expired,
}

/// A weather warning issued by the provider. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherAlert {
    pub name: String,
    pub start: i64,
    pub end: i64,
}

impl WeatherAlert {
    pub fn new(name: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn phase(&self, now: i64) -> AlertPhase {
        if now < self.start {
            AlertPhase::Upcoming
        } else if now < self.end {
            AlertPhase::Active
        } else {
            AlertPhase::Expired
        }
    }

    /// Describes when the alert starts or ends, e.g. `Starts at 14:00` or
    /// `Ends at Tue 06:00`. The weekday is only shown when the time falls on
    /// a different day of the year than `now` in `tz`.
    ///
    /// Expired alerts produce an empty string.
    pub fn status<Tz>(&self, now: i64, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let Some(today) = local_time(now, tz).map(|t| t.ordinal()) else {
            log::warn!("Cannot represent current time {} for alert '{}'", now, self.name);
            return String::new();
        };

        let (prefix, at) = match self.phase(now) {
            AlertPhase::Upcoming => ("Starts at", self.start),
            AlertPhase::Active => ("Ends at", self.end),
            AlertPhase::Expired => ("Ended at", self.end),
        };

        let Some(target) = local_time(at, tz) else {
            log::warn!("Cannot represent alert time {} for '{}'", at, self.name);
            return String::new();
        };
        let text = format_alert_time(prefix, &target, today);

        // expired alerts are not shown on the display
        if self.phase(now) == AlertPhase::Expired {
            log::debug!("Alert '{}' {}", self.name, text.to_lowercase());
            return String::new();
        }

        text
    }
}

// status text for an alert described by its name and validity window
pub fn alert_status<Tz>(name: &str, start: i64, end: i64, now: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    WeatherAlert::new(name, start, end).status(now, tz)
}

fn format_alert_time<Tz>(prefix: &str, target: &DateTime<Tz>, today: u32) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if target.ordinal() == today {
        format!("{} {}", prefix, target.format("%H:%M"))
    } else {
        format!("{} {}", prefix, target.format("%a %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    // monday 2024-01-15 00:00:00 utc
    const MONDAY: i64 = 1_705_276_800;
    const HOUR: i64 = 3600;

    #[test]
    fn test_phases() {
        let alert = WeatherAlert::new("Wind warning", MONDAY + 10 * HOUR, MONDAY + 18 * HOUR);
        assert_eq!(alert.phase(MONDAY), AlertPhase::Upcoming);
        assert_eq!(alert.phase(MONDAY + 10 * HOUR), AlertPhase::Active);
        assert_eq!(alert.phase(MONDAY + 18 * HOUR), AlertPhase::Expired);
    }

    #[test]
    fn test_starts_later_today() {
        let now = MONDAY + 8 * HOUR;
        let status = alert_status("Fog", MONDAY + 10 * HOUR, MONDAY + 12 * HOUR, now, &Utc);
        assert_eq!(status, "Starts at 10:00");
    }

    #[test]
    fn test_starts_another_day() {
        let now = MONDAY + 8 * HOUR;
        let status = alert_status("Fog", MONDAY + 34 * HOUR, MONDAY + 40 * HOUR, now, &Utc);
        assert_eq!(status, "Starts at Tue 10:00");
    }

    #[test]
    fn test_active_alert_reports_end() {
        let now = MONDAY + 8 * HOUR;
        let alert = WeatherAlert::new("Frost", MONDAY + 7 * HOUR, MONDAY + 18 * HOUR + 30 * 60);
        assert_eq!(alert.status(now, &Utc), "Ends at 18:30");

        let overnight = WeatherAlert::new("Frost", MONDAY + 7 * HOUR, MONDAY + 30 * HOUR);
        assert_eq!(overnight.status(now, &Utc), "Ends at Tue 06:00");
    }

    #[test]
    fn test_expired_alert_is_blank() {
        let now = MONDAY + 20 * HOUR;
        assert_eq!(alert_status("Heat", MONDAY, MONDAY + 18 * HOUR, now, &Utc), "");
        assert_eq!(alert_status("Heat", MONDAY, now, now, &Utc), "");
    }

    #[test]
    fn test_day_is_taken_from_time_zone() {
        // 03:00 utc monday is 22:00 sunday at utc-5
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = MONDAY + 3 * HOUR;
        let status = alert_status("Snow", MONDAY + 5 * HOUR, MONDAY + 9 * HOUR, now, &tz);
        assert_eq!(status, "Starts at Mon 00:00");

        let status = alert_status("Snow", MONDAY + 4 * HOUR, MONDAY + 9 * HOUR, now, &tz);
        assert_eq!(status, "Starts at 23:00");
    }
}
