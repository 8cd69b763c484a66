use chrono::{DateTime, TimeZone};
use std::fmt::Display;

// converts unix seconds to a time in the given zone, none if chrono can't represent it
pub fn local_time<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(tz))
}

// formats unix seconds with a strftime pattern, or an empty string when out of range
pub fn format_timestamp<Tz>(timestamp: i64, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match local_time(timestamp, tz) {
        Some(time) => time.format(pattern).to_string(),
        None => {
            log::warn!("Timestamp {} is out of range", timestamp);
            String::new()
        }
    }
}

// converts a fraction (1.0 = 100%) to a whole percentage like "42%"
pub fn to_percent(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i32)
}

// rounds a temperature to the nearest degree and adds a degree symbol
pub fn to_degree(temperature: f64) -> String {
    format!("{}°", temperature.round() as i32)
}

// escapes text before it goes into the svg
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// returns the default when the value is empty
pub fn value_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}
