use chrono::{Local, TimeZone, Timelike};
use std::fmt::Display;
use std::path::Path;

use crate::alert::WeatherAlert;
use crate::models::{DailyWeather, HourlyWeather, WeatherReport};
use crate::utils::{escape_xml, format_timestamp, local_time, to_degree, to_percent, value_or};

const TEMPLATE: &str = include_str!("../templates/template.svg");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.svg");

// hourly graph geometry, x and y as (start, end)
pub const GRAPH_HOURS: usize = 12;
const GRAPH_X: (i32, i32) = (550, 770);
const GRAPH_Y: (i32, i32) = (360, 460);
const GRID_PADDING: i32 = 10;
const TEXT_PADDING: i32 = 4;
const ROUND_TO: i32 = 5;

// daily forecast geometry
pub const DAILY_BOXES: usize = 5;
const DAILY_X: i32 = 20;
const DAILY_WIDTH: i32 = 100;
const DAILY_ICON: i32 = 80;

// alert box as (x, y, width, height)
const ALERT_BOX: (i32, i32, i32, i32) = (20, 500, 760, 90);

/// Fills the SVG template with a weather report.
///
/// The template marks every spot to fill with a `{{NAME}}` placeholder.
/// Times are shown in `tz`.
#[derive(Debug, Clone)]
pub struct SvgRenderer<Tz: TimeZone> {
    template: String,
    tz: Tz,
}

impl SvgRenderer<Local> {
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl<Tz> SvgRenderer<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    // uses the template built into the binary
    pub fn new(tz: Tz) -> Self {
        Self::with_template(TEMPLATE, tz)
    }

    pub fn with_template(template: impl Into<String>, tz: Tz) -> Self {
        Self {
            template: template.into(),
            tz,
        }
    }

    pub fn from_file(path: &Path, tz: Tz) -> std::io::Result<Self> {
        let template = std::fs::read_to_string(path)?;
        Ok(Self::with_template(template, tz))
    }

    /// Renders the report. `now` decides how alert times are described.
    pub fn render(&self, report: &WeatherReport, now: i64) -> String {
        let current = &report.current;
        let precipitation = &report.precipitation;
        let (alerts_visibility, alerts) = self.alerts(&report.alerts, now);
        let icon = format!("{}.svg", escape_xml(&current.icon));

        let replacements = [
            ("{{DATE}}", self.format(current.timestamp, "%A, %B %e, %Y")),
            ("{{UPDATED}}", self.format(current.timestamp, "%H:%M")),
            ("{{AQI}}", current.aqi.summary()),
            ("{{WIND}}", current.wind.summary()),
            ("{{UV}}", current.uvi.summary()),
            ("{{HUMIDITY}}", to_percent(current.humidity)),
            ("{{FEELS_LIKE}}", to_degree(current.feels_like)),
            ("{{TEMP}}", to_degree(current.temp)),
            ("{{WEATHER}}", escape_xml(value_or(&current.weather, "N/A"))),
            ("{{ICON}}", icon),
            ("{{POP_HOUR}}", to_percent(precipitation.hour)),
            ("{{POP_TODAY}}", to_percent(precipitation.today)),
            ("{{POP_OPACITY}}", format!("{:.2}", precipitation.hour.max(precipitation.today))),
            ("{{HOURLY}}", self.hourly_graph(&report.hourly)),
            ("{{DAILY}}", self.daily_forecast(&report.daily)),
            ("{{ALERTS_VISIBILITY}}", alerts_visibility.to_string()),
            ("{{ALERTS}}", alerts),
        ];

        replacements
            .iter()
            .fold(self.template.clone(), |svg, (placeholder, value)| {
                svg.replace(placeholder, value)
            })
    }

    fn format(&self, timestamp: i64, pattern: &str) -> String {
        format_timestamp(timestamp, &self.tz, pattern)
    }

    fn hourly_graph(&self, hourly: &[HourlyWeather]) -> String {
        let hours = &hourly[..hourly.len().min(GRAPH_HOURS)];
        if hours.len() < 2 {
            log::warn!("Not enough hourly data to draw a graph ({} entries)", hours.len());
            return String::new();
        }

        let column = (GRAPH_X.1 - GRAPH_X.0) / (GRAPH_HOURS as i32 - 1);
        let height = GRAPH_Y.1 - GRAPH_Y.0;
        let x = |i: usize| GRAPH_X.0 + i as i32 * column;
        let local_hours: Vec<Option<u32>> = hours
            .iter()
            .map(|h| local_time(h.timestamp, &self.tz).map(|t| t.hour()))
            .collect();
        let on_third_hour = |i: usize| local_hours[i].is_some_and(|hour| hour % 3 == 0);
        let (lo, hi) = temperature_bounds(hours);
        let divisions = (hi - lo) / ROUND_TO;
        let mut elements = Vec::new();

        // chance of precipitation as a filled area
        let mut points: Vec<String> = hours
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{},{:.1}", x(i), GRAPH_Y.1 as f64 - height as f64 * h.pop))
            .collect();
        points.push(format!("{},{}", x(hours.len() - 1), GRAPH_Y.1));
        points.push(format!("{},{}", GRAPH_X.0, GRAPH_Y.1));
        elements.push(format!(r#"<polygon class="hourlypop" points="{}"/>"#, points.join(" ")));

        for i in (1..hours.len() - 1).filter(|i| on_third_hour(*i)) {
            elements.push(format!(
                r#"<line class="hourlygrid" x1="{x}" y1="{}" x2="{x}" y2="{}"/>"#,
                GRAPH_Y.0 - GRID_PADDING,
                GRAPH_Y.1 + GRID_PADDING,
                x = x(i),
            ));
        }

        // top and bottom lines are part of the template
        for i in 1..divisions {
            let y = GRAPH_Y.0 + i * height / divisions;
            elements.push(format!(
                r#"<line class="hourlygrid" x1="{}" y1="{y}" x2="{}" y2="{y}"/>"#,
                GRAPH_X.0 - GRID_PADDING,
                GRAPH_X.1 + GRID_PADDING,
            ));
        }

        for i in (0..hours.len()).filter(|i| on_third_hour(*i)) {
            if let Some(hour) = local_hours[i] {
                elements.push(format!(
                    r#"<text class="hourlyhour" x="{}" y="{}">{}</text>"#,
                    x(i),
                    GRAPH_Y.1 + GRID_PADDING + 14,
                    hour
                ));
            }
        }

        for i in 0..=divisions {
            elements.push(format!(
                r#"<text class="hourlytemp" x="{}" y="{}">{}</text>"#,
                GRAPH_X.0 - GRID_PADDING - TEXT_PADDING,
                GRAPH_Y.0 + i * height / divisions,
                to_degree((hi - i * ROUND_TO) as f64)
            ));
        }

        let line: Vec<String> = hours
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let y = GRAPH_Y.1 as f64 - height as f64 * (h.temp - lo as f64) / (hi - lo) as f64;
                format!("{},{:.1}", x(i), y)
            })
            .collect();
        elements.push(format!(r#"<polyline class="hourlytempline" points="{}"/>"#, line.join(" ")));

        elements.join("\n    ")
    }

    fn daily_forecast(&self, daily: &[DailyWeather]) -> String {
        daily
            .iter()
            .take(DAILY_BOXES)
            .enumerate()
            .map(|(i, day)| {
                let left = DAILY_X + i as i32 * DAILY_WIDTH;
                let center = left + DAILY_WIDTH / 2;
                let icon_x = center - DAILY_ICON / 2;
                let weekday = self.format(day.timestamp, "%a");
                let hi = to_degree(day.hi);
                let lo = day.lo.map(to_degree).unwrap_or_else(|| "--".to_string());
                let icon = format!("{}.svg", escape_xml(&day.icon));
                format!(
                    r#"<text class="dailyday" x="{center}" y="320">{weekday}</text>
    <image x="{icon_x}" y="332" width="{DAILY_ICON}" height="{DAILY_ICON}" href="{icon}" xlink:href="{icon}"/>
    <text class="dailytemp" x="{center}" y="440">{hi}/{lo}</text>"#
                )
            })
            .collect::<Vec<_>>()
            .join("\n    ")
    }

    // one alert shows its timing, two show both names, more show a count
    fn alerts(&self, alerts: &[WeatherAlert], now: i64) -> (&'static str, String) {
        let (first, second) = match alerts {
            [] => return ("hidden", String::new()),
            [only] => (only.name.clone(), format!("({})", only.status(now, &self.tz))),
            [first, second] => (first.name.clone(), second.name.clone()),
            [first, rest @ ..] => (first.name.clone(), format!("({} more alerts)", rest.len())),
        };

        let (x, y, width, height) = ALERT_BOX;
        let center = x + width / 2;
        let content = format!(
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" style="fill:black"/>
    <text class="alerttext" x="{center}" y="{}">{}</text>
    <text class="alerttext" x="{center}" y="{}">{}</text>"#,
            y + 36,
            escape_xml(&first),
            y + 70,
            escape_xml(&second),
        );
        ("visible", content)
    }
}

/// Lowest and highest temperature rounded outwards to multiples of 5 degrees.
/// The range is never empty.
pub fn temperature_bounds(hourly: &[HourlyWeather]) -> (i32, i32) {
    let max = hourly.iter().map(|h| h.temp).fold(f64::NEG_INFINITY, f64::max);
    let min = hourly.iter().map(|h| h.temp).fold(f64::INFINITY, f64::min);
    let step = ROUND_TO as f64;

    let lo = (min / step).floor() as i32 * ROUND_TO;
    let mut hi = (max / step).ceil() as i32 * ROUND_TO;
    if hi == lo {
        hi += ROUND_TO;
    }
    (lo, hi)
}

// the card served when a report could not be fetched
pub fn render_error(message: &str) -> String {
    ERROR_TEMPLATE.replace("{{ERROR}}", &escape_xml(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air_quality::{classify_air_quality, Concentrations};
    use crate::models::{CurrentWeather, Precipitation};
    use crate::uv::classify_uv;
    use crate::wind::classify_wind;
    use chrono::Utc;

    // monday 2024-01-15 00:00:00 utc
    const MONDAY: i64 = 1_705_276_800;
    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    fn sample_report(alerts: Vec<WeatherAlert>) -> WeatherReport {
        let temps = [3.2, 4.0, 6.5, 8.9, 10.2, 11.7, 11.0, 9.4, 7.7, 6.1, 5.0, 4.4];
        let pops = [0.0, 0.1, 0.2, 0.5, 0.8, 1.0, 0.6, 0.3, 0.0, 0.0, 0.0, 0.0];
        let hourly = temps
            .iter()
            .zip(pops)
            .enumerate()
            .map(|(i, (temp, pop))| HourlyWeather {
                timestamp: MONDAY + (9 + i as i64) * HOUR,
                temp: *temp,
                pop,
                icon: "10d".to_string(),
            })
            .collect();
        let daily = (0..6)
            .map(|i| DailyWeather {
                timestamp: MONDAY + 12 * HOUR + i * DAY,
                hi: 6.0 - i as f64,
                lo: if i < 5 { Some(-4.0 + i as f64) } else { None },
                weather: "rain".to_string(),
                icon: format!("0{}d", i + 1),
            })
            .collect();

        WeatherReport {
            current: CurrentWeather {
                timestamp: MONDAY + 9 * HOUR,
                temp: 3.4,
                feels_like: -0.6,
                weather: "rain & snow".to_string(),
                icon: "13d".to_string(),
                aqi: classify_air_quality(
                    3,
                    Concentrations { no2: 10.0, pm10: 40.0, o3: 130.0, pm2_5: 20.0 },
                ),
                wind: classify_wind(6.2),
                uvi: classify_uv(1),
                humidity: 0.87,
            },
            precipitation: Precipitation { hour: 0.25, today: 0.8 },
            hourly,
            daily,
            alerts,
        }
    }

    fn render(report: &WeatherReport) -> String {
        SvgRenderer::new(Utc).render(report, MONDAY + 9 * HOUR)
    }

    #[test]
    fn test_fills_every_placeholder() {
        let svg = render(&sample_report(vec![]));
        assert!(!svg.contains("{{"), "unreplaced placeholder in {}", svg);
    }

    #[test]
    fn test_current_conditions() {
        let svg = render(&sample_report(vec![]));
        assert!(svg.contains(">Monday, January 15, 2024<"));
        assert!(svg.contains(">09:00<"));
        assert!(svg.contains(">3 - Moderate (o3)<"));
        assert!(svg.contains(">4 - Moderate breeze<"));
        assert!(svg.contains(">0 - Low<"));
        assert!(svg.contains(">87%<"));
        assert!(svg.contains(">-1°<"));
        assert!(svg.contains(">3°<"));
        assert!(svg.contains(">rain &amp; snow<"));
        assert!(svg.contains(r#"href="13d.svg" xlink:href="13d.svg""#));
    }

    #[test]
    fn test_precipitation() {
        let svg = render(&sample_report(vec![]));
        assert!(svg.contains(">25%<"));
        assert!(svg.contains(">80%<"));
        assert!(svg.contains(r#"opacity="0.80""#));
    }

    #[test]
    fn test_hourly_graph() {
        let svg = render(&sample_report(vec![]));

        // 09:00 to 20:00, gridlines at 12, 15 and 18
        for x in [610, 670, 730] {
            let line = format!(r#"<line class="hourlygrid" x1="{x}" y1="350" x2="{x}" y2="470"/>"#);
            assert!(svg.contains(&line), "missing gridline at {}", x);
        }
        assert!(!svg.contains(r#"x1="550" y1="350""#));
        for (x, hour) in [(550, 9), (610, 12), (670, 15), (730, 18)] {
            let label = format!(r#"<text class="hourlyhour" x="{x}" y="484">{hour}</text>"#);
            assert!(svg.contains(&label), "missing label {}", hour);
        }

        // 3.2..11.7 widens to 0..15, which needs two extra gridlines
        assert!(svg.contains(r#"<line class="hourlygrid" x1="540" y1="393" x2="780" y2="393"/>"#));
        assert!(svg.contains(r#"<line class="hourlygrid" x1="540" y1="426" x2="780" y2="426"/>"#));
        for (y, temp) in [(360, "15°"), (393, "10°"), (426, "5°"), (460, "0°")] {
            let label = format!(r#"<text class="hourlytemp" x="536" y="{y}">{temp}</text>"#);
            assert!(svg.contains(&label), "missing temperature label {}", temp);
        }

        assert!(svg.contains(r#"points="550,460.0 570,450.0 590,440.0"#));
        assert!(svg.contains(r#"770,460.0 770,460 550,460""#));
        assert!(svg.contains(r#"<polyline class="hourlytempline" points="550,438.7 570,433.3"#));
    }

    #[test]
    fn test_short_hourly_series_skips_graph() {
        let mut report = sample_report(vec![]);
        report.hourly.truncate(1);
        let svg = render(&report);
        assert!(!svg.contains("hourlypop"));
        assert!(!svg.contains("{{HOURLY}}"));
    }

    #[test]
    fn test_daily_forecast() {
        let svg = render(&sample_report(vec![]));
        assert!(svg.contains(r#"<text class="dailyday" x="70" y="320">Mon</text>"#));
        assert!(svg.contains(r#"<text class="dailyday" x="470" y="320">Fri</text>"#));
        assert!(svg.contains(">6°/-4°<"));
        assert!(svg.contains(">2°/0°<"));
        // only five boxes are drawn
        assert!(!svg.contains(">Sat<"));
        assert!(svg.contains(r#"href="05d.svg""#));
        assert!(!svg.contains(r#"href="06d.svg""#));
    }

    #[test]
    fn test_missing_low_is_dashed() {
        let mut report = sample_report(vec![]);
        report.daily.truncate(1);
        report.daily[0].lo = None;
        let svg = render(&report);
        assert!(svg.contains(">6°/--<"));
    }

    #[test]
    fn test_no_alerts_hides_group() {
        let svg = render(&sample_report(vec![]));
        assert!(svg.contains(r#"<g id="group-alerts" visibility="hidden">"#));
        assert!(!svg.contains("alerttext"));
    }

    #[test]
    fn test_single_alert_shows_timing() {
        let alert = WeatherAlert::new("Frost warning", MONDAY + 14 * HOUR, MONDAY + 20 * HOUR);
        let svg = render(&sample_report(vec![alert]));
        assert!(svg.contains(r#"visibility="visible""#));
        assert!(svg.contains(r#"style="fill:black""#));
        assert!(svg.contains(">Frost warning<"));
        assert!(svg.contains(">(Starts at 14:00)<"));
    }

    #[test]
    fn test_two_alerts_show_both_names() {
        let alerts = vec![
            WeatherAlert::new("Frost", MONDAY, MONDAY + DAY),
            WeatherAlert::new("Black ice", MONDAY, MONDAY + DAY),
        ];
        let svg = render(&sample_report(alerts));
        assert!(svg.contains(">Frost<"));
        assert!(svg.contains(">Black ice<"));
    }

    #[test]
    fn test_many_alerts_show_count() {
        let alerts = vec![
            WeatherAlert::new("Storm", MONDAY, MONDAY + DAY),
            WeatherAlert::new("Flood", MONDAY, MONDAY + DAY),
            WeatherAlert::new("Heavy rain", MONDAY, MONDAY + DAY),
        ];
        let svg = render(&sample_report(alerts));
        assert!(svg.contains(">Storm<"));
        assert!(svg.contains(">(2 more alerts)<"));
        assert!(!svg.contains(">Flood<"));
    }

    #[test]
    fn test_temperature_bounds() {
        let hours = |temps: &[f64]| -> Vec<HourlyWeather> {
            temps
                .iter()
                .map(|t| HourlyWeather { timestamp: MONDAY, temp: *t, pop: 0.0, icon: String::new() })
                .collect()
        };
        assert_eq!(temperature_bounds(&hours(&[3.2, 11.7])), (0, 15));
        assert_eq!(temperature_bounds(&hours(&[-7.2, -1.0])), (-10, 0));
        assert_eq!(temperature_bounds(&hours(&[10.0, 15.0])), (10, 15));
        assert_eq!(temperature_bounds(&hours(&[5.0, 5.0])), (5, 10));
    }

    #[test]
    fn test_custom_template() {
        let renderer = SvgRenderer::with_template("<svg>{{TEMP}} {{WIND}}</svg>", Utc);
        let svg = renderer.render(&sample_report(vec![]), MONDAY);
        assert_eq!(svg, "<svg>3° 4 - Moderate breeze</svg>");
    }

    #[test]
    fn test_error_card() {
        let svg = render_error("timed out <30s>");
        assert!(svg.contains(">timed out &lt;30s&gt;<"));
    }
}
