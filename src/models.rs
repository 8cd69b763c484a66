use std::sync::Arc;

use chrono::Local;

use crate::air_quality::AirQualityClassification;
use crate::alert::WeatherAlert;
use crate::render::SvgRenderer;
use crate::services::WeatherSource;
use crate::uv::UvClassification;
use crate::wind::WindClassification;

// shared by every request in serve mode
pub struct AppState {
    pub source: Arc<dyn WeatherSource>,
    pub renderer: SvgRenderer<Local>,
    pub hours: usize,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub timestamp: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub weather: String,
    pub icon: String,
    pub aqi: AirQualityClassification,
    pub wind: WindClassification,
    pub uvi: UvClassification,
    /// 0.0 - 1.0
    pub humidity: f64,
}

/// Chance of precipitation, 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Precipitation {
    pub hour: f64,
    pub today: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyWeather {
    pub timestamp: i64,
    pub temp: f64,
    pub pop: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeather {
    pub timestamp: i64,
    pub hi: f64,
    /// Taken from the following day's minimum, so the last day has none
    pub lo: Option<f64>,
    pub weather: String,
    pub icon: String,
}

/// Everything needed to draw one image
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub precipitation: Precipitation,
    pub hourly: Vec<HourlyWeather>,
    pub daily: Vec<DailyWeather>,
    pub alerts: Vec<WeatherAlert>,
}
