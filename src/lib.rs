//! Weather display generator for e-ink screens.
//!
//! Fetches the forecast for a fixed location from OpenWeatherMap, classifies
//! wind, UV and air quality readings, and fills an SVG template with the
//! result:
//! - Current conditions with Beaufort, UV and air quality summaries
//! - Precipitation chances and a 12 hour graph
//! - Daily forecast and active weather alerts

pub mod air_quality;
pub mod alert;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;
pub mod utils;
pub mod uv;
pub mod wind;

pub use air_quality::{classify_air_quality, AirQualityClassification, Concentrations, Pollutant};
pub use alert::{alert_status, AlertPhase, WeatherAlert};
pub use uv::{classify_uv, UvClassification};
pub use wind::{classify_wind, WindClassification};
