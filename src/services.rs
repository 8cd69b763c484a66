use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::air_quality::{classify_air_quality, Concentrations};
use crate::alert::WeatherAlert;
use crate::config::LocationConfig;
use crate::error::WeatherError;
use crate::models::{CurrentWeather, DailyWeather, HourlyWeather, Precipitation, WeatherReport};
use crate::uv::classify_uv;
use crate::wind::classify_wind;

const ONECALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";
const AIR_POLLUTION_URL: &str = "http://api.openweathermap.org/data/2.5/air_pollution";

/// A provider that can produce a full report for a fixed location.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetches current conditions, up to `hours` hourly and `days` daily
    /// entries, and any active alerts.
    async fn fetch_report(&self, hours: usize, days: usize) -> Result<WeatherReport, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherMap {
    client: Client,
    location: LocationConfig,
    api_key: String,
}

impl OpenWeatherMap {
    pub fn new(location: LocationConfig, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), location, api_key)
    }

    pub fn with_client(client: Client, location: LocationConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            location,
            api_key: api_key.into(),
        }
    }

    fn onecall_url(&self) -> String {
        format!(
            "{}?lat={}&lon={}&exclude=minutely&units=metric&appid={}",
            ONECALL_URL, self.location.latitude, self.location.longitude, self.api_key
        )
    }

    fn air_pollution_url(&self) -> String {
        format!(
            "{}?lat={}&lon={}&appid={}",
            AIR_POLLUTION_URL, self.location.latitude, self.location.longitude, self.api_key
        )
    }

    // fetches a url and decodes the body as json, failing on non-2xx responses
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str, url: &str) -> Result<T, WeatherError> {
        log::debug!("Fetching {} data for ({:.4}, {:.4})", endpoint, self.location.latitude, self.location.longitude);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::Status {
                endpoint,
                status: response.status(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMap {
    async fn fetch_report(&self, hours: usize, days: usize) -> Result<WeatherReport, WeatherError> {
        let onecall_url = self.onecall_url();
        let air_pollution_url = self.air_pollution_url();
        let (onecall, air_pollution) = tokio::try_join!(
            self.get_json::<OneCallResponse>("onecall", &onecall_url),
            self.get_json::<AirPollutionResponse>("air pollution", &air_pollution_url),
        )?;

        build_report(onecall, air_pollution, hours, days)
    }
}

#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub current: OneCallCurrent,
    #[serde(default)]
    pub hourly: Vec<OneCallHourly>,
    #[serde(default)]
    pub daily: Vec<OneCallDaily>,
    #[serde(default)]
    pub alerts: Vec<OneCallAlert>,
}

#[derive(Debug, Deserialize)]
pub struct OneCallCurrent {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub uvi: f64,
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct OneCallHourly {
    pub dt: i64,
    pub temp: f64,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct OneCallDaily {
    pub dt: i64,
    pub temp: DailyTemperature,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct DailyTemperature {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct OneCallAlert {
    pub event: String,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    pub main: AirPollutionIndex,
    pub components: Components,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionIndex {
    pub aqi: i32,
}

#[derive(Debug, Deserialize)]
pub struct Components {
    pub no2: f64,
    pub pm10: f64,
    pub o3: f64,
    pub pm2_5: f64,
}

impl From<Components> for Concentrations {
    fn from(c: Components) -> Self {
        Concentrations {
            no2: c.no2,
            pm10: c.pm10,
            o3: c.o3,
            pm2_5: c.pm2_5,
        }
    }
}

fn first_condition<'a>(conditions: &'a [Condition], field: &'static str) -> Result<&'a Condition, WeatherError> {
    conditions.first().ok_or(WeatherError::MissingField(field))
}

/// Maps the two decoded responses into the records the renderer draws.
///
/// At most `hours` hourly and `days` daily entries are kept; fewer are
/// returned when the response is shorter.
pub fn build_report(
    onecall: OneCallResponse,
    air_pollution: AirPollutionResponse,
    hours: usize,
    days: usize,
) -> Result<WeatherReport, WeatherError> {
    let air = air_pollution
        .list
        .into_iter()
        .next()
        .ok_or(WeatherError::MissingField("list"))?;
    let aqi = classify_air_quality(air.main.aqi, air.components.into());

    let current = &onecall.current;
    let condition = first_condition(&current.weather, "current.weather")?;
    let current_weather = CurrentWeather {
        timestamp: current.dt,
        temp: current.temp,
        feels_like: current.feels_like,
        weather: condition.description.clone(),
        icon: condition.icon.clone(),
        aqi,
        wind: classify_wind(current.wind_speed),
        // the uv scale is integral, fractional readings are truncated
        uvi: classify_uv(current.uvi as i32),
        humidity: current.humidity / 100.0,
    };

    let precipitation = Precipitation {
        hour: onecall
            .hourly
            .first()
            .ok_or(WeatherError::MissingField("hourly"))?
            .pop,
        today: onecall
            .daily
            .first()
            .ok_or(WeatherError::MissingField("daily"))?
            .pop,
    };

    let hourly = onecall
        .hourly
        .iter()
        .take(hours)
        .map(|hour| -> Result<HourlyWeather, WeatherError> {
            Ok(HourlyWeather {
                timestamp: hour.dt,
                temp: hour.temp,
                pop: hour.pop,
                icon: first_condition(&hour.weather, "hourly.weather")?.icon.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // the night after a day is closest to the next day's minimum
    let daily = onecall
        .daily
        .iter()
        .enumerate()
        .take(days)
        .map(|(i, day)| -> Result<DailyWeather, WeatherError> {
            let condition = first_condition(&day.weather, "daily.weather")?;
            Ok(DailyWeather {
                timestamp: day.dt,
                hi: day.temp.max,
                lo: onecall.daily.get(i + 1).map(|next| next.temp.min),
                weather: condition.description.clone(),
                icon: condition.icon.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let alerts = onecall
        .alerts
        .into_iter()
        .map(|alert| WeatherAlert::new(alert.event, alert.start, alert.end))
        .collect();

    Ok(WeatherReport {
        current: current_weather,
        precipitation,
        hourly,
        daily,
        alerts,
    })
}
