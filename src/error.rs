/// Errors from talking to the weather provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch {endpoint} data: {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing expected field in response: {0}")]
    MissingField(&'static str),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No API key found in {0}")]
    MissingApiKey(String),

    #[error("Latitude and longitude are required")]
    MissingLocation,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
