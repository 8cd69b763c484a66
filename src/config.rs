use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const API_KEY_FILE: &str = "apikey.txt";
pub const IMG_DIR: &str = "img";
pub const TEMPLATE_FILE: &str = "template.svg";
pub const OUTPUT_FILE: &str = "generated.svg";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Settings for one deployment. Every field may be left out of the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: Option<LocationConfig>,
    pub api_key: Option<String>,
    /// File whose first whitespace-separated token is the API key
    pub api_key_file: Option<PathBuf>,
    /// Template SVG; the built-in template is used when unset and `img/template.svg` is missing
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Hours shown in the hourly graph
    pub hours: usize,
    /// Days shown in the daily forecast
    pub days: usize,
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: None,
            api_key: None,
            api_key_file: None,
            template: None,
            output: None,
            hours: 12,
            days: 5,
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn location(&self) -> Result<LocationConfig, ConfigError> {
        self.location.ok_or(ConfigError::MissingLocation)
    }

    // an inline key wins, then the configured key file, then apikey.txt in the project dir
    pub fn api_key(&self, project_dir: &Path) -> Result<String, ConfigError> {
        if let Some(key) = self.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        let path = self
            .api_key_file
            .clone()
            .unwrap_or_else(|| project_dir.join(API_KEY_FILE));
        read_api_key(&path)
    }

    pub fn template_path(&self, project_dir: &Path) -> Option<PathBuf> {
        if let Some(path) = &self.template {
            return Some(path.clone());
        }
        let default = project_dir.join(IMG_DIR).join(TEMPLATE_FILE);
        default.is_file().then_some(default)
    }

    pub fn output_path(&self, project_dir: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| project_dir.join(IMG_DIR).join(OUTPUT_FILE))
    }
}

// reads the api key, which is the first token in the file
pub fn read_api_key(path: &Path) -> Result<String, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

    contents
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingApiKey(path.display().to_string()))
}

// the binary lives in <project>/bin, so the project dir is one level above the executable's dir
pub fn project_dir() -> PathBuf {
    std::env::current_exe()
        .and_then(|exe| exe.canonicalize())
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nook-weather-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
location:
  latitude: 52.52
  longitude: 13.405
api_key: abc123
template: /srv/nook/template.svg
output: /srv/nook/out.svg
hours: 12
days: 4
listen: 127.0.0.1:8080
"#;
        let config = Config::parse(yaml).unwrap();
        let location = config.location().unwrap();
        assert_eq!(location.latitude, 52.52);
        assert_eq!(location.longitude, 13.405);
        assert_eq!(config.days, 4);
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(config.api_key(Path::new("/nowhere")).unwrap(), "abc123");
        assert_eq!(
            config.output_path(Path::new("/nowhere")),
            PathBuf::from("/srv/nook/out.svg")
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = Config::parse("days: 3").unwrap();
        assert_eq!(config.hours, 12);
        assert_eq!(config.days, 3);
        assert_eq!(config.listen, "0.0.0.0:3000");
        assert!(matches!(config.location(), Err(ConfigError::MissingLocation)));
        assert_eq!(
            config.output_path(Path::new("/opt/nook")),
            PathBuf::from("/opt/nook/img/generated.svg")
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::parse("hours: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_api_key_from_project_dir() {
        let dir = temp_dir("key");
        std::fs::write(dir.join(API_KEY_FILE), "  secretkey \nignored\n").unwrap();

        let config = Config::default();
        assert_eq!(config.api_key(&dir).unwrap(), "secretkey");

        std::fs::write(dir.join(API_KEY_FILE), "\n\n").unwrap();
        assert!(matches!(config.api_key(&dir), Err(ConfigError::MissingApiKey(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_blank_inline_key_falls_back_to_file() {
        let dir = temp_dir("blank");
        let key_file = dir.join("owm.key");
        std::fs::write(&key_file, "fromfile").unwrap();

        let config = Config {
            api_key: Some("   ".to_string()),
            api_key_file: Some(key_file),
            ..Config::default()
        };
        assert_eq!(config.api_key(&dir).unwrap(), "fromfile");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_template_path_only_when_present() {
        let dir = temp_dir("template");
        let config = Config::default();
        assert_eq!(config.template_path(&dir), None);

        std::fs::create_dir_all(dir.join(IMG_DIR)).unwrap();
        std::fs::write(dir.join(IMG_DIR).join(TEMPLATE_FILE), "<svg/>").unwrap();
        assert_eq!(
            config.template_path(&dir),
            Some(dir.join(IMG_DIR).join(TEMPLATE_FILE))
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
