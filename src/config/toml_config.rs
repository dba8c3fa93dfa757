use crate::core::{ConfigProvider, Coordinates, EmptyResultPolicy, ProviderKind};
use crate::utils::error::{ParkError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_RADIUS_METERS: u32 = 1_500;
const MAX_RADIUS_METERS: u32 = 50_000;
const DEFAULT_HISTORY_CAPACITY: usize = 5;
const MAX_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub radius_meters: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Map center before the viewer has been located.
    pub default_center: Option<Coordinates>,
    /// Fixed device position; without it locating the viewer fails softly.
    pub device: Option<Coordinates>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub empty_result: EmptyResultPolicy,
    #[serde(default = "default_recent_searches")]
    pub recent: Vec<String>,
    pub history_capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Catalog
}

fn default_recent_searches() -> Vec<String> {
    [
        "MacKinnon Hall",
        "Glass Bowl Stadium",
        "Student Union",
        "Engineering Building",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn campus_center() -> Coordinates {
    Coordinates::new(41.6563, -83.6127)
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            api_key: None,
            radius_meters: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            empty_result: EmptyResultPolicy::default(),
            recent: default_recent_searches(),
            history_capacity: None,
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ParkError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables
    /// are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ParkError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.map.provider == ProviderKind::Places {
            let endpoint = validation::validate_required_field("map.endpoint", &self.map.endpoint)?;
            validation::validate_url("map.endpoint", endpoint)?;
        }
        if let Some(key) = &self.map.api_key {
            validation::validate_non_empty_string("map.api_key", key)?;
        }
        if let Some(radius) = self.map.radius_meters {
            validation::validate_range("map.radius_meters", radius, 1, MAX_RADIUS_METERS)?;
        }
        if let Some(center) = &self.location.default_center {
            validation::validate_coordinates("location.default_center", center)?;
        }
        if let Some(device) = &self.location.device {
            validation::validate_coordinates("location.device", device)?;
        }
        if let Some(capacity) = self.search.history_capacity {
            validation::validate_range(
                "search.history_capacity",
                capacity,
                0,
                MAX_HISTORY_CAPACITY,
            )?;
        }
        if let Some(path) = &self.catalog.path {
            validation::validate_path("catalog.path", path)?;
        }
        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ParkError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn provider_kind(&self) -> ProviderKind {
        self.map.provider
    }

    fn places_endpoint(&self) -> Option<&str> {
        self.map.endpoint.as_deref()
    }

    fn places_api_key(&self) -> Option<&str> {
        self.map.api_key.as_deref()
    }

    fn radius_meters(&self) -> u32 {
        self.map.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS)
    }

    fn default_center(&self) -> Coordinates {
        self.location.default_center.unwrap_or_else(campus_center)
    }

    fn fixed_position(&self) -> Option<Coordinates> {
        self.location.device
    }

    fn empty_result_policy(&self) -> EmptyResultPolicy {
        self.search.empty_result
    }

    fn recent_searches(&self) -> &[String] {
        &self.search.recent
    }

    fn history_capacity(&self) -> usize {
        self.search
            .history_capacity
            .unwrap_or(DEFAULT_HISTORY_CAPACITY)
    }

    fn catalog_path(&self) -> Option<&str> {
        self.catalog.path.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.provider_kind(), ProviderKind::Catalog);
        assert_eq!(config.radius_meters(), DEFAULT_RADIUS_METERS);
        assert_eq!(config.default_center(), campus_center());
        assert_eq!(config.empty_result_policy(), EmptyResultPolicy::ShowEmpty);
        assert_eq!(config.recent_searches().len(), 4);
        assert!(config.fixed_position().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[map]
provider = "places"
endpoint = "https://maps.example.com/place/nearbysearch/json"
radius_meters = 800

[location]
default_center = { latitude = 41.66, longitude = -83.61 }
device = { latitude = 41.657, longitude = -83.605 }

[search]
empty_result = "show-all"
recent = ["Rocket Hall"]
history_capacity = 3

[catalog]
path = "lots.toml"

[logging]
level = "debug"
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.provider_kind(), ProviderKind::Places);
        assert_eq!(config.radius_meters(), 800);
        assert_eq!(config.default_center(), Coordinates::new(41.66, -83.61));
        assert_eq!(
            config.fixed_position(),
            Some(Coordinates::new(41.657, -83.605))
        );
        assert_eq!(config.empty_result_policy(), EmptyResultPolicy::ShowAll);
        assert_eq!(config.recent_searches(), ["Rocket Hall".to_string()]);
        assert_eq!(config.history_capacity(), 3);
        assert_eq!(config.catalog_path(), Some("lots.toml"));
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FINDMYPARK_TEST_PLACES_KEY", "abc123");

        let toml_content = r#"
[map]
provider = "places"
endpoint = "https://maps.example.com/nearby"
api_key = "${FINDMYPARK_TEST_PLACES_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.places_api_key(), Some("abc123"));

        std::env::remove_var("FINDMYPARK_TEST_PLACES_KEY");
    }

    #[test]
    fn test_places_provider_requires_endpoint() {
        let config = TomlConfig::from_toml_str("[map]\nprovider = \"places\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            "[map]\nprovider = \"places\"\nendpoint = \"invalid-url\"\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_values_fail_validation() {
        let config = TomlConfig::from_toml_str("[map]\nradius_meters = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            "[location]\ndevice = { latitude = 123.0, longitude = 0.0 }\n",
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_provider_is_a_parse_error() {
        assert!(TomlConfig::from_toml_str("[map]\nprovider = \"bing\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[map]\nradius_meters = 2500\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.radius_meters(), 2500);
    }
}
