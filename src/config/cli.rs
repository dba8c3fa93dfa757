use crate::app::output::OutputFormat;
use crate::config::toml_config::TomlConfig;
use crate::core::{Coordinates, ProviderKind};
use crate::utils::error::{ParkError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "findmypark")]
#[command(about = "Find available campus parking near you")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Filter lots by name
    #[arg(short, long)]
    pub query: Option<String>,

    /// Device latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Device longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Search radius in meters
    #[arg(long)]
    pub radius: Option<u32>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub places_endpoint: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to a TOML lot catalog replacing the built-in campus lots
    #[arg(long)]
    pub catalog: Option<String>,

    /// Select a lot by id after searching
    #[arg(long)]
    pub select: Option<String>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn device_position(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    /// Loads the TOML file (if any) and lays the command line flags over it.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(provider) = self.provider {
            config.map.provider = provider;
        }
        if let Some(endpoint) = &self.places_endpoint {
            config.map.endpoint = Some(endpoint.clone());
        }
        if let Some(key) = &self.api_key {
            config.map.api_key = Some(key.clone());
        }
        if let Some(radius) = self.radius {
            config.map.radius_meters = Some(radius);
        }
        if let Some(position) = self.device_position() {
            config.location.device = Some(position);
        }
        if let Some(catalog) = &self.catalog {
            config.catalog.path = Some(catalog.clone());
        }
        if self.log_json {
            config.logging.json = true;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.lat.is_some() != self.lng.is_some() {
            return Err(ParkError::ConfigError {
                message: "--lat and --lng must be given together".to_string(),
            });
        }
        if let Some(position) = self.device_position() {
            validation::validate_coordinates("location.device", &position)?;
        }
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }
        Ok(())
    }
}
