use crate::domain::model::LotId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParkError {
    #[error("Parking lot not found: {id}")]
    NotFound { id: LotId },

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Map provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// Failures reported by a location capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Single error type for everything a map/places capability can fail with.
/// The underlying reason is always kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("provider returned status {status}: {reason}")]
    Status { status: String, reason: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Degraded experience, the session continues.
    Low,
    Medium,
    High,
    Critical,
}

impl ParkError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ParkError::Location(_) | ParkError::Provider(_) => ErrorSeverity::Low,
            ParkError::NotFound { .. } => ErrorSeverity::Medium,
            ParkError::ConfigError { .. }
            | ParkError::InvalidConfigValueError { .. }
            | ParkError::ValidationError { .. }
            | ParkError::TomlError(_) => ErrorSeverity::High,
            ParkError::IoError(_) | ParkError::SerializationError(_) | ParkError::CsvError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ParkError::NotFound { id } => format!("No parking lot with id '{}' is shown", id),
            ParkError::Location(LocationError::PermissionDenied) => {
                "Location access was denied, staying on the current map area".to_string()
            }
            ParkError::Location(LocationError::Unavailable(_)) => {
                "Your location is unavailable right now".to_string()
            }
            ParkError::Provider(_) => {
                "Live parking search failed, showing campus lots instead".to_string()
            }
            ParkError::ConfigError { message } | ParkError::ValidationError { message } => {
                message.clone()
            }
            ParkError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            ParkError::TomlError(e) => format!("Config file could not be parsed: {}", e),
            ParkError::IoError(e) => format!("File access failed: {}", e),
            ParkError::SerializationError(_) | ParkError::CsvError(_) => {
                "Results could not be written".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ParkError::NotFound { .. } => "Refresh the search and pick a lot from the list",
            ParkError::Location(LocationError::PermissionDenied) => {
                "Allow location access or pass --lat/--lng"
            }
            ParkError::Location(LocationError::Unavailable(_)) => "Try again in a moment",
            ParkError::Provider(_) => "Check the places endpoint and API key",
            ParkError::ConfigError { .. }
            | ParkError::InvalidConfigValueError { .. }
            | ParkError::ValidationError { .. }
            | ParkError::TomlError(_) => "Fix the configuration and run again",
            ParkError::IoError(_) => "Check that the path exists and is readable",
            ParkError::SerializationError(_) | ParkError::CsvError(_) => {
                "Try a different --format"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ParkError>;
