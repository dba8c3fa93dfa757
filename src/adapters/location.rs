use crate::core::{Coordinates, LocationProvider};
use crate::utils::error::LocationError;
use async_trait::async_trait;

/// A device position known up front (CLI flags, config file).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    position: Coordinates,
}

impl FixedLocation {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.position)
    }
}

/// Used when no position source is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable(
            "no location source configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_location_returns_position() {
        let here = Coordinates::new(41.6563, -83.6127);
        assert_eq!(FixedLocation::new(here).current_position().await, Ok(here));
    }

    #[tokio::test]
    async fn test_no_location_is_unavailable() {
        let err = NoLocation.current_position().await.unwrap_err();
        assert!(matches!(err, LocationError::Unavailable(_)));
    }
}
