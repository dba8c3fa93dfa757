use crate::domain::model::{Coordinates, PlaceRecord};
use crate::utils::error::{LocationError, ProviderError};
use async_trait::async_trait;

/// Device geolocation.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> std::result::Result<Coordinates, LocationError>;
}

/// Map/places search near a coordinate.
#[async_trait]
pub trait MapProvider: Send + Sync {
    async fn search_nearby(
        &self,
        center: Coordinates,
        radius_meters: u32,
        query: &str,
    ) -> std::result::Result<Vec<PlaceRecord>, ProviderError>;
}

#[async_trait]
impl<T: LocationProvider + ?Sized> LocationProvider for Box<T> {
    async fn current_position(&self) -> std::result::Result<Coordinates, LocationError> {
        (**self).current_position().await
    }
}

#[async_trait]
impl<T: MapProvider + ?Sized> MapProvider for Box<T> {
    async fn search_nearby(
        &self,
        center: Coordinates,
        radius_meters: u32,
        query: &str,
    ) -> std::result::Result<Vec<PlaceRecord>, ProviderError> {
        (**self).search_nearby(center, radius_meters, query).await
    }
}

/// Which map adapter a session should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Catalog,
    Places,
}

/// What to show when the name filter matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyResultPolicy {
    #[default]
    ShowEmpty,
    ShowAll,
}

pub trait ConfigProvider: Send + Sync {
    fn provider_kind(&self) -> ProviderKind;
    fn places_endpoint(&self) -> Option<&str>;
    fn places_api_key(&self) -> Option<&str>;
    fn radius_meters(&self) -> u32;
    fn default_center(&self) -> Coordinates;
    /// Configured device position, if any.
    fn fixed_position(&self) -> Option<Coordinates>;
    fn empty_result_policy(&self) -> EmptyResultPolicy;
    fn recent_searches(&self) -> &[String];
    fn history_capacity(&self) -> usize;
    fn catalog_path(&self) -> Option<&str>;
}
