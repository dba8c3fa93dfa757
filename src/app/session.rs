use crate::adapters::location::{FixedLocation, NoLocation};
use crate::adapters::map::CatalogMapProvider;
use crate::adapters::places::HttpPlacesProvider;
use crate::core::catalog::LotCatalog;
use crate::core::discovery::{DiscoveryEngine, DiscoverySettings, RefreshOutcome};
use crate::core::selection::{CoreEvent, Notice};
use crate::core::{
    ConfigProvider, Coordinates, LocationProvider, LotId, LotSource, MapProvider, ParkingLot,
    ProviderKind,
};
use crate::utils::error::{ParkError, Result};
use serde::Serialize;

pub type Session = DiscoveryEngine<Box<dyn MapProvider>, Box<dyn LocationProvider>>;

/// What one CLI run found.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub center: Coordinates,
    pub query: String,
    pub source: LotSource,
    pub lots: Vec<ParkingLot>,
    pub selection: Option<ParkingLot>,
    pub notices: Vec<Notice>,
    pub recent_searches: Vec<String>,
}

pub fn load_catalog<C: ConfigProvider + ?Sized>(config: &C) -> Result<LotCatalog> {
    match config.catalog_path() {
        Some(path) => {
            let catalog = LotCatalog::from_file(path)?;
            tracing::info!("Loaded {} lots from {}", catalog.len(), path);
            Ok(catalog)
        }
        None => Ok(LotCatalog::sample()),
    }
}

pub fn build_map_provider<C: ConfigProvider + ?Sized>(
    config: &C,
    catalog: &LotCatalog,
) -> Result<Box<dyn MapProvider>> {
    match config.provider_kind() {
        ProviderKind::Catalog => Ok(Box::new(CatalogMapProvider::new(catalog.clone()))),
        ProviderKind::Places => {
            let endpoint = config
                .places_endpoint()
                .ok_or_else(|| ParkError::ConfigError {
                    message: "map.endpoint is required for the places provider".to_string(),
                })?;
            Ok(Box::new(HttpPlacesProvider::new(
                endpoint,
                config.places_api_key().map(str::to_string),
            )?))
        }
    }
}

pub fn build_location_provider<C: ConfigProvider + ?Sized>(config: &C) -> Box<dyn LocationProvider> {
    match config.fixed_position() {
        Some(position) => Box::new(FixedLocation::new(position)),
        None => Box::new(NoLocation),
    }
}

pub fn build_session<C: ConfigProvider + ?Sized>(config: &C) -> Result<Session> {
    let catalog = load_catalog(config)?;
    let map = build_map_provider(config, &catalog)?;
    let location = build_location_provider(config);

    Ok(DiscoveryEngine::new(
        map,
        location,
        catalog,
        DiscoverySettings::from_config(config),
    ))
}

/// Locate, search, optionally select. Location and provider failures end up
/// as notices in the report; only an unknown `select` id is an error.
pub async fn run_session<M: MapProvider, L: LocationProvider>(
    engine: &DiscoveryEngine<M, L>,
    query: Option<&str>,
    select: Option<&LotId>,
) -> Result<SessionReport> {
    let mut events = engine.subscribe();

    engine.locate().await;
    let outcome = match query {
        Some(text) => engine.search_submitted(text).await,
        None => engine.refresh().await,
    };
    if let RefreshOutcome::Applied { count, source } = outcome {
        tracing::info!("Showing {} lots ({:?})", count, source);
    }

    if let Some(id) = select {
        let lot = engine.lot_clicked(id)?;
        tracing::info!("Selected {}: {}", lot.name(), lot.availability_label());
    }

    let mut notices = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }

    Ok(SessionReport {
        center: engine.center(),
        query: engine.query(),
        source: engine.visible_source(),
        lots: engine.visible_lots(),
        selection: engine.selection(),
        notices,
        recent_searches: engine.recent_searches(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use crate::core::selection::NoticeKind;

    #[tokio::test]
    async fn test_default_session_runs_offline() {
        let config = TomlConfig::default();
        let session = build_session(&config).unwrap();

        let report = run_session(&session, Some("Lot 13N"), Some(&LotId::from(1)))
            .await
            .unwrap();

        assert_eq!(report.lots.len(), 1);
        assert_eq!(report.selection.as_ref().unwrap().name(), "Lot 13N");
        assert_eq!(report.source, LotSource::Provider);
        assert_eq!(report.recent_searches[0], "Lot 13N");
        // No device position configured.
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].kind, NoticeKind::LocationFailed);
    }

    #[test]
    fn test_places_provider_needs_endpoint() {
        let mut config = TomlConfig::default();
        config.map.provider = ProviderKind::Places;
        assert!(build_session(&config).is_err());
    }

    #[tokio::test]
    async fn test_unknown_selection_is_an_error() {
        let session = build_session(&TomlConfig::default()).unwrap();
        let result = run_session(&session, None, Some(&LotId::from("404"))).await;
        assert!(matches!(result, Err(ParkError::NotFound { .. })));
    }
}
