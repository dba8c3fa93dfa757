use crate::core::catalog::LotCatalog;
use crate::core::normalize::normalize_places;
use crate::core::search::{SearchFilter, SearchHistory};
use crate::core::selection::{
    CoreEvent, EventBus, Notice, NoticeKind, SelectionController, SelectionState,
};
use crate::core::{
    ConfigProvider, Coordinates, EmptyResultPolicy, LocationProvider, LotId, LotSource,
    MapProvider, ParkingLot,
};
use crate::utils::error::{ParkError, Result};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedReceiver;

const DEFAULT_RADIUS_METERS: u32 = 1_500;

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub radius_meters: u32,
    pub default_center: Coordinates,
    pub empty_result: EmptyResultPolicy,
    pub recent_searches: Vec<String>,
    pub history_capacity: usize,
}

impl DiscoverySettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            radius_meters: config.radius_meters(),
            default_center: config.default_center(),
            empty_result: config.empty_result_policy(),
            recent_searches: config.recent_searches().to_vec(),
            history_capacity: config.history_capacity(),
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            default_center: Coordinates::new(41.6563, -83.6127),
            empty_result: EmptyResultPolicy::ShowEmpty,
            recent_searches: Vec::new(),
            history_capacity: 5,
        }
    }
}

/// Commands coming from the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    SearchTextChanged(String),
    SearchSubmitted(String),
    LotClicked(LotId),
    MapClicked(Coordinates),
    ClearSelection,
    Locate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied { count: usize, source: LotSource },
    /// A newer search was issued while this one was in flight.
    Stale { token: u64 },
}

struct DiscoveryState {
    center: Coordinates,
    filter: SearchFilter,
    history: SearchHistory,
    visible: Vec<ParkingLot>,
    source: LotSource,
    selection: SelectionController,
    latest_token: u64,
}

/// Owns one discovery session: the catalog, the current query and visible
/// lots, the selection, and the search sequence used to drop stale provider
/// responses.
///
/// All methods take `&self` so several searches can be in flight at once.
/// The state lock is never held across an `.await`.
pub struct DiscoveryEngine<M: MapProvider, L: LocationProvider> {
    map: M,
    location: L,
    catalog: LotCatalog,
    settings: DiscoverySettings,
    bus: EventBus,
    state: Mutex<DiscoveryState>,
}

impl<M: MapProvider, L: LocationProvider> DiscoveryEngine<M, L> {
    pub fn new(map: M, location: L, catalog: LotCatalog, settings: DiscoverySettings) -> Self {
        let bus = EventBus::new();
        let state = DiscoveryState {
            center: settings.default_center,
            filter: SearchFilter::default(),
            history: SearchHistory::with_entries(
                settings.history_capacity,
                settings.recent_searches.iter().cloned(),
            ),
            visible: catalog.list().to_vec(),
            source: LotSource::Catalog,
            selection: SelectionController::new(bus.clone()),
            latest_token: 0,
        };

        Self {
            map,
            location,
            catalog,
            settings,
            bus,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, DiscoveryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> UnboundedReceiver<CoreEvent> {
        self.bus.subscribe()
    }

    pub fn center(&self) -> Coordinates {
        self.state().center
    }

    pub fn query(&self) -> String {
        self.state().filter.query().to_string()
    }

    pub fn visible_lots(&self) -> Vec<ParkingLot> {
        self.state().visible.clone()
    }

    pub fn visible_source(&self) -> LotSource {
        self.state().source
    }

    pub fn recent_searches(&self) -> Vec<String> {
        self.state().history.entries()
    }

    pub fn selection(&self) -> Option<ParkingLot> {
        self.state().selection.selected().cloned()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.state().selection.state().clone()
    }

    /// Asks the location capability for the device position. Failures keep
    /// the last center and surface a notice; there is no retry.
    pub async fn locate(&self) -> Coordinates {
        match self.location.current_position().await {
            Ok(position) => {
                tracing::info!("Located viewer at {}", position);
                self.state().center = position;
                self.bus
                    .emit(CoreEvent::RecenterRequested { center: position });
                position
            }
            Err(e) => {
                let center = self.center();
                tracing::warn!("Location lookup failed, keeping center {}: {}", center, e);
                let err = ParkError::from(e);
                self.bus.emit(CoreEvent::Notice(Notice::new(
                    NoticeKind::LocationFailed,
                    err.user_friendly_message(),
                    err.to_string(),
                )));
                center
            }
        }
    }

    /// Locates the viewer, then searches around the resulting center.
    pub async fn locate_and_refresh(&self) -> RefreshOutcome {
        self.locate().await;
        self.refresh().await
    }

    /// Live filtering while the user types. History is left alone.
    pub async fn search_text_changed(&self, text: &str) -> RefreshOutcome {
        self.state().filter.set_query(text);
        self.refresh().await
    }

    /// A committed search: same refresh as a text change, and the query
    /// goes to the recent-search list.
    pub async fn search_submitted(&self, text: &str) -> RefreshOutcome {
        {
            let mut state = self.state();
            state.filter.set_query(text);
            state.history.record(text);
        }
        self.refresh().await
    }

    pub async fn search_near(&self, center: Coordinates) -> RefreshOutcome {
        self.state().center = center;
        self.refresh().await
    }

    /// Runs a provider search for the current center and query. Only the
    /// most recently issued search gets to replace the visible lots.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (token, center, query) = {
            let mut state = self.state();
            state.latest_token += 1;
            (
                state.latest_token,
                state.center,
                state.filter.query().to_string(),
            )
        };

        tracing::debug!(
            "Search #{} near {} (radius {}m, query {:?})",
            token,
            center,
            self.settings.radius_meters,
            query
        );

        let result = self
            .map
            .search_nearby(center, self.settings.radius_meters, &query)
            .await;

        let mut state = self.state();
        if token != state.latest_token {
            tracing::debug!(
                "Discarding stale search #{} (latest is #{})",
                token,
                state.latest_token
            );
            return RefreshOutcome::Stale { token };
        }

        let (candidates, source) = match result {
            Ok(places) => (normalize_places(places, center), LotSource::Provider),
            Err(e) => {
                tracing::warn!("Map provider failed, falling back to catalog: {}", e);
                let err = ParkError::from(e);
                self.bus.emit(CoreEvent::Notice(Notice::new(
                    NoticeKind::ProviderFailed,
                    err.user_friendly_message(),
                    err.to_string(),
                )));
                (self.catalog.list().to_vec(), LotSource::Fallback)
            }
        };

        let filtered = state.filter.apply(&candidates);
        let visible = if filtered.is_empty()
            && state.filter.is_active()
            && self.settings.empty_result == EmptyResultPolicy::ShowAll
        {
            tracing::debug!("No lots match {:?}, showing all", state.filter.query());
            candidates
        } else {
            filtered
        };

        let count = visible.len();
        state.visible = visible;
        state.source = source;
        self.bus.emit(CoreEvent::LotsUpdated { count, source });

        RefreshOutcome::Applied { count, source }
    }

    /// Selects the clicked lot. Unknown ids are an integration error and are
    /// returned to the caller.
    pub fn lot_clicked(&self, id: &LotId) -> Result<ParkingLot> {
        let mut state = self.state();
        let lot = match state.visible.iter().find(|lot| lot.id() == id) {
            Some(lot) => lot.clone(),
            None => self.catalog.by_id(id)?.clone(),
        };
        state.selection.select(lot.clone());
        Ok(lot)
    }

    pub fn select(&self, lot: ParkingLot) {
        self.state().selection.select(lot);
    }

    pub fn clear_selection(&self) {
        self.state().selection.clear();
    }

    pub async fn handle(&self, command: UiCommand) -> Result<()> {
        match command {
            UiCommand::SearchTextChanged(text) => {
                self.search_text_changed(&text).await;
            }
            UiCommand::SearchSubmitted(text) => {
                self.search_submitted(&text).await;
            }
            UiCommand::LotClicked(id) => {
                self.lot_clicked(&id)?;
            }
            UiCommand::MapClicked(center) => {
                self.search_near(center).await;
            }
            UiCommand::ClearSelection => self.clear_selection(),
            UiCommand::Locate => {
                self.locate_and_refresh().await;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::location::{FixedLocation, NoLocation};
    use crate::adapters::map::CatalogMapProvider;

    fn engine() -> DiscoveryEngine<CatalogMapProvider, FixedLocation> {
        let catalog = LotCatalog::sample();
        DiscoveryEngine::new(
            CatalogMapProvider::new(catalog.clone()),
            FixedLocation::new(Coordinates::new(41.6574, -83.6053)),
            catalog,
            DiscoverySettings::default(),
        )
    }

    #[test]
    fn test_initial_visible_set_is_catalog() {
        let engine = engine();
        assert_eq!(engine.visible_lots(), LotCatalog::sample().list().to_vec());
        assert_eq!(engine.visible_source(), LotSource::Catalog);
        assert!(engine.selection().is_none());
    }

    #[tokio::test]
    async fn test_search_text_narrows_visible_lots() {
        let engine = engine();
        let outcome = engine.search_text_changed("area").await;

        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                count: 2,
                source: LotSource::Provider
            }
        );
        let names: Vec<String> = engine
            .visible_lots()
            .iter()
            .map(|lot| lot.name().to_string())
            .collect();
        assert_eq!(names, vec!["Area 2", "Area 3"]);
    }

    #[tokio::test]
    async fn test_only_submitted_searches_are_recorded() {
        let engine = engine();
        for partial in ["L", "Lo", "Lot"] {
            engine.search_text_changed(partial).await;
        }
        assert!(engine.recent_searches().is_empty());
        assert_eq!(engine.query(), "Lot");

        engine.search_submitted("Lot 16").await;
        assert_eq!(engine.recent_searches(), vec!["Lot 16"]);
        assert_eq!(engine.visible_lots().len(), 1);

        engine
            .handle(UiCommand::SearchSubmitted("area".to_string()))
            .await
            .unwrap();
        assert_eq!(engine.recent_searches(), vec!["area", "Lot 16"]);
    }

    #[tokio::test]
    async fn test_empty_result_policy_show_all() {
        let catalog = LotCatalog::sample();
        let settings = DiscoverySettings {
            empty_result: EmptyResultPolicy::ShowAll,
            ..DiscoverySettings::default()
        };
        let engine = DiscoveryEngine::new(
            CatalogMapProvider::new(catalog.clone()),
            NoLocation,
            catalog,
            settings,
        );

        engine.search_text_changed("Glass Bowl").await;
        assert_eq!(engine.visible_lots().len(), 5);
    }

    #[tokio::test]
    async fn test_empty_result_policy_show_empty() {
        let engine = engine();
        let outcome = engine.search_text_changed("Glass Bowl").await;
        assert!(matches!(outcome, RefreshOutcome::Applied { count: 0, .. }));
        assert!(engine.visible_lots().is_empty());
    }

    #[tokio::test]
    async fn test_locate_updates_center() {
        let engine = engine();
        let mut rx = engine.subscribe();

        let center = engine.locate().await;
        assert_eq!(center, Coordinates::new(41.6574, -83.6053));
        assert_eq!(engine.center(), center);
        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::RecenterRequested { center }
        );
    }

    #[tokio::test]
    async fn test_lot_clicked_selects_and_unknown_id_errors() {
        let engine = engine();
        let lot = engine.lot_clicked(&LotId::from(2)).unwrap();
        assert_eq!(lot.name(), "Lot 16");
        assert_eq!(engine.selection(), Some(lot));

        let err = engine.lot_clicked(&LotId::from("missing")).unwrap_err();
        assert!(matches!(err, ParkError::NotFound { .. }));
        assert_eq!(engine.selection().unwrap().name(), "Lot 16");
    }

    #[tokio::test]
    async fn test_handle_dispatches_commands() {
        let engine = engine();
        engine
            .handle(UiCommand::SearchTextChanged("lot 1".to_string()))
            .await
            .unwrap();
        assert_eq!(engine.visible_lots().len(), 3);

        engine
            .handle(UiCommand::LotClicked(LotId::from(1)))
            .await
            .unwrap();
        assert_eq!(engine.selection().unwrap().name(), "Lot 13N");

        engine.handle(UiCommand::ClearSelection).await.unwrap();
        assert_eq!(engine.selection_state(), SelectionState::Idle);

        assert!(engine
            .handle(UiCommand::LotClicked(LotId::from("nope")))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_map_click_searches_new_area() {
        let engine = engine();
        let far_away = Coordinates::new(40.0, -80.0);
        let outcome = engine.handle(UiCommand::MapClicked(far_away)).await;
        assert!(outcome.is_ok());
        assert_eq!(engine.center(), far_away);
        assert!(engine.visible_lots().is_empty());
    }
}
