pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use core::catalog::LotCatalog;
pub use core::discovery::{DiscoveryEngine, DiscoverySettings, RefreshOutcome, UiCommand};
pub use core::search::{filter_lots, SearchFilter, SearchHistory};
pub use core::selection::{CoreEvent, EventBus, Notice, NoticeKind, SelectionController, SelectionState};
pub use domain::model::{Coordinates, LotCategory, LotId, LotSource, ParkingLot, PlaceRecord};
pub use domain::ports::{LocationProvider, MapProvider};
pub use utils::error::{LocationError, ParkError, ProviderError, Result};
