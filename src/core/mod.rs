pub mod catalog;
pub mod discovery;
pub mod normalize;
pub mod search;
pub mod selection;

pub use crate::domain::model::{
    Coordinates, LotCategory, LotId, LotSource, ParkingLot, ParkingLotRecord, PlaceRecord,
};
pub use crate::domain::ports::{
    ConfigProvider, EmptyResultPolicy, LocationProvider, MapProvider, ProviderKind,
};
pub use crate::utils::error::Result;
