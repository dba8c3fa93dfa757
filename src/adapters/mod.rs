// Adapters layer: concrete location and map/places capabilities behind the domain ports.

pub mod location;
pub mod map;
pub mod places;
