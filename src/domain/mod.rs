// Domain layer: lot model and the ports (location, map, config) the core consumes.

pub mod model;
pub mod ports;
