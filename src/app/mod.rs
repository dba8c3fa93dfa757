// Application layer: wires config, adapters and the discovery engine into a runnable session.

pub mod output;
pub mod session;
