// Domain layer: ticket models and the ports the run talks through.

pub mod model;
pub mod ports;
