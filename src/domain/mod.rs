// Domain layer: run state, tool invocations and the runner port. No I/O here.

pub mod model;
pub mod ports;
