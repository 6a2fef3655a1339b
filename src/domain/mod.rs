pub mod builder;
pub mod cycles;
pub mod graph;
pub mod metadata;
pub mod metrics;
pub mod ports;
