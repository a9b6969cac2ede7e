// DevGate - core/mod.rs
//
// Core logic: identity resolution, the gate, logger handles, formatting.
// Reaches the platform layer only through the `KeyValueStore` trait, the
// debugger probe and `GateConfig`.

pub mod format;
pub mod gate;
pub mod logger;
pub mod model;
pub mod resolver;
pub mod sink;
