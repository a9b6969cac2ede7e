// DevGate - platform/mod.rs
//
// Platform abstraction layer.
// Dependencies: standard library, directories crate, core::model.
// Must NOT depend on: core::gate, core::logger.

pub mod config;
pub mod debugger;
pub mod storage;
