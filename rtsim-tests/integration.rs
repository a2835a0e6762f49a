//! Integration tests for rtsim
//!
//! These tests drive the scheduling engine only through its public API and
//! check whole runs: the reference scenario, determinism, randomized
//! invariant checks and configuration loading from disk.

#[path = "style.rs"]
mod style;

#[path = "integration/config_loading.rs"]
mod config_loading;
#[path = "integration/determinism.rs"]
mod determinism;
#[path = "integration/properties.rs"]
mod properties;
#[path = "integration/reference_scenario.rs"]
mod reference_scenario;
