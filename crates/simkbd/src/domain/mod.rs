//! Domain types for the simkbd binary.
//!
//! Store-level domain logic (value model, keyboard mutation, readiness) lives
//! in `simkbd-core`; this module only holds the step's runtime configuration.

pub mod config;

pub use config::{BootstrapConfig, StepConfig};
