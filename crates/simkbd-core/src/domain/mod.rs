//! Domain layer: pure logic over decoded preferences.
//!
//! Nothing in this module touches the file system, spawns processes, or
//! sleeps.  Side effects live in the `simkbd` crate's infrastructure layer.

pub mod destination;
pub mod preferences;
pub mod readiness;
