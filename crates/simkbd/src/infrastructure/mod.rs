//! Infrastructure layer for simkbd.
//!
//! Contains OS-facing adapters: child processes, path resolution, file reads,
//! the wall clock, and the Bitrise `envman` store.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `simkbd_core`, but MUST NOT be imported by the `application` or domain
//! layers.  The application layer declares the traits; this layer implements
//! them.
//!
//! # Sub-modules
//!
//! - **`process`** – runs external commands and captures combined output.
//!
//! - **`simulator`** – `xcrun simctl` device lookup and shutdown, the
//!   `open -a Simulator` launcher, and a mock of each for tests.
//!
//! - **`paths`** – `~` expansion and absolute-path resolution.
//!
//! - **`storage`** – reads the store file for the bootstrap probe, and the
//!   system clock that paces it.
//!
//! - **`env_export`** – exports the backup path for later steps.

pub mod env_export;
pub mod paths;
pub mod process;
pub mod simulator;
pub mod storage;
