//! simkbd library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does simkbd do?
//!
//! When "Connect Hardware Keyboard" is on, the iOS Simulator routes the host
//! keyboard into the simulated device and hides the on-screen keyboard.  UI
//! tests that type into text fields then fail in confusing ways.  simkbd
//! turns the setting off for every device known to the simulator:
//!
//! 1. Copies the current preferences file to a temporary directory and
//!    exports the copy's path so a later step can restore it.
//! 2. Opens the preferences store.  If it does not exist yet at the default
//!    location, launches the simulator once so it creates the file.
//! 3. Sets `ConnectHardwareKeyboard = false` for each device and writes the
//!    file back in its original property-list variant.

/// Domain layer: runtime configuration.
pub mod domain;

/// Application layer: open, mutate, bootstrap, and back up the store.
pub mod application;

/// Infrastructure layer: processes, paths, the file system, and mocks.
pub mod infrastructure;
