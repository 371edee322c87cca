//! # simkbd-core
//!
//! Shared library for simkbd containing the preferences store codec, the
//! dynamically-typed value model, and the pure domain logic used to disable
//! the iOS Simulator "Connect Hardware Keyboard" setting.
//!
//! This crate performs no process spawning and no sleeping.  File access is
//! limited to whatever bytes the caller hands in, so everything here can be
//! exercised from plain unit tests.
//!
//! # Architecture overview
//!
//! The simulator keeps its preferences in a property list at
//! `~/Library/Preferences/com.apple.iphonesimulator.plist`.  The file is a
//! nested dictionary whose `DevicePreferences` key maps each simulated
//! device's UDID to that device's settings.
//!
//! - **`store`** – How bytes on disk become a [`Dictionary`] and back.  The
//!   codec remembers which property-list variant (binary or XML) the file
//!   used so the file is written back in the same variant.
//!
//! - **`domain`** – Pure logic over the decoded dictionary: the keyboard
//!   mutation itself, the readiness decision used while waiting for the
//!   simulator to create the store, and the destination specifier parser.

pub mod domain;
pub mod store;

pub use domain::destination::{DestinationError, SimulatorDestination, DEFAULT_DESTINATION};
pub use domain::preferences::{
    disable_connect_hardware_keyboard, CONNECT_HARDWARE_KEYBOARD_KEY, DEVICE_PREFERENCES_KEY,
};
pub use domain::readiness::{assess, LoadedStore, PollBudget, PollState, ProbeError};
pub use store::codec::{decode, encode, DecodeError, EncodeError, EncodingTag};
pub use store::value::{get_dictionary, Dictionary, LookupError, Value};
