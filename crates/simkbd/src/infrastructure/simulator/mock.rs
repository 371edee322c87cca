//! In-memory simulator collaborators for unit testing.
//!
//! The real adapters shell out to `xcrun simctl` and `open`, which only exist
//! on macOS hosts with Xcode installed.  These mocks record every call in a
//! `Mutex<Vec<...>>` so tests can assert which devices were launched and shut
//! down, and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let manager = Arc::new(MockSimulatorManager::new());
//! // ... run the bootstrap waiter ...
//! assert_eq!(*manager.shutdowns.lock().unwrap(), vec!["UDID-1".to_string()]);
//! ```
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make the launcher or manager return
//! [`SimulatorError::CommandFailed`].  The call is still recorded.

use std::sync::Mutex;

use simkbd_core::SimulatorDestination;

use crate::application::bootstrap::{
    DeviceFinder, SimulatorDevice, SimulatorError, SimulatorLauncher, SimulatorManager,
};

/// A device finder that returns a fixed device, or none at all.
#[derive(Debug, Default)]
pub struct MockDeviceFinder {
    /// Device returned by every lookup.  `None` reports `DeviceNotFound`.
    pub device: Option<SimulatorDevice>,
    /// Rendered destinations passed to `find_device`.
    pub lookups: Mutex<Vec<String>>,
}

impl MockDeviceFinder {
    /// Creates a finder that always resolves to the given device.
    pub fn with_device(udid: &str, name: &str) -> Self {
        Self {
            device: Some(SimulatorDevice {
                udid: udid.to_string(),
                name: name.to_string(),
                runtime: "com.apple.CoreSimulator.SimRuntime.iOS-17-2".to_string(),
            }),
            lookups: Mutex::new(Vec::new()),
        }
    }
}

impl DeviceFinder for MockDeviceFinder {
    fn find_device(
        &self,
        destination: &SimulatorDestination,
    ) -> Result<SimulatorDevice, SimulatorError> {
        let rendered = destination.to_string();
        self.lookups.lock().unwrap().push(rendered.clone());
        self.device
            .clone()
            .ok_or(SimulatorError::DeviceNotFound {
                destination: rendered,
            })
    }
}

/// A launcher that records device ids instead of opening the Simulator app.
#[derive(Debug, Default)]
pub struct MockSimulatorLauncher {
    pub launches: Mutex<Vec<String>>,
    pub should_fail: bool,
}

impl MockSimulatorLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulatorLauncher for MockSimulatorLauncher {
    fn launch(&self, device_id: &str) -> Result<(), SimulatorError> {
        self.launches.lock().unwrap().push(device_id.to_string());
        if self.should_fail {
            return Err(SimulatorError::CommandFailed {
                command: format!("open -a Simulator --args -CurrentDeviceUDID {device_id}"),
                output: "Unable to find application named 'Simulator'".to_string(),
            });
        }
        Ok(())
    }
}

/// A manager that records shutdown requests.
#[derive(Debug, Default)]
pub struct MockSimulatorManager {
    pub shutdowns: Mutex<Vec<String>>,
    pub should_fail: bool,
}

impl MockSimulatorManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulatorManager for MockSimulatorManager {
    fn shutdown(&self, device_id: &str) -> Result<(), SimulatorError> {
        self.shutdowns.lock().unwrap().push(device_id.to_string());
        if self.should_fail {
            return Err(SimulatorError::CommandFailed {
                command: format!("xcrun simctl shutdown {device_id}"),
                output: "Unable to shutdown device in current state: Shutdown".to_string(),
            });
        }
        Ok(())
    }
}
