//! BootstrapWaiter: creates a missing default preferences store by launching
//! the simulator and waiting for it to write the file.
//!
//! ```text
//! materialize(path)
//!  ├─ parse destination  ──────────────── InvalidDestination
//!  ├─ DeviceFinder::find_device  ───────── DeviceLookup
//!  ├─ SimulatorLauncher::launch  ───────── Launch
//!  ├─ ShutdownGuard (drops on every exit below)
//!  └─ poll loop
//!       ├─ NotFound / FoundNotReady -> Clock::sleep, PollBudget::charge
//!       ├─ Ready                    -> Ok(LoadedStore)
//!       ├─ HardError                -> Probe
//!       └─ TimedOut                 -> TimedOut
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use simkbd_core::{
    assess, DestinationError, LoadedStore, PollBudget, PollState, ProbeError, SimulatorDestination,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::BootstrapConfig;

/// Error type for simulator collaborators.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// The command could not be started.
    #[error("`{command}` could not be run: {reason}")]
    Unavailable { command: String, reason: String },

    /// The command ran but exited unsuccessfully.
    #[error("`{command}` failed: {output}")]
    CommandFailed { command: String, output: String },

    /// The command's output could not be understood.
    #[error("unexpected output from `{command}`: {reason}")]
    InvalidOutput { command: String, reason: String },

    #[error("no available simulator matches destination: {destination}")]
    DeviceNotFound { destination: String },
}

/// Error type for the bootstrap use case.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid destination specifier ({destination}): {source}")]
    InvalidDestination {
        destination: String,
        #[source]
        source: DestinationError,
    },

    #[error("simulator UDID lookup failed: {0}")]
    DeviceLookup(#[source] SimulatorError),

    #[error("failed to launch simulator {device_id}: {source}")]
    Launch {
        device_id: String,
        #[source]
        source: SimulatorError,
    },

    #[error("failed to probe {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: ProbeError,
    },

    #[error("couldn't initialise preferences at {} within {}s", .path.display(), .waited.as_secs())]
    TimedOut { path: PathBuf, waited: Duration },
}

/// A simulator device resolved from a destination specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorDevice {
    pub udid: String,
    pub name: String,
    /// CoreSimulator runtime identifier, e.g.
    /// `com.apple.CoreSimulator.SimRuntime.iOS-17-2`.
    pub runtime: String,
}

/// Resolves a destination specifier to a concrete device.
pub trait DeviceFinder {
    /// # Errors
    ///
    /// Returns [`SimulatorError::DeviceNotFound`] if no available device
    /// matches, or another variant if the lookup itself fails.
    fn find_device(&self, destination: &SimulatorDestination)
        -> Result<SimulatorDevice, SimulatorError>;
}

/// Starts the Simulator app on a given device.
pub trait SimulatorLauncher {
    /// # Errors
    ///
    /// Returns [`SimulatorError`] carrying the launcher's combined output.
    fn launch(&self, device_id: &str) -> Result<(), SimulatorError>;
}

/// Simulator lifecycle operations.
pub trait SimulatorManager {
    /// Shuts down the device.
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError`] if the shutdown command fails.
    fn shutdown(&self, device_id: &str) -> Result<(), SimulatorError>;
}

/// Reads the store file.  Implementations must not keep the file open after
/// returning.
pub trait PreferencesProbe {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Paces the poll loop.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Creates the preferences store when it is missing at the default path.
pub trait StoreBootstrap {
    /// Returns the decoded store once it is ready.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] if the simulator cannot be started or the
    /// store does not become ready in time.
    fn materialize(&self, path: &Path) -> Result<LoadedStore, BootstrapError>;
}

/// Shuts the simulator down when dropped.
struct ShutdownGuard<'a> {
    manager: &'a dyn SimulatorManager,
    device_id: &'a str,
}

impl Drop for ShutdownGuard<'_> {
    fn drop(&mut self) {
        debug!("shutting down simulator {}", self.device_id);
        if let Err(e) = self.manager.shutdown(self.device_id) {
            warn!("Failed to shutdown simulator: {e}");
        }
    }
}

/// The bootstrap use case.
pub struct BootstrapWaiter {
    config: BootstrapConfig,
    finder: Arc<dyn DeviceFinder>,
    launcher: Arc<dyn SimulatorLauncher>,
    manager: Arc<dyn SimulatorManager>,
    probe: Arc<dyn PreferencesProbe>,
    clock: Arc<dyn Clock>,
}

impl BootstrapWaiter {
    pub fn new(
        config: BootstrapConfig,
        finder: Arc<dyn DeviceFinder>,
        launcher: Arc<dyn SimulatorLauncher>,
        manager: Arc<dyn SimulatorManager>,
        probe: Arc<dyn PreferencesProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            finder,
            launcher,
            manager,
            probe,
            clock,
        }
    }

    fn wait_for_store(&self, path: &Path) -> Result<LoadedStore, BootstrapError> {
        let mut budget = PollBudget::new(self.config.timeout, self.config.poll_interval);

        loop {
            let state = if budget.is_exhausted() {
                PollState::TimedOut
            } else {
                assess(self.probe.read(path))
            };

            match state {
                PollState::Ready(store) => {
                    info!(
                        "Simulator preferences ready after {}s",
                        budget.elapsed().as_secs()
                    );
                    return Ok(store);
                }
                PollState::HardError(source) => {
                    return Err(BootstrapError::Probe {
                        path: path.to_path_buf(),
                        source,
                    })
                }
                PollState::TimedOut => {
                    return Err(BootstrapError::TimedOut {
                        path: path.to_path_buf(),
                        waited: budget.elapsed(),
                    })
                }
                PollState::NotFound => debug!("Simulator preferences not created yet"),
                PollState::FoundNotReady => debug!("Simulator preferences not ready"),
            }

            self.clock.sleep(budget.interval());
            budget.charge();
        }
    }
}

impl StoreBootstrap for BootstrapWaiter {
    fn materialize(&self, path: &Path) -> Result<LoadedStore, BootstrapError> {
        let destination: SimulatorDestination =
            self.config
                .destination
                .parse()
                .map_err(|source| BootstrapError::InvalidDestination {
                    destination: self.config.destination.clone(),
                    source,
                })?;

        let device = self
            .finder
            .find_device(&destination)
            .map_err(BootstrapError::DeviceLookup)?;

        info!(
            "Launching simulator {} ({}) to create {}",
            device.name,
            device.udid,
            path.display()
        );
        self.launcher
            .launch(&device.udid)
            .map_err(|source| BootstrapError::Launch {
                device_id: device.udid.clone(),
                source,
            })?;

        let _shutdown = ShutdownGuard {
            manager: self.manager.as_ref(),
            device_id: &device.udid,
        };

        self.wait_for_store(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::simulator::mock::{
        MockDeviceFinder, MockSimulatorLauncher, MockSimulatorManager,
    };
    use crate::infrastructure::storage::mock::{RecordingClock, ScriptedProbe};

    const READY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>DevicePreferences</key><dict/></dict></plist>"#;

    const PLACEHOLDER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>CurrentDeviceUDID</key><string>X</string></dict></plist>"#;

    struct Harness {
        finder: Arc<MockDeviceFinder>,
        launcher: Arc<MockSimulatorLauncher>,
        manager: Arc<MockSimulatorManager>,
        probe: Arc<ScriptedProbe>,
        clock: Arc<RecordingClock>,
    }

    impl Harness {
        fn new(probe: ScriptedProbe) -> Self {
            Self {
                finder: Arc::new(MockDeviceFinder::with_device("UDID-1", "Bitrise iOS default")),
                launcher: Arc::new(MockSimulatorLauncher::new()),
                manager: Arc::new(MockSimulatorManager::new()),
                probe: Arc::new(probe),
                clock: Arc::new(RecordingClock::new()),
            }
        }

        fn waiter(&self, config: BootstrapConfig) -> BootstrapWaiter {
            BootstrapWaiter::new(
                config,
                self.finder.clone(),
                self.launcher.clone(),
                self.manager.clone(),
                self.probe.clone(),
                self.clock.clone(),
            )
        }

        fn shutdowns(&self) -> Vec<String> {
            self.manager.shutdowns.lock().unwrap().clone()
        }
    }

    fn not_found() -> io::Result<Vec<u8>> {
        Err(io::Error::from(io::ErrorKind::NotFound))
    }

    #[test]
    fn test_materialize_waits_through_missing_and_placeholder_file() {
        // Arrange: not found twice, placeholder once, then ready.
        let harness = Harness::new(ScriptedProbe::new(vec![
            not_found(),
            not_found(),
            Ok(PLACEHOLDER.as_bytes().to_vec()),
            Ok(READY.as_bytes().to_vec()),
        ]));
        let waiter = harness.waiter(BootstrapConfig::default());

        // Act
        let store = waiter
            .materialize(Path::new("/tmp/prefs.plist"))
            .expect("store becomes ready");

        // Assert
        assert!(store.root.contains_key("DevicePreferences"));
        assert_eq!(*harness.clock.sleeps.lock().unwrap(), vec![Duration::from_secs(5); 3]);
        assert_eq!(harness.probe.reads(), 4);
        assert_eq!(*harness.launcher.launches.lock().unwrap(), vec!["UDID-1".to_string()]);
        assert_eq!(harness.shutdowns(), vec!["UDID-1".to_string()]);
    }

    #[test]
    fn test_materialize_times_out_and_still_shuts_down() {
        // Arrange: the file never appears.
        let harness = Harness::new(ScriptedProbe::new(vec![]));
        let waiter = harness.waiter(BootstrapConfig {
            timeout: Duration::from_secs(20),
            poll_interval: Duration::from_secs(5),
            ..BootstrapConfig::default()
        });

        // Act
        let err = waiter.materialize(Path::new("/tmp/prefs.plist")).unwrap_err();

        // Assert
        match err {
            BootstrapError::TimedOut { waited, .. } => assert_eq!(waited, Duration::from_secs(20)),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(harness.probe.reads(), 4);
        assert_eq!(harness.clock.sleeps.lock().unwrap().len(), 4);
        assert_eq!(harness.shutdowns().len(), 1);
    }

    #[test]
    fn test_default_budget_polls_at_most_sixty_times() {
        let harness = Harness::new(ScriptedProbe::new(vec![]));
        let waiter = harness.waiter(BootstrapConfig::default());

        let err = waiter.materialize(Path::new("/tmp/prefs.plist")).unwrap_err();

        assert!(err.to_string().starts_with("couldn't initialise preferences"));
        assert_eq!(harness.probe.reads(), 60);
        assert_eq!(harness.shutdowns().len(), 1);
    }

    #[test]
    fn test_materialize_aborts_on_unreadable_file() {
        let harness = Harness::new(ScriptedProbe::new(vec![
            not_found(),
            Err(io::Error::from(io::ErrorKind::PermissionDenied)),
        ]));
        let waiter = harness.waiter(BootstrapConfig::default());

        let err = waiter.materialize(Path::new("/tmp/prefs.plist")).unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Probe {
                source: ProbeError::Io(_),
                ..
            }
        ));
        assert_eq!(harness.clock.sleeps.lock().unwrap().len(), 1);
        assert_eq!(harness.shutdowns().len(), 1);
    }

    #[test]
    fn test_materialize_aborts_on_corrupt_file() {
        let harness = Harness::new(ScriptedProbe::new(vec![Ok(b"garbage".to_vec())]));
        let waiter = harness.waiter(BootstrapConfig::default());

        let err = waiter.materialize(Path::new("/tmp/prefs.plist")).unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Probe {
                source: ProbeError::Decode(_),
                ..
            }
        ));
        assert_eq!(harness.shutdowns().len(), 1);
    }

    #[test]
    fn test_shutdown_failure_does_not_mask_success() {
        let harness = Harness::new(ScriptedProbe::new(vec![Ok(READY.as_bytes().to_vec())]));
        let manager = Arc::new(MockSimulatorManager {
            should_fail: true,
            ..MockSimulatorManager::default()
        });
        let waiter = BootstrapWaiter::new(
            BootstrapConfig::default(),
            harness.finder.clone(),
            harness.launcher.clone(),
            manager.clone(),
            harness.probe.clone(),
            harness.clock.clone(),
        );

        assert!(waiter.materialize(Path::new("/tmp/prefs.plist")).is_ok());
        assert_eq!(manager.shutdowns.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_destination_fails_before_launch() {
        let harness = Harness::new(ScriptedProbe::new(vec![]));
        let waiter = harness.waiter(BootstrapConfig {
            destination: "platform=iOS Simulator".to_string(),
            ..BootstrapConfig::default()
        });

        let err = waiter.materialize(Path::new("/tmp/prefs.plist")).unwrap_err();

        assert!(matches!(err, BootstrapError::InvalidDestination { .. }));
        assert!(harness.launcher.launches.lock().unwrap().is_empty());
        assert!(harness.shutdowns().is_empty());
    }

    #[test]
    fn test_device_lookup_failure_skips_launch_and_shutdown() {
        let harness = Harness::new(ScriptedProbe::new(vec![]));
        let waiter = BootstrapWaiter::new(
            BootstrapConfig::default(),
            Arc::new(MockDeviceFinder::default()),
            harness.launcher.clone(),
            harness.manager.clone(),
            harness.probe.clone(),
            harness.clock.clone(),
        );

        let err = waiter.materialize(Path::new("/tmp/prefs.plist")).unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::DeviceLookup(SimulatorError::DeviceNotFound { .. })
        ));
        assert!(harness.launcher.launches.lock().unwrap().is_empty());
        assert!(harness.shutdowns().is_empty());
    }

    #[test]
    fn test_launch_failure_surfaces_output_and_skips_polling() {
        let harness = Harness::new(ScriptedProbe::new(vec![]));
        let launcher = Arc::new(MockSimulatorLauncher {
            should_fail: true,
            ..MockSimulatorLauncher::default()
        });
        let waiter = BootstrapWaiter::new(
            BootstrapConfig::default(),
            harness.finder.clone(),
            launcher,
            harness.manager.clone(),
            harness.probe.clone(),
            harness.clock.clone(),
        );

        let err = waiter.materialize(Path::new("/tmp/prefs.plist")).unwrap_err();

        assert!(matches!(err, BootstrapError::Launch { .. }));
        assert!(err.to_string().contains("UDID-1"));
        assert_eq!(harness.probe.reads(), 0);
    }
}
