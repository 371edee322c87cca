//! Step configuration types.
//!
//! [`StepConfig`] is the single source of truth for all runtime settings.
//! The binary builds it from CLI arguments and environment variables; tests
//! build it from [`Default`] and override individual fields.
//!
//! Keeping configuration as a plain struct (no environment reads inside the
//! domain) lets the application layer run unchanged under test.

use std::path::PathBuf;
use std::time::Duration;

use simkbd_core::DEFAULT_DESTINATION;

/// Location the simulator uses for its preferences store.  A missing file at
/// this path is bootstrapped; a missing file anywhere else is an error.
pub const DEFAULT_PREFERENCES_PATH: &str = "~/Library/Preferences/com.apple.iphonesimulator.plist";

/// Environment variable that receives the backup copy's path.
pub const BACKUP_PATH_ENV_KEY: &str = "BACKUP_IPHONESIMULATOR_PREFERENCES_PATH";

/// All runtime configuration for one run of the step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepConfig {
    /// Preferences store to mutate.  May be relative or start with `~`.
    pub preferences_path: PathBuf,

    /// Enables debug-level logging.
    pub verbose: bool,

    /// Environment variable the backup path is exported under.
    pub backup_env_key: String,

    /// Settings used only when the store has to be created first.
    pub bootstrap: BootstrapConfig,
}

/// Settings for creating a missing default preferences store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Destination specifier of the simulator to launch.
    pub destination: String,

    /// Total time to wait for the simulator to write the store.
    pub timeout: Duration,

    /// Delay between two reads of the store file.
    pub poll_interval: Duration,
}

impl Default for StepConfig {
    /// | Field            | Default                                                  |
    /// |------------------|----------------------------------------------------------|
    /// | preferences_path | `~/Library/Preferences/com.apple.iphonesimulator.plist`  |
    /// | verbose          | `false`                                                  |
    /// | backup_env_key   | `BACKUP_IPHONESIMULATOR_PREFERENCES_PATH`                |
    fn default() -> Self {
        Self {
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
            verbose: false,
            backup_env_key: BACKUP_PATH_ENV_KEY.to_string(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Default for BootstrapConfig {
    /// | Field         | Default                                                      |
    /// |---------------|--------------------------------------------------------------|
    /// | destination   | `platform=iOS Simulator,name=Bitrise iOS default,OS=latest`  |
    /// | timeout       | 300 seconds                                                  |
    /// | poll_interval | 5 seconds                                                    |
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION.to_string(),
            timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_config_default_points_at_simulator_preferences() {
        let cfg = StepConfig::default();
        assert_eq!(
            cfg.preferences_path,
            PathBuf::from("~/Library/Preferences/com.apple.iphonesimulator.plist")
        );
        assert!(!cfg.verbose);
        assert_eq!(cfg.backup_env_key, "BACKUP_IPHONESIMULATOR_PREFERENCES_PATH");
    }

    #[test]
    fn test_bootstrap_config_default_waits_five_minutes_in_five_second_steps() {
        let cfg = BootstrapConfig::default();
        assert_eq!(cfg.timeout, Duration::from_secs(300));
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.destination, DEFAULT_DESTINATION);
    }
}
