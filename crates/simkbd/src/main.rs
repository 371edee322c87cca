//! simkbd entry point.
//!
//! Turns off "Connect Hardware Keyboard" for every device in the iOS
//! Simulator preferences store, so the software keyboard shows up during UI
//! tests.
//!
//! # Usage
//!
//! ```text
//! simkbd [OPTIONS]
//!
//! Options:
//!   --preferences-path <PATH>    Store to modify [default: ~/Library/Preferences/com.apple.iphonesimulator.plist]
//!   --verbose <yes|no>           Debug logging [default: no]
//!   --destination <SPEC>         Simulator used to create a missing store
//!   --bootstrap-timeout <SECS>   How long to wait for the store [default: 300]
//!   --poll-interval <SECS>       Delay between checks [default: 5]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                          | Flag                  |
//! |-----------------------------------|-----------------------|
//! | `iphonesimulator_preferences_pth` | `--preferences-path`  |
//! | `verbose`                         | `--verbose`           |
//! | `SIMKBD_DESTINATION`              | `--destination`       |
//! | `SIMKBD_BOOTSTRAP_TIMEOUT`        | `--bootstrap-timeout` |
//! | `SIMKBD_POLL_INTERVAL`            | `--poll-interval`     |
//!
//! `RUST_LOG`, when set, overrides the level chosen by `--verbose`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use simkbd::application::backup::backup_and_export;
use simkbd::application::bootstrap::BootstrapWaiter;
use simkbd::application::open_preferences::{PathResolver, SimulatorPreferences};
use simkbd::domain::config::{BACKUP_PATH_ENV_KEY, DEFAULT_PREFERENCES_PATH};
use simkbd::domain::{BootstrapConfig, StepConfig};
use simkbd::infrastructure::env_export::EnvmanExporter;
use simkbd::infrastructure::paths::EnvPathResolver;
use simkbd::infrastructure::process::SystemCommandRunner;
use simkbd::infrastructure::simulator::{OpenSimulatorLauncher, SimctlDeviceFinder, SimctlManager};
use simkbd::infrastructure::storage::{FsPreferencesProbe, SystemClock};
use simkbd_core::DEFAULT_DESTINATION;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Disables Connect Hardware Keyboard for every iOS Simulator device.
#[derive(Debug, Parser)]
#[command(name = "simkbd", version)]
struct Cli {
    /// Preferences store to modify.
    ///
    /// A missing file is only created (by booting a simulator) when this is
    /// the default location.
    #[arg(
        long,
        default_value = DEFAULT_PREFERENCES_PATH,
        env = "iphonesimulator_preferences_pth"
    )]
    preferences_path: PathBuf,

    /// Print debug logs (`yes`/`no`).
    #[arg(
        long,
        default_value = "no",
        env = "verbose",
        action = ArgAction::Set,
        value_parser = parse_yes_no
    )]
    verbose: bool,

    /// Destination specifier of the simulator to boot when the store is
    /// missing.
    #[arg(long, default_value = DEFAULT_DESTINATION, env = "SIMKBD_DESTINATION")]
    destination: String,

    /// Seconds to wait for the simulator to write the store.
    #[arg(long, default_value_t = 300, env = "SIMKBD_BOOTSTRAP_TIMEOUT")]
    bootstrap_timeout: u64,

    /// Seconds between two checks of the store.
    #[arg(long, default_value_t = 5, env = "SIMKBD_POLL_INTERVAL")]
    poll_interval: u64,
}

impl Cli {
    fn into_step_config(self) -> StepConfig {
        StepConfig {
            preferences_path: self.preferences_path,
            verbose: self.verbose,
            backup_env_key: BACKUP_PATH_ENV_KEY.to_string(),
            bootstrap: BootstrapConfig {
                destination: self.destination,
                timeout: Duration::from_secs(self.bootstrap_timeout),
                poll_interval: Duration::from_secs(self.poll_interval),
            },
        }
    }
}

/// Accepts the step-input spellings of a boolean.
fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" | "" => Ok(false),
        other => Err(format!("expected yes or no, got '{other}'")),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let config = Cli::parse().into_step_config();

    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &StepConfig) -> anyhow::Result<()> {
    info!(
        "Configs: preferences_path={}, verbose={}, destination={}, bootstrap_timeout={}s, poll_interval={}s",
        config.preferences_path.display(),
        config.verbose,
        config.bootstrap.destination,
        config.bootstrap.timeout.as_secs(),
        config.bootstrap.poll_interval.as_secs()
    );

    let resolver = EnvPathResolver::from_env();
    let path = resolver
        .resolve(&config.preferences_path)
        .context("failed to resolve preferences path")?;

    let exporter = EnvmanExporter::new(SystemCommandRunner);
    backup_and_export(
        &path,
        &std::env::temp_dir(),
        &config.backup_env_key,
        &exporter,
    )
    .context("failed to back up simulator preferences")?;

    let bootstrap = BootstrapWaiter::new(
        config.bootstrap.clone(),
        Arc::new(SimctlDeviceFinder::new(SystemCommandRunner)),
        Arc::new(OpenSimulatorLauncher::new(SystemCommandRunner)),
        Arc::new(SimctlManager::new(SystemCommandRunner)),
        Arc::new(FsPreferencesProbe),
        Arc::new(SystemClock),
    );

    let mut preferences = SimulatorPreferences::open(&path, &resolver, &bootstrap)
        .context("failed to open simulator preferences")?;
    preferences
        .disable_connect_hardware_keyboard()
        .context("failed to disable Connect Hardware Keyboard")?;

    info!("Hardware keyboard disabled");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
