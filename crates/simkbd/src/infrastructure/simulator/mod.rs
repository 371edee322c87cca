//! Simulator adapters backed by `xcrun simctl` and `open`.
//!
//! - [`SimctlDeviceFinder`] – `xcrun simctl list devices available --json`,
//!   matched against a [`SimulatorDestination`].
//! - [`OpenSimulatorLauncher`] – `open -a Simulator --args -CurrentDeviceUDID <udid>`.
//! - [`SimctlManager`] – `xcrun simctl shutdown <udid>`.
//!
//! All three are generic over [`CommandRunner`] so their command lines and
//! output handling can be tested without Xcode installed.

pub mod mock;

use std::collections::HashMap;

use serde::Deserialize;
use simkbd_core::SimulatorDestination;
use tracing::debug;

use crate::application::bootstrap::{
    DeviceFinder, SimulatorDevice, SimulatorError, SimulatorLauncher, SimulatorManager,
};
use crate::infrastructure::process::{format_command, CommandOutput, CommandRunner};

const RUNTIME_PREFIX: &str = "com.apple.CoreSimulator.SimRuntime.";

// ── simctl JSON schema ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DeviceList {
    devices: HashMap<String, Vec<DeviceEntry>>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    udid: String,
    name: String,
    #[serde(rename = "isAvailable", default = "default_true")]
    is_available: bool,
}

fn default_true() -> bool {
    true
}

/// Splits `com.apple.CoreSimulator.SimRuntime.iOS-17-2` into `("iOS", [17, 2])`.
fn parse_runtime(runtime: &str) -> Option<(&str, Vec<u32>)> {
    let rest = runtime.strip_prefix(RUNTIME_PREFIX)?;
    let (platform, version) = rest.split_once('-')?;
    let version = version
        .split('-')
        .map(str::parse)
        .collect::<Result<Vec<u32>, _>>()
        .ok()?;
    Some((platform, version))
}

/// Parses `"17.2"` into `[17, 2]`.
fn parse_os_version(os: &str) -> Option<Vec<u32>> {
    os.split('.').map(|p| p.trim().parse().ok()).collect()
}

/// Drops trailing zero components so `17.0` and `17` compare equal.
fn trim_version(mut version: Vec<u32>) -> Vec<u32> {
    while version.len() > 1 && version.last() == Some(&0) {
        version.pop();
    }
    version
}

/// Picks the device matching `destination` from `simctl list --json` output.
///
/// With `OS=latest` the match on the newest runtime wins.
fn select_device(
    json: &str,
    destination: &SimulatorDestination,
) -> Result<Option<SimulatorDevice>, serde_json::Error> {
    let list: DeviceList = serde_json::from_str(json)?;
    let wanted_os = if destination.wants_latest_os() {
        None
    } else {
        parse_os_version(&destination.os).map(trim_version)
    };

    let mut best: Option<(Vec<u32>, SimulatorDevice)> = None;
    for (runtime, entries) in &list.devices {
        let Some((platform, version)) = parse_runtime(runtime) else {
            continue;
        };
        if platform != destination.runtime_platform() {
            continue;
        }
        if !destination.wants_latest_os() && wanted_os.as_ref() != Some(&trim_version(version.clone())) {
            continue;
        }

        let Some(entry) = entries
            .iter()
            .find(|e| e.is_available && e.name == destination.name)
        else {
            continue;
        };

        if best.as_ref().map_or(true, |(v, _)| version > *v) {
            best = Some((
                version,
                SimulatorDevice {
                    udid: entry.udid.clone(),
                    name: entry.name.clone(),
                    runtime: runtime.clone(),
                },
            ));
        }
    }

    Ok(best.map(|(_, device)| device))
}

fn run_checked<R: CommandRunner>(
    runner: &R,
    program: &str,
    args: &[String],
) -> Result<CommandOutput, SimulatorError> {
    let command = format_command(program, args);
    let output = runner
        .run(program, args)
        .map_err(|e| SimulatorError::Unavailable {
            command: command.clone(),
            reason: e.to_string(),
        })?;
    if !output.success {
        return Err(SimulatorError::CommandFailed {
            command,
            output: output.combined_output,
        });
    }
    Ok(output)
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

// ── Adapters ──────────────────────────────────────────────────────────────────

/// [`DeviceFinder`] that queries `xcrun simctl`.
#[derive(Debug, Default, Clone)]
pub struct SimctlDeviceFinder<R> {
    runner: R,
}

impl<R: CommandRunner> SimctlDeviceFinder<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> DeviceFinder for SimctlDeviceFinder<R> {
    fn find_device(
        &self,
        destination: &SimulatorDestination,
    ) -> Result<SimulatorDevice, SimulatorError> {
        let args = to_args(&["simctl", "list", "devices", "available", "--json"]);
        let output = run_checked(&self.runner, "xcrun", &args)?;

        let device = select_device(&output.stdout, destination)
            .map_err(|e| SimulatorError::InvalidOutput {
                command: format_command("xcrun", &args),
                reason: e.to_string(),
            })?
            .ok_or_else(|| SimulatorError::DeviceNotFound {
                destination: destination.to_string(),
            })?;

        debug!(
            "Resolved {destination} to {} ({})",
            device.udid, device.runtime
        );
        Ok(device)
    }
}

/// [`SimulatorLauncher`] that starts Simulator.app through `open`.
#[derive(Debug, Default, Clone)]
pub struct OpenSimulatorLauncher<R> {
    runner: R,
}

impl<R: CommandRunner> OpenSimulatorLauncher<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> SimulatorLauncher for OpenSimulatorLauncher<R> {
    fn launch(&self, device_id: &str) -> Result<(), SimulatorError> {
        let args = to_args(&["-a", "Simulator", "--args", "-CurrentDeviceUDID", device_id]);
        run_checked(&self.runner, "open", &args).map(|_| ())
    }
}

/// [`SimulatorManager`] that shuts devices down through `xcrun simctl`.
#[derive(Debug, Default, Clone)]
pub struct SimctlManager<R> {
    runner: R,
}

impl<R: CommandRunner> SimctlManager<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> SimulatorManager for SimctlManager<R> {
    fn shutdown(&self, device_id: &str) -> Result<(), SimulatorError> {
        let args = to_args(&["simctl", "shutdown", device_id]);
        run_checked(&self.runner, "xcrun", &args).map(|_| ())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
