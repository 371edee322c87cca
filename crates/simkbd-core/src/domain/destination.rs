//! Parser for `xcodebuild`-style simulator destination specifiers.
//!
//! ```text
//! platform=iOS Simulator,name=Bitrise iOS default,OS=latest
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Destination used when the preferences store has to be bootstrapped.
pub const DEFAULT_DESTINATION: &str = "platform=iOS Simulator,name=Bitrise iOS default,OS=latest";

/// OS value meaning "newest installed runtime".
pub const LATEST_OS: &str = "latest";

const SIMULATOR_SUFFIX: &str = " Simulator";

/// Error type for destination parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DestinationError {
    #[error("malformed destination component {0:?}: expected key=value")]
    MalformedComponent(String),

    #[error("unknown destination key: {0}")]
    UnknownKey(String),

    #[error("destination is missing required key: {0}")]
    MissingKey(&'static str),

    #[error("destination platform {0:?} is not a simulator platform")]
    NotASimulator(String),
}

/// A parsed simulator destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorDestination {
    /// Full platform name, e.g. `"iOS Simulator"`.
    pub platform: String,
    /// Device name, e.g. `"iPhone 15"`.
    pub name: String,
    /// OS version, or [`LATEST_OS`].
    pub os: String,
    pub arch: Option<String>,
}

impl SimulatorDestination {
    /// Platform name as used in CoreSimulator runtime identifiers
    /// (`"iOS Simulator"` -> `"iOS"`).
    pub fn runtime_platform(&self) -> &str {
        self.platform
            .strip_suffix(SIMULATOR_SUFFIX)
            .unwrap_or(&self.platform)
    }

    pub fn wants_latest_os(&self) -> bool {
        self.os.eq_ignore_ascii_case(LATEST_OS)
    }
}

impl FromStr for SimulatorDestination {
    type Err = DestinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut platform = None;
        let mut name = None;
        let mut os = None;
        let mut arch = None;

        for component in s.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let (key, value) = component
                .split_once('=')
                .ok_or_else(|| DestinationError::MalformedComponent(component.to_string()))?;
            let value = value.trim().to_string();
            match key.trim() {
                "platform" => platform = Some(value),
                "name" => name = Some(value),
                "OS" => os = Some(value),
                "arch" => arch = Some(value),
                other => return Err(DestinationError::UnknownKey(other.to_string())),
            }
        }

        let platform = platform.ok_or(DestinationError::MissingKey("platform"))?;
        if !platform.ends_with(SIMULATOR_SUFFIX) {
            return Err(DestinationError::NotASimulator(platform));
        }
        let name = name
            .filter(|n| !n.is_empty())
            .ok_or(DestinationError::MissingKey("name"))?;

        Ok(Self {
            platform,
            name,
            os: os.unwrap_or_else(|| LATEST_OS.to_string()),
            arch,
        })
    }
}

impl fmt::Display for SimulatorDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "platform={},name={},OS={}", self.platform, self.name, self.os)?;
        if let Some(arch) = &self.arch {
            write!(f, ",arch={arch}")?;
        }
        Ok(())
    }
}
