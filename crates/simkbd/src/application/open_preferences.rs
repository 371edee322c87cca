//! SimulatorPreferences: the preferences accessor.
//!
//! Owns one decoded store for the duration of a run.  All mutation happens on
//! an in-memory copy; the file on disk is only replaced once the whole tree
//! has been updated and re-encoded.

use std::io;
use std::path::{Path, PathBuf};

use simkbd_core::{
    decode, disable_connect_hardware_keyboard, encode, DecodeError, Dictionary, EncodeError,
    EncodingTag, LookupError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::bootstrap::{BootstrapError, StoreBootstrap};
use crate::domain::config::DEFAULT_PREFERENCES_PATH;

/// Error type for path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("cannot expand {}: home directory is unknown", .0.display())]
    NoHomeDir(PathBuf),

    #[error("cannot resolve {}: {source}", .path.display())]
    CurrentDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Turns user-supplied paths into absolute, normalised paths.
pub trait PathResolver {
    /// # Errors
    ///
    /// Returns [`PathError`] if `~` or the working directory cannot be
    /// determined.
    fn resolve(&self, path: &Path) -> Result<PathBuf, PathError>;
}

/// Error type for opening the preferences store.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to resolve path: {0}")]
    Resolve(#[from] PathError),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to open file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

/// Error type for the keyboard mutation.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] EncodeError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A loaded iOS Simulator preferences store.
#[derive(Debug)]
pub struct SimulatorPreferences {
    path: PathBuf,
    tag: EncodingTag,
    root: Dictionary,
}

impl SimulatorPreferences {
    /// Opens the store at `path`.
    ///
    /// If the file does not exist and `path` resolves to the simulator's
    /// default preferences location, `bootstrap` is asked to create it.
    ///
    /// # Errors
    ///
    /// - [`OpenError::NotFound`] if the file is missing at any other path.
    /// - [`OpenError::Io`] / [`OpenError::Decode`] if it cannot be read.
    /// - [`OpenError::Bootstrap`] if creating the default store fails.
    pub fn open(
        path: impl AsRef<Path>,
        resolver: &dyn PathResolver,
        bootstrap: &dyn StoreBootstrap,
    ) -> Result<Self, OpenError> {
        let path = resolver.resolve(path.as_ref())?;

        match std::fs::read(&path) {
            Ok(bytes) => {
                let (root, tag) = decode(&bytes).map_err(|source| OpenError::Decode {
                    path: path.clone(),
                    source,
                })?;
                debug!("Loaded {tag} preferences from {}", path.display());
                Ok(Self { path, tag, root })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let default_path = resolver.resolve(Path::new(DEFAULT_PREFERENCES_PATH))?;
                if path != default_path {
                    return Err(OpenError::NotFound(path));
                }

                debug!("Initialising default simulator preferences");
                let store = bootstrap.materialize(&path)?;
                Ok(Self {
                    path,
                    tag: store.tag,
                    root: store.root,
                })
            }
            Err(source) => Err(OpenError::Io { path, source }),
        }
    }

    /// Absolute path the store was loaded from and will be written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Property-list variant used when persisting.
    pub fn encoding(&self) -> EncodingTag {
        self.tag
    }

    pub fn root(&self) -> &Dictionary {
        &self.root
    }

    /// Sets `ConnectHardwareKeyboard = false` for every device and writes the
    /// store back to [`Self::path`] in its original variant.
    ///
    /// Returns the number of devices updated.  If any step before the final
    /// write fails, neither the file nor the in-memory store changes.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] if the store does not have the expected
    /// shape, or if encoding or writing fails.
    pub fn disable_connect_hardware_keyboard(&mut self) -> Result<usize, MutationError> {
        let mut root = self.root.clone();
        let devices = disable_connect_hardware_keyboard(&mut root)?;

        let bytes = encode(&root, self.tag)?;
        std::fs::write(&self.path, bytes).map_err(|source| MutationError::Write {
            path: self.path.clone(),
            source,
        })?;

        self.root = root;
        info!(
            "Connect Hardware Keyboard disabled for {devices} device(s) in {}",
            self.path.display()
        );
        Ok(devices)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
