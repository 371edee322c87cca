//! Storage infrastructure: the file-system probe and the clock used by the
//! bootstrap poll loop.
//!
//! The accessor reads and writes the store directly with `std::fs`; only the
//! bootstrap loop needs these seams, because its tests must script file
//! appearance and must not really sleep.

pub mod mock;

use std::io;
use std::path::Path;
use std::time::Duration;

use crate::application::bootstrap::{Clock, PreferencesProbe};

/// Reads the store with [`std::fs::read`], which closes the file before
/// returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPreferencesProbe;

impl PreferencesProbe for FsPreferencesProbe {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Blocks the current thread for the requested duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
