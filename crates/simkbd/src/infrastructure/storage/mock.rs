//! Scripted probe and recording clock for exercising the bootstrap poll loop.
//!
//! # Usage in tests
//!
//! ```ignore
//! let probe = Arc::new(ScriptedProbe::new(vec![
//!     Err(io::Error::from(io::ErrorKind::NotFound)),
//!     Ok(ready_bytes),
//! ]));
//! let clock = Arc::new(RecordingClock::new());
//! // ... run the waiter ...
//! assert_eq!(probe.reads(), 2);
//! assert_eq!(clock.sleeps.lock().unwrap().len(), 1);
//! ```

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::bootstrap::{Clock, PreferencesProbe};

/// A probe that replays a fixed sequence of read results.
///
/// Once the script is used up, every further read reports `NotFound`.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    script: Mutex<VecDeque<io::Result<Vec<u8>>>>,
    reads: Mutex<usize>,
}

impl ScriptedProbe {
    pub fn new(script: Vec<io::Result<Vec<u8>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            reads: Mutex::new(0),
        }
    }

    /// Number of reads performed so far.
    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

impl PreferencesProbe for ScriptedProbe {
    fn read(&self, _path: &Path) -> io::Result<Vec<u8>> {
        *self.reads.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::from(io::ErrorKind::NotFound)))
    }
}

/// A clock that records requested sleeps and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingClock {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested sleeps.
    pub fn total_slept(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
