//! Readiness decision for a preferences store that is being created by the
//! simulator.
//!
//! The simulator writes its preferences lazily, some time after launch.  The
//! waiter in the `simkbd` crate polls the file, and every poll result is fed
//! through [`assess`] to decide what happens next:
//!
//! ```text
//!   read result                      state
//!   ─────────────────────────────    ──────────────
//!   Err(NotFound)                 -> NotFound       (sleep, retry)
//!   Err(other)                    -> HardError      (abort)
//!   Ok(bytes), decode fails       -> HardError      (abort)
//!   Ok(bytes), no DevicePrefs     -> FoundNotReady  (sleep, retry)
//!   Ok(bytes), DevicePrefs not {} -> HardError      (abort)
//!   Ok(bytes), DevicePrefs {}     -> Ready          (return)
//!   budget exhausted              -> TimedOut       (abort)
//! ```
//!
//! The sleeping and clock handling are left to the caller; [`PollBudget`]
//! only does the arithmetic.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::domain::preferences::DEVICE_PREFERENCES_KEY;
use crate::store::codec::{decode, DecodeError, EncodingTag};
use crate::store::value::{get_dictionary, Dictionary, LookupError};

/// A decoded store together with the variant it was read in.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedStore {
    pub root: Dictionary,
    pub tag: EncodingTag,
}

/// Unrecoverable problem observed while polling.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read file: {0}")]
    Io(#[source] io::Error),

    #[error("failed to decode file: {0}")]
    Decode(#[source] DecodeError),

    #[error("unexpected store shape: {0}")]
    Shape(#[source] LookupError),
}

/// Outcome of one poll.
#[derive(Debug)]
pub enum PollState {
    /// The file does not exist yet.
    NotFound,
    /// The file exists but the simulator has not populated it yet.
    FoundNotReady,
    /// The file is usable.
    Ready(LoadedStore),
    /// The wait budget ran out before the file became ready.
    TimedOut,
    /// Polling must stop.
    HardError(ProbeError),
}

impl PollState {
    /// `true` for the states that warrant another poll.
    pub fn should_retry(&self) -> bool {
        matches!(self, PollState::NotFound | PollState::FoundNotReady)
    }
}

/// Maps the result of reading the store file to the next [`PollState`].
///
/// Never returns [`PollState::TimedOut`]; that decision belongs to
/// [`PollBudget`].
pub fn assess(read: io::Result<Vec<u8>>) -> PollState {
    let bytes = match read {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return PollState::NotFound,
        Err(e) => return PollState::HardError(ProbeError::Io(e)),
    };

    let (root, tag) = match decode(&bytes) {
        Ok(decoded) => decoded,
        Err(e) => return PollState::HardError(ProbeError::Decode(e)),
    };

    match get_dictionary(&root, DEVICE_PREFERENCES_KEY) {
        Ok(_) => PollState::Ready(LoadedStore { root, tag }),
        Err(LookupError::KeyNotFound(_)) => PollState::FoundNotReady,
        Err(e) => PollState::HardError(ProbeError::Shape(e)),
    }
}

/// Remaining wait time for the bootstrap poll loop.
///
/// Every retry is charged one full `interval`, regardless of how long the
/// read itself took, so the number of polls is bounded by
/// `total / interval` (rounded up).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    total: Duration,
    remaining: Duration,
    interval: Duration,
}

impl PollBudget {
    /// Creates a budget of `total` consumed in steps of `interval`.
    ///
    /// A zero `interval` is treated as one millisecond so the loop always
    /// terminates.
    pub fn new(total: Duration, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            total,
            remaining: total,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Time consumed so far.
    pub fn elapsed(&self) -> Duration {
        self.total - self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Charges one poll interval against the budget.
    pub fn charge(&mut self) {
        self.remaining = self.remaining.saturating_sub(self.interval);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
