//! Application layer use cases.
//!
//! - **`open_preferences`** – The preferences accessor.  Resolves the store
//!   path, loads the store (bootstrapping it if it is missing at the default
//!   location), disables Connect Hardware Keyboard, and writes the store back
//!   in its original variant.
//!
//! - **`bootstrap`** – Launches the simulator and waits, with a bounded poll
//!   budget, until it has written a usable preferences store.  The simulator
//!   is always shut down again, whatever the outcome.
//!
//! - **`backup`** – Copies the original store aside and exports the copy's
//!   path so the change can be rolled back later.
//!
//! Every OS interaction goes through a trait declared here and implemented in
//! the infrastructure layer, so the use cases run under test with mocks.

pub mod backup;
pub mod bootstrap;
pub mod open_preferences;
