//! Preferences store representation.
//!
//! - **`value`** – the tagged [`value::Value`] variant and typed lookups.
//! - **`codec`** – property-list bytes to and from a [`value::Dictionary`].

pub mod codec;
pub mod value;
