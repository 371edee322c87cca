//! Dynamically-typed values held inside a preferences store.
//!
//! Property lists are untyped trees: any dictionary entry may hold a string,
//! a number, a nested dictionary, and so on.  [`Value`] models that tree as a
//! closed enum, and the `as_*` accessors return `None` on a type mismatch so
//! callers never have to guess at the shape of the data.

use std::collections::BTreeMap;
use std::time::SystemTime;

use thiserror::Error;

/// A string-keyed mapping of values.
///
/// A `BTreeMap` keeps key order sorted, which makes encoding deterministic.
pub type Dictionary = BTreeMap<String, Value>;

/// A single property-list value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value.  Exists only in memory; property lists have no
    /// null, so encoding it fails.
    Null,
    Boolean(bool),
    /// Signed integer.  Most integers in simulator preferences land here.
    Integer(i64),
    /// Unsigned integer too large for `i64`.
    UnsignedInteger(u64),
    Real(f64),
    String(String),
    Data(Vec<u8>),
    Date(SystemTime),
    /// Keyed-archiver object reference (binary property lists only).
    Uid(u64),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::UnsignedInteger(_) => "integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::Data(_) => "data",
            Value::Date(_) => "date",
            Value::Uid(_) => "uid",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Dictionary> for Value {
    fn from(dict: Dictionary) -> Self {
        Value::Dictionary(dict)
    }
}

/// Error returned when a required dictionary entry is missing or has the
/// wrong type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("value is not a dictionary: {key} (found {found})")]
    NotADictionary { key: String, found: &'static str },
}

/// Looks up `key` in `dict` and returns it as a nested dictionary.
///
/// # Errors
///
/// Returns [`LookupError::KeyNotFound`] if `key` is absent, or
/// [`LookupError::NotADictionary`] if its value is some other kind.
pub fn get_dictionary<'a>(dict: &'a Dictionary, key: &str) -> Result<&'a Dictionary, LookupError> {
    let value = dict
        .get(key)
        .ok_or_else(|| LookupError::KeyNotFound(key.to_string()))?;
    value.as_dictionary().ok_or(LookupError::NotADictionary {
        key: key.to_string(),
        found: value.kind(),
    })
}

/// Mutable variant of [`get_dictionary`].
///
/// # Errors
///
/// Same as [`get_dictionary`].
pub fn get_dictionary_mut<'a>(
    dict: &'a mut Dictionary,
    key: &str,
) -> Result<&'a mut Dictionary, LookupError> {
    let value = dict
        .get_mut(key)
        .ok_or_else(|| LookupError::KeyNotFound(key.to_string()))?;
    let found = value.kind();
    value.as_dictionary_mut().ok_or(LookupError::NotADictionary {
        key: key.to_string(),
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dictionary {
        let mut inner = Dictionary::new();
        inner.insert("Name".to_string(), Value::from("iPhone 15"));

        let mut root = Dictionary::new();
        root.insert("Device".to_string(), Value::Dictionary(inner));
        root.insert("Count".to_string(), Value::Integer(3));
        root
    }

    #[test]
    fn test_get_dictionary_returns_nested_dictionary() {
        let root = sample();
        let inner = get_dictionary(&root, "Device").expect("nested dictionary");
        assert_eq!(inner.get("Name").and_then(Value::as_str), Some("iPhone 15"));
    }

    #[test]
    fn test_get_dictionary_reports_missing_key() {
        let root = sample();
        let err = get_dictionary(&root, "Missing").unwrap_err();
        assert_eq!(err, LookupError::KeyNotFound("Missing".to_string()));
        assert_eq!(err.to_string(), "key not found: Missing");
    }

    #[test]
    fn test_get_dictionary_reports_wrong_kind() {
        let root = sample();
        let err = get_dictionary(&root, "Count").unwrap_err();
        assert_eq!(
            err,
            LookupError::NotADictionary {
                key: "Count".to_string(),
                found: "integer"
            }
        );
    }

    #[test]
    fn test_get_dictionary_mut_allows_in_place_update() {
        let mut root = sample();
        get_dictionary_mut(&mut root, "Device")
            .unwrap()
            .insert("Booted".to_string(), Value::Boolean(true));

        let inner = get_dictionary(&root, "Device").unwrap();
        assert_eq!(inner.get("Booted").and_then(Value::as_boolean), Some(true));
    }

    #[test]
    fn test_typed_accessors_return_none_on_mismatch() {
        let v = Value::Integer(1);
        assert!(v.as_boolean().is_none());
        assert!(v.as_str().is_none());
        assert!(v.as_dictionary().is_none());
        assert_eq!(Value::Null.kind(), "null");
    }
}
