//! Property-list codec for the simulator preferences store.
//!
//! Property lists come in several on-disk variants that all describe the same
//! tree.  The simulator writes whichever one it likes, and tools that read the
//! file afterwards expect to find the same variant, so [`decode`] reports the
//! variant it saw as an [`EncodingTag`] and [`encode`] writes that variant
//! back.
//!
//! Variant detection:
//! ```text
//! b"bplist..."          -> EncodingTag::Binary
//! [BOM][whitespace]<... -> EncodingTag::Xml
//! anything else         -> DecodeError::UnrecognisedFormat
//! ```

use std::io::Cursor;

use thiserror::Error;

use crate::store::value::{Dictionary, Value};

const BINARY_MAGIC: &[u8] = b"bplist";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Serialization variant of a property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingTag {
    /// Apple's XML property-list format.
    Xml,
    /// Apple's `bplist00` binary format.
    Binary,
}

impl std::fmt::Display for EncodingTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingTag::Xml => f.write_str("xml"),
            EncodingTag::Binary => f.write_str("binary"),
        }
    }
}

/// Errors produced while decoding a preferences store.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are neither a binary nor an XML property list.
    #[error("unrecognised property list format ({len} bytes)")]
    UnrecognisedFormat { len: usize },

    #[error("malformed {tag} property list: {source}")]
    Malformed {
        tag: EncodingTag,
        #[source]
        source: plist::Error,
    },

    #[error("property list root is a {found}, expected a dictionary")]
    RootNotDictionary { found: &'static str },

    /// The property list contains a value kind this crate does not model.
    #[error("unsupported value at {path}")]
    UnsupportedValue { path: String },
}

/// Errors produced while encoding a preferences store.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("value at {path} ({kind}) cannot be represented in a property list")]
    Unrepresentable { path: String, kind: &'static str },

    #[error("failed to serialize {tag} property list: {source}")]
    Serialize {
        tag: EncodingTag,
        #[source]
        source: plist::Error,
    },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes property-list bytes into a root dictionary and the variant tag.
///
/// # Errors
///
/// Returns [`DecodeError`] if the bytes are not a recognised property list,
/// cannot be parsed, or do not have a dictionary at the root.
///
/// # Examples
///
/// ```rust
/// use simkbd_core::{decode, encode, EncodingTag};
///
/// let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
/// <plist version="1.0"><dict><key>A</key><true/></dict></plist>"#;
/// let (root, tag) = decode(xml).unwrap();
/// assert_eq!(tag, EncodingTag::Xml);
/// assert!(root.contains_key("A"));
///
/// let bytes = encode(&root, EncodingTag::Binary).unwrap();
/// assert!(bytes.starts_with(b"bplist"));
/// ```
pub fn decode(bytes: &[u8]) -> Result<(Dictionary, EncodingTag), DecodeError> {
    let tag = detect_encoding(bytes).ok_or(DecodeError::UnrecognisedFormat { len: bytes.len() })?;

    let parsed = match tag {
        EncodingTag::Binary => plist::Value::from_reader(Cursor::new(bytes)),
        EncodingTag::Xml => plist::Value::from_reader_xml(bytes),
    }
    .map_err(|source| DecodeError::Malformed { tag, source })?;

    match from_plist(parsed, "")? {
        Value::Dictionary(root) => Ok((root, tag)),
        other => Err(DecodeError::RootNotDictionary { found: other.kind() }),
    }
}

/// Encodes `root` using the property-list variant named by `tag`.
///
/// The output is deterministic: dictionary keys are written in sorted order.
///
/// # Errors
///
/// Returns [`EncodeError::Unrepresentable`] if the tree contains a
/// [`Value::Null`], or [`EncodeError::Serialize`] if the writer fails.
pub fn encode(root: &Dictionary, tag: EncodingTag) -> Result<Vec<u8>, EncodeError> {
    let value = plist::Value::Dictionary(dictionary_to_plist(root, "")?);

    let mut buf = Vec::new();
    match tag {
        EncodingTag::Binary => value.to_writer_binary(&mut buf),
        EncodingTag::Xml => value.to_writer_xml(&mut buf),
    }
    .map_err(|source| EncodeError::Serialize { tag, source })?;

    Ok(buf)
}

/// Sniffs the property-list variant from the leading bytes.
pub fn detect_encoding(bytes: &[u8]) -> Option<EncodingTag> {
    if bytes.starts_with(BINARY_MAGIC) {
        return Some(EncodingTag::Binary);
    }

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => Some(EncodingTag::Xml),
        _ => None,
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn from_plist(value: plist::Value, path: &str) -> Result<Value, DecodeError> {
    let converted = match value {
        plist::Value::Boolean(b) => Value::Boolean(b),
        plist::Value::Integer(n) => match n.as_signed() {
            Some(signed) => Value::Integer(signed),
            None => match n.as_unsigned() {
                Some(unsigned) => Value::UnsignedInteger(unsigned),
                None => {
                    return Err(DecodeError::UnsupportedValue {
                        path: path.to_string(),
                    })
                }
            },
        },
        plist::Value::Real(r) => Value::Real(r),
        plist::Value::String(s) => Value::String(s),
        plist::Value::Data(d) => Value::Data(d),
        plist::Value::Date(d) => Value::Date(d.into()),
        plist::Value::Uid(uid) => Value::Uid(uid.get()),
        plist::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_plist(item, &child_path(path, &i.to_string())))
                .collect::<Result<_, _>>()?,
        ),
        plist::Value::Dictionary(dict) => {
            let mut out = Dictionary::new();
            for (key, item) in dict {
                let converted = from_plist(item, &child_path(path, &key))?;
                out.insert(key, converted);
            }
            Value::Dictionary(out)
        }
        _ => {
            return Err(DecodeError::UnsupportedValue {
                path: path.to_string(),
            })
        }
    };
    Ok(converted)
}

fn dictionary_to_plist(dict: &Dictionary, path: &str) -> Result<plist::Dictionary, EncodeError> {
    let mut out = plist::Dictionary::new();
    for (key, value) in dict {
        out.insert(key.clone(), to_plist(value, &child_path(path, key))?);
    }
    Ok(out)
}

fn to_plist(value: &Value, path: &str) -> Result<plist::Value, EncodeError> {
    let converted = match value {
        Value::Null => {
            return Err(EncodeError::Unrepresentable {
                path: path.to_string(),
                kind: value.kind(),
            })
        }
        Value::Boolean(b) => plist::Value::Boolean(*b),
        Value::Integer(n) => plist::Value::Integer((*n).into()),
        Value::UnsignedInteger(n) => plist::Value::Integer((*n).into()),
        Value::Real(r) => plist::Value::Real(*r),
        Value::String(s) => plist::Value::String(s.clone()),
        Value::Data(d) => plist::Value::Data(d.clone()),
        Value::Date(t) => plist::Value::Date((*t).into()),
        Value::Uid(uid) => plist::Value::Uid(plist::Uid::new(*uid)),
        Value::Array(items) => plist::Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_plist(item, &child_path(path, &i.to_string())))
                .collect::<Result<_, _>>()?,
        ),
        Value::Dictionary(dict) => plist::Value::Dictionary(dictionary_to_plist(dict, path)?),
    };
    Ok(converted)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
