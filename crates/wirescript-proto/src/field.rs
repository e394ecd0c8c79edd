//! Field kinds and runtime field values.
//!
//! A descriptor assigns each field a [`FieldKind`] fixing its wire layout.
//! Scripts supply values as JSON numbers or hex strings; both deserialize
//! into [`FieldValue`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire layout of a single message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Big-endian unsigned 16-bit integer.
    U16,
    /// Big-endian unsigned 32-bit integer.
    U32,
    /// Big-endian unsigned 64-bit integer.
    U64,
    /// Byte string with a big-endian `u16` length prefix.
    Bytes,
    /// Unprefixed byte string consuming the remainder of the payload.
    ///
    /// Only legal as the final field of a descriptor; the registry rejects
    /// descriptors that violate this.
    Rest,
}

/// Named field within a message descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name, unique within its message.
    pub name: String,
    /// Wire layout of the field.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Create a field definition.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind }
    }
}

/// A runtime value for a message field.
///
/// Deserializes untagged: JSON numbers become [`FieldValue::Uint`], JSON
/// strings are parsed as hex into [`FieldValue::Bytes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Unsigned integer value for `U16`/`U32`/`U64` fields.
    Uint(u64),
    /// Byte-string value for `Bytes`/`Rest` fields, hex-encoded in JSON.
    Bytes(#[serde(with = "hex::serde")] Vec<u8>),
}

impl FieldValue {
    /// Byte-string value from a slice.
    pub fn bytes(data: impl AsRef<[u8]>) -> Self {
        Self::Bytes(data.as_ref().to_vec())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_number_as_uint() {
        let value: FieldValue = serde_json::from_str("10").unwrap();
        assert_eq!(value, FieldValue::Uint(10));
    }

    #[test]
    fn deserialize_hex_string_as_bytes() {
        let value: FieldValue = serde_json::from_str("\"deadbeef\"").unwrap();
        assert_eq!(value, FieldValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn deserialize_bad_hex_fails() {
        let result: Result<FieldValue, _> = serde_json::from_str("\"zz\"");
        assert!(result.is_err());
    }

    #[test]
    fn display_forms() {
        assert_eq!(FieldValue::Uint(42).to_string(), "42");
        assert_eq!(FieldValue::bytes([0x01, 0x02]).to_string(), "0x0102");
    }
}
