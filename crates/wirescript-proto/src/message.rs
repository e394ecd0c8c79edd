//! Message descriptors and registry-driven encode/decode.
//!
//! A [`MessageDescriptor`] is the structural contract for one message type:
//! its name, numeric code, and ordered field list. Encoding walks the
//! descriptor in order, pulling values from a name-keyed map; decoding is the
//! inverse. Descriptors are immutable and owned by the registry; the engine
//! only ever borrows them.

use std::collections::BTreeMap;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    errors::{Result, WireError},
    field::{FieldDef, FieldKind, FieldValue},
};

/// Field values keyed by field name.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Structural descriptor for one message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Message name, e.g. `"ping"`.
    pub name: String,
    /// Numeric wire type code.
    pub code: u16,
    /// Ordered field layout of the payload.
    pub fields: Vec<FieldDef>,
}

impl MessageDescriptor {
    /// Create a descriptor from a name, code, and field list.
    pub fn new(name: impl Into<String>, code: u16, fields: Vec<FieldDef>) -> Self {
        Self { name: name.into(), code, fields }
    }

    /// Encode `values` into a payload following this descriptor.
    ///
    /// Fields are emitted in descriptor order. Missing values default to
    /// zero (integers) or empty (byte strings); the simulated peer is
    /// best-effort and scripts rarely spell out every field. A value whose
    /// name is not in the descriptor is an error, so a typo in a script
    /// cannot be silently dropped.
    ///
    /// # Errors
    ///
    /// [`WireError::UnknownField`] for a value naming no field,
    /// [`WireError::BadFieldValue`] for a value that does not fit its kind.
    pub fn encode(&self, values: &FieldMap) -> Result<Bytes> {
        for name in values.keys() {
            if !self.fields.iter().any(|f| &f.name == name) {
                return Err(WireError::UnknownField {
                    message: self.name.clone(),
                    field: name.clone(),
                });
            }
        }

        let mut buf = BytesMut::new();
        for field in &self.fields {
            self.encode_field(field, values.get(&field.name), &mut buf)?;
        }
        Ok(buf.freeze())
    }

    fn encode_field(
        &self,
        field: &FieldDef,
        value: Option<&FieldValue>,
        buf: &mut BytesMut,
    ) -> Result<()> {
        let bad = |reason: String| WireError::BadFieldValue {
            message: self.name.clone(),
            field: field.name.clone(),
            reason,
        };

        match field.kind {
            FieldKind::U16 | FieldKind::U32 | FieldKind::U64 => {
                let v = match value {
                    None => 0,
                    Some(FieldValue::Uint(v)) => *v,
                    Some(other) => return Err(bad(format!("expected integer, got {other}"))),
                };
                match field.kind {
                    FieldKind::U16 => {
                        let v = u16::try_from(v)
                            .map_err(|_| bad(format!("{v} does not fit in u16")))?;
                        buf.put_u16(v);
                    },
                    FieldKind::U32 => {
                        let v = u32::try_from(v)
                            .map_err(|_| bad(format!("{v} does not fit in u32")))?;
                        buf.put_u32(v);
                    },
                    _ => buf.put_u64(v),
                }
            },
            FieldKind::Bytes => {
                let data = match value {
                    None => &[][..],
                    Some(FieldValue::Bytes(b)) => b.as_slice(),
                    Some(other) => return Err(bad(format!("expected bytes, got {other}"))),
                };
                let len = u16::try_from(data.len())
                    .map_err(|_| bad(format!("{} bytes exceed length prefix", data.len())))?;
                buf.put_u16(len);
                buf.put_slice(data);
            },
            FieldKind::Rest => {
                let data = match value {
                    None => &[][..],
                    Some(FieldValue::Bytes(b)) => b.as_slice(),
                    Some(other) => return Err(bad(format!("expected bytes, got {other}"))),
                };
                buf.put_slice(data);
            },
        }
        Ok(())
    }

    /// Decode a payload into a name-keyed value map following this
    /// descriptor.
    ///
    /// # Errors
    ///
    /// [`WireError::Truncated`] if the payload ends mid-field,
    /// [`WireError::TrailingBytes`] if bytes remain after the final field of
    /// a descriptor without a tail.
    pub fn decode(&self, mut payload: &[u8]) -> Result<FieldMap> {
        let truncated = |field: &FieldDef| WireError::Truncated {
            message: self.name.clone(),
            field: field.name.clone(),
        };

        let mut values = FieldMap::new();
        for field in &self.fields {
            let value = match field.kind {
                FieldKind::U16 => {
                    if payload.remaining() < 2 {
                        return Err(truncated(field));
                    }
                    FieldValue::Uint(u64::from(payload.get_u16()))
                },
                FieldKind::U32 => {
                    if payload.remaining() < 4 {
                        return Err(truncated(field));
                    }
                    FieldValue::Uint(u64::from(payload.get_u32()))
                },
                FieldKind::U64 => {
                    if payload.remaining() < 8 {
                        return Err(truncated(field));
                    }
                    FieldValue::Uint(payload.get_u64())
                },
                FieldKind::Bytes => {
                    if payload.remaining() < 2 {
                        return Err(truncated(field));
                    }
                    let len = usize::from(payload.get_u16());
                    if payload.remaining() < len {
                        return Err(truncated(field));
                    }
                    FieldValue::Bytes(payload.copy_to_bytes(len).to_vec())
                },
                FieldKind::Rest => {
                    FieldValue::Bytes(payload.copy_to_bytes(payload.remaining()).to_vec())
                },
            };
            values.insert(field.name.clone(), value);
        }

        if payload.has_remaining() {
            return Err(WireError::TrailingBytes {
                message: self.name.clone(),
                remaining: payload.remaining(),
            });
        }
        Ok(values)
    }
}

/// One encoded message: a numeric type code plus its payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    /// Numeric wire type code.
    pub code: u16,
    /// Encoded payload, laid out per the owning descriptor.
    pub payload: Bytes,
}

impl WireMessage {
    /// Create a wire message from a code and payload.
    pub fn new(code: u16, payload: Bytes) -> Self {
        Self { code, payload }
    }

    /// Full wire form: big-endian type code followed by the payload.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(2 + self.payload.len());
        buf.put_u16(self.code);
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}
