//! Error types for registry lookups and the wire codec.

use thiserror::Error;

/// Convenience alias for codec results.
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors raised by the message registry and the field codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The named message type is not present in the registry.
    #[error("unknown message type '{0}'")]
    UnknownMessage(String),

    /// No registered message carries this numeric type code.
    #[error("unknown message code {0}")]
    UnknownCode(u16),

    /// A message name or code was registered twice.
    #[error("duplicate registration for message '{name}' (code {code})")]
    DuplicateMessage {
        /// Message name as registered.
        name: String,
        /// Numeric type code as registered.
        code: u16,
    },

    /// A `Rest` field may only appear as the final field of a descriptor.
    #[error("field '{field}' of message '{message}': rest field must be last")]
    RestNotLast {
        /// Owning message name.
        message: String,
        /// Offending field name.
        field: String,
    },

    /// A supplied value does not name any field of the descriptor.
    #[error("message '{message}' has no field named '{field}'")]
    UnknownField {
        /// Owning message name.
        message: String,
        /// Offending field name.
        field: String,
    },

    /// A supplied value does not fit the field's wire kind.
    #[error("field '{field}' of message '{message}': {reason}")]
    BadFieldValue {
        /// Owning message name.
        message: String,
        /// Offending field name.
        field: String,
        /// What went wrong, e.g. "65536 does not fit in u16".
        reason: String,
    },

    /// The payload ended before all fields were decoded.
    #[error("message '{message}' truncated while decoding field '{field}'")]
    Truncated {
        /// Owning message name.
        message: String,
        /// Field being decoded when input ran out.
        field: String,
    },

    /// Bytes remained after the final field of a descriptor with no tail.
    #[error("message '{message}' carries {remaining} trailing bytes")]
    TrailingBytes {
        /// Owning message name.
        message: String,
        /// Number of unconsumed bytes.
        remaining: usize,
    },
}
