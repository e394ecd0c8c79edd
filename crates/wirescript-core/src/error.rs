//! Error taxonomy for script validation and sequence execution.
//!
//! Two families, kept separate on purpose: [`ValidationError`] and
//! [`SequenceError`] mean the caller's input was malformed and the run never
//! started, while [`RunError`] means a step was executed and failed. Within
//! [`RunError`], the expectation variants are the primary "test failed"
//! signal, distinct from lifecycle and codec errors.

use thiserror::Error;
use wirescript_proto::{FieldValue, WireError};

use crate::event::ConnId;

/// A single raw event description could not be turned into a typed event.
///
/// Construction is all-or-nothing: a raw description either yields a fully
/// valid event or one of these errors, never a half-built event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The `type` tag is not one of connect, send, expect, disconnect.
    #[error("unknown event type '{0}'")]
    UnknownEventType(String),

    /// A required field is absent from the raw description.
    #[error("{event_type} event is missing '{field}'")]
    MissingField {
        /// Event type tag of the offending description.
        event_type: String,
        /// Name of the absent field.
        field: &'static str,
    },

    /// The named message type is absent from the registry.
    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),
}

/// A whole script failed validation before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The script contained zero steps.
    ///
    /// Distinct from a script with an invalid step so callers can tell
    /// "nothing to run" from "bad input".
    #[error("sequence contains no events")]
    Empty,

    /// A step failed validation; earlier steps were valid.
    #[error("invalid event at step {step}: {source}")]
    Invalid {
        /// Zero-based index of the first invalid step.
        step: usize,
        /// Why that step was rejected.
        #[source]
        source: ValidationError,
    },
}

/// A step failed during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Connect referenced an id that is already open.
    #[error("connection '{0}' is already open")]
    AlreadyOpen(ConnId),

    /// Send, expect, or disconnect referenced an id that is not open.
    #[error("connection '{0}' is not open")]
    NotOpen(ConnId),

    /// Encoding or decoding failed against the message descriptor.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The next queued inbound message was absent or of the wrong type.
    #[error("expected '{expected}', got {}", .actual.as_deref().unwrap_or("nothing"))]
    UnmetExpectation {
        /// Message type the script expected.
        expected: String,
        /// Message type actually at the head of the queue, if any.
        actual: Option<String>,
    },

    /// The popped message matched in type but violated a field constraint.
    #[error("field '{field}': expected {expected}, got {}", fmt_actual(.actual))]
    FieldMismatch {
        /// Constrained field name.
        field: String,
        /// Value the script required.
        expected: FieldValue,
        /// Decoded value, or `None` if the field was absent.
        actual: Option<FieldValue>,
    },
}

fn fmt_actual(actual: &Option<FieldValue>) -> String {
    actual.as_ref().map_or_else(|| String::from("nothing"), ToString::to_string)
}
