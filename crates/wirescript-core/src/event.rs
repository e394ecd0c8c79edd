//! Event model: raw descriptions, typed events, and validation.
//!
//! Raw event descriptions arrive as loosely-typed mappings (the script
//! vocabulary of the caller-facing API). [`build_event`] turns each one into
//! a closed [`Event`] variant exactly once, resolving message names against
//! the registry up front. Execution then matches exhaustively on the variant,
//! so a forgotten case is a compile error rather than a runtime surprise.

use std::fmt;

use serde::Deserialize;
use wirescript_proto::{FieldMap, MessageDescriptor, MessageRegistry};

use crate::error::{SequenceError, ValidationError};

/// Opaque identity token for a simulated connection.
///
/// In the source protocol this is a private-key surrogate (`connprivkey`);
/// here it is just an opaque string. Unique among currently-open connections;
/// may be reused after the prior connection with this id is closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnId(String);

impl ConnId {
    /// Create a connection id from any string token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Raw event description as submitted by the caller.
///
/// Recognized fields: `type` (all events), `connprivkey` (all events),
/// `msg_name` (send/expect), and an optional `fields` map carrying send
/// values or expect constraints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    /// Event type tag: connect, send, expect, or disconnect.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Connection identity token.
    pub connprivkey: Option<String>,

    /// Message type name for send/expect events.
    pub msg_name: Option<String>,

    /// Field values (send) or field constraints (expect).
    #[serde(default)]
    pub fields: FieldMap,
}

/// A validated script step.
///
/// Immutable once constructed; message descriptors are resolved here and
/// carried in the variant, so execution never consults the registry for the
/// outbound side.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Open a simulated connection.
    Connect {
        /// Connection to open.
        conn: ConnId,
    },
    /// Encode and send a message on an open connection.
    Send {
        /// Connection to send on.
        conn: ConnId,
        /// Resolved descriptor of the outbound message.
        desc: MessageDescriptor,
        /// Field values to encode; unspecified fields default to zero/empty.
        values: FieldMap,
    },
    /// Assert that the next queued inbound message has the given type.
    Expect {
        /// Connection to consume from.
        conn: ConnId,
        /// Resolved descriptor of the expected message.
        desc: MessageDescriptor,
        /// Field-level constraints that must hold on the decoded message.
        constraints: FieldMap,
    },
    /// Close a simulated connection.
    Disconnect {
        /// Connection to close.
        conn: ConnId,
    },
}

impl Event {
    /// Connection the event operates on.
    pub fn conn(&self) -> &ConnId {
        match self {
            Self::Connect { conn }
            | Self::Send { conn, .. }
            | Self::Expect { conn, .. }
            | Self::Disconnect { conn } => conn,
        }
    }

    /// Event type tag, matching the raw vocabulary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Send { .. } => "send",
            Self::Expect { .. } => "expect",
            Self::Disconnect { .. } => "disconnect",
        }
    }
}

fn require_conn(raw: &RawEvent) -> Result<ConnId, ValidationError> {
    raw.connprivkey.as_deref().map(ConnId::new).ok_or(ValidationError::MissingField {
        event_type: raw.event_type.clone(),
        field: "connprivkey",
    })
}

fn require_msg<'r>(
    raw: &RawEvent,
    registry: &'r MessageRegistry,
) -> Result<&'r MessageDescriptor, ValidationError> {
    let name = raw.msg_name.as_deref().ok_or(ValidationError::MissingField {
        event_type: raw.event_type.clone(),
        field: "msg_name",
    })?;
    registry
        .lookup(name)
        .ok_or_else(|| ValidationError::UnknownMessageType(name.to_string()))
}

/// Construct a typed event from a raw description.
///
/// Pure: no side effects, no registry mutation, idempotent. Either a fully
/// valid [`Event`] comes back or a [`ValidationError`]; there is no partial
/// construction.
pub fn build_event(raw: &RawEvent, registry: &MessageRegistry) -> Result<Event, ValidationError> {
    match raw.event_type.as_str() {
        "connect" => Ok(Event::Connect { conn: require_conn(raw)? }),
        "send" => Ok(Event::Send {
            conn: require_conn(raw)?,
            desc: require_msg(raw, registry)?.clone(),
            values: raw.fields.clone(),
        }),
        "expect" => Ok(Event::Expect {
            conn: require_conn(raw)?,
            desc: require_msg(raw, registry)?.clone(),
            constraints: raw.fields.clone(),
        }),
        "disconnect" => Ok(Event::Disconnect { conn: require_conn(raw)? }),
        other => Err(ValidationError::UnknownEventType(other.to_string())),
    }
}

/// Validate a whole script into typed events.
///
/// # Errors
///
/// [`SequenceError::Empty`] for a zero-step script;
/// [`SequenceError::Invalid`] carrying the index of the first bad step.
pub fn build_sequence(
    raws: &[RawEvent],
    registry: &MessageRegistry,
) -> Result<Vec<Event>, SequenceError> {
    if raws.is_empty() {
        return Err(SequenceError::Empty);
    }
    raws.iter()
        .enumerate()
        .map(|(step, raw)| {
            build_event(raw, registry).map_err(|source| SequenceError::Invalid { step, source })
        })
        .collect()
}
