//! Wirescript sequence-execution engine.
//!
//! Pure, synchronous execution of protocol test scripts against a simulated
//! peer, completely decoupled from I/O.
//!
//! # Architecture
//!
//! A script is an ordered list of events (connect, send, expect, disconnect).
//! Raw event descriptions are validated once into a closed [`event::Event`]
//! union, with message names resolved against a read-only
//! [`wirescript_proto::MessageRegistry`] at construction time. The
//! [`runner::SequenceRunner`] then executes events strictly in order against
//! a [`connection::ConnectionTable`] and a [`peer::AutoResponder`], stopping
//! at the first failure. Progress is reported through an explicit
//! [`notify::ProgressSink`] passed into the runner, so this crate has zero
//! compile-time dependency on any transport layer.
//!
//! Step ordering and FIFO inbound matching are only meaningful within a
//! single logical conversation, so a runner (and its connection table) is
//! constructed fresh for each script and consumed by the run. Sharing one
//! runner across concurrent callers is not expressible.
//!
//! # Components
//!
//! - [`event`]: raw event vocabulary, typed events, validation
//! - [`connection`]: per-connection state and the connection table
//! - [`peer`]: simulated peer / auto-responder
//! - [`runner`]: fail-fast sequence execution
//! - [`notify`]: progress-notification boundary
//! - [`error`]: validation and execution error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod connection;
pub mod error;
pub mod event;
pub mod notify;
pub mod peer;
pub mod runner;

pub use error::{RunError, SequenceError, ValidationError};
pub use event::{ConnId, Event, RawEvent, build_event, build_sequence};
pub use notify::{Direction, Notification, NullSink, ProgressSink, RecordingSink};
pub use peer::{AutoResponder, LivenessResponder, ResponderConfig};
pub use runner::{RunOutcome, RunResult, SequenceRunner, run_script};
