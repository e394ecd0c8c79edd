//! Progress-notification boundary.
//!
//! The runner reports each completed step and exactly one terminal outcome
//! through a [`ProgressSink`] passed in by the caller. The sink is the only
//! coupling point to the outside: a WebSocket relay, a JSON-lines writer, and
//! a test recorder all implement the same two methods, and the engine
//! compiles without knowing any of them.

use serde::Serialize;

use crate::runner::RunOutcome;

/// Which side of the conversation a step notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// A connection was opened.
    Connect,
    /// A message was encoded and sent to the simulated peer.
    Out,
    /// An expected inbound message was consumed.
    In,
    /// A connection was closed.
    Disconnect,
}

/// One per-step progress notification, emitted in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Step kind.
    pub direction: Direction,

    /// Connection the step operated on.
    pub connprivkey: String,

    /// Message type name, for send/expect steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_name: Option<String>,

    /// Hex-encoded wire form of the message, for send/expect steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Milliseconds since the Unix epoch at step completion.
    pub timestamp_ms: u64,
}

/// Observer for one run's progress.
///
/// Notifications for steps completed before a failing step are still
/// delivered; [`ProgressSink::finished`] is called exactly once per run,
/// after the last step notification.
pub trait ProgressSink {
    /// A step completed successfully.
    fn step(&mut self, notification: Notification);

    /// The run finished, successfully or not.
    fn finished(&mut self, outcome: &RunOutcome);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn step(&mut self, _notification: Notification) {}

    fn finished(&mut self, _outcome: &RunOutcome) {}
}

/// Sink that records everything, for tests and in-process callers.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Step notifications in delivery order.
    pub steps: Vec<Notification>,
    /// Terminal outcome, set exactly once when the run finishes.
    pub outcome: Option<RunOutcome>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for RecordingSink {
    fn step(&mut self, notification: Notification) {
        self.steps.push(notification);
    }

    fn finished(&mut self, outcome: &RunOutcome) {
        self.outcome = Some(outcome.clone());
    }
}

/// Wall-clock timestamp for notifications.
pub(crate) fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}
