//! Fail-fast sequence execution.
//!
//! The runner executes validated events strictly left-to-right against its
//! own connection table and simulated peer. Execution stops at the first
//! failing step; prior steps' side effects (opened connections, queued
//! messages) are left as-is, modeling a real conversation rather than a
//! transaction.
//!
//! A runner is built fresh for each script and consumed by [`SequenceRunner::run`].
//! This is a required invariant, not an optimization: step ordering and FIFO
//! inbound matching are only meaningful within one logical conversation, so
//! sharing a runner between scripts would corrupt the matching rules.

use tracing::debug;
use wirescript_proto::{MessageRegistry, WireMessage};

use crate::{
    connection::ConnectionTable,
    error::{RunError, SequenceError},
    event::{Event, RawEvent, build_sequence},
    notify::{Direction, Notification, ProgressSink, unix_millis},
    peer::{AutoResponder, LivenessResponder},
};

/// Terminal outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every step executed and every expectation held.
    Success,
    /// Execution stopped at `step`; earlier steps had already taken effect.
    FailureAt {
        /// Zero-based index of the failing step.
        step: usize,
        /// Why the step failed.
        error: RunError,
    },
}

impl RunOutcome {
    /// True for [`RunOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of one run: how far it got, and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Number of steps that completed successfully.
    pub steps_completed: usize,
    /// Terminal outcome.
    pub outcome: RunOutcome,
}

/// Executes one script against a fresh connection table and simulated peer.
///
/// Borrows the shared read-only registry; owns everything else. [`Self::run`]
/// consumes the runner, so reuse across scripts is a compile error.
pub struct SequenceRunner<'r> {
    registry: &'r MessageRegistry,
    table: ConnectionTable,
    responder: Box<dyn AutoResponder>,
}

impl<'r> SequenceRunner<'r> {
    /// Runner with the default liveness responder.
    pub fn new(registry: &'r MessageRegistry) -> Self {
        Self::with_responder(registry, Box::new(LivenessResponder::default()))
    }

    /// Runner with a custom auto-responder.
    pub fn with_responder(registry: &'r MessageRegistry, responder: Box<dyn AutoResponder>) -> Self {
        Self { registry, table: ConnectionTable::new(), responder }
    }

    /// Execute `events` in order, reporting progress to `sink`.
    ///
    /// One notification per completed step, then exactly one terminal
    /// [`ProgressSink::finished`] call, on success and failure alike.
    pub fn run(mut self, events: &[Event], sink: &mut dyn ProgressSink) -> RunResult {
        for (step, event) in events.iter().enumerate() {
            debug!(step, kind = event.kind(), conn = %event.conn(), "executing step");
            match self.execute(event) {
                Ok(notification) => sink.step(notification),
                Err(error) => {
                    debug!(step, %error, "run failed");
                    let outcome = RunOutcome::FailureAt { step, error };
                    sink.finished(&outcome);
                    return RunResult { steps_completed: step, outcome };
                },
            }
        }

        let outcome = RunOutcome::Success;
        sink.finished(&outcome);
        RunResult { steps_completed: events.len(), outcome }
    }

    fn execute(&mut self, event: &Event) -> Result<Notification, RunError> {
        match event {
            Event::Connect { conn } => {
                self.table.open(conn)?;
                Ok(self.notification(Direction::Connect, conn.as_str(), None, None))
            },

            Event::Send { conn, desc, values } => {
                self.table.get_mut(conn)?;
                let payload = desc.encode(values)?;
                let message = WireMessage::new(desc.code, payload);

                let replies = self.responder.on_outbound(desc, values, self.registry);
                let connection = self.table.get_mut(conn)?;
                for reply in replies {
                    connection.push_inbound(reply);
                }

                let hex_form = hex::encode(message.to_bytes());
                Ok(self.notification(
                    Direction::Out,
                    conn.as_str(),
                    Some(desc.name.clone()),
                    Some(hex_form),
                ))
            },

            Event::Expect { conn, desc, constraints } => {
                let connection = self.table.get_mut(conn)?;
                let Some(message) = connection.pop_inbound() else {
                    return Err(RunError::UnmetExpectation {
                        expected: desc.name.clone(),
                        actual: None,
                    });
                };

                if message.code != desc.code {
                    let actual = self
                        .registry
                        .lookup_code(message.code)
                        .map_or_else(|| format!("code {}", message.code), |d| d.name.clone());
                    return Err(RunError::UnmetExpectation {
                        expected: desc.name.clone(),
                        actual: Some(actual),
                    });
                }

                let fields = desc.decode(&message.payload)?;
                for (name, expected) in constraints {
                    let actual = fields.get(name);
                    if actual != Some(expected) {
                        return Err(RunError::FieldMismatch {
                            field: name.clone(),
                            expected: expected.clone(),
                            actual: actual.cloned(),
                        });
                    }
                }

                let hex_form = hex::encode(message.to_bytes());
                Ok(self.notification(
                    Direction::In,
                    conn.as_str(),
                    Some(desc.name.clone()),
                    Some(hex_form),
                ))
            },

            Event::Disconnect { conn } => {
                self.table.close(conn)?;
                Ok(self.notification(Direction::Disconnect, conn.as_str(), None, None))
            },
        }
    }

    fn notification(
        &self,
        direction: Direction,
        conn: &str,
        msg_name: Option<String>,
        payload: Option<String>,
    ) -> Notification {
        Notification {
            direction,
            connprivkey: conn.to_string(),
            msg_name,
            payload,
            timestamp_ms: unix_millis(),
        }
    }
}

/// Submit-sequence boundary: validate raw events, then run them.
///
/// Builds one fresh runner per call. Validation failures mean the run never
/// started: no notifications are emitted and no side effects occur.
///
/// # Errors
///
/// [`SequenceError::Empty`] or [`SequenceError::Invalid`] from validation.
pub fn run_script(
    registry: &MessageRegistry,
    raws: &[RawEvent],
    sink: &mut dyn ProgressSink,
) -> Result<RunResult, SequenceError> {
    let events = build_sequence(raws, registry)?;
    Ok(SequenceRunner::new(registry).run(&events, sink))
}
