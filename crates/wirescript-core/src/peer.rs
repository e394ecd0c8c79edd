//! Simulated peer / auto-responder.
//!
//! The peer is a stand-in for a real remote protocol participant: it watches
//! outbound messages and fabricates plausible inbound replies so that
//! "send X, expect Y" scripts resolve without a second protocol stack. It is
//! deliberately a best-effort simulation, not a protocol oracle; the one rule
//! it must get right is the message-type tag of each reply, because that is
//! what expectation matching keys on.

use tracing::{debug, warn};
use wirescript_proto::{FieldMap, FieldValue, MessageDescriptor, MessageRegistry, WireMessage};

/// Decides whether and how to fabricate inbound replies.
///
/// Pluggable so suppression thresholds and reply sizing can follow whichever
/// protocol revision a test targets.
pub trait AutoResponder {
    /// React to an outbound message.
    ///
    /// Returned messages are queued onto the sending connection's inbound
    /// queue in order. Infallible: a responder that cannot build a reply
    /// synthesizes nothing rather than failing the step.
    fn on_outbound(
        &self,
        desc: &MessageDescriptor,
        values: &FieldMap,
        registry: &MessageRegistry,
    ) -> Vec<WireMessage>;
}

/// Configuration for the default liveness responder.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// Reply-suppression ceiling for the liveness probe's byte count.
    ///
    /// A probe requesting this many reply bytes or more gets no reply; the
    /// protocol defines that as "do not reply" to discourage abuse.
    pub pong_ceiling: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self { pong_ceiling: 65532 }
    }
}

/// Default responder: answers liveness probes, ignores everything else.
#[derive(Debug, Clone, Default)]
pub struct LivenessResponder {
    config: ResponderConfig,
}

impl LivenessResponder {
    /// Responder with a custom configuration.
    pub fn new(config: ResponderConfig) -> Self {
        Self { config }
    }
}

impl AutoResponder for LivenessResponder {
    fn on_outbound(
        &self,
        desc: &MessageDescriptor,
        values: &FieldMap,
        registry: &MessageRegistry,
    ) -> Vec<WireMessage> {
        if desc.name != "ping" {
            return Vec::new();
        }

        let requested = match values.get("num_pong_bytes") {
            Some(FieldValue::Uint(n)) => *n,
            _ => 0,
        };
        if requested >= self.config.pong_ceiling {
            debug!(requested, ceiling = self.config.pong_ceiling, "suppressing liveness reply");
            return Vec::new();
        }

        let Some(pong) = registry.lookup("pong") else {
            warn!("registry has no 'pong' message; liveness probe goes unanswered");
            return Vec::new();
        };

        let mut reply = FieldMap::new();
        reply.insert("byteslen".into(), FieldValue::Uint(requested));
        reply.insert("ignored".into(), FieldValue::Bytes(vec![0; requested as usize]));

        match pong.encode(&reply) {
            Ok(payload) => vec![WireMessage::new(pong.code, payload)],
            Err(error) => {
                warn!(%error, "failed to encode liveness reply; synthesizing nothing");
                Vec::new()
            },
        }
    }
}
