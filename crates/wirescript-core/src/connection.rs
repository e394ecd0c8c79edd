//! Per-connection state and the connection table.
//!
//! The table owns every [`Connection`] record for the lifetime of one runner.
//! There is no implicit creation: every id must pass through
//! [`ConnectionTable::open`] before send, expect, or close may reference it,
//! and tearing down a connection that does not exist is an error. Those two
//! rules model the protocol's lifecycle invariant and protect scripts from
//! silently clobbering state.

use std::collections::{HashMap, VecDeque, hash_map::Entry};

use wirescript_proto::WireMessage;

use crate::{error::RunError, event::ConnId};

/// Lifecycle state of a simulated connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Opened by a connect event and usable.
    Open,
    /// Explicitly closed; any further use is an error.
    Closed,
}

/// A simulated logical channel, independent of real network sockets.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnId,
    state: ConnectionState,
    inbound: VecDeque<WireMessage>,
}

impl Connection {
    fn new(id: ConnId) -> Self {
        Self { id, state: ConnectionState::Open, inbound: VecDeque::new() }
    }

    /// Connection identity token.
    pub fn id(&self) -> &ConnId {
        &self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Append a synthesized inbound message, preserving generation order.
    pub fn push_inbound(&mut self, message: WireMessage) {
        self.inbound.push_back(message);
    }

    /// Consume the oldest queued inbound message.
    pub fn pop_inbound(&mut self) -> Option<WireMessage> {
        self.inbound.pop_front()
    }

    /// Number of queued inbound messages.
    pub fn queued(&self) -> usize {
        self.inbound.len()
    }
}

/// Maps connection ids to connection state for one run.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    connections: HashMap<ConnId, Connection>,
}

impl ConnectionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a connection under `id`.
    ///
    /// An id may be reused after its prior connection was explicitly closed;
    /// the new connection starts fresh with an empty inbound queue.
    ///
    /// # Errors
    ///
    /// [`RunError::AlreadyOpen`] if a connection with this id is open.
    pub fn open(&mut self, id: &ConnId) -> Result<(), RunError> {
        match self.connections.entry(id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().state == ConnectionState::Open {
                    return Err(RunError::AlreadyOpen(id.clone()));
                }
                entry.insert(Connection::new(id.clone()));
                Ok(())
            },
            Entry::Vacant(entry) => {
                entry.insert(Connection::new(id.clone()));
                Ok(())
            },
        }
    }

    /// Close the open connection under `id`.
    ///
    /// # Errors
    ///
    /// [`RunError::NotOpen`] if the id was never opened or already closed.
    pub fn close(&mut self, id: &ConnId) -> Result<(), RunError> {
        match self.connections.get_mut(id) {
            Some(conn) if conn.state == ConnectionState::Open => {
                conn.state = ConnectionState::Closed;
                Ok(())
            },
            _ => Err(RunError::NotOpen(id.clone())),
        }
    }

    /// Borrow the open connection under `id` mutably.
    ///
    /// # Errors
    ///
    /// [`RunError::NotOpen`] if the id was never opened or already closed.
    pub fn get_mut(&mut self, id: &ConnId) -> Result<&mut Connection, RunError> {
        match self.connections.get_mut(id) {
            Some(conn) if conn.state == ConnectionState::Open => Ok(conn),
            _ => Err(RunError::NotOpen(id.clone())),
        }
    }
}
