//! Two-party relay session.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use tokio::sync::mpsc;
use tracing::{debug, info};
use yao_common::{
    future::MaybeDone,
    msgs::{Payload, ServerMessage},
    JoinRequest, Role,
};
use yao_ot_core::PadCache;

use crate::mailbox::{Fetch, Mailbox};

/// Identifies a connection to the relay.
pub type ConnectionId = u64;

/// Queue of messages to be written to a connection.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

const ROLES: [Role; 2] = [Role::Garbler, Role::Evaluator];

/// A session error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SessionError {
    #[error("connection {0} has not joined the session")]
    NotJoined(ConnectionId),
    #[error("the {0} slot is already taken")]
    SlotTaken(Role),
    #[error("both slots are taken")]
    Full,
    #[error("connection {0} is not the garbler")]
    NotGarbler(ConnectionId),
}

/// Phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Phase {
    Empty,
    OneJoined,
    BothJoined,
}

/// A two party session.
///
/// Each role has a slot holding the connection which plays it, and a mailbox
/// holding the values its peer published for it.
#[derive(Debug)]
pub struct Session {
    slots: [Option<ConnectionId>; 2],
    mailboxes: [Mailbox; 2],
    pads: PadCache,
    connections: HashMap<ConnectionId, Outbox>,
    rng: ChaCha12Rng,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self {
            slots: [None; 2],
            mailboxes: Default::default(),
            pads: PadCache::new(),
            connections: HashMap::new(),
            rng: ChaCha12Rng::from_entropy(),
        }
    }

    /// Returns the phase of the session.
    pub fn phase(&self) -> Phase {
        match self.slots.iter().flatten().count() {
            0 => Phase::Empty,
            1 => Phase::OneJoined,
            _ => Phase::BothJoined,
        }
    }

    /// Returns the role played by a connection.
    pub fn role(&self, id: ConnectionId) -> Option<Role> {
        ROLES
            .into_iter()
            .find(|role| self.slots[role.index()] == Some(id))
    }

    /// Returns the mailbox of a role.
    pub fn mailbox(&self, role: Role) -> &Mailbox {
        &self.mailboxes[role.index()]
    }

    /// Returns the number of OT transfers waiting for their second party.
    pub fn pending_transfers(&self) -> usize {
        self.pads.len()
    }

    /// Registers a new connection.
    pub fn connect(&mut self, id: ConnectionId, outbox: Outbox) {
        self.connections.insert(id, outbox);
    }

    fn send_to(&self, id: ConnectionId, msg: ServerMessage) {
        if let Some(outbox) = self.connections.get(&id) {
            // Fails only if the connection is already going away.
            let _ = outbox.send(msg);
        }
    }

    fn role_of(&self, id: ConnectionId) -> Result<Role, SessionError> {
        self.role(id).ok_or(SessionError::NotJoined(id))
    }

    /// Assigns a role to a connection.
    ///
    /// A specific role takes that slot if it is free. Otherwise the garbler
    /// slot is preferred. `Finish` vacates the garbler slot. A connection
    /// which gets no slot is sent `Rejected`.
    pub fn join(&mut self, id: ConnectionId, request: JoinRequest) -> Result<(), SessionError> {
        let requested = match request {
            JoinRequest::Role(role) => Some(role),
            JoinRequest::Any => None,
            JoinRequest::Finish => return self.finish(id),
        };

        if let Some(role) = self.role(id) {
            debug!(id, %role, "connection already joined");
            self.send_to(id, ServerMessage::Whoami(role));
            return Ok(());
        }

        let role = match self.free_slot(requested) {
            Ok(role) => role,
            Err(err) => {
                self.send_to(
                    id,
                    ServerMessage::Rejected {
                        reason: err.to_string(),
                    },
                );
                return Err(err);
            }
        };

        let before = self.phase();
        self.slots[role.index()] = Some(id);
        info!(id, %role, "party joined");
        self.send_to(id, ServerMessage::Whoami(role));

        if before != Phase::BothJoined && self.phase() == Phase::BothJoined {
            info!("both parties joined");
            for peer in self.slots.into_iter().flatten() {
                self.send_to(peer, ServerMessage::Go);
            }
        }

        Ok(())
    }

    fn free_slot(&self, requested: Option<Role>) -> Result<Role, SessionError> {
        match requested {
            Some(role) if self.slots[role.index()].is_none() => Ok(role),
            Some(role) => Err(SessionError::SlotTaken(role)),
            None => ROLES
                .into_iter()
                .find(|role| self.slots[role.index()].is_none())
                .ok_or(SessionError::Full),
        }
    }

    fn finish(&mut self, id: ConnectionId) -> Result<(), SessionError> {
        if self.role(id) != Some(Role::Garbler) {
            return Err(SessionError::NotGarbler(id));
        }

        info!(id, "garbler finished");
        self.vacate(Role::Garbler);

        Ok(())
    }

    fn vacate(&mut self, role: Role) {
        self.slots[role.index()] = None;
        self.mailboxes[role.index()].clear();

        if self.phase() == Phase::Empty {
            debug!("session is empty, dropping OT pads");
            self.pads.clear();
        }
    }

    /// Publishes a value into the peer's mailbox.
    pub fn publish(
        &mut self,
        id: ConnectionId,
        tag: String,
        value: Payload,
    ) -> Result<(), SessionError> {
        let role = self.role_of(id)?;
        debug!(%role, %tag, len = value.len(), "publish");
        self.mailboxes[role.peer().index()].publish(tag, value);

        Ok(())
    }

    /// Fetches a value from the connection's own mailbox.
    ///
    /// A stored value is delivered right away. Otherwise the returned future
    /// resolves once the peer publishes it, and the caller is responsible for
    /// delivering it.
    pub fn listen(
        &mut self,
        id: ConnectionId,
        tag: String,
    ) -> Result<Option<MaybeDone<Payload>>, SessionError> {
        let role = self.role_of(id)?;
        debug!(%role, %tag, "listening");

        match self.mailboxes[role.index()].fetch(&tag) {
            Fetch::Ready(value) => {
                self.send_to(id, ServerMessage::Deliver { tag, value });
                Ok(None)
            }
            Fetch::Pending(recv) => Ok(Some(recv)),
        }
    }

    /// Serves OT randomness for transfer `msg_id`.
    ///
    /// The garbler is the sender and receives both pads. The evaluator
    /// receives a random choice bit and the matching pad.
    pub fn oblv(
        &mut self,
        id: ConnectionId,
        msg_id: String,
        length: usize,
    ) -> Result<(), SessionError> {
        let role = self.role_of(id)?;
        let pads = self.pads.draw(&msg_id, length, &mut self.rng);
        let randomness = match role {
            Role::Garbler => pads.sender(),
            Role::Evaluator => pads.receiver(self.rng.gen()),
        };

        debug!(%role, %msg_id, length, "serving OT randomness");
        self.send_to(id, ServerMessage::Oblv { msg_id, randomness });

        Ok(())
    }

    /// Removes a connection, vacating its slot.
    pub fn disconnect(&mut self, id: ConnectionId) {
        self.connections.remove(&id);

        if let Some(role) = self.role(id) {
            info!(id, %role, "party disconnected");
            self.vacate(role);
        }
    }

    /// Notifies every connection that the relay is shutting down and resets
    /// the session.
    pub fn shutdown(&mut self, reason: &str) {
        info!(reason, "shutting down session");
        for outbox in self.connections.values() {
            let _ = outbox.send(ServerMessage::Shutdown {
                reason: reason.to_string(),
            });
        }

        self.connections.clear();
        self.slots = [None; 2];
        self.mailboxes.iter_mut().for_each(Mailbox::clear);
        self.pads.clear();
    }
}

/// A session shared between connection tasks.
#[derive(Debug, Default)]
pub(crate) struct SharedSession(Mutex<Session>);

impl SharedSession {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
