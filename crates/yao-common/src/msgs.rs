//! Messages exchanged between parties and the relay.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque mailbox value.
///
/// The relay stores and forwards values without interpreting them.
pub type Payload = Vec<u8>;

/// Role of a party in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Role {
    Garbler,
    Evaluator,
}

impl Role {
    /// Returns the role of the other party.
    pub fn peer(&self) -> Role {
        match self {
            Role::Garbler => Role::Evaluator,
            Role::Evaluator => Role::Garbler,
        }
    }

    /// Returns the index of the role, `0` for the garbler.
    pub fn index(&self) -> usize {
        match self {
            Role::Garbler => 0,
            Role::Evaluator => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Garbler => write!(f, "garbler"),
            Role::Evaluator => write!(f, "evaluator"),
        }
    }
}

/// A join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinRequest {
    /// Join with a specific role.
    Role(Role),
    /// Join with whichever role is free, preferring the garbler.
    Any,
    /// The garbler is done and vacates its slot.
    Finish,
}

/// OT randomness handed out by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtRandomness {
    /// Both pads, for the sender.
    Sender {
        /// Pads `r0` and `r1`.
        pads: [Payload; 2],
    },
    /// A random choice bit `d` and the pad `r_d`, for the receiver.
    Receiver {
        /// Random choice bit.
        choice: bool,
        /// Pad selected by `choice`.
        pad: Payload,
    },
}

/// A message sent by a party to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Requests a role.
    Join(JoinRequest),
    /// Publishes a value under a tag in the peer's mailbox.
    Send {
        /// Mailbox tag.
        tag: String,
        /// Encoded value.
        value: Payload,
    },
    /// Requests the value stored under a tag in the party's own mailbox.
    ListeningFor {
        /// Mailbox tag.
        tag: String,
    },
    /// Requests OT randomness.
    Oblv {
        /// Transfer id shared by both parties.
        msg_id: String,
        /// Length of each pad in bytes.
        length: usize,
    },
}

/// A message sent by the relay to a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Announces the role assigned to the party.
    Whoami(Role),
    /// Both roles are filled.
    Go,
    /// The relay is shutting down.
    Shutdown {
        /// Reason for the shutdown.
        reason: String,
    },
    /// A join request was refused.
    Rejected {
        /// Reason for the refusal.
        reason: String,
    },
    /// Delivers a mailbox value.
    Deliver {
        /// Mailbox tag.
        tag: String,
        /// Encoded value.
        value: Payload,
    },
    /// Delivers OT randomness.
    Oblv {
        /// Transfer id.
        msg_id: String,
        /// Randomness for the requesting party.
        randomness: OtRandomness,
    },
}

/// Kind of a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EventKind {
    Whoami,
    Go,
    Shutdown,
    Rejected,
}

/// A session event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Event {
    Whoami(Role),
    Go,
    Shutdown(String),
    Rejected(String),
}

impl Event {
    /// Returns the kind of the event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Whoami(_) => EventKind::Whoami,
            Event::Go => EventKind::Go,
            Event::Shutdown(_) => EventKind::Shutdown,
            Event::Rejected(_) => EventKind::Rejected,
        }
    }
}
