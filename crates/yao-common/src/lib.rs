//! Common functionality shared by the parties and the relay.
//!
//! This crate provides the relay wire protocol, framed I/O and the
//! [`Rendezvous`](rendezvous::Rendezvous) client used by both parties.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod future;
pub mod io;
pub mod msgs;
pub mod rendezvous;

pub use msgs::{Event, EventKind, JoinRequest, OtRandomness, Role};
pub use rendezvous::{Rendezvous, TransportError};
