//! Garbler and evaluator parties of a two-party garbled circuit session.
//!
//! Both parties connect to a relay with a [`Rendezvous`], load the same
//! circuit and exchange labels through mailbox tags:
//!
//! | tag | from | value |
//! |-----|------|-------|
//! | `Wire{j}` | garbler | active label of garbler input wire `j` |
//! | `ot/Wire{j}` | both | OT transfer of evaluator input wire `j` |
//! | `gates` | garbler | garbled table |
//! | `evaluation` | evaluator | active labels of the output wires |
//! | `results` | garbler | decoded output bits |

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod evaluator;
mod garbler;
mod schedule;

use std::{path::PathBuf, sync::Arc};

use futures::future::select_all;
use tracing::debug;
use yao_circuits::{Circuit, ParseError};
use yao_common::{Event, EventKind, JoinRequest, Rendezvous, Role, TransportError};

pub use config::{PartyConfig, PartyConfigBuilder, PartyConfigBuilderError};
pub use error::{EvaluatorError, GarblerError};
pub use evaluator::{Evaluator, EvaluatorState};
pub use garbler::{Garbler, GarblerState};
pub use schedule::Progress;

use error::ErrorRepr;

/// Tag of the garbled table.
pub const GATES_TAG: &str = "gates";
/// Tag of the evaluator's output labels.
pub const EVALUATION_TAG: &str = "evaluation";
/// Tag of the decoded output bits.
pub const RESULTS_TAG: &str = "results";
/// Name of the circuit family whose output bits are reported in reverse.
pub const REVERSED_OUTPUT_CIRCUIT: &str = "aes128";

/// Tag of the garbler's label for input wire `wire`.
pub fn wire_tag(wire: usize) -> String {
    format!("Wire{wire}")
}

/// Transfer id of the OT for evaluator input wire `wire`.
pub fn transfer_id(wire: usize) -> yao_ot::TransferId {
    yao_ot::TransferId::new(format!("ot/{}", wire_tag(wire)))
}

/// Formats decoded output bits as a string of `0` and `1`.
///
/// The bits of [`REVERSED_OUTPUT_CIRCUIT`] are reversed.
pub fn format_result(circ: &Circuit, bits: &[bool]) -> String {
    let digit = |bit: &bool| if *bit { '1' } else { '0' };
    if circ.name() == Some(REVERSED_OUTPUT_CIRCUIT) {
        bits.iter().rev().map(digit).collect()
    } else {
        bits.iter().map(digit).collect()
    }
}

/// Where a party gets its circuit from.
#[derive(Debug, Clone)]
pub enum CircuitSource {
    /// A Bristol file, loaded once the peer has joined.
    File(PathBuf),
    /// An already parsed circuit.
    Parsed(Arc<Circuit>),
}

impl CircuitSource {
    fn load(&self) -> Result<Arc<Circuit>, ParseError> {
        match self {
            CircuitSource::File(path) => Circuit::load(path).map(Arc::new),
            CircuitSource::Parsed(circ) => Ok(circ.clone()),
        }
    }
}

impl From<PathBuf> for CircuitSource {
    fn from(path: PathBuf) -> Self {
        CircuitSource::File(path)
    }
}

impl From<&str> for CircuitSource {
    fn from(path: &str) -> Self {
        CircuitSource::File(path.into())
    }
}

impl From<Circuit> for CircuitSource {
    fn from(circ: Circuit) -> Self {
        CircuitSource::Parsed(Arc::new(circ))
    }
}

impl From<Arc<Circuit>> for CircuitSource {
    fn from(circ: Arc<Circuit>) -> Self {
        CircuitSource::Parsed(circ)
    }
}

/// Joins the session as `role` and waits until the peer has joined.
async fn join_session(transport: &Rendezvous, role: Role) -> Result<(), ErrorRepr> {
    let events = [EventKind::Go, EventKind::Shutdown, EventKind::Rejected]
        .map(|kind| transport.wait_for(kind));
    transport.join(JoinRequest::Role(role)).await?;

    let (event, _, _) = select_all(events).await;
    match event.map_err(TransportError::from)? {
        Event::Go => {
            debug!(%role, "peer joined");
            Ok(())
        }
        Event::Shutdown(reason) => Err(ErrorRepr::Shutdown(reason)),
        Event::Rejected(reason) => Err(ErrorRepr::Rejected(reason)),
        event => Err(ErrorRepr::State(format!("unexpected event {event:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AND: &str = "1 3\n1 1 1\n\n2 1 0 1 2 AND\n";

    #[test]
    fn test_tags() {
        assert_eq!(wire_tag(3), "Wire3");
        assert_eq!(transfer_id(3).as_str(), "ot/Wire3");
    }

    #[test]
    fn test_format_result() {
        let plain = Circuit::parse_str(Some("adder2".to_string()), AND).unwrap();
        let reversed =
            Circuit::parse_str(Some(REVERSED_OUTPUT_CIRCUIT.to_string()), AND).unwrap();
        let bits = [true, true, false];

        assert_eq!(format_result(&plain, &bits), "110");
        assert_eq!(format_result(&reversed, &bits), "011");
    }

    #[test]
    fn test_load_missing_file() {
        let source = CircuitSource::from("circuits/does-not-exist.txt");
        assert!(source.load().is_err());
    }
}
