use std::{collections::BTreeMap, fmt};

use futures::future::try_join_all;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use tracing::{debug, info, instrument};
use yao_circuits::Circuit;
use yao_common::{JoinRequest, Rendezvous, Role};
use yao_core::Label;
use yao_garble_core::{GarbledCircuit, GarbledGate, Generator, GeneratorError, WireLabels};
use yao_ot::{relay::Sender, OTSender};

use crate::{
    error::ErrorRepr,
    format_result, join_session,
    schedule::{run_batched, Progress},
    transfer_id, wire_tag, CircuitSource, GarblerError, PartyConfig, EVALUATION_TAG, GATES_TAG,
    RESULTS_TAG,
};

/// State of a [`Garbler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GarblerState {
    Idle,
    WaitingForPeer,
    LoadingCircuit,
    GeneratingLabels,
    TransferringInputs,
    Garbling,
    AwaitingEvaluation,
    Decoding,
    Done,
}

/// The garbler party.
///
/// Garbles the circuit, hands its own input labels to the evaluator and the
/// evaluator's input labels through OT, then decodes the evaluator's output
/// labels.
pub struct Garbler {
    source: CircuitSource,
    input: Vec<bool>,
    config: PartyConfig,
    progress: Option<Progress>,
    state: GarblerState,
}

impl fmt::Debug for Garbler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Garbler")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Garbler {
    /// Creates a new garbler.
    ///
    /// # Arguments
    ///
    /// * `source` - The circuit.
    /// * `input` - Bits of the garbler's input wires, in circuit order.
    /// * `config` - Party configuration.
    pub fn new(source: impl Into<CircuitSource>, input: Vec<bool>, config: PartyConfig) -> Self {
        Self {
            source: source.into(),
            input,
            config,
            progress: None,
            state: GarblerState::Idle,
        }
    }

    /// Sets a hook which is called with `(garbled gates, total gates)` after
    /// each batch.
    pub fn with_progress(mut self, progress: impl FnMut(usize, usize) + Send + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> GarblerState {
        self.state
    }

    fn transition(&mut self, next: GarblerState) {
        debug!(from = ?self.state, to = ?next, "garbler state");
        self.state = next;
    }

    /// Runs the protocol, returning the output bits as a string.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn run(&mut self, transport: &Rendezvous) -> Result<String, GarblerError> {
        if self.state != GarblerState::Idle {
            return Err(ErrorRepr::State(format!("garbler is {:?}", self.state)).into());
        }

        self.transition(GarblerState::WaitingForPeer);
        join_session(transport, Role::Garbler).await?;

        self.transition(GarblerState::LoadingCircuit);
        let circ = self.source.load()?;
        if self.input.len() != circ.garbler_inputs().len() {
            return Err(ErrorRepr::InputLength {
                expected: circ.garbler_inputs().len(),
                actual: self.input.len(),
            }
            .into());
        }

        self.transition(GarblerState::GeneratingLabels);
        let labels = WireLabels::generate(&circ, &mut ChaCha12Rng::from_entropy())?;

        self.transition(GarblerState::TransferringInputs);
        self.transfer_inputs(transport, &circ, &labels).await?;

        self.transition(GarblerState::Garbling);
        let gates = self.garble(&circ, &labels).await?;

        self.transition(GarblerState::AwaitingEvaluation);
        transport.publish(GATES_TAG, &GarbledCircuit { gates }).await?;
        let outputs: BTreeMap<usize, Label> = transport.fetch(EVALUATION_TAG).await?;

        self.transition(GarblerState::Decoding);
        let bits = labels.decode_outputs(&circ, &outputs)?;
        transport.publish(RESULTS_TAG, &bits).await?;
        transport.join(JoinRequest::Finish).await?;

        let result = format_result(&circ, &bits);
        info!(%result, "garbler done");
        self.transition(GarblerState::Done);

        Ok(result)
    }

    /// Publishes the labels of the garbler's inputs and sends the labels of
    /// the evaluator's inputs through OT.
    async fn transfer_inputs(
        &self,
        transport: &Rendezvous,
        circ: &Circuit,
        labels: &WireLabels,
    ) -> Result<(), GarblerError> {
        for (wire, bit) in circ.garbler_inputs().iter().zip(&self.input) {
            transport
                .publish(&wire_tag(*wire), &labels.label(*wire, *bit)?)
                .await?;
        }

        let sender = Sender::new(transport.clone());
        try_join_all(circ.evaluator_inputs().iter().map(|wire| {
            let sender = &sender;
            async move {
                let pair = *labels.pair(*wire)?;
                sender.send_ot(transfer_id(*wire), pair).await?;
                Ok::<_, GarblerError>(())
            }
        }))
        .await?;

        debug!(
            direct = circ.garbler_inputs().len(),
            oblivious = circ.evaluator_inputs().len(),
            "transferred input labels"
        );

        Ok(())
    }

    async fn garble(
        &mut self,
        circ: &Circuit,
        labels: &WireLabels,
    ) -> Result<Vec<GarbledGate>, GarblerError> {
        let generator = Generator::new(circ, labels);
        let mut gates = Vec::with_capacity(circ.gates().len());

        run_batched(
            circ.gates().len(),
            &self.config,
            &mut self.progress,
            |range| {
                for gate in generator.garble(range) {
                    gates.push(gate?);
                }
                Ok::<_, GeneratorError>(())
            },
        )
        .await?;

        debug!(and = circ.and_count(), xor = circ.xor_count(), "garbled circuit");

        Ok(gates)
    }
}
