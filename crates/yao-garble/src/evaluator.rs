use std::{collections::BTreeMap, fmt};

use futures::future::try_join_all;
use tracing::{debug, info, instrument};
use yao_common::{Rendezvous, Role};
use yao_core::Label;
use yao_garble_core::{Evaluator as GateEvaluator, GarbledCircuit};
use yao_ot::{relay::Receiver, OTReceiver};

use crate::{
    error::ErrorRepr,
    format_result, join_session,
    schedule::{run_batched, Progress},
    transfer_id, wire_tag, CircuitSource, EvaluatorError, PartyConfig, EVALUATION_TAG, GATES_TAG,
    RESULTS_TAG,
};

/// State of an [`Evaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum EvaluatorState {
    Idle,
    WaitingForPeer,
    LoadingCircuit,
    AwaitingInputs,
    Evaluating,
    AwaitingDecode,
    Done,
}

/// The evaluator party.
///
/// Evaluates the garbled circuit knowing one label per wire, and learns the
/// output bits from the garbler.
pub struct Evaluator {
    source: CircuitSource,
    input: Vec<bool>,
    config: PartyConfig,
    progress: Option<Progress>,
    state: EvaluatorState,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Creates a new evaluator.
    ///
    /// # Arguments
    ///
    /// * `source` - The circuit.
    /// * `input` - Bits of the evaluator's input wires, in circuit order.
    /// * `config` - Party configuration.
    pub fn new(source: impl Into<CircuitSource>, input: Vec<bool>, config: PartyConfig) -> Self {
        Self {
            source: source.into(),
            input,
            config,
            progress: None,
            state: EvaluatorState::Idle,
        }
    }

    /// Sets a hook which is called with `(evaluated gates, total gates)`
    /// after each batch.
    pub fn with_progress(mut self, progress: impl FnMut(usize, usize) + Send + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    fn transition(&mut self, next: EvaluatorState) {
        debug!(from = ?self.state, to = ?next, "evaluator state");
        self.state = next;
    }

    /// Runs the protocol, returning the output bits as a string.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn run(&mut self, transport: &Rendezvous) -> Result<String, EvaluatorError> {
        if self.state != EvaluatorState::Idle {
            return Err(ErrorRepr::State(format!("evaluator is {:?}", self.state)).into());
        }

        self.transition(EvaluatorState::WaitingForPeer);
        join_session(transport, Role::Evaluator).await?;

        self.transition(EvaluatorState::LoadingCircuit);
        let circ = self.source.load()?;
        if self.input.len() != circ.evaluator_inputs().len() {
            return Err(ErrorRepr::InputLength {
                expected: circ.evaluator_inputs().len(),
                actual: self.input.len(),
            }
            .into());
        }

        self.transition(EvaluatorState::AwaitingInputs);
        let receiver = Receiver::new(transport.clone());
        let (table, direct, oblivious) = futures::try_join!(
            async {
                let table: GarbledCircuit = transport.fetch(GATES_TAG).await?;
                Ok::<_, EvaluatorError>(table)
            },
            try_join_all(circ.garbler_inputs().iter().map(|wire| async move {
                let label: Label = transport.fetch(&wire_tag(*wire)).await?;
                Ok::<_, EvaluatorError>((*wire, label))
            })),
            try_join_all(
                circ.evaluator_inputs()
                    .iter()
                    .zip(&self.input)
                    .map(|(wire, bit)| {
                        let receiver = &receiver;
                        async move {
                            let output = receiver.receive_ot(transfer_id(*wire), *bit).await?;
                            Ok::<_, EvaluatorError>((*wire, output.msg))
                        }
                    })
            ),
        )?;
        debug!(gates = table.gates.len(), "received inputs");

        self.transition(EvaluatorState::Evaluating);
        let mut evaluator = GateEvaluator::new(&circ, direct.into_iter().chain(oblivious))?;
        run_batched(
            circ.gates().len(),
            &self.config,
            &mut self.progress,
            |range| evaluator.evaluate(range, &table.gates),
        )
        .await?;
        let outputs: BTreeMap<usize, Label> = evaluator.outputs()?;

        self.transition(EvaluatorState::AwaitingDecode);
        transport.publish(EVALUATION_TAG, &outputs).await?;
        let bits: Vec<bool> = transport.fetch(RESULTS_TAG).await?;
        if bits.len() != circ.outputs().len() {
            return Err(ErrorRepr::ResultLength {
                expected: circ.outputs().len(),
                actual: bits.len(),
            }
            .into());
        }

        let result = format_result(&circ, &bits);
        info!(%result, "evaluator done");
        self.transition(EvaluatorState::Done);

        Ok(result)
    }
}
