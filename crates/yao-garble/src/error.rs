use yao_circuits::ParseError;
use yao_common::TransportError;
use yao_core::LabelError;
use yao_garble_core::{EvaluatorError as CoreEvaluatorError, GeneratorError};
use yao_ot::OTError;

/// A garbler error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct GarblerError(#[from] ErrorRepr);

/// An evaluator error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct EvaluatorError(#[from] ErrorRepr);

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorRepr {
    #[error("invalid state: {0}")]
    State(String),
    #[error("failed to load circuit: {0}")]
    Circuit(#[from] ParseError),
    #[error("expected {expected} input bits, got {actual}")]
    InputLength { expected: usize, actual: usize },
    #[error("expected {expected} result bits, got {actual}")]
    ResultLength { expected: usize, actual: usize },
    #[error("relay shut down: {0}")]
    Shutdown(String),
    #[error("relay rejected the join: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("OT error: {0}")]
    OT(#[from] OTError),
    #[error("label error: {0}")]
    Label(#[from] LabelError),
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),
    #[error("evaluator error: {0}")]
    Evaluator(#[from] CoreEvaluatorError),
}

macro_rules! impl_from {
    ($err:ident, $($source:ty),+) => {
        $(
            impl From<$source> for $err {
                fn from(err: $source) -> Self {
                    Self(ErrorRepr::from(err))
                }
            }
        )+
    };
}

impl_from!(
    GarblerError,
    ParseError,
    TransportError,
    OTError,
    LabelError,
    GeneratorError
);
impl_from!(
    EvaluatorError,
    ParseError,
    TransportError,
    OTError,
    LabelError,
    CoreEvaluatorError
);
