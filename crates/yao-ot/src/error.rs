use yao_common::TransportError;
use yao_core::LabelError;
use yao_ot_core::OTCoreError;

/// An OT error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct OTError(#[from] ErrorRepr);

impl OTError {
    pub(crate) fn randomness(msg: impl Into<String>) -> Self {
        Self(ErrorRepr::Randomness(msg.into()))
    }

    pub(crate) fn length(msg: impl Into<String>) -> Self {
        Self(ErrorRepr::Length(msg.into()))
    }
}

#[derive(Debug, thiserror::Error)]
enum ErrorRepr {
    #[error("core error: {0}")]
    Core(#[from] OTCoreError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("label error: {0}")]
    Label(#[from] LabelError),
    #[error("unexpected randomness from relay: {0}")]
    Randomness(String),
    #[error("length error: {0}")]
    Length(String),
}

impl From<OTCoreError> for OTError {
    fn from(err: OTCoreError) -> Self {
        Self(ErrorRepr::Core(err))
    }
}

impl From<TransportError> for OTError {
    fn from(err: TransportError) -> Self {
        Self(ErrorRepr::Transport(err))
    }
}

impl From<LabelError> for OTError {
    fn from(err: LabelError) -> Self {
        Self(ErrorRepr::Label(err))
    }
}
