/// A relay error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum RelayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to load config: {0}")]
    Config(String),
    #[error("failed to set up tracing: {0}")]
    Tracing(String),
}

impl From<serde_yaml::Error> for RelayError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}
