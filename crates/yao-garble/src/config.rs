use std::time::Duration;

use derive_builder::Builder;

/// Configuration shared by the garbler and the evaluator.
#[derive(Debug, Clone, Builder)]
pub struct PartyConfig {
    /// Number of gates processed between two yields to the scheduler.
    ///
    /// `None` or `0` processes the whole circuit in one batch.
    #[builder(default, setter(strip_option))]
    batch_size: Option<usize>,
    /// Pause between two batches.
    ///
    /// A zero delay still yields to the scheduler.
    #[builder(default)]
    yield_delay: Duration,
}

impl PartyConfig {
    /// Creates a new builder.
    pub fn builder() -> PartyConfigBuilder {
        PartyConfigBuilder::default()
    }

    /// Returns the batch size, `None` if the circuit is processed at once.
    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size.filter(|size| *size > 0)
    }

    /// Returns the pause between two batches.
    pub fn yield_delay(&self) -> Duration {
        self.yield_delay
    }
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            yield_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = PartyConfig::builder()
            .batch_size(64)
            .yield_delay(Duration::from_millis(5))
            .build()
            .unwrap();

        assert_eq!(config.batch_size(), Some(64));
        assert_eq!(config.yield_delay(), Duration::from_millis(5));
    }

    #[test]
    fn test_zero_batch_size_means_whole_circuit() {
        let config = PartyConfig::builder().batch_size(0).build().unwrap();
        assert_eq!(config.batch_size(), None);

        let config = PartyConfig::default();
        assert_eq!(config.batch_size(), None);
        assert!(config.yield_delay().is_zero());
    }
}
