/// Failure computing the rate of a single counter. Only the affected key is dropped for
/// the current cycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    /// The counter decreased since the last sample (reset or wrap).
    #[error("Value overflow")]
    CounterOverflow {
        key: String,
        previous: f64,
        current: f64,
    },
    /// The new sample is not newer than the stored one.
    #[error("No time difference")]
    NonMonotonicTimestamp {
        key: String,
        previous: f64,
        current: f64,
    },
}

impl RateError {
    pub fn key(&self) -> &str {
        match self {
            RateError::CounterOverflow { key, .. } => key,
            RateError::NonMonotonicTimestamp { key, .. } => key,
        }
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
