#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid regular expression `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("group name must not be empty")]
    EmptyGroupName,
    #[error("invalid monitoring state `{0}`: expected 0 (OK), 1 (WARN), 2 (CRIT) or 3 (UNKNOWN)")]
    InvalidState(u8),
    #[error("state `{status}` is mapped to both {first} and {second}")]
    AmbiguousStateMapping {
        status: String,
        first: u8,
        second: u8,
    },
    #[error(
        "combination of operational state `{oper}` and admin state `{admin}` is mapped to both {first} and {second}"
    )]
    AmbiguousCombinedMapping {
        oper: String,
        admin: String,
        first: u8,
        second: u8,
    },
    #[error("invalid levels ({warn}, {crit}): {reason}")]
    InvalidLevels {
        warn: f64,
        crit: f64,
        reason: &'static str,
    },
    #[error("predictive levels configured for `{direction}`, but no predictive comparator is available")]
    PredictiveWithoutComparator { direction: String },
}

pub type Result<T> = std::result::Result<T, Error>;
