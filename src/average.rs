//! Backlog-windowed exponential moving averages of rates.
//!
//! Averages live in the same [`ValueStore`] as the counter samples, under the counter key
//! suffixed with `.average`. The stored sample is `(timestamp, ema)`.
use crate::store::{Sample, ValueStore};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("cannot add averages with different backlogs ({left} min and {right} min)")]
    BacklogMismatch { left: u32, right: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// An averaged value together with the backlog it was computed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Average {
    pub value: f64,
    pub backlog_minutes: u32,
}

impl Average {
    /// Adds two averages over the same backlog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BacklogMismatch`] if the backlogs differ.
    pub fn checked_add(self, other: Average) -> Result<Average> {
        if self.backlog_minutes != other.backlog_minutes {
            return Err(Error::BacklogMismatch {
                left: self.backlog_minutes,
                right: other.backlog_minutes,
            });
        }
        Ok(Average {
            value: self.value + other.value,
            backlog_minutes: self.backlog_minutes,
        })
    }
}

/// Value store key of the average belonging to `key`.
pub fn average_key(key: &str) -> String {
    format!("{key}.average")
}

/// Updates and returns the moving average stored under `key`.
///
/// The backlog is the half-life of the average: after `backlog_minutes` the old average
/// contributes half of the new one. The first call seeds the average with `value`. A
/// call that is not newer than the stored average returns it unchanged.
///
/// # Example
/// ```
/// use ifmon::average::average;
/// use ifmon::store::ValueStore;
///
/// let mut store = ValueStore::new();
/// assert_eq!(average(&mut store, "in.average", 0.0, 100.0, 1), 100.0);
/// assert_eq!(average(&mut store, "in.average", 60.0, 200.0, 1), 150.0);
/// ```
pub fn average(
    store: &mut ValueStore,
    key: &str,
    timestamp: f64,
    value: f64,
    backlog_minutes: u32,
) -> f64 {
    let Some(previous) = store.get(key) else {
        store.insert(key, Sample { timestamp, value });
        return value;
    };

    let dt = timestamp - previous.timestamp;
    if dt <= 0.0 {
        return previous.value;
    }

    let half_life = 60.0 * f64::from(backlog_minutes.max(1));
    let weight = 0.5_f64.powf(dt / half_life);
    let ema = previous.value * weight + value * (1.0 - weight);
    store.insert(
        key,
        Sample {
            timestamp,
            value: ema,
        },
    );
    ema
}
