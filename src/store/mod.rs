//! Persistent samples and the rate calculation built on top of them.
//!
//! A [`ValueStore`] maps string keys to the last `(timestamp, value)` pair seen for that
//! key. It is loaded once at the start of a host check cycle, mutated in place while the
//! items of that host are checked and persisted once at the end (see
//! [`persistence`](crate::persistence)).
//!
//! The store performs unconditional read-modify-write on every access and has no
//! locking. Two checks running concurrently against the same store are not supported;
//! the caller has to serialize them.
use std::collections::BTreeMap;

mod error;

pub use error::{RateError, Result};

/// A stored observation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Sample {
    pub timestamp: f64,
    pub value: f64,
}

impl From<(f64, f64)> for Sample {
    fn from((timestamp, value): (f64, f64)) -> Self {
        Self { timestamp, value }
    }
}

impl From<Sample> for (f64, f64) {
    fn from(sample: Sample) -> Self {
        (sample.timestamp, sample.value)
    }
}

/// Outcome of a successful [`ValueStore::rate`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateOutcome {
    /// Per-second rate since the previous sample.
    Rate(f64),
    /// First observation for this key. The sample was stored, no rate exists yet.
    Pending,
}

impl RateOutcome {
    pub fn rate(self) -> Option<f64> {
        match self {
            RateOutcome::Rate(rate) => Some(rate),
            RateOutcome::Pending => None,
        }
    }
}

/// Key/sample map of one check item.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ValueStore {
    samples: BTreeMap<String, Sample>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Sample> {
        self.samples.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, sample: Sample) -> Option<Sample> {
        self.samples.insert(key.into(), sample)
    }

    pub fn remove(&mut self, key: &str) -> Option<Sample> {
        self.samples.remove(key)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    /// Computes the per-second rate of a monotonically increasing counter.
    ///
    /// The new sample always replaces the stored one, also when an error is returned, so
    /// that the next call can compute a rate again.
    ///
    /// # Errors
    ///
    /// - [`RateError::NonMonotonicTimestamp`] if `timestamp` is not after the stored one.
    /// - [`RateError::CounterOverflow`] if `value` is smaller than the stored value.
    ///
    /// # Example
    /// ```
    /// use ifmon::store::{RateOutcome, ValueStore};
    ///
    /// let mut store = ValueStore::new();
    /// assert_eq!(store.rate("in_octets.1", 0.0, 1000.0)?, RateOutcome::Pending);
    /// assert_eq!(store.rate("in_octets.1", 5.0, 2000.0)?, RateOutcome::Rate(200.0));
    /// # Ok::<(), ifmon::store::RateError>(())
    /// ```
    pub fn rate(&mut self, key: &str, timestamp: f64, value: f64) -> Result<RateOutcome> {
        let previous = self.insert(key, Sample { timestamp, value });
        let Some(previous) = previous else {
            log::trace!(target: "rate", "initialized `{key}`");
            return Ok(RateOutcome::Pending);
        };

        let dt = timestamp - previous.timestamp;
        if dt <= 0.0 {
            log::debug!(
                target: "rate",
                "no time difference for `{key}`: {} -> {timestamp}",
                previous.timestamp
            );
            return Err(RateError::NonMonotonicTimestamp {
                key: key.to_owned(),
                previous: previous.timestamp,
                current: timestamp,
            });
        }

        let delta = value - previous.value;
        if delta < 0.0 {
            log::debug!(
                target: "rate",
                "counter `{key}` decreased: {} -> {value}",
                previous.value
            );
            return Err(RateError::CounterOverflow {
                key: key.to_owned(),
                previous: previous.value,
                current: value,
            });
        }

        Ok(RateOutcome::Rate(delta / dt))
    }
}

/// Value stores of all items of one host, keyed by item name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct HostValueStore {
    items: BTreeMap<String, ValueStore>,
}

impl HostValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, item: &str) -> Option<&ValueStore> {
        self.items.get(item)
    }

    /// Returns the store of `item`, creating an empty one on first use.
    pub fn item_mut(&mut self, item: &str) -> &mut ValueStore {
        self.items.entry(item.to_owned()).or_default()
    }

    /// Drops the stores of items not contained in `items`.
    pub fn retain_items<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::BTreeSet<&str> = items.into_iter().collect();
        self.items.retain(|item, _| keep.contains(item.as_str()));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
