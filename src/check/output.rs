use std::fmt;

use crate::config::Error;

/// Monitoring state of a check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum State {
    Ok,
    Warn,
    Crit,
    Unknown,
}

impl State {
    /// The more severe state, ordered OK < WARN < UNKNOWN < CRIT.
    pub fn worst(self, other: State) -> State {
        fn severity(state: State) -> u8 {
            match state {
                State::Ok => 0,
                State::Warn => 1,
                State::Unknown => 2,
                State::Crit => 3,
            }
        }
        if severity(other) > severity(self) {
            other
        } else {
            self
        }
    }
}

impl TryFrom<u8> for State {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(State::Ok),
            1 => Ok(State::Warn),
            2 => Ok(State::Crit),
            3 => Ok(State::Unknown),
            other => Err(Error::InvalidState(other)),
        }
    }
}

impl From<State> for u8 {
    fn from(state: State) -> Self {
        match state {
            State::Ok => 0,
            State::Warn => 1,
            State::Crit => 2,
            State::Unknown => 3,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Ok => "OK",
            State::Warn => "WARN",
            State::Crit => "CRIT",
            State::Unknown => "UNKNOWN",
        })
    }
}

/// Where a result text is shown: in the one-line summary or only in the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Summary,
    Notice,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CheckResult {
    pub state: State,
    pub text: String,
    pub severity: Severity,
}

impl CheckResult {
    pub fn summary(state: State, text: impl Into<String>) -> Self {
        Self {
            state,
            text: text.into(),
            severity: Severity::Summary,
        }
    }

    pub fn notice(state: State, text: impl Into<String>) -> Self {
        Self {
            state,
            text: text.into(),
            severity: Severity::Notice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_boundary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_boundary: Option<f64>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            warn: None,
            crit: None,
            lower_boundary: None,
            upper_boundary: None,
        }
    }

    pub fn with_levels(mut self, levels: Option<(f64, f64)>) -> Self {
        (self.warn, self.crit) = levels.unzip();
        self
    }

    pub fn with_boundaries(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower_boundary = lower;
        self.upper_boundary = upper;
        self
    }
}

/// One entry of a check's output, in emission order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckEntry {
    Result(CheckResult),
    Metric(Metric),
}

impl CheckEntry {
    pub fn as_result(&self) -> Option<&CheckResult> {
        match self {
            CheckEntry::Result(result) => Some(result),
            CheckEntry::Metric(_) => None,
        }
    }

    pub fn as_metric(&self) -> Option<&Metric> {
        match self {
            CheckEntry::Metric(metric) => Some(metric),
            CheckEntry::Result(_) => None,
        }
    }
}

impl From<CheckResult> for CheckEntry {
    fn from(result: CheckResult) -> Self {
        CheckEntry::Result(result)
    }
}

impl From<Metric> for CheckEntry {
    fn from(metric: Metric) -> Self {
        CheckEntry::Metric(metric)
    }
}

/// Worst state over all results of `entries`, OK if there are none.
pub fn worst_state<'a>(entries: impl IntoIterator<Item = &'a CheckEntry>) -> State {
    entries
        .into_iter()
        .filter_map(CheckEntry::as_result)
        .fold(State::Ok, |worst, result| worst.worst(result.state))
}
