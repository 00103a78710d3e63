use std::fmt;

/// Operational (or administrative) state of a port, keyed by its `ifOperStatus` code.
///
/// Codes outside the known range are kept verbatim in [`OperStatus::Other`] so that
/// matching conditions and state mappings can still refer to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperStatus {
    Up,
    Down,
    Testing,
    Unknown,
    Dormant,
    NotPresent,
    LowerLayerDown,
    Degraded,
    AdminDown,
    Other(String),
}

impl OperStatus {
    /// Returns the numeric code as reported by the device, e.g. `"1"` for up.
    pub fn code(&self) -> &str {
        match self {
            OperStatus::Up => "1",
            OperStatus::Down => "2",
            OperStatus::Testing => "3",
            OperStatus::Unknown => "4",
            OperStatus::Dormant => "5",
            OperStatus::NotPresent => "6",
            OperStatus::LowerLayerDown => "7",
            OperStatus::Degraded => "8",
            OperStatus::AdminDown => "9",
            OperStatus::Other(code) => code,
        }
    }

    /// Returns the human readable name, falling back to the raw code.
    pub fn name(&self) -> &str {
        match self {
            OperStatus::Up => "up",
            OperStatus::Down => "down",
            OperStatus::Testing => "testing",
            OperStatus::Unknown => "unknown",
            OperStatus::Dormant => "dormant",
            OperStatus::NotPresent => "not present",
            OperStatus::LowerLayerDown => "lower layer down",
            OperStatus::Degraded => "degraded",
            OperStatus::AdminDown => "admin down",
            OperStatus::Other(code) => code,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, OperStatus::Up)
    }

    pub fn is_down(&self) -> bool {
        matches!(self, OperStatus::Down)
    }
}

impl From<&str> for OperStatus {
    fn from(code: &str) -> Self {
        match code.trim() {
            "1" => OperStatus::Up,
            "2" => OperStatus::Down,
            "3" => OperStatus::Testing,
            "4" => OperStatus::Unknown,
            "5" => OperStatus::Dormant,
            "6" => OperStatus::NotPresent,
            "7" => OperStatus::LowerLayerDown,
            "8" => OperStatus::Degraded,
            "9" => OperStatus::AdminDown,
            other => OperStatus::Other(other.to_owned()),
        }
    }
}

impl From<String> for OperStatus {
    fn from(code: String) -> Self {
        OperStatus::from(code.as_str())
    }
}

impl From<OperStatus> for String {
    fn from(status: OperStatus) -> Self {
        match status {
            OperStatus::Other(code) => code,
            known => known.code().to_owned(),
        }
    }
}

impl fmt::Display for OperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
