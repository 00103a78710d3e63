//! Common interface record shared by every data source.
//!
//! Parsers of device output (SNMP tables, agent sections, `/proc/net/dev`, ...) produce
//! one [`Interface`] per physical port and cycle. The engine treats these records as
//! read-only input; only the [`cluster`](crate::cluster) reduction attaches the source
//! node to them.
//!
//! # Key Components
//!
//! - [`Attributes`]: identity and static properties of a port (index, names, speed, states).
//! - [`Counters`]: raw monotonically increasing counters.
//! - [`Rates`]: per-second rates, either computed by the engine or pre-computed by a parser.
//! - [`Traffic`]: what a record carries: counters or rates.
use std::fmt;
use std::str::FromStr;

mod counters;
mod error;
mod status;

pub use counters::{CounterKind, Counters, Rates};
pub use error::{Error, Result};
pub use status::OperStatus;

/// Speeds above this are reported by some TP-Link firmwares in units of 10 kbit/s.
const BOGUS_SPEED_THRESHOLD: f64 = 9.0 * 1000.0 * 1000.0 * 1000.0 * 1000.0;

/// Placeholder for the node part of value store keys on non-clustered hosts.
const NO_NODE: &str = "None";

/// Hardware (MAC) address of a port.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhysAddress(Vec<u8>);

impl PhysAddress {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for PhysAddress {
    type Err = Error;

    /// Parses colon separated hex bytes, e.g. `64:5d:86:e4:50:2f`. An empty string is
    /// an empty address.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split(':')
            .map(|byte| u8::from_str_radix(byte, 16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| Error::InvalidPhysAddress(s.to_owned()))
    }
}

impl TryFrom<String> for PhysAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PhysAddress> for String {
    fn from(value: PhysAddress) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PhysAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Identity and static properties of a single port.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "AttributesRecord")]
pub struct Attributes {
    /// Stable, device assigned port id.
    pub index: String,
    pub descr: String,
    pub alias: String,
    /// Port type code (`ifType`), e.g. `6` for ethernet. May be empty.
    #[serde(rename = "type")]
    pub port_type: String,
    /// Link speed in bits per second, `0` if unknown.
    pub speed: f64,
    pub oper_status: OperStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_status: Option<OperStatus>,
    #[serde(skip_serializing_if = "PhysAddress::is_empty")]
    pub phys_address: PhysAddress,
    /// Length of the output packet queue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_qlen: Option<f64>,
    /// Textual speed, shown when no numeric speed is known.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub speed_as_text: String,
    /// Group tag set by the data source itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Cluster node this record was observed on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<String>,
}

#[derive(serde::Deserialize)]
struct AttributesRecord {
    index: String,
    #[serde(default)]
    descr: String,
    #[serde(default)]
    alias: String,
    #[serde(rename = "type", default)]
    port_type: String,
    #[serde(default)]
    speed: f64,
    oper_status: OperStatus,
    #[serde(default)]
    admin_status: Option<OperStatus>,
    #[serde(default)]
    phys_address: PhysAddress,
    #[serde(default)]
    out_qlen: Option<f64>,
    #[serde(default)]
    speed_as_text: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    node: Option<String>,
    #[serde(default)]
    extra_info: Option<String>,
}

impl TryFrom<AttributesRecord> for Attributes {
    type Error = Error;

    fn try_from(record: AttributesRecord) -> Result<Self> {
        let mut attributes = Attributes::new(
            record.index,
            record.descr,
            record.alias,
            record.oper_status,
        )?;
        attributes.port_type = record.port_type;
        attributes.speed = record.speed;
        attributes.admin_status = record.admin_status;
        attributes.phys_address = record.phys_address;
        attributes.out_qlen = record.out_qlen;
        attributes.speed_as_text = record.speed_as_text;
        attributes.group = record.group;
        attributes.node = record.node;
        attributes.extra_info = record.extra_info;
        attributes.finalize();
        Ok(attributes)
    }
}

impl Attributes {
    /// Creates the attributes of a port with unknown type and speed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyIndex`] if `index` is empty.
    pub fn new(
        index: impl Into<String>,
        descr: impl Into<String>,
        alias: impl Into<String>,
        oper_status: OperStatus,
    ) -> Result<Self> {
        let index = index.into();
        let descr = descr.into();
        if index.trim().is_empty() {
            return Err(Error::EmptyIndex { descr });
        }
        let mut attributes = Self {
            index,
            descr,
            alias: alias.into(),
            port_type: String::new(),
            speed: 0.0,
            oper_status,
            admin_status: None,
            phys_address: PhysAddress::default(),
            out_qlen: None,
            speed_as_text: String::new(),
            group: None,
            node: None,
            extra_info: None,
        };
        attributes.finalize();
        Ok(attributes)
    }

    pub fn with_port_type(mut self, port_type: impl Into<String>) -> Self {
        self.port_type = port_type.into();
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self.finalize();
        self
    }

    pub fn with_admin_status(mut self, admin_status: OperStatus) -> Self {
        self.admin_status = Some(admin_status);
        self
    }

    pub fn with_phys_address(mut self, phys_address: PhysAddress) -> Self {
        self.phys_address = phys_address;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_out_qlen(mut self, out_qlen: f64) -> Self {
        self.out_qlen = Some(out_qlen);
        self
    }

    /// Normalizes names and works around known firmware bugs.
    fn finalize(&mut self) {
        if self.speed > BOGUS_SPEED_THRESHOLD {
            self.speed /= 10000.0;
        }
        self.descr = cleanup_if_string(&self.descr);
        self.alias = cleanup_if_string(&self.alias);
    }

    pub fn is_up(&self) -> bool {
        self.oper_status.is_up()
    }

    /// Identity used in value store keys: `index.descr.alias.node`.
    pub fn id_for_value_store(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.index,
            self.descr,
            self.alias,
            self.node.as_deref().unwrap_or(NO_NODE)
        )
    }
}

// Some devices report names as hex strings with trailing NUL bytes.
fn cleanup_if_string(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '\0')
        .collect::<String>()
        .trim()
        .replace('\n', " ")
}

/// What an interface record carries for this cycle.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traffic {
    /// Raw counters; the engine derives rates via the value store.
    Counters(Counters),
    /// Rates already computed by the data source; no value store access happens.
    Rates(Rates),
}

impl Default for Traffic {
    fn default() -> Self {
        Traffic::Counters(Counters::default())
    }
}

/// One interface as observed in one check cycle.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interface {
    pub attributes: Attributes,
    #[serde(flatten)]
    pub traffic: Traffic,
}

impl Interface {
    pub fn with_counters(attributes: Attributes, counters: Counters) -> Self {
        Self {
            attributes,
            traffic: Traffic::Counters(counters),
        }
    }

    pub fn with_rates(attributes: Attributes, rates: Rates) -> Self {
        Self {
            attributes,
            traffic: Traffic::Rates(rates),
        }
    }
}
