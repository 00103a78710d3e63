//! Reads the Linux interface counters from `/proc/net/dev`.
use std::io::BufRead;
use std::path::Path;

use super::Result;
use crate::fsutil;
use crate::interface::{Attributes, Counters, Interface, OperStatus};

pub const DEFAULT_PATH: &str = "/proc/net/dev";

/// `ifType` of the loopback interface.
const SOFTWARE_LOOPBACK: &str = "24";
/// `ifType` of everything else.
const ETHERNET_CSMACD: &str = "6";

/// Counters of one line of `/proc/net/dev`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct NetDevStat {
    rx_bytes: u64,
    rx_packets: u64,
    rx_errs: u64,
    rx_drop: u64,
    rx_multicast: u64,
    tx_bytes: u64,
    tx_packets: u64,
    tx_errs: u64,
    tx_drop: u64,
}

impl NetDevStat {
    /// Picks the used counters from the 16 fields following the interface name.
    fn from_fields<'a>(fields: impl Iterator<Item = &'a str>) -> Option<Self> {
        let values: Vec<u64> = fields.map(|field| field.parse().unwrap_or(0)).collect();
        if values.len() < 16 {
            return None;
        }
        Some(Self {
            rx_bytes: values[0],
            rx_packets: values[1],
            rx_errs: values[2],
            rx_drop: values[3],
            rx_multicast: values[7],
            tx_bytes: values[8],
            tx_packets: values[9],
            tx_errs: values[10],
            tx_drop: values[11],
        })
    }

    /// The kernel counts multicast packets as part of the received packets.
    fn into_counters(self) -> Counters {
        Counters {
            in_octets: Some(self.rx_bytes),
            in_ucast: Some(self.rx_packets.saturating_sub(self.rx_multicast)),
            in_mcast: Some(self.rx_multicast),
            in_bcast: None,
            in_disc: Some(self.rx_drop),
            in_err: Some(self.rx_errs),
            out_octets: Some(self.tx_bytes),
            out_ucast: Some(self.tx_packets),
            out_mcast: None,
            out_bcast: None,
            out_disc: Some(self.tx_drop),
            out_err: Some(self.tx_errs),
        }
    }
}

fn parse_interface_line(line: &str) -> Option<(&str, impl Iterator<Item = &str>)> {
    let (iface, data) = line.trim().split_once(':')?;
    Some((iface.trim(), data.split_whitespace()))
}

/// Parses `/proc/net/dev` formatted data into one interface per line.
///
/// Interfaces are indexed by their position, starting at 1. Lines with too few fields
/// are skipped and unparsable values read as zero.
pub fn from_reader<R: BufRead>(buf: &mut R) -> Result<Vec<Interface>> {
    let mut interfaces = Vec::new();
    let mut line = String::new();

    // Skip headers (first two lines)
    for _ in 0..2 {
        buf.read_line(&mut line)?;
        line.clear();
    }

    while buf.read_line(&mut line)? != 0 {
        match parse_interface_line(&line)
            .and_then(|(name, fields)| Some((name, NetDevStat::from_fields(fields)?)))
        {
            Some((name, stat)) => {
                let index = (interfaces.len() + 1).to_string();
                let port_type = if name == "lo" {
                    SOFTWARE_LOOPBACK
                } else {
                    ETHERNET_CSMACD
                };
                let attributes = Attributes::new(index, name, name, OperStatus::Up)?
                    .with_port_type(port_type);
                interfaces.push(Interface::with_counters(attributes, stat.into_counters()));
            }
            None => log::debug!(target: "source", "skipping malformed line {:?}", line.trim()),
        }
        line.clear();
    }

    Ok(interfaces)
}

/// Reads the interfaces from a file in `/proc/net/dev` format.
pub fn read(path: impl AsRef<Path>) -> Result<Vec<Interface>> {
    let mut reader = fsutil::open_file_reader(path)?;
    from_reader(&mut reader)
}
