//! ifmon: discovery and traffic checks for network interfaces.
//!
//! The library turns interface counters and the state kept from the previous cycle into
//! rates, thresholds and verdicts. It decides which interfaces become monitored items,
//! combines interfaces into groups and merges the sections of cluster nodes.
//!
//! Everything is synchronous. Timestamps are passed in by the caller, and the value
//! store is an explicit handle that is loaded before and persisted after a host's checks.
use std::io::Write;

use cli::{Args, Command, SectionArgs};
use persistence::{JsonFilePersister, StorePersister};

pub mod average;
pub mod check;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fsutil;
pub mod group;
pub mod interface;
pub mod levels;
pub mod persistence;
pub mod rates;
pub mod render;
pub mod source;
pub mod store;

pub use error::{Error, Result};

/// Check results of one service.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ServiceReport {
    pub item: String,
    pub state: check::State,
    pub entries: Vec<check::CheckEntry>,
}

/// Runs one `ifmon` command and writes its JSON output to `out`.
///
/// # Errors
///
/// Fails on unreadable inputs, invalid rules or parameters, or if the value store cannot
/// be loaded or persisted. Per-counter problems are part of the check results instead.
pub fn run(args: Args, out: &mut impl Write) -> Result<()> {
    match args.command {
        Command::Discover { section, rules } => {
            let section = load_section(&section)?;
            let discoverer = discovery::Discoverer::new(load_rules(rules.as_deref())?)?;
            let services = discoverer.discover(&section);
            log::debug!(target: "discovery", "discovered {} services", services.len());
            serde_json::to_writer_pretty(&mut *out, &services)?;
        }
        Command::Check {
            section,
            rules,
            services,
            params,
            state_file,
            timestamp,
        } => {
            let section = load_section(&section)?;
            let services: Vec<discovery::DiscoveredItem> = match services {
                Some(path) => fsutil::read_json(path)?,
                None => discovery::Discoverer::new(load_rules(rules.as_deref())?)?
                    .discover(&section),
            };
            let params: config::CheckParams = match params {
                Some(path) => fsutil::read_json(path)?,
                None => config::CheckParams::default(),
            };
            let timestamp = match timestamp {
                Some(timestamp) => timestamp,
                None => std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)?
                    .as_secs_f64(),
            };

            let persister = JsonFilePersister::new(state_file);
            let reports = check_services(&services, &params, &section, timestamp, &persister)?;
            serde_json::to_writer_pretty(&mut *out, &reports)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// Checks all services of one host within one load/persist cycle of the value store.
///
/// State of items that are no longer checked is dropped.
pub fn check_services(
    services: &[discovery::DiscoveredItem],
    params: &config::CheckParams,
    section: &[interface::Interface],
    timestamp: f64,
    persister: &impl StorePersister,
) -> Result<Vec<ServiceReport>> {
    let mut host_store = persister.load()?;
    let checker = check::Checker::new();

    let mut reports = Vec::with_capacity(services.len());
    for service in services {
        let params = params.for_service(&service.parameters);
        let entries = checker.check(
            &service.item,
            &params,
            section,
            timestamp,
            host_store.item_mut(&service.item),
        )?;
        if entries.is_empty() {
            log::warn!(target: "check", "service {} has no matching interface", service.item);
        }
        reports.push(ServiceReport {
            item: service.item.clone(),
            state: check::worst_state(&entries),
            entries,
        });
    }

    host_store.retain_items(services.iter().map(|service| service.item.as_str()));
    persister.persist(&host_store)?;
    Ok(reports)
}

fn load_section(args: &SectionArgs) -> Result<Vec<interface::Interface>> {
    if let Some(path) = &args.interfaces {
        return Ok(fsutil::read_json(path)?);
    }
    if !args.nodes.is_empty() {
        let mut nodes = Vec::with_capacity(args.nodes.len());
        for (node, path) in &args.nodes {
            nodes.push((node.clone(), fsutil::read_json(path)?));
        }
        return Ok(cluster::reduce(nodes));
    }
    Ok(source::net_dev::read(&args.net_dev)?)
}

fn load_rules(path: Option<&std::path::Path>) -> Result<Vec<config::DiscoveryRule>> {
    match path {
        Some(path) => Ok(fsutil::read_json(path)?),
        None => Ok(vec![config::DiscoveryRule::builtin_default()]),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::*;
    use crate::interface::{Attributes, Counters, Interface, OperStatus};

    fn write_section(path: &Path, in_octets: u64) {
        let section = vec![
            Interface::with_counters(
                Attributes::new("1", "eth0", "eth0", OperStatus::Up)
                    .unwrap()
                    .with_port_type("6")
                    .with_speed(1_000_000_000.0),
                Counters {
                    in_octets: Some(in_octets),
                    out_octets: Some(0),
                    ..Default::default()
                },
            ),
            Interface::with_counters(
                Attributes::new("2", "lo", "lo", OperStatus::Up)
                    .unwrap()
                    .with_port_type("24"),
                Counters::default(),
            ),
        ];
        std::fs::write(path, serde_json::to_string(&section).unwrap()).unwrap();
    }

    fn run_json(args: &[&str]) -> serde_json::Value {
        let args = Args::try_parse_from(args).unwrap();
        let mut out = Vec::<u8>::new();
        run(args, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_discover_with_default_rule() {
        let dir = tempfile::tempdir().unwrap();
        let interfaces = dir.path().join("interfaces.json");
        write_section(&interfaces, 0);

        let services = run_json(&[
            "ifmon",
            "discover",
            "--interfaces",
            interfaces.to_str().unwrap(),
        ]);
        let services = services.as_array().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0]["item"], "1");
        assert_eq!(services[0]["parameters"]["discovered_speed"], 1_000_000_000.0);
    }

    #[test]
    fn test_check_keeps_state_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let interfaces = dir.path().join("interfaces.json");
        let state_file = dir.path().join("state.json");
        let check = |timestamp: &str| {
            run_json(&[
                "ifmon",
                "check",
                "--interfaces",
                interfaces.to_str().unwrap(),
                "--state-file",
                state_file.to_str().unwrap(),
                "--timestamp",
                timestamp,
            ])
        };

        write_section(&interfaces, 1000);
        let first = check("0");
        assert_eq!(first[0]["item"], "1");
        assert_eq!(first[0]["state"], 0);
        assert!(state_file.exists());

        write_section(&interfaces, 2000);
        let second = check("5");
        let entries = second[0]["entries"].as_array().unwrap();
        let traffic_in = entries
            .iter()
            .find(|entry| entry["type"] == "metric" && entry["name"] == "in")
            .unwrap();
        assert_eq!(traffic_in["value"], 200.0);
        assert_eq!(traffic_in["upper_boundary"], 125_000_000.0);
    }

    #[test]
    fn test_stale_items_are_dropped_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let persister = JsonFilePersister::new(dir.path().join("state.json"));
        let mut stored = store::HostValueStore::new();
        stored.item_mut("gone").rate("k", 0.0, 1.0).unwrap();
        persister.persist(&stored).unwrap();

        let reports =
            check_services(&[], &config::CheckParams::default(), &[], 1.0, &persister).unwrap();
        assert!(reports.is_empty());
        assert!(persister.load().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let interfaces = dir.path().join("interfaces.json");
        std::fs::write(&interfaces, "[{\"index\": \"\", \"oper_status\": \"1\"}]").unwrap();
        let args = Args::try_parse_from([
            "ifmon",
            "discover",
            "--interfaces",
            interfaces.to_str().unwrap(),
        ])
        .unwrap();
        let err = run(args, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
