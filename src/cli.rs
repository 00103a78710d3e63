//! Command-line arguments of the `ifmon` binary.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::source::net_dev;

#[derive(Parser, Debug, Clone)]
#[command(name = "ifmon")]
#[command(version, about = "Discovers network interfaces and checks their traffic")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the services found in the interface section as JSON
    Discover {
        #[command(flatten)]
        section: SectionArgs,

        /// Discovery rules (JSON list); the built-in default rule if omitted
        #[arg(long, env = "IFMON_RULES")]
        rules: Option<PathBuf>,
    },
    /// Check all services and print their results as JSON
    Check {
        #[command(flatten)]
        section: SectionArgs,

        /// Discovery rules, used when no services file is given
        #[arg(long, env = "IFMON_RULES")]
        rules: Option<PathBuf>,

        /// Previously discovered services (output of `ifmon discover`)
        #[arg(long, env = "IFMON_SERVICES")]
        services: Option<PathBuf>,

        /// Check parameters applied to every service (JSON object)
        #[arg(long, env = "IFMON_PARAMS")]
        params: Option<PathBuf>,

        /// Value store kept between runs
        #[arg(long, env = "IFMON_STATE_FILE", default_value = "ifmon-state.json")]
        state_file: PathBuf,

        /// Check time in seconds since the epoch; now if omitted
        #[arg(long)]
        timestamp: Option<f64>,
    },
}

/// Where the interface section comes from. A JSON section takes precedence over node
/// sections and those over `/proc/net/dev`.
#[derive(clap::Args, Debug, Clone)]
pub struct SectionArgs {
    /// Interface section (JSON list of interfaces)
    #[arg(long, env = "IFMON_INTERFACES")]
    pub interfaces: Option<PathBuf>,

    /// Interface section of one cluster node; repeat for every node
    #[arg(long = "node", value_name = "NAME=PATH", value_parser = parse_node)]
    pub nodes: Vec<(String, PathBuf)>,

    /// Linux interface statistics
    #[arg(long, env = "IFMON_NET_DEV", default_value = net_dev::DEFAULT_PATH)]
    pub net_dev: PathBuf,
}

fn parse_node(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_owned(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got `{value}`")),
    }
}
