//! topstat: a top-style view of the load of a running database instance.
//!
//! Every poll iteration samples a set of server counters, takes the difference with the previous
//! sample, and prints the difference as a grid or as JSON.
//! The reporting modes are:
//! - namespace top (`top`): time spent per namespace, the default.
//! - lock usage (`--locks`): lock time per database from `serverStatus`.
//! - operation metrics (`--operation-metrics`): document units and cpu time per database.
//! - stat line (`--stat`): a single line with server-wide counters from `serverStatus`.
extern crate serde;
extern crate serde_json;
#[macro_use]
extern crate serde_derive;

use clap::Parser;
use std::time::Duration;

pub mod utility;
pub mod source;
pub mod host_info;
pub mod ranking;
pub mod shape;
pub mod top;
pub mod locks;
pub mod operation_metrics;
pub mod server_status;
pub mod poll;

/// The hosts used when neither `--hosts` nor `TOPSTAT_HOSTS` is set.
const DEFAULT_HOSTS: &str = "localhost";
/// The ports used when neither `--ports` nor `TOPSTAT_PORTS` is set.
const DEFAULT_PORTS: &str = "28017";
/// The number of entries shown per grid when `--listcount` is 0.
pub const DEFAULT_LIST_COUNT: usize = 9;
/// The hard deadline for the `$operationMetrics` aggregation.
pub const OPERATION_METRICS_TIMEOUT: Duration = Duration::from_secs(30);
/// The padding between grid columns.
pub const GRID_COLUMN_PADDING: usize = 4;
/// The minimal width of the namespace column, so the grid does not jump around between samples.
pub const NAMESPACE_COLUMN_WIDTH: usize = 48;

#[derive(Debug, Parser, Default, Clone)]
#[clap(version, about, long_about = None)]
pub struct Opts {
    /// Hostnames to poll (comma separated)
    #[arg(short = 'H', long, value_name = "hostname,hostname")]
    pub hosts: Option<String>,
    /// Port numbers to poll on the hostnames (comma separated)
    #[arg(short, long, value_name = "port,port")]
    pub ports: Option<String>,
    /// Report on use of per-database locks
    #[arg(long, conflicts_with_all = ["operation_metrics", "stat"])]
    pub locks: bool,
    /// Report document units and cpu time per database
    #[arg(long, conflicts_with = "stat")]
    pub operation_metrics: bool,
    /// Report a single line of server-wide counters per sample
    #[arg(long)]
    pub stat: bool,
    /// Number of stats lines to print (0 for indefinite)
    #[arg(short = 'n', long, value_name = "count", default_value_t = 0)]
    pub rowcount: usize,
    /// Number of entry lines to print per stat row (0 defaults to 9)
    #[arg(short = 'l', long, value_name = "count", default_value_t = 0)]
    pub listcount: usize,
    /// Sort entries by average total ms / op instead of default of total time
    #[arg(short, long)]
    pub sortlatency: bool,
    /// Format output as JSON
    #[arg(long)]
    pub json: bool,
    /// Ignore hostInfo CPU result
    #[arg(long, hide = true)]
    pub ignorecpu: bool,
    /// Show all stat line columns, including the extended metrics columns
    #[arg(long)]
    pub all: bool,
    /// Stat line columns to show, by key (comma separated)
    #[arg(long, value_name = "key,key")]
    pub fields: Option<String>,
    /// Show stat line byte and bit amounts as plain numbers
    #[arg(long)]
    pub raw_numbers: bool,
    /// Timeout for a single command in seconds
    #[arg(long, value_name = "seconds", default_value_t = 10)]
    pub timeout: u64,
    /// Write the hosts and ports to .env
    #[arg(long)]
    pub write_dotenv: bool,
    /// Polling interval in seconds
    #[arg(value_name = "sleep time", default_value_t = 1)]
    pub sleep_time: u64,
}
