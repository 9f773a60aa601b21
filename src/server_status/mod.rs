//! Module for the stat line mode, using `serverStatus`.
//!
//! Every iteration prints a single line with server-wide counters: operation counters, cache,
//! memory, query executor and latency statistics, queues, network and replication state.
//! The columns are defined by the declarative [STAT_HEADERS] registry: every column has a
//! predicate that tells whether it applies to the server, and a reader that produces the cell
//! from the current and previous sample.
//!
mod structs;
mod readers;
mod functions;

pub use structs::*;
pub use readers::*;
pub use functions::*;
