//! Module for the operation metrics mode, using the `$operationMetrics` aggregation stage.
//!
//! The aggregation returns a document per database with the document and index entry units read
//! and written, and the cpu time spent. The diff is shown as units per second per database.
//!
mod structs;
mod functions;

pub use structs::*;
