//! Module for the `hostInfo` command, which provides the number of cpu cores of the server.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
