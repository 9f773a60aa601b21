//! Module for issuing administrative commands against the monitored server.
//!
//! The [CommandSource] trait is what the poll loop uses to obtain the raw reply documents.
//! [HttpSource] implements it for a server exposing its commands as JSON over HTTP:
//! `GET http://<host>:<port>/<command>` for a command, and `GET http://<host>:<port>/<stage>`
//! for a single stage aggregation.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
