//! The poll loop.
//!
//! A [Poller] owns the previous sample of a single host, and per iteration samples, diffs
//! against the previous sample and prints the diff. It is generic over the snapshot type, so the
//! previous sample always has the same shape as the current one.
//! [poll_hosts] runs a poller per host and port as a tokio task.
//!
mod structs;
mod functions;
mod error;

pub use structs::*;
pub use functions::*;
pub use error::*;
