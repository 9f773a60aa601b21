//! Module for the namespace top mode, using the `top` command.
//!
//! `top` reports per namespace the accumulated time (microseconds) and count of all operations,
//! of the operations under a read lock and of the operations under a write lock.
//! The diff is shown per namespace in milliseconds, as percentage of the elapsed time, as latency
//! and as operations per second.
//!
mod structs;
mod functions;

pub use structs::*;
