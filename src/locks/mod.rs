//! Module for the lock usage mode, using the `locks` section of `serverStatus`.
//!
//! Servers that report the lock time per database (`timeLockedMicros`) can show how much time
//! each database spent holding read and write locks.
//! Servers that report `acquireCount` use a different locking model, and are not supported.
//!
mod structs;
mod functions;

pub use structs::*;
