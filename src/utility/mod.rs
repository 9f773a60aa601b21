//! Utilities shared by the reporting modes.
//!
//! - host and port configuration via the command line switches and `.env`.
//! - the grid writer used to align the text output.
//! - number formatting, which renders zero divisors as `NaN`/`+Inf` instead of failing.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
