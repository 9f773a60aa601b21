//! Ordering and truncation of the entries of a diff.
//!
//! Every diff projects its entries into [SortEntry] values, which are ordered by [rank] and cut
//! to the number of entries to show by [truncate].
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
