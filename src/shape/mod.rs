//! The capabilities every reporting mode implements.
//!
//! A snapshot type is [Sampler] (it can be read from a [crate::source::CommandSource]) and
//! [Diffable] (two snapshots give a diff). The diff is [Renderable] as JSON and as a grid,
//! and, when it has multiple entries, [Rankable].
//! The poll loop only knows about these traits.
//!
mod structs;
mod traits;
mod error;
mod functions;

pub use structs::*;
pub use traits::*;
pub use error::*;
pub use functions::*;
