//! The traits
//!
use std::sync::Arc;
use anyhow::Result;
use crate::ranking::{self, SortEntry, SortMode};
use crate::shape::{RenderOptions, SampleContext};
use crate::source::CommandSource;

/// A snapshot that can be read from the server.
#[allow(async_fn_in_trait)]
pub trait Sampler: Diffable {
    /// The name of the mode, used in logging.
    const NAME: &'static str;
    /// Read and decode a snapshot. The snapshot time is taken before the command is issued.
    async fn sample<C: CommandSource>(source: &C, context: &SampleContext) -> Result<Self>;
}

/// A snapshot that can be compared with an earlier snapshot of the same type.
pub trait Diffable: Sized {
    type Diff: Renderable;
    /// The difference between `current` and `previous`, for the keys present in both.
    fn diff(current: &Arc<Self>, previous: &Arc<Self>) -> Self::Diff;
}

/// A diff with entries that can be ordered.
pub trait Rankable {
    fn sort_entries(&self, sort_mode: SortMode) -> Vec<SortEntry>;
    /// The entries to show, in order.
    fn ranked(&self, options: &RenderOptions) -> Vec<SortEntry> {
        ranking::truncate(
            ranking::rank(self.sort_entries(options.sort_mode)),
            ranking::display_count(options.list_count),
        )
    }
}

/// A diff that can be printed.
pub trait Renderable {
    fn json(&self, options: &RenderOptions) -> Result<String>;
    fn grid(&self, options: &RenderOptions) -> String;
}
