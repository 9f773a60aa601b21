//! The structs
//!
use std::{sync::Arc, time::Duration};
use crate::shape::{RenderOptions, SampleContext};
/// What to report on, selected with `--locks`, `--operation-metrics` and `--stat`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Top,
    Locks,
    OperationMetrics,
    Stat,
}
#[derive(Debug, Default, Clone)]
pub struct PollOptions {
    /// The number of diffs to print, 0 for no limit.
    pub row_count: usize,
    pub sleep_time: Duration,
    pub json: bool,
    /// With multiple hosts, `render.host` is printed before every grid.
    pub render: RenderOptions,
}
/// The poll loop of a single host for snapshot type `T`.
pub struct Poller<C, T> {
    pub source: C,
    pub options: PollOptions,
    pub context: SampleContext,
    pub previous: Option<Arc<T>>,
    /// A sample has been read successfully at least once.
    pub has_data: bool,
}
