//! The structs
//!
use crate::ranking::SortMode;
/// What a sample needs to know besides the reply.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleContext {
    /// The number of cpu cores of the server, 0 if unknown.
    pub num_cores: i64,
}
/// The output settings for rendering a diff.
#[derive(Debug, Default, Clone)]
pub struct RenderOptions {
    /// The `--listcount` value, 0 means the default.
    pub list_count: usize,
    pub sort_mode: SortMode,
    /// Stat line: use units for byte and bit amounts.
    pub human_readable: bool,
    /// Stat line: show the extended columns.
    pub all: bool,
    /// Stat line: show these columns instead of the ones active for the server.
    pub fields: Option<Vec<String>>,
    /// Multiple servers are polled at the same time.
    pub multiple_hosts: bool,
    /// The `host:port` being polled, set when multiple servers are polled.
    pub host: Option<String>,
}
