//! The structs
//!
/// What to order the entries of a diff by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// The accumulated total, like the total time for a namespace.
    #[default]
    Total,
    /// The derived average latency, like total time divided by total count.
    Latency,
}
/// The projection of a diff entry used for ordering.
///
/// `sort_metric` is the (possibly `NaN`) value entries are ordered by,
/// `tiebreak_metric` is the absolute value in the current sample, used when `sort_metric` ties.
#[derive(Debug, Clone, PartialEq)]
pub struct SortEntry {
    pub key: String,
    pub sort_metric: f64,
    pub tiebreak_metric: i64,
}
