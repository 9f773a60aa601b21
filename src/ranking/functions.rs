//! The impls and functions
//!
use std::cmp::Ordering;
use crate::ranking::{SortEntry, SortMode};
use crate::DEFAULT_LIST_COUNT;

impl SortMode {
    /// The `--sortlatency` switch.
    pub fn from_sort_latency(sort_latency: bool) -> Self {
        if sort_latency { SortMode::Latency } else { SortMode::Total }
    }
}

impl SortEntry {
    pub fn new(
        key: &str,
        sort_metric: f64,
        tiebreak_metric: i64,
    ) -> Self
    {
        SortEntry { key: key.to_string(), sort_metric, tiebreak_metric }
    }
}

/// An entry with a `NaN` sort metric goes before an entry with a number.
/// Two `NaN` entries, or two entries with a number, are equal here.
///
/// A `NaN` comes from an average over a zero count. These entries are put on top.
pub fn nan_first(
    left: f64,
    right: f64,
) -> Ordering
{
    match (left.is_nan(), right.is_nan()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// The order of two sort entries, where `Ordering::Less` means `left` is shown first.
///
/// 1. `NaN` sort metrics first, see [nan_first].
/// 2. Descending by sort metric.
/// 3. Descending by the current absolute value.
/// 4. Descending by key.
pub fn compare_sort_entries(
    left: &SortEntry,
    right: &SortEntry,
) -> Ordering
{
    nan_first(left.sort_metric, right.sort_metric)
        .then_with(|| right.sort_metric.partial_cmp(&left.sort_metric).unwrap_or(Ordering::Equal))
        .then_with(|| right.tiebreak_metric.cmp(&left.tiebreak_metric))
        .then_with(|| right.key.cmp(&left.key))
}

pub fn rank(
    mut sort_entries: Vec<SortEntry>,
) -> Vec<SortEntry>
{
    sort_entries.sort_by(compare_sort_entries);
    sort_entries
}

/// The first `limit` entries, all entries if `limit` is 0.
pub fn truncate(
    mut sort_entries: Vec<SortEntry>,
    limit: usize,
) -> Vec<SortEntry>
{
    if limit > 0 {
        sort_entries.truncate(limit);
    }
    sort_entries
}

/// The number of entries to show for the `--listcount` value.
pub fn display_count(
    list_count: usize,
) -> usize
{
    if list_count == 0 { DEFAULT_LIST_COUNT } else { list_count }
}
