//! The structs
//!
use std::{collections::BTreeMap, sync::Arc};
use chrono::{DateTime, Duration, Local};
/// The read statistics of a database, for the primary or the secondary members.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct OperationMetricsMemberInfo {
    #[serde(rename = "docBytesRead")]
    pub doc_bytes_read: i64,
    #[serde(rename = "docUnitsRead")]
    pub doc_units_read: i64,
    #[serde(rename = "idxEntryBytesRead")]
    pub index_entry_bytes_read: i64,
    #[serde(rename = "idxEntryUnitsRead")]
    pub index_entry_units_read: i64,
    #[serde(rename = "keysSorted")]
    pub keys_sorted: i64,
    #[serde(rename = "sorterSpills")]
    pub sorter_spills: i64,
    #[serde(rename = "docUnitsReturned")]
    pub doc_units_returned: i64,
    #[serde(rename = "cursorSeeks")]
    pub cursor_seeks: i64,
}
/// A single document of `$operationMetrics`.
///
/// ```text
/// {
///   "db": "test",
///   "primaryMetrics": { "docBytesRead": 2048, "docUnitsRead": 16, ... },
///   "secondaryMetrics": { "docBytesRead": 0, "docUnitsRead": 0, ... },
///   "docBytesWritten": 640,
///   "docUnitsWritten": 5,
///   "idxEntryBytesWritten": 120,
///   "idxEntryUnitsWritten": 4,
///   "cpuNanos": 1870331
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationMetricsEntry {
    #[serde(rename = "db")]
    pub database: String,
    #[serde(rename = "primaryMetrics", default)]
    pub primary_metrics: OperationMetricsMemberInfo,
    #[serde(rename = "secondaryMetrics", default)]
    pub secondary_metrics: OperationMetricsMemberInfo,
    #[serde(rename = "docBytesWritten", default)]
    pub doc_bytes_written: i64,
    #[serde(rename = "docUnitsWritten", default)]
    pub doc_units_written: i64,
    #[serde(rename = "idxEntryBytesWritten", default)]
    pub index_entry_bytes_written: i64,
    #[serde(rename = "idxEntryUnitsWritten", default)]
    pub index_entry_units_written: i64,
    #[serde(rename = "cpuNanos", default)]
    pub cpu_nanos: i64,
}
/// The difference of an [OperationMetricsEntry] with its earlier sample.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OperationMetricsEntryDelta {
    pub primary_metrics: OperationMetricsMemberInfo,
    pub secondary_metrics: OperationMetricsMemberInfo,
    pub doc_bytes_written: i64,
    pub doc_units_written: i64,
    pub index_entry_bytes_written: i64,
    pub index_entry_units_written: i64,
    pub cpu_nanos: i64,
}
/// A sample of `$operationMetrics`.
#[derive(Debug, Default, Clone)]
pub struct OperationMetricsSnapshot {
    pub time: DateTime<Local>,
    pub num_cores: i64,
    /// database -> metrics
    pub entries: BTreeMap<String, OperationMetricsEntry>,
}
/// The difference between two [OperationMetricsSnapshot]s.
#[derive(Debug)]
pub struct OperationMetricsDiff {
    pub num_cores: i64,
    pub elapsed: Duration,
    pub current: Arc<OperationMetricsSnapshot>,
    /// database -> deltas
    pub totals: BTreeMap<String, OperationMetricsEntryDelta>,
    pub time: DateTime<Local>,
}
