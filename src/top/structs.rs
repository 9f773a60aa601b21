//! The structs
//!
use std::{collections::BTreeMap, sync::Arc};
use chrono::{DateTime, Duration, Local};
/// Time and count for a single lock statistic of a namespace.
///
/// In a snapshot, time is in microseconds. In a diff, time is in milliseconds.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TopField {
    pub time: i64,
    pub count: i64,
}
/// The statistics of a single namespace.
///
/// ```text
/// "totals": {
///   "note": "all times in microseconds",
///   "test.orders": {
///     "total": { "time": 2318, "count": 14 },
///     "readLock": { "time": 1201, "count": 9 },
///     "writeLock": { "time": 1117, "count": 5 },
///     "queries": { "time": 1201, "count": 9 },
///     ...
/// ```
/// Only total, readLock and writeLock are used, they are serialized as total, read and write.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct NsTopInfo {
    pub total: TopField,
    #[serde(rename(serialize = "read", deserialize = "readLock"))]
    pub read: TopField,
    #[serde(rename(serialize = "write", deserialize = "writeLock"))]
    pub write: TopField,
}
/// A sample of `top`.
#[derive(Debug, Default, Clone)]
pub struct TopSnapshot {
    pub time: DateTime<Local>,
    pub num_cores: i64,
    /// namespace -> statistics
    pub totals: BTreeMap<String, NsTopInfo>,
}
/// The difference between two [TopSnapshot]s.
#[derive(Serialize, Debug)]
pub struct TopDiff {
    #[serde(skip)]
    pub num_cores: i64,
    #[serde(skip)]
    pub elapsed: Duration,
    #[serde(skip)]
    pub current: Arc<TopSnapshot>,
    /// namespace -> deltas
    pub totals: BTreeMap<String, NsTopInfo>,
    pub time: DateTime<Local>,
}
