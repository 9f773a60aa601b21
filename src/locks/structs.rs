//! The structs
//!
use std::{collections::BTreeMap, sync::Arc};
use chrono::{DateTime, Duration, Local};
/// Lock times in microseconds, per lock mode.
///
/// `R` and `W` are the global (exclusive) modes, `r` and `w` the intent modes.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ReadWriteLockTimes {
    #[serde(rename = "R")]
    pub read: i64,
    #[serde(rename = "W")]
    pub write: i64,
    #[serde(rename = "r")]
    pub read_lower: i64,
    #[serde(rename = "w")]
    pub write_lower: i64,
}
/// The lock statistics of a single database.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockStats {
    #[serde(default)]
    pub acquire_count: Option<ReadWriteLockTimes>,
    #[serde(default)]
    pub acquire_wait_count: Option<ReadWriteLockTimes>,
    #[serde(default)]
    pub time_locked_micros: ReadWriteLockTimes,
    #[serde(default)]
    pub time_acquiring_micros: ReadWriteLockTimes,
}
/// A sample of the `locks` section of `serverStatus`.
#[derive(Debug, Default, Clone)]
pub struct LockSnapshot {
    pub time: DateTime<Local>,
    /// database -> lock statistics
    pub locks: BTreeMap<String, LockStats>,
}
/// The lock time difference of a database, in milliseconds.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LockDelta {
    pub read: i64,
    pub write: i64,
}
/// The difference between two [LockSnapshot]s.
#[derive(Serialize, Debug)]
pub struct LockDiff {
    #[serde(skip)]
    pub elapsed: Duration,
    #[serde(skip)]
    pub current: Arc<LockSnapshot>,
    /// database -> deltas
    pub totals: BTreeMap<String, LockDelta>,
    pub time: DateTime<Local>,
}
