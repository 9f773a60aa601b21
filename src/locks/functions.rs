//! The impls and functions
//!
use std::{collections::BTreeMap, sync::Arc};
use chrono::{DateTime, Local};
use log::*;
use anyhow::Result;
use serde_json::Value;
use crate::ranking::{SortEntry, SortMode};
use crate::shape::{self, DecodeError, Diffable, Rankable, RenderOptions, Renderable, SampleContext, Sampler};
use crate::source::CommandSource;
use crate::locks::{LockDelta, LockDiff, LockSnapshot, LockStats, ReadWriteLockTimes};
use crate::utility::{self, GridWriter};
use crate::{GRID_COLUMN_PADDING, NAMESPACE_COLUMN_WIDTH};

impl ReadWriteLockTimes {
    /// Time in the read modes, `R` + `r`.
    pub fn read_total(&self) -> i64 {
        self.read + self.read_lower
    }
    /// Time in the write modes, `W` + `w`.
    pub fn write_total(&self) -> i64 {
        self.write + self.write_lower
    }
}

impl LockDelta {
    pub fn total(&self) -> i64 {
        self.read + self.write
    }
}

impl LockSnapshot {
    /// Decode the `locks` section of a `serverStatus` reply.
    ///
    /// A reply without `locks`, or with an `acquireCount` for any entry, is
    /// [DecodeError::UnsupportedFeature].
    pub fn decode(
        reply: Value,
        time: DateTime<Local>,
    ) -> Result<LockSnapshot, DecodeError>
    {
        let locks = match reply {
            Value::Object(mut reply) => reply.remove("locks"),
            _ => None,
        }
        .ok_or(DecodeError::UnsupportedFeature("lock information"))?;

        let locks: BTreeMap<String, LockStats> = serde_json::from_value(locks)?;
        if locks.values().any(|lock_stats| lock_stats.acquire_count.is_some()) {
            return Err(DecodeError::UnsupportedFeature("lock information"));
        }

        Ok(LockSnapshot { time, locks })
    }
}

impl Sampler for LockSnapshot {
    const NAME: &'static str = "locks";
    async fn sample<C: CommandSource>(
        source: &C,
        _context: &SampleContext,
    ) -> Result<Self>
    {
        let time = Local::now();
        let reply = source.run_command("serverStatus").await?;
        let snapshot = LockSnapshot::decode(reply, time)?;
        debug!("locks: {} databases", snapshot.locks.len());
        Ok(snapshot)
    }
}

impl Diffable for LockSnapshot {
    type Diff = LockDiff;
    fn diff(
        current: &Arc<Self>,
        previous: &Arc<Self>,
    ) -> LockDiff
    {
        let mut totals = BTreeMap::new();
        for (database, previous_stats) in &previous.locks {
            if let Some(current_stats) = current.locks.get(database) {
                let current_locked = &current_stats.time_locked_micros;
                let previous_locked = &previous_stats.time_locked_micros;
                totals.insert(database.clone(), LockDelta {
                    read: (current_locked.read_total() - previous_locked.read_total()) / 1000,
                    write: (current_locked.write_total() - previous_locked.write_total()) / 1000,
                });
            }
        }
        LockDiff {
            elapsed: current.time - previous.time,
            current: Arc::clone(current),
            totals,
            time: Local::now(),
        }
    }
}

impl Rankable for LockDiff {
    /// Lock usage is always ordered by the total lock time, the sort mode does not apply.
    fn sort_entries(
        &self,
        _sort_mode: SortMode,
    ) -> Vec<SortEntry>
    {
        self.totals
            .iter()
            .map(|(database, delta)| {
                let current_total = self.current.locks
                    .get(database)
                    .map(|lock_stats| lock_stats.time_locked_micros.read_lower + lock_stats.time_locked_micros.write_lower)
                    .unwrap_or_default();
                SortEntry::new(database, delta.total() as f64, current_total)
            })
            .collect()
    }
}

impl Renderable for LockDiff {
    fn json(
        &self,
        options: &RenderOptions,
    ) -> Result<String>
    {
        shape::json_document(self, options)
    }
    fn grid(
        &self,
        options: &RenderOptions,
    ) -> String
    {
        let mut grid = GridWriter::new(GRID_COLUMN_PADDING);
        grid.write_cells([
            format!("{:>width$}", "db", width = NAMESPACE_COLUMN_WIDTH),
            "total(ms)".to_string(),
            "read(ms)".to_string(),
            "write(ms)".to_string(),
            utility::format_timestamp(&self.time),
        ]);
        grid.end_row();

        for sort_entry in self.ranked(options) {
            let Some(delta) = self.totals.get(&sort_entry.key) else { continue };
            grid.write_cells([
                sort_entry.key,
                format!("{}ms", delta.total()),
                format!("{}ms", delta.read),
                format!("{}ms", delta.write),
                String::new(),
            ]);
            grid.end_row();
        }
        grid.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lock_reply(databases: &[(&str, i64, i64)]) -> Value {
        let mut locks = serde_json::Map::new();
        for (database, read, write) in databases {
            locks.insert(database.to_string(), serde_json::json!({
                "timeLockedMicros": { "R": read / 2, "W": write / 2, "r": read - read / 2, "w": write - write / 2 },
                "timeAcquiringMicros": { "r": 12, "w": 3 },
            }));
        }
        serde_json::json!({ "host": "db-1.local", "locks": locks, "ok": 1 })
    }

    #[test]
    fn unit_decode_locks() {
        let reply = r#"
{
    "host": "db-1.local",
    "version": "2.6.12",
    "locks": {
        ".": {
            "timeLockedMicros": { "R": 1853, "W": 89103 },
            "timeAcquiringMicros": { "R": 1011, "W": 5519 }
        },
        "admin": {
            "timeLockedMicros": { "r": 3450, "w": 0 },
            "timeAcquiringMicros": { "r": 140, "w": 0 }
        },
        "test": {
            "timeLockedMicros": { "r": 45280, "w": 903182 },
            "timeAcquiringMicros": { "r": 1809, "w": 7711 }
        }
    },
    "ok": 1
}"#;
        let reply: Value = serde_json::from_str(reply).unwrap();
        let result = LockSnapshot::decode(reply, Local::now()).unwrap();

        assert_eq!(result.locks.len(), 3);
        assert_eq!(result.locks["."].time_locked_micros, ReadWriteLockTimes { read: 1853, write: 89103, read_lower: 0, write_lower: 0 });
        assert_eq!(result.locks["test"].time_locked_micros.read_total(), 45280);
        assert_eq!(result.locks["test"].time_locked_micros.write_total(), 903182);
        assert!(result.locks["admin"].acquire_count.is_none());
    }

    #[test]
    fn unit_decode_locks_acquire_count_is_unsupported() {
        let reply = r#"
{
    "locks": {
        "Global": {
            "acquireCount": { "r": 1203, "w": 88, "W": 4 }
        },
        "Database": {
            "acquireCount": { "r": 530, "w": 85 }
        }
    },
    "ok": 1
}"#;
        let reply: Value = serde_json::from_str(reply).unwrap();
        let result = LockSnapshot::decode(reply, Local::now());
        assert!(matches!(result, Err(DecodeError::UnsupportedFeature(_))));
    }

    #[test]
    fn unit_decode_locks_absent_is_unsupported() {
        let reply = serde_json::json!({ "host": "db-1.local", "ok": 1 });
        let result = LockSnapshot::decode(reply, Local::now());
        assert!(matches!(result, Err(DecodeError::UnsupportedFeature(_))));
    }

    #[test]
    fn unit_diff_locks() {
        let time = Local::now();
        let previous = Arc::new(LockSnapshot::decode(lock_reply(&[("test", 10000, 4000), ("admin", 2000, 0), ("local", 0, 0)]), time).unwrap());
        let current = Arc::new(LockSnapshot::decode(lock_reply(&[("test", 15500, 9000), ("admin", 1000, 0), ("config", 0, 0)]), time + Duration::seconds(1)).unwrap());

        let diff = LockSnapshot::diff(&current, &previous);

        assert_eq!(diff.totals.keys().collect::<Vec<_>>(), vec!["admin", "test"]);
        assert_eq!(diff.totals["test"], LockDelta { read: 5, write: 5 });
        assert_eq!(diff.totals["test"].total(), 10);
        assert_eq!(diff.totals["admin"], LockDelta { read: -1, write: 0 });
        assert_eq!(diff.elapsed, Duration::seconds(1));
    }

    #[test]
    fn unit_locks_ranked_by_total_then_current() {
        let time = Local::now();
        let previous = Arc::new(LockSnapshot::decode(lock_reply(&[("zeta", 0, 0), ("beta", 0, 0), ("gamma", 0, 0)]), time).unwrap());
        let current = Arc::new(LockSnapshot::decode(lock_reply(&[("zeta", 2000, 0), ("beta", 1000, 1001), ("gamma", 4000, 0)]), time + Duration::seconds(1)).unwrap());
        let diff = LockSnapshot::diff(&current, &previous);

        let ranked: Vec<String> = diff.ranked(&RenderOptions::default()).into_iter().map(|entry| entry.key).collect();
        // zeta and beta tie on 2ms; the current r + w of beta is larger.
        assert_eq!(ranked, vec!["gamma", "beta", "zeta"]);

        let options = RenderOptions { sort_mode: SortMode::Latency, ..Default::default() };
        let ranked_latency: Vec<String> = diff.ranked(&options).into_iter().map(|entry| entry.key).collect();
        assert_eq!(ranked, ranked_latency);
    }

    #[test]
    fn unit_locks_grid_and_json() {
        let time = Local::now();
        let previous = Arc::new(LockSnapshot::decode(lock_reply(&[("test", 10000, 4000)]), time).unwrap());
        let current = Arc::new(LockSnapshot::decode(lock_reply(&[("test", 15500, 9000)]), time + Duration::seconds(1)).unwrap());
        let diff = LockSnapshot::diff(&current, &previous);

        let grid = diff.grid(&RenderOptions::default());
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("db"));
        assert!(lines[0].contains("total(ms)"));
        assert!(lines[1].trim_start().starts_with("test"));
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), vec!["test", "10ms", "5ms", "5ms"]);

        let json: Value = serde_json::from_str(&diff.json(&RenderOptions::default()).unwrap()).unwrap();
        assert_eq!(json["totals"]["test"]["read"], 5);
        assert_eq!(json["totals"]["test"]["write"], 5);
        assert!(json["time"].is_string());
    }
}
