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
use crate::top::{NsTopInfo, TopDiff, TopField, TopSnapshot};
use crate::utility::{self, GridWriter};
use crate::{GRID_COLUMN_PADDING, NAMESPACE_COLUMN_WIDTH};

impl TopField {
    /// The delta with an earlier sample, with time converted from microseconds to milliseconds.
    pub fn delta(
        &self,
        previous: &TopField,
    ) -> TopField
    {
        TopField {
            time: (self.time - previous.time) / 1000,
            count: self.count - previous.count,
        }
    }
}

impl TopSnapshot {
    /// Decode the reply of `top`.
    ///
    /// The `totals` document contains a `note` field with a text, which is removed before the
    /// namespaces are decoded.
    pub fn decode(
        reply: Value,
        time: DateTime<Local>,
        num_cores: i64,
    ) -> Result<TopSnapshot, DecodeError>
    {
        let mut totals = match reply {
            Value::Object(mut reply) => reply.remove("totals"),
            _ => None,
        }
        .ok_or(DecodeError::MissingField("totals"))?;

        if let Some(totals) = totals.as_object_mut() {
            totals.remove("note");
        }
        let totals: BTreeMap<String, NsTopInfo> = serde_json::from_value(totals)?;

        Ok(TopSnapshot { time, num_cores, totals })
    }
}

impl Sampler for TopSnapshot {
    const NAME: &'static str = "top";
    async fn sample<C: CommandSource>(
        source: &C,
        context: &SampleContext,
    ) -> Result<Self>
    {
        let time = Local::now();
        let reply = source.run_command("top").await?;
        let snapshot = TopSnapshot::decode(reply, time, context.num_cores)?;
        debug!("top: {} namespaces", snapshot.totals.len());
        Ok(snapshot)
    }
}

impl Diffable for TopSnapshot {
    type Diff = TopDiff;
    fn diff(
        current: &Arc<Self>,
        previous: &Arc<Self>,
    ) -> TopDiff
    {
        let mut totals = BTreeMap::new();
        for (namespace, previous_info) in &previous.totals {
            if let Some(current_info) = current.totals.get(namespace) {
                totals.insert(namespace.clone(), NsTopInfo {
                    total: current_info.total.delta(&previous_info.total),
                    read: current_info.read.delta(&previous_info.read),
                    write: current_info.write.delta(&previous_info.write),
                });
            }
        }
        TopDiff {
            num_cores: previous.num_cores,
            elapsed: current.time - previous.time,
            current: Arc::clone(current),
            totals,
            time: Local::now(),
        }
    }
}

impl Rankable for TopDiff {
    fn sort_entries(
        &self,
        sort_mode: SortMode,
    ) -> Vec<SortEntry>
    {
        self.totals
            .iter()
            .map(|(namespace, diff)| {
                let current_total = self.current.totals
                    .get(namespace)
                    .map(|info| info.total.time)
                    .unwrap_or_default();
                let sort_metric = match sort_mode {
                    SortMode::Total => diff.total.time as f64,
                    SortMode::Latency => diff.total.time as f64 / diff.total.count as f64,
                };
                SortEntry::new(namespace, sort_metric, current_total)
            })
            .collect()
    }
}

/// The cells for time, percentage of the elapsed time, latency and operations per second.
fn field_cells(
    field: &TopField,
    elapsed_millis: f64,
    elapsed_seconds: f64,
) -> [String; 4]
{
    [
        format!("{}ms", field.time),
        utility::format_percentage(field.time as f64, elapsed_millis, 1),
        format!("{}ms/op", utility::format_float(field.time as f64 / field.count as f64, 1)),
        format!("{}op/s", utility::format_float(field.count as f64 / elapsed_seconds, 1)),
    ]
}

impl Renderable for TopDiff {
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
        let elapsed_millis = self.elapsed.num_milliseconds() as f64;
        let elapsed_seconds = elapsed_millis / 1000_f64;

        let mut grid = GridWriter::new(GRID_COLUMN_PADDING);
        grid.write_cells([
            format!("{:>width$}", "ns", width = NAMESPACE_COLUMN_WIDTH),
            "TOTAL(ms)".to_string(),
            "total%".to_string(),
            "total%/core".to_string(),
            "time/op".to_string(),
            "op/s".to_string(),
            "READ(ms)".to_string(),
            "read%".to_string(),
            "time/op".to_string(),
            "op/s".to_string(),
            "WRITE(ms)".to_string(),
            "write%".to_string(),
            "time/op".to_string(),
            "op/s".to_string(),
            utility::format_timestamp(&self.time),
        ]);
        grid.end_row();

        for sort_entry in self.ranked(options) {
            let Some(diff) = self.totals.get(&sort_entry.key) else { continue };
            let [total_time, total_percentage, total_latency, total_rate] = field_cells(&diff.total, elapsed_millis, elapsed_seconds);
            let [read_time, read_percentage, read_latency, read_rate] = field_cells(&diff.read, elapsed_millis, elapsed_seconds);
            let [write_time, write_percentage, write_latency, write_rate] = field_cells(&diff.write, elapsed_millis, elapsed_seconds);
            let per_core = diff.total.time as f64 / elapsed_millis * 100_f64 / self.num_cores as f64;
            grid.write_cells([
                sort_entry.key,
                total_time,
                total_percentage,
                format!("{}%", utility::format_float(per_core, 2)),
                total_latency,
                total_rate,
                read_time,
                read_percentage,
                read_latency,
                read_rate,
                write_time,
                write_percentage,
                write_latency,
                write_rate,
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

    fn top_reply(namespaces: &[(&str, i64, i64)]) -> Value {
        let mut totals = serde_json::Map::new();
        totals.insert("note".to_string(), Value::from("all times in microseconds"));
        for (namespace, time, count) in namespaces {
            totals.insert(namespace.to_string(), serde_json::json!({
                "total": { "time": time, "count": count },
                "readLock": { "time": time / 2, "count": count / 2 },
                "writeLock": { "time": time / 2, "count": count - count / 2 },
            }));
        }
        serde_json::json!({ "totals": totals, "ok": 1 })
    }

    #[test]
    fn unit_decode_top() {
        let reply = r#"
{
    "totals": {
        "note": "all times in microseconds",
        "admin.system.roles": {
            "total": { "time": 53, "count": 1 },
            "readLock": { "time": 53, "count": 1 },
            "writeLock": { "time": 0, "count": 0 },
            "queries": { "time": 53, "count": 1 },
            "getmore": { "time": 0, "count": 0 },
            "insert": { "time": 0, "count": 0 },
            "update": { "time": 0, "count": 0 },
            "remove": { "time": 0, "count": 0 },
            "commands": { "time": 0, "count": 0 }
        },
        "test.orders": {
            "total": { "time": 2318, "count": 14 },
            "readLock": { "time": 1201, "count": 9 },
            "writeLock": { "time": 1117, "count": 5 }
        }
    },
    "ok": 1
}"#;
        let reply: Value = serde_json::from_str(reply).unwrap();
        let result = TopSnapshot::decode(reply, Local::now(), 4).unwrap();

        assert_eq!(result.totals.len(), 2);
        assert!(!result.totals.contains_key("note"));
        assert_eq!(result.num_cores, 4);
        let orders = &result.totals["test.orders"];
        assert_eq!(orders.total, TopField { time: 2318, count: 14 });
        assert_eq!(orders.read, TopField { time: 1201, count: 9 });
        assert_eq!(orders.write, TopField { time: 1117, count: 5 });
    }

    #[test]
    fn unit_decode_top_without_totals() {
        let reply = serde_json::json!({ "ok": 1 });
        let result = TopSnapshot::decode(reply, Local::now(), 1);
        assert!(matches!(result, Err(DecodeError::MissingField("totals"))));
    }

    #[test]
    fn unit_decode_top_malformed_namespace() {
        let reply = serde_json::json!({ "totals": { "test.orders": { "total": { "time": "lots" } } } });
        let result = TopSnapshot::decode(reply, Local::now(), 1);
        assert!(matches!(result, Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn unit_diff_top_milliseconds_and_rates() {
        let time = Local::now();
        let previous = Arc::new(TopSnapshot::decode(top_reply(&[("db.coll", 1000, 10)]), time, 2).unwrap());
        let current = Arc::new(TopSnapshot::decode(top_reply(&[("db.coll", 3000, 15)]), time + Duration::seconds(2), 2).unwrap());

        let diff = TopSnapshot::diff(&current, &previous);

        assert_eq!(diff.elapsed, Duration::seconds(2));
        assert_eq!(diff.totals["db.coll"].total, TopField { time: 2, count: 5 });
        let grid = diff.grid(&RenderOptions::default());
        let row = grid.lines().nth(1).unwrap();
        assert!(row.trim_start().starts_with("db.coll"));
        // 2ms over 2000ms is 0.1%, over 2 cores 0.05%; 5 operations in 2 seconds is 2.5op/s.
        assert!(row.contains(" 2ms "));
        assert!(row.contains(" 0.1% "));
        assert!(row.contains(" 0.05% "));
        assert!(row.contains(" 0.4ms/op "));
        assert!(row.contains(" 2.5op/s"));
    }

    #[test]
    fn unit_diff_top_inner_join_and_negative_deltas() {
        let time = Local::now();
        let previous = Arc::new(TopSnapshot::decode(top_reply(&[("test.a", 5000, 10), ("test.b", 9000, 30), ("test.gone", 10, 1)]), time, 1).unwrap());
        let current = Arc::new(TopSnapshot::decode(top_reply(&[("test.a", 8000, 12), ("test.b", 1000, 2), ("test.new", 10, 1)]), time + Duration::seconds(1), 1).unwrap());

        let diff = TopSnapshot::diff(&current, &previous);

        assert_eq!(diff.totals.keys().collect::<Vec<_>>(), vec!["test.a", "test.b"]);
        assert_eq!(diff.totals["test.a"].total, TopField { time: 3, count: 2 });
        // a restarted server gives negative deltas, which are kept.
        assert_eq!(diff.totals["test.b"].total, TopField { time: -8, count: -28 });
    }

    #[test]
    fn unit_diff_top_is_deterministic() {
        let time = Local::now();
        let previous = Arc::new(TopSnapshot::decode(top_reply(&[("test.a", 5000, 10), ("test.b", 9000, 30)]), time, 1).unwrap());
        let current = Arc::new(TopSnapshot::decode(top_reply(&[("test.a", 8000, 12), ("test.b", 12000, 32)]), time + Duration::seconds(1), 1).unwrap());

        let first = TopSnapshot::diff(&current, &previous);
        let second = TopSnapshot::diff(&current, &previous);

        assert_eq!(first.totals, second.totals);
        assert_eq!(first.elapsed, second.elapsed);
        assert_eq!(first.num_cores, second.num_cores);
    }

    #[test]
    fn unit_top_sort_by_latency() {
        let time = Local::now();
        // test.a: 10ms over 10 operations, test.b: 8ms over 2 operations, test.c: no operations.
        let previous = Arc::new(TopSnapshot::decode(top_reply(&[("test.a", 0, 0), ("test.b", 0, 0), ("test.c", 0, 0)]), time, 1).unwrap());
        let current = Arc::new(TopSnapshot::decode(top_reply(&[("test.a", 10000, 10), ("test.b", 8000, 2), ("test.c", 0, 0)]), time + Duration::seconds(1), 1).unwrap());
        let diff = TopSnapshot::diff(&current, &previous);

        let by_total: Vec<String> = diff.ranked(&RenderOptions::default()).into_iter().map(|entry| entry.key).collect();
        assert_eq!(by_total, vec!["test.a", "test.b", "test.c"]);

        let options = RenderOptions { sort_mode: SortMode::Latency, ..Default::default() };
        let by_latency: Vec<String> = diff.ranked(&options).into_iter().map(|entry| entry.key).collect();
        // 0/0 is NaN, which goes first.
        assert_eq!(by_latency, vec!["test.c", "test.b", "test.a"]);
    }

    #[test]
    fn unit_top_grid_default_list_count() {
        let time = Local::now();
        let namespaces: Vec<(String, i64, i64)> = (0..20).map(|number| (format!("test.c{:02}", number), number * 1000, number)).collect();
        let previous_namespaces: Vec<(&str, i64, i64)> = namespaces.iter().map(|(namespace, _, _)| (namespace.as_str(), 0, 0)).collect();
        let current_namespaces: Vec<(&str, i64, i64)> = namespaces.iter().map(|(namespace, time, count)| (namespace.as_str(), *time, *count)).collect();
        let previous = Arc::new(TopSnapshot::decode(top_reply(&previous_namespaces), time, 1).unwrap());
        let current = Arc::new(TopSnapshot::decode(top_reply(&current_namespaces), time + Duration::seconds(1), 1).unwrap());
        let diff = TopSnapshot::diff(&current, &previous);

        let grid = diff.grid(&RenderOptions::default());
        // header and 9 entries
        assert_eq!(grid.lines().count(), 10);
        assert!(grid.lines().nth(1).unwrap().trim_start().starts_with("test.c19"));

        let options = RenderOptions { list_count: 3, ..Default::default() };
        assert_eq!(diff.grid(&options).lines().count(), 4);
    }

    #[test]
    fn unit_top_grid_zero_elapsed() {
        let time = Local::now();
        let previous = Arc::new(TopSnapshot::decode(top_reply(&[("db.coll", 1000, 10)]), time, 0).unwrap());
        let current = Arc::new(TopSnapshot::decode(top_reply(&[("db.coll", 3000, 10)]), time, 0).unwrap());
        let diff = TopSnapshot::diff(&current, &previous);

        let grid = diff.grid(&RenderOptions::default());
        let row = grid.lines().nth(1).unwrap();
        assert!(row.contains("+Inf%"));
        assert!(row.contains("NaN"));
    }

    #[test]
    fn unit_top_json() {
        let time = Local::now();
        let previous = Arc::new(TopSnapshot::decode(top_reply(&[("db.coll", 1000, 10)]), time, 1).unwrap());
        let current = Arc::new(TopSnapshot::decode(top_reply(&[("db.coll", 3000, 15)]), time + Duration::seconds(2), 1).unwrap());
        let diff = TopSnapshot::diff(&current, &previous);

        let json: Value = serde_json::from_str(&diff.json(&RenderOptions::default()).unwrap()).unwrap();
        assert_eq!(json["totals"]["db.coll"]["total"]["time"], 2);
        assert_eq!(json["totals"]["db.coll"]["total"]["count"], 5);
        assert_eq!(json["totals"]["db.coll"]["read"]["time"], 1);
        assert!(json["totals"]["db.coll"]["write"].is_object());
        assert!(json["time"].is_string());
    }
}
