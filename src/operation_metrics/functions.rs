//! The impls and functions
//!
use std::{collections::BTreeMap, sync::Arc};
use chrono::{DateTime, Local};
use log::*;
use anyhow::{Context, Result};
use serde_json::Value;
use crate::ranking::{SortEntry, SortMode};
use crate::shape::{self, DecodeError, Diffable, Rankable, RenderOptions, Renderable, SampleContext, Sampler};
use crate::source::CommandSource;
use crate::operation_metrics::{OperationMetricsDiff, OperationMetricsEntry, OperationMetricsEntryDelta, OperationMetricsMemberInfo, OperationMetricsSnapshot};
use crate::utility::{self, GridWriter};
use crate::{GRID_COLUMN_PADDING, NAMESPACE_COLUMN_WIDTH, OPERATION_METRICS_TIMEOUT};

impl OperationMetricsMemberInfo {
    pub fn delta(
        &self,
        previous: &OperationMetricsMemberInfo,
    ) -> OperationMetricsMemberInfo
    {
        OperationMetricsMemberInfo {
            doc_bytes_read: self.doc_bytes_read - previous.doc_bytes_read,
            doc_units_read: self.doc_units_read - previous.doc_units_read,
            index_entry_bytes_read: self.index_entry_bytes_read - previous.index_entry_bytes_read,
            index_entry_units_read: self.index_entry_units_read - previous.index_entry_units_read,
            keys_sorted: self.keys_sorted - previous.keys_sorted,
            sorter_spills: self.sorter_spills - previous.sorter_spills,
            doc_units_returned: self.doc_units_returned - previous.doc_units_returned,
            cursor_seeks: self.cursor_seeks - previous.cursor_seeks,
        }
    }
}

impl OperationMetricsEntry {
    /// Document units read on the primary and the secondaries, and written.
    pub fn total_doc_units(&self) -> i64 {
        self.primary_metrics.doc_units_read + self.secondary_metrics.doc_units_read + self.doc_units_written
    }
    pub fn delta(
        &self,
        previous: &OperationMetricsEntry,
    ) -> OperationMetricsEntryDelta
    {
        OperationMetricsEntryDelta {
            primary_metrics: self.primary_metrics.delta(&previous.primary_metrics),
            secondary_metrics: self.secondary_metrics.delta(&previous.secondary_metrics),
            doc_bytes_written: self.doc_bytes_written - previous.doc_bytes_written,
            doc_units_written: self.doc_units_written - previous.doc_units_written,
            index_entry_bytes_written: self.index_entry_bytes_written - previous.index_entry_bytes_written,
            index_entry_units_written: self.index_entry_units_written - previous.index_entry_units_written,
            cpu_nanos: self.cpu_nanos - previous.cpu_nanos,
        }
    }
}

impl OperationMetricsEntryDelta {
    pub fn doc_units_read(&self) -> i64 {
        self.primary_metrics.doc_units_read + self.secondary_metrics.doc_units_read
    }
    pub fn total_doc_units(&self) -> i64 {
        self.doc_units_read() + self.doc_units_written
    }
}

impl OperationMetricsSnapshot {
    /// Decode the documents of an `$operationMetrics` cursor.
    ///
    /// Reading stops at the first document that fails or does not decode, and then no snapshot is
    /// returned at all.
    pub fn decode<I>(
        cursor: I,
        time: DateTime<Local>,
        num_cores: i64,
    ) -> Result<OperationMetricsSnapshot, DecodeError>
    where
        I: IntoIterator<Item = Result<Value>>,
    {
        let mut entries = BTreeMap::new();
        for document in cursor {
            let document = document.map_err(|error| DecodeError::Cursor(format!("{:#}", error)))?;
            if document.get("db").is_none() {
                return Err(DecodeError::MissingField("db"));
            }
            let entry: OperationMetricsEntry = serde_json::from_value(document)?;
            entries.insert(entry.database.clone(), entry);
        }
        Ok(OperationMetricsSnapshot { time, num_cores, entries })
    }
}

impl Sampler for OperationMetricsSnapshot {
    const NAME: &'static str = "operation metrics";
    async fn sample<C: CommandSource>(
        source: &C,
        context: &SampleContext,
    ) -> Result<Self>
    {
        let time = Local::now();
        let cursor = tokio::time::timeout(OPERATION_METRICS_TIMEOUT, source.aggregate("$operationMetrics", OPERATION_METRICS_TIMEOUT))
            .await
            .with_context(|| format!("$operationMetrics did not finish within {:?}", OPERATION_METRICS_TIMEOUT))??;
        let snapshot = OperationMetricsSnapshot::decode(cursor, time, context.num_cores)?;
        debug!("operation metrics: {} databases", snapshot.entries.len());
        Ok(snapshot)
    }
}

impl Diffable for OperationMetricsSnapshot {
    type Diff = OperationMetricsDiff;
    fn diff(
        current: &Arc<Self>,
        previous: &Arc<Self>,
    ) -> OperationMetricsDiff
    {
        let totals = previous.entries
            .iter()
            .filter_map(|(database, previous_entry)| {
                current.entries
                    .get(database)
                    .map(|current_entry| (database.clone(), current_entry.delta(previous_entry)))
            })
            .collect();
        OperationMetricsDiff {
            num_cores: previous.num_cores,
            elapsed: current.time - previous.time,
            current: Arc::clone(current),
            totals,
            time: Local::now(),
        }
    }
}

impl Rankable for OperationMetricsDiff {
    /// [SortMode::Total] orders by cpu time, [SortMode::Latency] by the document units.
    fn sort_entries(
        &self,
        sort_mode: SortMode,
    ) -> Vec<SortEntry>
    {
        self.totals
            .iter()
            .map(|(database, delta)| {
                let current_entry = self.current.entries.get(database);
                match sort_mode {
                    SortMode::Total => SortEntry::new(
                        database,
                        delta.cpu_nanos as f64,
                        current_entry.map(|entry| entry.cpu_nanos).unwrap_or_default(),
                    ),
                    SortMode::Latency => SortEntry::new(
                        database,
                        delta.total_doc_units() as f64,
                        current_entry.map(OperationMetricsEntry::total_doc_units).unwrap_or_default(),
                    ),
                }
            })
            .collect()
    }
}

impl Renderable for OperationMetricsDiff {
    /// There is no JSON representation for operation metrics.
    fn json(
        &self,
        options: &RenderOptions,
    ) -> Result<String>
    {
        shape::json_document(&serde_json::json!({ "unsupported": true }), options)
    }
    fn grid(
        &self,
        options: &RenderOptions,
    ) -> String
    {
        let elapsed_seconds = self.elapsed.num_milliseconds() as f64 / 1000_f64;

        let mut grid = GridWriter::new(GRID_COLUMN_PADDING);
        grid.write_cells([
            format!("{:>width$}", "ns", width = NAMESPACE_COLUMN_WIDTH),
            "TOTAL".to_string(),
            "total Units/s".to_string(),
            "total RUnits/s".to_string(),
            "total WUnits/s".to_string(),
            utility::format_timestamp(&self.time),
        ]);
        grid.end_row();

        for sort_entry in self.ranked(options) {
            let Some(delta) = self.totals.get(&sort_entry.key) else { continue };
            grid.write_cells([
                sort_entry.key,
                String::new(),
                format!("{}Units/s", utility::format_float(delta.total_doc_units() as f64 / elapsed_seconds, 1)),
                format!("{}RUnits/s", utility::format_float(delta.doc_units_read() as f64 / elapsed_seconds, 1)),
                format!("{}WUnits/s", utility::format_float(delta.doc_units_written as f64 / elapsed_seconds, 1)),
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
    use anyhow::anyhow;
    use chrono::Duration;

    fn document(database: &str, units_read: i64, units_written: i64, cpu_nanos: i64) -> Value {
        serde_json::json!({
            "db": database,
            "primaryMetrics": { "docBytesRead": units_read * 128, "docUnitsRead": units_read, "cursorSeeks": 3 },
            "secondaryMetrics": { "docUnitsRead": 0 },
            "docBytesWritten": units_written * 128,
            "docUnitsWritten": units_written,
            "idxEntryUnitsWritten": units_written,
            "cpuNanos": cpu_nanos,
        })
    }

    /// An aggregation that never returns.
    struct StalledSource;

    impl CommandSource for StalledSource {
        async fn run_command(&self, _command: &str) -> Result<Value> {
            std::future::pending().await
        }
        async fn aggregate(&self, _stage: &str, _timeout: std::time::Duration) -> Result<crate::source::Cursor> {
            std::future::pending().await
        }
        fn connection_string(&self) -> String {
            "http://stalled:28017".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unit_sample_operation_metrics_timeout() {
        let started = tokio::time::Instant::now();
        let result = OperationMetricsSnapshot::sample(&StalledSource, &SampleContext::default()).await;

        let error = result.unwrap_err();
        assert_eq!(format!("{}", error), "$operationMetrics did not finish within 30s");
        assert!(error.downcast_ref::<tokio::time::error::Elapsed>().is_some());
        assert!(started.elapsed() >= OPERATION_METRICS_TIMEOUT);
    }

    fn snapshot(documents: Vec<Value>, time: DateTime<Local>) -> Arc<OperationMetricsSnapshot> {
        Arc::new(OperationMetricsSnapshot::decode(documents.into_iter().map(Ok), time, 2).unwrap())
    }

    #[test]
    fn unit_decode_operation_metrics() {
        let documents = r#"
[
    {
        "db": "test",
        "primaryMetrics": {
            "docBytesRead": 2048,
            "docUnitsRead": 16,
            "idxEntryBytesRead": 311,
            "idxEntryUnitsRead": 20,
            "keysSorted": 0,
            "sorterSpills": 0,
            "docUnitsReturned": 12,
            "cursorSeeks": 7
        },
        "secondaryMetrics": {
            "docBytesRead": 0,
            "docUnitsRead": 2,
            "idxEntryBytesRead": 0,
            "idxEntryUnitsRead": 0,
            "keysSorted": 0,
            "sorterSpills": 0,
            "docUnitsReturned": 0,
            "cursorSeeks": 0
        },
        "docBytesWritten": 640,
        "docUnitsWritten": 5,
        "idxEntryBytesWritten": 120,
        "idxEntryUnitsWritten": 4,
        "cpuNanos": 1870331
    },
    {
        "db": "admin",
        "cpuNanos": 2010
    }
]"#;
        let documents: Vec<Value> = serde_json::from_str(documents).unwrap();
        let result = OperationMetricsSnapshot::decode(documents.into_iter().map(Ok), Local::now(), 4).unwrap();

        assert_eq!(result.entries.len(), 2);
        let test = &result.entries["test"];
        assert_eq!(test.primary_metrics.doc_units_returned, 12);
        assert_eq!(test.total_doc_units(), 23);
        assert_eq!(test.cpu_nanos, 1870331);
        assert_eq!(result.entries["admin"].primary_metrics, OperationMetricsMemberInfo::default());
    }

    #[test]
    fn unit_decode_operation_metrics_halts_on_error() {
        let documents: Vec<Result<Value>> = vec![
            Ok(document("test", 1, 1, 1)),
            Err(anyhow!("connection reset")),
            Ok(document("admin", 1, 1, 1)),
        ];
        let result = OperationMetricsSnapshot::decode(documents, Local::now(), 1);
        match result {
            Err(DecodeError::Cursor(message)) => assert!(message.contains("connection reset")),
            other => panic!("expected cursor error, got {:?}", other),
        }

        let documents = vec![Ok(document("test", 1, 1, 1)), Ok(serde_json::json!({ "cpuNanos": 5 }))];
        let result = OperationMetricsSnapshot::decode(documents, Local::now(), 1);
        assert!(matches!(result, Err(DecodeError::MissingField("db"))));

        let documents = vec![Ok(serde_json::json!({ "db": "test", "cpuNanos": "many" }))];
        let result = OperationMetricsSnapshot::decode(documents, Local::now(), 1);
        assert!(matches!(result, Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn unit_diff_operation_metrics() {
        let time = Local::now();
        let previous = snapshot(vec![document("test", 10, 5, 1000), document("local", 0, 0, 0)], time);
        let current = snapshot(vec![document("test", 30, 15, 4000), document("config", 0, 0, 0)], time + Duration::seconds(2));

        let diff = OperationMetricsSnapshot::diff(&current, &previous);

        assert_eq!(diff.totals.len(), 1);
        let test = &diff.totals["test"];
        assert_eq!(test.primary_metrics.doc_units_read, 20);
        assert_eq!(test.primary_metrics.cursor_seeks, 0);
        assert_eq!(test.doc_units_written, 10);
        assert_eq!(test.total_doc_units(), 30);
        assert_eq!(test.cpu_nanos, 3000);
        assert_eq!(diff.num_cores, 2);

        let grid = diff.grid(&RenderOptions::default());
        let row = grid.lines().nth(1).unwrap();
        assert_eq!(row.split_whitespace().collect::<Vec<_>>(), vec!["test", "15.0Units/s", "10.0RUnits/s", "5.0WUnits/s"]);
    }

    #[test]
    fn unit_operation_metrics_ranked_by_cpu_by_default() {
        let time = Local::now();
        let previous = snapshot(vec![document("busy_cpu", 0, 0, 0), document("busy_units", 0, 0, 0)], time);
        let current = snapshot(vec![document("busy_cpu", 1, 0, 900000), document("busy_units", 500, 500, 100)], time + Duration::seconds(1));
        let diff = OperationMetricsSnapshot::diff(&current, &previous);

        let by_cpu: Vec<String> = diff.ranked(&RenderOptions::default()).into_iter().map(|entry| entry.key).collect();
        assert_eq!(by_cpu, vec!["busy_cpu", "busy_units"]);

        let options = RenderOptions { sort_mode: SortMode::Latency, ..Default::default() };
        let by_units: Vec<String> = diff.ranked(&options).into_iter().map(|entry| entry.key).collect();
        assert_eq!(by_units, vec!["busy_units", "busy_cpu"]);
    }

    #[test]
    fn unit_operation_metrics_json_is_unsupported() {
        let time = Local::now();
        let previous = snapshot(vec![document("test", 0, 0, 0)], time);
        let current = snapshot(vec![document("test", 1, 1, 1)], time + Duration::seconds(1));
        let diff = OperationMetricsSnapshot::diff(&current, &previous);

        let json: Value = serde_json::from_str(&diff.json(&RenderOptions::default()).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "unsupported": true }));
    }
}
