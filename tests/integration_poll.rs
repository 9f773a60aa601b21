use std::{collections::VecDeque, sync::Mutex, time::Duration};
use anyhow::{bail, Result};
use serde_json::{json, Value};

use topstat::operation_metrics::OperationMetricsSnapshot;
use topstat::poll::{PollError, PollOptions, Poller};
use topstat::ranking::SortMode;
use topstat::server_status::ServerStatus;
use topstat::shape::{RenderOptions, SampleContext};
use topstat::source::{CommandSource, Cursor};
use topstat::top::TopSnapshot;

/// Hands out the replies in order, for commands and aggregations alike.
struct ReplaySource {
    replies: Mutex<VecDeque<Value>>,
}

impl ReplaySource {
    fn new(replies: Vec<Value>) -> Self {
        ReplaySource { replies: Mutex::new(replies.into()) }
    }
    fn next_reply(&self) -> Result<Value> {
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => Ok(reply),
            None => bail!("connection closed"),
        }
    }
}

impl CommandSource for ReplaySource {
    async fn run_command(&self, _command: &str) -> Result<Value> {
        self.next_reply()
    }
    async fn aggregate(&self, _stage: &str, _timeout: Duration) -> Result<Cursor> {
        match self.next_reply()? {
            Value::Array(documents) => Ok(documents.into_iter().map(Ok).collect()),
            _ => bail!("aggregation reply is not an array"),
        }
    }
    fn connection_string(&self) -> String {
        "http://replay:28017".to_string()
    }
}

fn poll_options(
    row_count: usize,
    json: bool,
    render: RenderOptions,
) -> PollOptions
{
    PollOptions { row_count, sleep_time: Duration::from_millis(1), json, render }
}

fn top_reply(namespaces: &[(&str, i64, i64)]) -> Value {
    let mut totals = serde_json::Map::new();
    totals.insert("note".to_string(), Value::from("all times in microseconds"));
    for (namespace, time, count) in namespaces {
        totals.insert(namespace.to_string(), json!({
            "total": { "time": time, "count": count },
            "readLock": { "time": time, "count": count },
            "writeLock": { "time": 0, "count": 0 },
        }));
    }
    json!({ "totals": totals, "ok": 1 })
}

#[tokio::test]
async fn integration_top_orders_by_total_time() {
    let source = ReplaySource::new(vec![
        top_reply(&[("shop.orders", 10_000, 10), ("shop.carts", 10_000, 10), ("admin.users", 1_000, 1)]),
        top_reply(&[("shop.orders", 12_000, 12), ("shop.carts", 40_000, 11), ("admin.users", 1_500, 2)]),
    ]);
    let mut poller: Poller<_, TopSnapshot> = Poller::new(source, poll_options(1, false, RenderOptions::default()), SampleContext { num_cores: 4 });
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();

    poller.run(&mut out, &mut diagnostics).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    let namespaces: Vec<&str> = out.lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(namespaces, vec!["shop.carts", "shop.orders", "admin.users"]);
    assert_eq!(String::from_utf8(diagnostics).unwrap(), "connected to: http://replay:28017\n");
}

#[tokio::test]
async fn integration_top_list_count() {
    let first: Vec<(String, i64, i64)> = (0..5).map(|number| (format!("test.c{}", number), 0, 0)).collect();
    let second: Vec<(String, i64, i64)> = (0..5).map(|number| (format!("test.c{}", number), number * 1000, number)).collect();
    fn as_refs(namespaces: &[(String, i64, i64)]) -> Vec<(&str, i64, i64)> {
        namespaces.iter().map(|(namespace, time, count)| (namespace.as_str(), *time, *count)).collect()
    }
    let source = ReplaySource::new(vec![top_reply(&as_refs(&first)), top_reply(&as_refs(&second))]);
    let render = RenderOptions { list_count: 2, sort_mode: SortMode::Total, ..Default::default() };
    let mut poller: Poller<_, TopSnapshot> = Poller::new(source, poll_options(1, false, render), SampleContext { num_cores: 1 });
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();

    poller.run(&mut out, &mut diagnostics).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    let namespaces: Vec<&str> = out.lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(namespaces, vec!["test.c4", "test.c3"]);
}

#[tokio::test]
async fn integration_operation_metrics_json() {
    let source = ReplaySource::new(vec![
        json!([
            { "db": "admin", "cpuNanos": 1_000, "docUnitsWritten": 1 },
            { "db": "shop", "cpuNanos": 5_000, "primaryMetrics": { "docUnitsRead": 10 } },
        ]),
        json!([
            { "db": "admin", "cpuNanos": 9_000, "docUnitsWritten": 1 },
            { "db": "shop", "cpuNanos": 6_000, "primaryMetrics": { "docUnitsRead": 50 } },
        ]),
    ]);
    let mut poller: Poller<_, OperationMetricsSnapshot> = Poller::new(source, poll_options(1, true, RenderOptions::default()), SampleContext::default());
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();

    poller.run(&mut out, &mut diagnostics).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    let json: Value = serde_json::from_str(out.trim_end()).unwrap();
    assert_eq!(json, json!({ "unsupported": true }));
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn integration_operation_metrics_grid() {
    let source = ReplaySource::new(vec![
        json!([
            { "db": "admin", "cpuNanos": 1_000 },
            { "db": "shop", "cpuNanos": 5_000 },
        ]),
        json!([
            { "db": "admin", "cpuNanos": 9_000 },
            { "db": "shop", "cpuNanos": 6_000 },
        ]),
    ]);
    let mut poller: Poller<_, OperationMetricsSnapshot> = Poller::new(source, poll_options(1, false, RenderOptions::default()), SampleContext::default());
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();

    poller.run(&mut out, &mut diagnostics).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    let databases: Vec<&str> = out.lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    // admin used 8000 cpu nanoseconds, shop 1000
    assert_eq!(databases, vec!["admin", "shop"]);
}

fn server_status_reply(scale: i64) -> Value {
    json!({
        "host": "db-1.local:27017",
        "version": "6.0.14",
        "process": "mongod",
        "uptimeMillis": 1000 * scale,
        "storageEngine": { "name": "wiredTiger" },
        "opcounters": { "insert": 10 * scale, "query": 20 * scale, "update": 0, "delete": 0, "getmore": 0, "command": 3 * scale },
        "connections": { "current": 7, "available": 800 },
        "ok": 1,
    })
}

#[tokio::test]
async fn integration_stat_selected_fields() {
    let source = ReplaySource::new(vec![server_status_reply(1), server_status_reply(2)]);
    let render = RenderOptions {
        fields: Some(vec!["insert".to_string(), "query".to_string(), "conn".to_string()]),
        ..Default::default()
    };
    let mut poller: Poller<_, ServerStatus> = Poller::new(source, poll_options(1, false, render), SampleContext { num_cores: 2 });
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();

    poller.run(&mut out, &mut diagnostics).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0].split_whitespace().collect::<Vec<&str>>(), vec!["insert", "query", "conn"]);
    assert_eq!(lines[1].split_whitespace().last(), Some("7"));
}

#[tokio::test]
async fn integration_stat_json_keyed_by_host() {
    let source = ReplaySource::new(vec![server_status_reply(1), server_status_reply(2)]);
    let render = RenderOptions {
        fields: Some(vec!["insert".to_string(), "conn".to_string()]),
        ..Default::default()
    };
    let mut poller: Poller<_, ServerStatus> = Poller::new(source, poll_options(1, true, render), SampleContext { num_cores: 2 });
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();

    poller.run(&mut out, &mut diagnostics).await.unwrap();

    let json: Value = serde_json::from_str(String::from_utf8(out).unwrap().trim_end()).unwrap();
    let fields = json["db-1.local:27017"].as_object().unwrap();
    assert_eq!(fields.keys().collect::<Vec<&String>>(), vec!["conn", "insert"]);
    assert_eq!(fields["conn"], "7");
}

#[tokio::test]
async fn integration_server_gone_at_startup() {
    let source = ReplaySource::new(vec![]);
    let mut poller: Poller<_, TopSnapshot> = Poller::new(source, poll_options(0, false, RenderOptions::default()), SampleContext::default());
    let mut out = Vec::new();
    let mut diagnostics = Vec::new();

    let result = poller.run(&mut out, &mut diagnostics).await;

    assert!(matches!(result, Err(PollError::FatalStartup(_))));
    assert!(out.is_empty());
}
