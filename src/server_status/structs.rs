//! The structs
//!
use std::{collections::BTreeMap, sync::Arc};
use chrono::{DateTime, Local};
use serde_json::Value;
use crate::locks::LockStats;
/// The parts of the `serverStatus` reply that are used by the stat line.
///
/// Most sections depend on the server version, storage engine and topology, and are optional.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerStatus {
    #[serde(skip)]
    pub sample_time: DateTime<Local>,
    #[serde(skip)]
    pub num_cores: i64,
    /// The complete reply, for the columns selected by their `serverStatus` path.
    #[serde(skip)]
    pub reply: Value,
    pub host: String,
    pub version: String,
    pub process: String,
    pub uptime_millis: i64,
    pub shard_cursor_type: Option<Value>,
    pub storage_engine: Option<StorageEngine>,
    pub opcounters: Option<OpcountStats>,
    pub opcounters_repl: Option<OpcountStats>,
    pub wired_tiger: Option<WiredTiger>,
    pub background_flushing: Option<FlushStats>,
    pub mem: Option<MemStats>,
    #[serde(rename = "extra_info")]
    pub extra_info: Option<ExtraInfo>,
    pub metrics: Option<MetricsStats>,
    pub op_latencies: Option<OpLatenciesStats>,
    pub global_lock: Option<GlobalLockStats>,
    pub locks: Option<BTreeMap<String, LockStats>>,
    pub network: NetworkStats,
    pub connections: ConnectionStats,
    pub repl: Option<ReplStatus>,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StorageEngine {
    pub name: String,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct OpcountStats {
    pub insert: i64,
    pub query: i64,
    pub update: i64,
    pub delete: i64,
    pub getmore: i64,
    pub command: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WiredTiger {
    pub cache: CacheStats,
    pub transaction: TransactionStats,
    #[serde(rename = "concurrentTransactions")]
    pub concurrent_transactions: ConcurrentTransactions,
}
/// The WiredTiger cache statistics, which are named with spaces.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CacheStats {
    #[serde(rename = "tracked dirty bytes in the cache")]
    pub tracked_dirty_bytes: i64,
    #[serde(rename = "bytes currently in the cache")]
    pub current_cached_bytes: i64,
    #[serde(rename = "maximum bytes configured")]
    pub max_bytes_configured: i64,
    #[serde(rename = "bytes read into cache")]
    pub bytes_read_into_cache: i64,
    #[serde(rename = "bytes written from cache")]
    pub bytes_written_from_cache: i64,
    #[serde(rename = "pages read into cache")]
    pub pages_read_into_cache: i64,
    #[serde(rename = "pages requested from the cache")]
    pub pages_requested_from_cache: i64,
    #[serde(rename = "pages written from cache")]
    pub pages_written_from_cache: i64,
    #[serde(rename = "pages currently held in the cache")]
    pub pages_currently_held_in_cache: i64,
    #[serde(rename = "unmodified pages evicted")]
    pub unmodified_pages_evicted: i64,
    #[serde(rename = "modified pages evicted")]
    pub modified_pages_evicted: i64,
    #[serde(rename = "internal pages evicted")]
    pub internal_pages_evicted: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TransactionStats {
    #[serde(rename = "transaction checkpoints")]
    pub transaction_checkpoints: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ConcurrentTransactions {
    pub read: ConcurrentTransactionStats,
    pub write: ConcurrentTransactionStats,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ConcurrentTransactionStats {
    pub out: i64,
    pub available: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FlushStats {
    pub flushes: i64,
}
/// Memory sizes in megabytes.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MemStats {
    pub supported: bool,
    pub mapped: i64,
    #[serde(rename = "virtual")]
    pub virtual_size: i64,
    pub resident: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ExtraInfo {
    pub page_faults: Option<i64>,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsStats {
    pub document: DocumentStats,
    pub operation: OperationStats,
    pub query_executor: QueryExecutorStats,
    pub record: RecordStats,
    pub get_last_error: GetLastErrorStats,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DocumentStats {
    pub returned: i64,
    pub inserted: i64,
    pub updated: i64,
    pub deleted: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationStats {
    pub scan_and_order: i64,
    pub write_conflicts: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryExecutorStats {
    pub scanned: i64,
    pub scanned_objects: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RecordStats {
    pub moves: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GetLastErrorStats {
    pub wtime: WaitTimeStats,
    pub wtimeouts: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WaitTimeStats {
    pub num: i64,
    pub total_millis: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct OpLatenciesStats {
    pub reads: LatencyStats,
    pub writes: LatencyStats,
    pub commands: LatencyStats,
}
/// The accumulated latency (microseconds) and number of operations.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct LatencyStats {
    pub latency: i64,
    pub ops: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalLockStats {
    pub total_time: i64,
    pub lock_time: i64,
    pub current_queue: Option<QueueStats>,
    pub active_clients: Option<QueueStats>,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct QueueStats {
    pub total: i64,
    pub readers: i64,
    pub writers: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkStats {
    pub bytes_in: i64,
    pub bytes_out: i64,
    pub num_requests: i64,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionStats {
    pub current: i64,
    pub available: i64,
    pub total_created: i64,
}
/// The replication state, from the `repl` section.
///
/// The state flags are not consistently typed over server versions, and are interpreted by
/// their truthiness.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ReplStatus {
    #[serde(rename = "setName")]
    pub set_name: String,
    #[serde(rename = "ismaster")]
    pub is_master: Option<Value>,
    pub secondary: Option<Value>,
    #[serde(rename = "isreplicaset")]
    pub is_replica_set: Option<Value>,
    #[serde(rename = "arbiterOnly")]
    pub arbiter_only: Option<Value>,
    pub passives: Vec<String>,
    pub me: String,
}
/// What the server and the invocation support, to decide which stat line columns are active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub wired_tiger: bool,
    pub mmap: bool,
    pub mongos: bool,
    pub replica_set: bool,
    pub locks: bool,
    pub collection_locks: bool,
    pub metrics: bool,
    pub op_latencies: bool,
    pub multiple_hosts: bool,
    pub all: bool,
}
/// Settings for the readers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    pub cpu_count: i64,
    pub human_readable: bool,
}
/// A single stat line column.
///
/// `read` gets the current sample first, then the previous sample.
pub struct StatHeader {
    pub key: &'static str,
    pub name: &'static str,
    pub active: fn(&Capabilities) -> bool,
    pub read: fn(&ReaderConfig, &ServerStatus, &ServerStatus) -> String,
}
/// A stat line column: a column of the registry, or a `serverStatus` field selected by its
/// dotted path, optionally suffixed with `.diff()` or `.rate()`.
#[derive(Clone, Copy)]
pub enum StatColumn<'a> {
    Registry(&'static StatHeader),
    Field(&'a str),
}
/// Two adjacent `serverStatus` samples, which is the diff of the stat line mode.
#[derive(Debug)]
pub struct StatLine {
    pub current: Arc<ServerStatus>,
    pub previous: Arc<ServerStatus>,
}
