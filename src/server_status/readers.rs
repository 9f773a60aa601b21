//! The stat line columns and the functions reading them
//!
use std::sync::LazyLock;
use regex::Regex;
use serde_json::Value;
use crate::locks::LockStats;
use crate::server_status::{Capabilities, OpcountStats, ReaderConfig, ServerStatus, StatHeader};
use crate::utility;

/// The stat line columns, in output order.
pub static STAT_HEADERS: &[StatHeader] = &[
    StatHeader { key: "host", name: "Host", active: with_multiple_hosts, read: read_host },
    StatHeader { key: "storage_engine", name: "Storage engine", active: when_selected, read: read_storage_engine },
    StatHeader { key: "insert", name: "Insert opcounter (diff)", active: always, read: read_insert },
    StatHeader { key: "query", name: "Query opcounter (diff)", active: always, read: read_query },
    StatHeader { key: "update", name: "Update opcounter (diff)", active: always, read: read_update },
    StatHeader { key: "delete", name: "Delete opcounter (diff)", active: always, read: read_delete },
    StatHeader { key: "getmore", name: "GetMore opcounter (diff)", active: always, read: read_getmore },
    StatHeader { key: "command", name: "Command opcounter (diff)", active: always, read: read_command },
    StatHeader { key: "dirty", name: "Cache dirty (percentage)", active: with_wired_tiger, read: read_dirty },
    StatHeader { key: "used", name: "Cache used (percentage)", active: with_wired_tiger, read: read_used },
    StatHeader { key: "read", name: "Cache bytes read into (diff)", active: with_wired_tiger, read: read_cache_bytes_read_into },
    StatHeader { key: "written", name: "Cache bytes written from (diff)", active: with_wired_tiger, read: read_cache_bytes_written_from },
    StatHeader { key: "pread", name: "Cache pages read into (diff)", active: with_wired_tiger, read: read_cache_pages_read_into },
    StatHeader { key: "preq", name: "Cache pages requested (diff)", active: with_wired_tiger, read: read_cache_pages_requested },
    StatHeader { key: "pwritten", name: "Cache pages written from (diff)", active: with_wired_tiger, read: read_cache_pages_written_from },
    StatHeader { key: "pagehit%", name: "Cache page hit ratio (percentage)", active: with_wired_tiger, read: read_cache_page_hit_ratio },
    StatHeader { key: "evict-um", name: "Cache unmodified pages evicted (diff)", active: with_wired_tiger, read: read_evicted_unmodified },
    StatHeader { key: "evict-m", name: "Cache modified pages evicted (diff)", active: with_wired_tiger, read: read_evicted_modified },
    StatHeader { key: "evict-i", name: "Cache internal pages evicted (diff)", active: with_wired_tiger, read: read_evicted_internal },
    StatHeader { key: "r%|w%|em%|eum%", name: "Cache page stats (percentage)", active: with_wired_tiger, read: read_cache_percentages },
    StatHeader { key: "flushes", name: "Number of flushes (diff)", active: always, read: read_flushes },
    StatHeader { key: "mapped", name: "Mapped (size)", active: with_mmap, read: read_mapped },
    StatHeader { key: "vsize", name: "Virtual (size)", active: always, read: read_vsize },
    StatHeader { key: "res", name: "Resident (size)", active: always, read: read_res },
    StatHeader { key: "nonmapped", name: "Non-mapped (size)", active: with_mmap_and_all, read: read_non_mapped },
    StatHeader { key: "faults", name: "Page faults (diff)", active: with_mmap, read: read_faults },
    StatHeader { key: "lrw", name: "Lock acquire count, read|write (diff percentage)", active: with_mmap_collection_locks_and_all, read: read_lock_waits },
    StatHeader { key: "lrwt", name: "Lock acquire time, read|write (diff percentage)", active: with_mmap_collection_locks_and_all, read: read_lock_wait_times },
    StatHeader { key: "locked_db", name: "Locked db info, '(db):(percentage)'", active: with_locks, read: read_locked_db },
    StatHeader { key: "sao", name: "Scan and Order (diff)", active: with_metrics_and_all, read: read_scan_and_order },
    StatHeader { key: "wc", name: "Write Conflicts (diff)", active: with_metrics_and_all, read: read_write_conflicts },
    StatHeader { key: "ns", name: "NScanned (diff)", active: with_metrics_and_all, read: read_scanned },
    StatHeader { key: "nso", name: "NScanned Objects (diff)", active: with_metrics_and_all, read: read_scanned_objects },
    StatHeader { key: "effic", name: "Query Efficiency: max(nscanned, nscannedObjects)/nreturned (ratio)", active: with_metrics_and_all, read: read_query_efficiency },
    StatHeader { key: "r|i|u|d", name: "Document metrics Returned|Inserted|Updated|Deleted (diff)", active: with_metrics_and_all, read: read_document_stats },
    StatHeader { key: "moves", name: "Document moves (diff)", active: with_metrics_mmap_and_all, read: read_moves },
    StatHeader { key: "gleto", name: "Get Last Error timeouts (diff)", active: with_metrics_and_all, read: read_gle_timeouts },
    StatHeader { key: "glems", name: "Average time waiting for GLE (millis)", active: with_metrics_and_all, read: read_gle_millis },
    StatHeader { key: "r|w|c", name: "Average execution time per read/write/command (millis)", active: with_op_latencies, read: read_op_latencies },
    StatHeader { key: "r%|w%|c%", name: "Average utilization percent per read/write/command (diff percentage)", active: with_op_latencies, read: read_op_latency_util_percent },
    StatHeader { key: "qrw", name: "Queued accesses, read|write", active: always, read: read_queued },
    StatHeader { key: "arw", name: "Active accesses, read|write", active: always, read: read_active },
    StatHeader { key: "net_in", name: "Network input (size)", active: always, read: read_net_in },
    StatHeader { key: "net_out", name: "Network output (size)", active: always, read: read_net_out },
    StatHeader { key: "conn", name: "Current connection count", active: always, read: read_connections },
    StatHeader { key: "set", name: "Replica set name", active: with_replica_set, read: read_set },
    StatHeader { key: "repl", name: "Replica set type", active: with_replica_set, read: read_repl },
    StatHeader { key: "time", name: "Time of sample", active: always, read: read_time },
];

/// Matches a process name of `mongos` that is not followed by a path separator before the next whitespace.
static MONGOS_PROCESS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.*\bmongos\b[^\\/]*(\s.*)?$").unwrap());

fn always(_capabilities: &Capabilities) -> bool { true }
/// Only shown when selected with `--fields`.
fn when_selected(_capabilities: &Capabilities) -> bool { false }
fn with_multiple_hosts(capabilities: &Capabilities) -> bool { capabilities.multiple_hosts }
fn with_wired_tiger(capabilities: &Capabilities) -> bool { capabilities.wired_tiger }
fn with_mmap(capabilities: &Capabilities) -> bool { capabilities.mmap }
fn with_mmap_and_all(capabilities: &Capabilities) -> bool { capabilities.mmap && capabilities.all }
fn with_locks(capabilities: &Capabilities) -> bool { capabilities.locks }
fn with_mmap_collection_locks_and_all(capabilities: &Capabilities) -> bool { capabilities.mmap && capabilities.collection_locks && capabilities.all }
fn with_metrics_and_all(capabilities: &Capabilities) -> bool { capabilities.metrics && capabilities.all }
fn with_metrics_mmap_and_all(capabilities: &Capabilities) -> bool { capabilities.metrics && capabilities.mmap && capabilities.all }
fn with_op_latencies(capabilities: &Capabilities) -> bool { capabilities.op_latencies }
fn with_replica_set(capabilities: &Capabilities) -> bool { capabilities.replica_set }

/// The seconds between two samples.
fn sample_seconds(
    new_stat: &ServerStatus,
    old_stat: &ServerStatus,
) -> f64
{
    (new_stat.sample_time - old_stat.sample_time).num_milliseconds() as f64 / 1000_f64
}

/// The change per second, 0 if no time has elapsed.
fn rate(
    new_value: i64,
    old_value: i64,
    sample_seconds: f64,
) -> i64
{
    if sample_seconds <= 0_f64 {
        return 0;
    }
    ((new_value - old_value) as f64 / sample_seconds) as i64
}

/// `value` as percentage of `out_of`, 0 if either is 0.
fn percentage(
    value: i64,
    out_of: i64,
) -> f64
{
    if value == 0 || out_of == 0 {
        return 0_f64;
    }
    100_f64 * (value as f64 / out_of as f64)
}

/// `value / out_of`, 0 if either is 0.
fn average(
    value: i64,
    out_of: i64,
) -> i64
{
    if value == 0 || out_of == 0 {
        return 0;
    }
    value / out_of
}

/// A value is truthy when it is `true`, a non-zero number or a non-empty string.
fn is_truthy(value: &Option<Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|number| number != 0_f64).unwrap_or(false),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

fn format_bits(human_readable: bool, amount: i64) -> String {
    if human_readable { utility::format_bits(amount) } else { amount.to_string() }
}

fn format_byte_amount(human_readable: bool, amount: i64) -> String {
    if human_readable { utility::format_byte_amount(amount) } else { amount.to_string() }
}

fn format_megabyte_amount(human_readable: bool, amount: i64) -> String {
    if human_readable { utility::format_megabyte_amount(amount) } else { amount.saturating_mul(1024 * 1024).to_string() }
}

pub fn storage_engine(stat: &ServerStatus) -> &str {
    match &stat.storage_engine {
        Some(storage_engine) if !storage_engine.name.is_empty() => storage_engine.name.as_str(),
        _ => "mmapv1",
    }
}

pub fn is_mongos(stat: &ServerStatus) -> bool {
    stat.shard_cursor_type.is_some() || MONGOS_PROCESS.is_match(&stat.process)
}

pub fn is_replica_set(stat: &ServerStatus) -> bool {
    stat.repl
        .as_ref()
        .map(|repl| matches!(repl.is_replica_set, Some(Value::Bool(true))) || !repl.set_name.is_empty())
        .unwrap_or(false)
}

pub fn is_mmap(stat: &ServerStatus) -> bool {
    storage_engine(stat) == "mmapv1"
}

pub fn is_wired_tiger(stat: &ServerStatus) -> bool {
    storage_engine(stat) == "wiredTiger"
}

pub fn has_locks(stat: &ServerStatus) -> bool {
    !read_locked_db(&ReaderConfig::default(), stat, stat).is_empty()
}

/// The server reports lock acquisitions, and how many of the collection lock acquisitions waited.
pub fn has_collection_locks(stat: &ServerStatus) -> bool {
    collection_locks(stat, stat).is_some()
}

pub fn has_metrics(stat: &ServerStatus) -> bool {
    stat.metrics.is_some()
}

pub fn has_op_latencies(stat: &ServerStatus) -> bool {
    stat.op_latencies.is_some()
}

/// The keys and names of the registry columns, one per line.
pub fn describe_fields() -> String {
    let width = STAT_HEADERS
        .iter()
        .map(|header| header.key.len())
        .max()
        .unwrap_or_default();
    STAT_HEADERS
        .iter()
        .map(|header| format!("{:width$}  {}", header.key, header.name, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The operation counter rate of the primary and the replicated operations.
///
/// Replicated operations only are marked with `*`, `both` always shows both separated by `|`.
fn diff_opcounter(
    new_stat: &ServerStatus,
    old_stat: &ServerStatus,
    field: fn(&OpcountStats) -> i64,
    both: bool,
) -> String
{
    let seconds = sample_seconds(new_stat, old_stat);
    let opcount = match (&new_stat.opcounters, &old_stat.opcounters) {
        (Some(new_counters), Some(old_counters)) => rate(field(new_counters), field(old_counters), seconds),
        _ => 0,
    };
    let opcount_repl = match (&new_stat.opcounters_repl, &old_stat.opcounters_repl) {
        (Some(new_counters), Some(old_counters)) => rate(field(new_counters), field(old_counters), seconds),
        _ => 0,
    };
    if both || opcount > 0 && opcount_repl > 0 {
        format!("{}|{}", opcount, opcount_repl)
    } else if opcount > 0 {
        opcount.to_string()
    } else if opcount_repl > 0 {
        format!("*{}", opcount_repl)
    } else {
        "*0".to_string()
    }
}

pub fn read_host(_config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    new_stat.host.clone()
}

pub fn read_storage_engine(_config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    storage_engine(new_stat).to_string()
}

pub fn read_insert(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    diff_opcounter(new_stat, old_stat, |counters| counters.insert, false)
}

pub fn read_query(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    diff_opcounter(new_stat, old_stat, |counters| counters.query, false)
}

pub fn read_update(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    diff_opcounter(new_stat, old_stat, |counters| counters.update, false)
}

pub fn read_delete(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    diff_opcounter(new_stat, old_stat, |counters| counters.delete, false)
}

pub fn read_getmore(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.opcounters, &old_stat.opcounters) {
        (Some(new_counters), Some(old_counters)) => rate(new_counters.getmore, old_counters.getmore, sample_seconds(new_stat, old_stat)).to_string(),
        _ => "0".to_string(),
    }
}

pub fn read_command(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    diff_opcounter(new_stat, old_stat, |counters| counters.command, true)
}

fn cache_fraction(config: &ReaderConfig, bytes: i64, max: i64) -> String {
    if max == 0 {
        return String::new();
    }
    let fraction = format!("{:.1}", 100_f64 * bytes as f64 / max as f64);
    if config.human_readable { format!("{}%", fraction) } else { fraction }
}

pub fn read_dirty(config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    match &new_stat.wired_tiger {
        Some(wired_tiger) => cache_fraction(config, wired_tiger.cache.tracked_dirty_bytes, wired_tiger.cache.max_bytes_configured),
        None => String::new(),
    }
}

pub fn read_used(config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    match &new_stat.wired_tiger {
        Some(wired_tiger) => cache_fraction(config, wired_tiger.cache.current_cached_bytes, wired_tiger.cache.max_bytes_configured),
        None => String::new(),
    }
}

/// The rate of a WiredTiger cache counter, empty without WiredTiger.
fn cache_rate(
    new_stat: &ServerStatus,
    old_stat: &ServerStatus,
    field: fn(&crate::server_status::CacheStats) -> i64,
) -> Option<i64>
{
    match (&new_stat.wired_tiger, &old_stat.wired_tiger) {
        (Some(new_wired_tiger), Some(old_wired_tiger)) => Some(rate(field(&new_wired_tiger.cache), field(&old_wired_tiger.cache), sample_seconds(new_stat, old_stat))),
        _ => None,
    }
}

pub fn read_cache_bytes_read_into(config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.bytes_read_into_cache)
        .map(|bytes| format_byte_amount(config.human_readable, bytes))
        .unwrap_or_default()
}

pub fn read_cache_bytes_written_from(config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.bytes_written_from_cache)
        .map(|bytes| format_byte_amount(config.human_readable, bytes))
        .unwrap_or_default()
}

pub fn read_cache_pages_read_into(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.pages_read_into_cache)
        .map(|pages| pages.to_string())
        .unwrap_or_default()
}

pub fn read_cache_pages_requested(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.pages_requested_from_cache)
        .map(|pages| pages.to_string())
        .unwrap_or_default()
}

pub fn read_cache_pages_written_from(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.pages_written_from_cache)
        .map(|pages| pages.to_string())
        .unwrap_or_default()
}

pub fn read_cache_page_hit_ratio(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.wired_tiger, &old_stat.wired_tiger) {
        (Some(new_wired_tiger), Some(old_wired_tiger)) => {
            let requested = new_wired_tiger.cache.pages_requested_from_cache - old_wired_tiger.cache.pages_requested_from_cache;
            let read_into = new_wired_tiger.cache.pages_read_into_cache - old_wired_tiger.cache.pages_read_into_cache;
            format!("{:.1}%", percentage(requested - read_into, requested))
        },
        _ => String::new(),
    }
}

pub fn read_evicted_unmodified(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.unmodified_pages_evicted)
        .map(|pages| pages.to_string())
        .unwrap_or_default()
}

pub fn read_evicted_modified(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.modified_pages_evicted)
        .map(|pages| pages.to_string())
        .unwrap_or_default()
}

pub fn read_evicted_internal(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    cache_rate(new_stat, old_stat, |cache| cache.internal_pages_evicted)
        .map(|pages| pages.to_string())
        .unwrap_or_default()
}

/// Pages read, written, modified evicted and unmodified evicted as percentage of the pages in the cache.
pub fn read_cache_percentages(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.wired_tiger, &old_stat.wired_tiger) {
        (Some(new_wired_tiger), Some(old_wired_tiger)) => {
            let new_cache = &new_wired_tiger.cache;
            let old_cache = &old_wired_tiger.cache;
            let held = new_cache.pages_currently_held_in_cache;
            format!("{:.1}%|{:.1}%|{:.1}%|{:.1}%",
                percentage(new_cache.pages_read_into_cache - old_cache.pages_read_into_cache, held),
                percentage(new_cache.pages_written_from_cache - old_cache.pages_written_from_cache, held),
                percentage(new_cache.modified_pages_evicted - old_cache.modified_pages_evicted, held),
                percentage(new_cache.unmodified_pages_evicted - old_cache.unmodified_pages_evicted, held),
            )
        },
        _ => String::new(),
    }
}

/// WiredTiger checkpoints, or background flushes for older storage engines.
pub fn read_flushes(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    let flushes = if let (Some(new_wired_tiger), Some(old_wired_tiger)) = (&new_stat.wired_tiger, &old_stat.wired_tiger) {
        new_wired_tiger.transaction.transaction_checkpoints - old_wired_tiger.transaction.transaction_checkpoints
    } else if let (Some(new_flushing), Some(old_flushing)) = (&new_stat.background_flushing, &old_stat.background_flushing) {
        new_flushing.flushes - old_flushing.flushes
    } else {
        0
    };
    flushes.to_string()
}

pub fn read_mapped(config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    match &new_stat.mem {
        Some(mem) if mem.supported && is_mongos(new_stat) => format_megabyte_amount(config.human_readable, mem.mapped),
        _ => String::new(),
    }
}

pub fn read_vsize(config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    match &new_stat.mem {
        Some(mem) if mem.supported => format_megabyte_amount(config.human_readable, mem.virtual_size),
        _ => String::new(),
    }
}

pub fn read_res(config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    match &new_stat.mem {
        Some(mem) if mem.supported => format_megabyte_amount(config.human_readable, mem.resident),
        _ => String::new(),
    }
}

pub fn read_non_mapped(config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    match &new_stat.mem {
        Some(mem) if mem.supported && !is_mongos(new_stat) => format_megabyte_amount(config.human_readable, mem.virtual_size - mem.mapped),
        _ => String::new(),
    }
}

/// Page faults per second, `n/a` for storage engines other than mmapv1 and -1 when not reported.
pub fn read_faults(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    if !is_mmap(new_stat) {
        return "n/a".to_string();
    }
    let new_faults = new_stat.extra_info.and_then(|extra_info| extra_info.page_faults);
    let old_faults = old_stat.extra_info.and_then(|extra_info| extra_info.page_faults);
    match (new_faults, old_faults) {
        (Some(new_faults), Some(old_faults)) => rate(new_faults, old_faults, sample_seconds(new_stat, old_stat)).to_string(),
        _ => "-1".to_string(),
    }
}

/// The database with the most lock time in the interval, as `db:percentage%`.
///
/// The write lock time of the global lock `.` is added when another database is the most locked.
/// Without databases in both samples, the global lock ratio is shown.
pub fn read_locked_db(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    if is_mongos(new_stat) {
        return String::new();
    }
    let (Some(new_locks), Some(old_locks)) = (&new_stat.locks, &old_stat.locks) else { return String::new() };
    if old_locks.get("Global").map(|global| global.acquire_count.is_some()).unwrap_or(false) {
        return String::new();
    }

    // (database, read, write) for the databases in both samples
    let lock_usages: Vec<(&str, i64, i64)> = new_locks
        .iter()
        .filter_map(|(database, new_lock)| {
            old_locks.get(database).map(|old_lock| (
                database.as_str(),
                new_lock.time_locked_micros.read_total() - old_lock.time_locked_micros.read_total(),
                new_lock.time_locked_micros.write_total() - old_lock.time_locked_micros.write_total(),
            ))
        })
        .collect();

    let highest_locked = lock_usages
        .iter()
        .max_by(|left, right| (left.1 + left.2).cmp(&(right.1 + right.2)).then_with(|| right.0.cmp(left.0)));
    match highest_locked {
        None => match &new_stat.global_lock {
            Some(global_lock) => format!(":{:.1}%", percentage(global_lock.lock_time, global_lock.total_time)),
            None => String::new(),
        },
        Some((database, _reads, writes)) => {
            let mut lock_to_report = *writes;
            if *database != "." {
                lock_to_report += lock_usages
                    .iter()
                    .filter(|(other_database, _, _)| *other_database == ".")
                    .map(|(_, _, other_writes)| other_writes)
                    .sum::<i64>();
            }
            // lock time is in microseconds, uptime in milliseconds
            lock_to_report /= 1000;
            format!("{}:{:.1}%", database, percentage(lock_to_report, new_stat.uptime_millis - old_stat.uptime_millis))
        },
    }
}

/// The `Collection` lock statistics of both samples, when acquisitions and waits are reported.
fn collection_locks<'a>(
    new_stat: &'a ServerStatus,
    old_stat: &'a ServerStatus,
) -> Option<(&'a LockStats, &'a LockStats)>
{
    if is_mongos(new_stat) {
        return None;
    }
    let (new_locks, old_locks) = (new_stat.locks.as_ref()?, old_stat.locks.as_ref()?);
    old_locks.get("Global")?.acquire_count?;
    let (new_collection, old_collection) = (new_locks.get("Collection")?, old_locks.get("Collection")?);
    new_collection.acquire_wait_count?;
    old_collection.acquire_wait_count?;
    Some((new_collection, old_collection))
}

/// The collection lock acquisitions that had to wait, as `read%|write%` of all acquisitions.
pub fn read_lock_waits(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    let Some((new_collection, old_collection)) = collection_locks(new_stat, old_stat) else { return String::new() };
    let (new_waits, old_waits) = (new_collection.acquire_wait_count.unwrap_or_default(), old_collection.acquire_wait_count.unwrap_or_default());
    let (new_acquires, old_acquires) = (new_collection.acquire_count.unwrap_or_default(), old_collection.acquire_count.unwrap_or_default());
    format!(
        "{:.1}%|{:.1}%",
        percentage(new_waits.read - old_waits.read, new_acquires.read - old_acquires.read),
        percentage(new_waits.write - old_waits.write, new_acquires.write - old_acquires.write),
    )
}

/// The average time in microseconds a waiting collection lock acquisition took, as `read|write`.
pub fn read_lock_wait_times(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    let Some((new_collection, old_collection)) = collection_locks(new_stat, old_stat) else { return String::new() };
    let (new_waits, old_waits) = (new_collection.acquire_wait_count.unwrap_or_default(), old_collection.acquire_wait_count.unwrap_or_default());
    let (new_time, old_time) = (new_collection.time_acquiring_micros, old_collection.time_acquiring_micros);
    format!(
        "{}|{}",
        average(new_time.read - old_time.read, new_waits.read - old_waits.read),
        average(new_time.write - old_time.write, new_waits.write - old_waits.write),
    )
}

/// The rate of a metrics counter, empty without metrics.
fn metrics_rate(
    new_stat: &ServerStatus,
    old_stat: &ServerStatus,
    field: fn(&crate::server_status::MetricsStats) -> i64,
) -> String
{
    match (&new_stat.metrics, &old_stat.metrics) {
        (Some(new_metrics), Some(old_metrics)) => rate(field(new_metrics), field(old_metrics), sample_seconds(new_stat, old_stat)).to_string(),
        _ => String::new(),
    }
}

pub fn read_scan_and_order(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    metrics_rate(new_stat, old_stat, |metrics| metrics.operation.scan_and_order)
}

pub fn read_write_conflicts(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    metrics_rate(new_stat, old_stat, |metrics| metrics.operation.write_conflicts)
}

pub fn read_scanned(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    metrics_rate(new_stat, old_stat, |metrics| metrics.query_executor.scanned)
}

pub fn read_scanned_objects(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    metrics_rate(new_stat, old_stat, |metrics| metrics.query_executor.scanned_objects)
}

/// The larger of keys and documents scanned per document returned.
pub fn read_query_efficiency(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.metrics, &old_stat.metrics) {
        (Some(new_metrics), Some(old_metrics)) => {
            let max_scanned = ((new_metrics.query_executor.scanned - old_metrics.query_executor.scanned) as f64)
                .max((new_metrics.query_executor.scanned_objects - old_metrics.query_executor.scanned_objects) as f64);
            let returned = ((new_metrics.document.returned - old_metrics.document.returned) as f64).max(1_f64);
            format!("{:.1}", max_scanned / returned)
        },
        _ => String::new(),
    }
}

pub fn read_document_stats(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.metrics, &old_stat.metrics) {
        (Some(new_metrics), Some(old_metrics)) => {
            let seconds = sample_seconds(new_stat, old_stat);
            format!("{}|{}|{}|{}",
                rate(new_metrics.document.returned, old_metrics.document.returned, seconds),
                rate(new_metrics.document.inserted, old_metrics.document.inserted, seconds),
                rate(new_metrics.document.updated, old_metrics.document.updated, seconds),
                rate(new_metrics.document.deleted, old_metrics.document.deleted, seconds),
            )
        },
        _ => String::new(),
    }
}

pub fn read_moves(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    metrics_rate(new_stat, old_stat, |metrics| metrics.record.moves)
}

pub fn read_gle_timeouts(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    metrics_rate(new_stat, old_stat, |metrics| metrics.get_last_error.wtimeouts)
}

pub fn read_gle_millis(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.metrics, &old_stat.metrics) {
        (Some(new_metrics), Some(old_metrics)) => {
            let number = new_metrics.get_last_error.wtime.num - old_metrics.get_last_error.wtime.num;
            let millis = new_metrics.get_last_error.wtime.total_millis - old_metrics.get_last_error.wtime.total_millis;
            average(millis, number).to_string()
        },
        _ => String::new(),
    }
}

/// Average milliseconds per read, write and command.
pub fn read_op_latencies(_config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.op_latencies, &old_stat.op_latencies) {
        (Some(new_latencies), Some(old_latencies)) => {
            format!("{}|{}|{}",
                average(new_latencies.reads.latency - old_latencies.reads.latency, new_latencies.reads.ops - old_latencies.reads.ops) / 1000,
                average(new_latencies.writes.latency - old_latencies.writes.latency, new_latencies.writes.ops - old_latencies.writes.ops) / 1000,
                average(new_latencies.commands.latency - old_latencies.commands.latency, new_latencies.commands.ops - old_latencies.commands.ops) / 1000,
            )
        },
        _ => String::new(),
    }
}

/// Time spent in reads, writes and commands per cpu core, as percentage of the elapsed time.
pub fn read_op_latency_util_percent(config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    match (&new_stat.op_latencies, &old_stat.op_latencies) {
        (Some(new_latencies), Some(old_latencies)) => {
            let sample_micros = (new_stat.sample_time - old_stat.sample_time).num_microseconds().unwrap_or_default();
            let per_core = |micros: i64| micros.checked_div(config.cpu_count).unwrap_or_default();
            format!("{:.1}%|{:.1}%|{:.1}%",
                percentage(per_core(new_latencies.reads.latency - old_latencies.reads.latency), sample_micros),
                percentage(per_core(new_latencies.writes.latency - old_latencies.writes.latency), sample_micros),
                percentage(per_core(new_latencies.commands.latency - old_latencies.commands.latency), sample_micros),
            )
        },
        _ => String::new(),
    }
}

/// Queued readers and writers. With WiredTiger, the clients that did not get a ticket.
pub fn read_queued(_config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    let (mut queued_readers, mut queued_writers) = (0, 0);
    if let Some(global_lock) = &new_stat.global_lock {
        if let Some(current_queue) = &global_lock.current_queue {
            match &new_stat.wired_tiger {
                Some(wired_tiger) => {
                    let active_clients = global_lock.active_clients.unwrap_or_default();
                    queued_readers = (current_queue.readers + active_clients.readers - wired_tiger.concurrent_transactions.read.out).max(0);
                    queued_writers = (current_queue.writers + active_clients.writers - wired_tiger.concurrent_transactions.write.out).max(0);
                },
                None => {
                    queued_readers = current_queue.readers;
                    queued_writers = current_queue.writers;
                },
            }
        }
    }
    format!("{}|{}", queued_readers, queued_writers)
}

pub fn read_active(_config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    let (mut active_readers, mut active_writers) = (0, 0);
    if let Some(global_lock) = &new_stat.global_lock {
        if let Some(wired_tiger) = &new_stat.wired_tiger {
            active_readers = wired_tiger.concurrent_transactions.read.out;
            active_writers = wired_tiger.concurrent_transactions.write.out;
        } else if let Some(active_clients) = &global_lock.active_clients {
            active_readers = active_clients.readers;
            active_writers = active_clients.writers;
        }
    }
    format!("{}|{}", active_readers, active_writers)
}

pub fn read_net_in(config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    format_bits(config.human_readable, rate(new_stat.network.bytes_in, old_stat.network.bytes_in, sample_seconds(new_stat, old_stat)))
}

pub fn read_net_out(config: &ReaderConfig, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    format_bits(config.human_readable, rate(new_stat.network.bytes_out, old_stat.network.bytes_out, sample_seconds(new_stat, old_stat)))
}

pub fn read_connections(_config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    new_stat.connections.current.to_string()
}

pub fn read_set(_config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    new_stat.repl
        .as_ref()
        .map(|repl| repl.set_name.clone())
        .unwrap_or_default()
}

/// The replication role: PRI, SEC, REC, ARB, PSV, SLV or UNK, and RTR for a router.
pub fn read_repl(_config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    let Some(repl) = &new_stat.repl else {
        return if is_mongos(new_stat) { "RTR".to_string() } else { String::new() };
    };
    let role = if is_truthy(&repl.is_master) {
        "PRI"
    } else if is_truthy(&repl.secondary) {
        "SEC"
    } else if is_truthy(&repl.is_replica_set) {
        "REC"
    } else if is_truthy(&repl.arbiter_only) {
        "ARB"
    } else if repl.passives.contains(&repl.me) {
        "PSV"
    } else if !is_replica_set(new_stat) {
        "UNK"
    } else {
        "SLV"
    };
    role.to_string()
}

pub fn read_time(config: &ReaderConfig, new_stat: &ServerStatus, _old_stat: &ServerStatus) -> String {
    if config.human_readable {
        new_stat.sample_time.format("%b %e %H:%M:%S%.3f").to_string()
    } else {
        utility::format_timestamp(&new_stat.sample_time)
    }
}

/// The leaf value at a dotted path of the reply, like `metrics.document.inserted`.
fn field_value<'a>(
    stat: &'a ServerStatus,
    path: &str,
) -> Option<&'a Value>
{
    path.split('.')
        .try_fold(&stat.reply, |value, key| value.get(key))
        .filter(|value| !value.is_object() && !value.is_array())
}

fn field_number(
    stat: &ServerStatus,
    path: &str,
) -> Option<i64>
{
    field_value(stat, path).and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|number| number as i64)))
}

/// A column selected by its `serverStatus` path.
///
/// `path.diff()` shows the difference with the previous sample, `path.rate()` the difference per
/// second. A path that does not lead to a value, or to a number for a difference, shows `INVALID`.
pub fn read_field(path: &str, new_stat: &ServerStatus, old_stat: &ServerStatus) -> String {
    let difference = |path: &str| field_number(new_stat, path).zip(field_number(old_stat, path));
    let value = if let Some(path) = path.strip_suffix(".diff()") {
        difference(path).map(|(new_value, old_value)| (new_value - old_value).to_string())
    } else if let Some(path) = path.strip_suffix(".rate()") {
        difference(path).map(|(new_value, old_value)| rate(new_value, old_value, sample_seconds(new_stat, old_stat)).to_string())
    } else {
        field_value(new_stat, path).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    };
    value.unwrap_or_else(|| "INVALID".to_string())
}
