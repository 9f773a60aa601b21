//! The impls and functions
//!
use std::sync::Arc;
use chrono::{DateTime, Local};
use log::*;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use crate::shape::{DecodeError, Diffable, RenderOptions, Renderable, SampleContext, Sampler};
use crate::source::CommandSource;
use crate::server_status::{self, Capabilities, ReaderConfig, ServerStatus, StatColumn, StatLine, STAT_HEADERS};
use crate::utility::GridWriter;
use crate::GRID_COLUMN_PADDING;

impl ServerStatus {
    pub fn new() -> Self { Default::default() }
    /// Decode a `serverStatus` reply.
    pub fn decode(
        reply: Value,
        time: DateTime<Local>,
        num_cores: i64,
    ) -> Result<ServerStatus, DecodeError>
    {
        let mut server_status: ServerStatus = serde_json::from_value(reply.clone())?;
        server_status.sample_time = time;
        server_status.num_cores = num_cores;
        server_status.reply = reply;
        Ok(server_status)
    }
}

impl Sampler for ServerStatus {
    const NAME: &'static str = "stat";
    async fn sample<C: CommandSource>(
        source: &C,
        context: &SampleContext,
    ) -> Result<Self>
    {
        let time = Local::now();
        let reply = source.run_command("serverStatus").await?;
        let server_status = ServerStatus::decode(reply, time, context.num_cores)?;
        debug!("stat: {} version {}", server_status.host, server_status.version);
        Ok(server_status)
    }
}

impl Diffable for ServerStatus {
    type Diff = StatLine;
    fn diff(
        current: &Arc<Self>,
        previous: &Arc<Self>,
    ) -> StatLine
    {
        StatLine {
            current: Arc::clone(current),
            previous: Arc::clone(previous),
        }
    }
}

impl Capabilities {
    /// What `stat` supports, combined with the output options.
    pub fn from_sample(
        stat: &ServerStatus,
        options: &RenderOptions,
    ) -> Self
    {
        Capabilities {
            wired_tiger: server_status::is_wired_tiger(stat),
            mmap: server_status::is_mmap(stat),
            mongos: server_status::is_mongos(stat),
            replica_set: server_status::is_replica_set(stat),
            locks: server_status::has_locks(stat),
            collection_locks: server_status::has_collection_locks(stat),
            metrics: server_status::has_metrics(stat),
            op_latencies: server_status::has_op_latencies(stat),
            multiple_hosts: options.multiple_hosts,
            all: options.all,
        }
    }
}

impl ReaderConfig {
    pub fn from_options(
        stat: &ServerStatus,
        options: &RenderOptions,
    ) -> Self
    {
        ReaderConfig {
            cpu_count: stat.num_cores,
            human_readable: options.human_readable,
        }
    }
}

/// The columns for the keys in `fields`, in the order of `fields`.
///
/// A key that is not in the registry selects a `serverStatus` field by its path.
pub fn select_columns(
    fields: &[String],
) -> Vec<StatColumn<'_>>
{
    fields
        .iter()
        .map(|field| {
            match STAT_HEADERS.iter().find(|header| header.key == field.as_str()) {
                Some(header) => StatColumn::Registry(header),
                None => {
                    debug!("stat line field {} is read from the serverStatus reply", field);
                    StatColumn::Field(field.as_str())
                },
            }
        })
        .collect()
}

impl<'a> StatColumn<'a> {
    pub fn key(&self) -> &'a str {
        match self {
            StatColumn::Registry(header) => header.key,
            StatColumn::Field(path) => *path,
        }
    }
    pub fn read(
        &self,
        config: &ReaderConfig,
        new_stat: &ServerStatus,
        old_stat: &ServerStatus,
    ) -> String
    {
        match self {
            StatColumn::Registry(header) => (header.read)(config, new_stat, old_stat),
            StatColumn::Field(path) => server_status::read_field(path, new_stat, old_stat),
        }
    }
}

impl StatLine {
    /// The columns to show: the selected fields, or the registry columns active for the server.
    pub fn columns<'a>(
        &self,
        options: &'a RenderOptions,
    ) -> Vec<StatColumn<'a>>
    {
        match &options.fields {
            Some(fields) => select_columns(fields),
            None => {
                let capabilities = Capabilities::from_sample(&self.current, options);
                STAT_HEADERS
                    .iter()
                    .filter(|header| (header.active)(&capabilities))
                    .map(StatColumn::Registry)
                    .collect()
            },
        }
    }
    /// The (key, value) pairs of the line.
    pub fn cells(
        &self,
        options: &RenderOptions,
    ) -> Vec<(String, String)>
    {
        let config = ReaderConfig::from_options(&self.current, options);
        self.columns(options)
            .into_iter()
            .map(|column| (column.key().to_string(), column.read(&config, &self.current, &self.previous)))
            .collect()
    }
}

impl Renderable for StatLine {
    fn json(
        &self,
        options: &RenderOptions,
    ) -> Result<String>
    {
        let fields: Map<String, Value> = self.cells(options)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        let mut line = Map::new();
        line.insert(self.current.host.clone(), Value::Object(fields));
        serde_json::to_string(&line)
            .with_context(|| "Json serialization error")
    }
    fn grid(
        &self,
        options: &RenderOptions,
    ) -> String
    {
        let cells = self.cells(options);
        let mut grid = GridWriter::new(GRID_COLUMN_PADDING);
        grid.write_cells(cells.iter().map(|(key, _)| key.clone()));
        grid.end_row();
        grid.write_cells(cells.into_iter().map(|(_, value)| value));
        grid.end_row();
        grid.flush()
    }
}
