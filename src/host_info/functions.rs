//! The impls and functions
//!
use log::*;
use anyhow::{Context, Result};
use serde_json::Value;
use crate::host_info::HostInfo;
use crate::source::CommandSource;

impl HostInfo {
    pub fn parse(
        reply: Value,
    ) -> Result<HostInfo>
    {
        serde_json::from_value(reply)
            .with_context(|| "Unable to parse hostInfo reply")
    }
    pub async fn read<C: CommandSource>(
        source: &C,
    ) -> Result<HostInfo>
    {
        let reply = source.run_command("hostInfo").await?;
        HostInfo::parse(reply)
    }
}

/// The number of cpu cores of the server, or 0 when it is not read (`--ignorecpu`) or can not be read.
pub async fn read_num_cores<C: CommandSource>(
    source: &C,
    ignore_cpu: bool,
) -> i64
{
    if ignore_cpu {
        info!("({}) ignoring hostInfo cpu count", source.connection_string());
        return 0;
    }
    match HostInfo::read(source).await {
        Ok(host_info) => {
            info!("({}) hostInfo: {}, {} cores, {} MB memory", source.connection_string(), host_info.system.hostname, host_info.system.num_cores, host_info.system.mem_size_mb);
            host_info.system.num_cores
        },
        Err(error) => {
            warn!("({}) unable to read the number of cores: {:#}", source.connection_string(), error);
            0
        },
    }
}
