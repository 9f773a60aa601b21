//! The impls and functions
//!
use std::{io::{self, Write}, sync::Arc, time::{Duration, Instant}};
use log::*;
use anyhow::Result;
use colored::*;
use tokio::task::JoinSet;
use crate::Opts;
use crate::host_info;
use crate::locks::LockSnapshot;
use crate::operation_metrics::OperationMetricsSnapshot;
use crate::poll::{Mode, PollError, PollOptions, Poller};
use crate::ranking::SortMode;
use crate::server_status::ServerStatus;
use crate::shape::{DecodeError, Diffable, RenderOptions, Renderable, SampleContext, Sampler};
use crate::source::{CommandSource, HttpSource};
use crate::top::TopSnapshot;

impl Mode {
    pub fn from_opts(options: &Opts) -> Self {
        if options.locks {
            Mode::Locks
        } else if options.operation_metrics {
            Mode::OperationMetrics
        } else if options.stat {
            Mode::Stat
        } else {
            Mode::Top
        }
    }
}

impl PollOptions {
    pub fn from_opts(
        options: &Opts,
        hostname_port: &str,
        multiple_hosts: bool,
    ) -> Self
    {
        PollOptions {
            row_count: options.rowcount,
            sleep_time: Duration::from_secs(options.sleep_time),
            json: options.json,
            render: RenderOptions {
                list_count: options.listcount,
                sort_mode: SortMode::from_sort_latency(options.sortlatency),
                human_readable: !options.raw_numbers,
                all: options.all,
                fields: options.fields.as_ref().map(|fields| {
                    fields.split(',')
                        .map(|field| field.trim().to_string())
                        .filter(|field| !field.is_empty())
                        .collect()
                }),
                multiple_hosts,
                host: multiple_hosts.then(|| hostname_port.to_string()),
            },
        }
    }
}

/// An [DecodeError::UnsupportedFeature] is not retried.
fn is_unsupported(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<DecodeError>(), Some(DecodeError::UnsupportedFeature(_)))
}

impl<C: CommandSource, T: Sampler> Poller<C, T> {
    pub fn new(
        source: C,
        options: PollOptions,
        context: SampleContext,
    ) -> Self
    {
        Poller { source, options, context, previous: None, has_data: false }
    }
    /// Read a sample, and return the diff with the previous sample, if there is one.
    ///
    /// A failed sample discards the previous sample, so the next diff is over two adjacent samples.
    pub async fn sample_diff(&mut self) -> Result<Option<<T as Diffable>::Diff>> {
        let current = match T::sample(&self.source, &self.context).await {
            Ok(current) => Arc::new(current),
            Err(error) => {
                self.previous = None;
                return Err(error);
            },
        };
        let diff = self.previous
            .as_ref()
            .map(|previous| T::diff(&current, previous));
        self.previous = Some(current);
        Ok(diff)
    }
    /// Print a diff with a single write, so the output of other hosts can not end up in between.
    fn emit<W: Write>(
        &self,
        diff: &<T as Diffable>::Diff,
        out: &mut W,
    ) -> Result<(), PollError>
    {
        let mut output = String::new();
        if self.options.json {
            output.push_str(&diff.json(&self.options.render).map_err(PollError::Render)?);
        } else {
            if let Some(host) = &self.options.render.host {
                output.push_str(host);
                output.push('\n');
            }
            output.push_str(&diff.grid(&self.options.render));
        }
        output.push('\n');
        out.write_all(output.as_bytes())?;
        out.flush()?;
        Ok(())
    }
    /// Run the poll loop until the row count is reached, or forever with a row count of 0.
    ///
    /// The first sample only primes the previous sample, so a row count of `n` prints `n` diffs
    /// when no sample fails.
    pub async fn run<W: Write, E: Write>(
        &mut self,
        out: &mut W,
        diagnostics: &mut E,
    ) -> Result<(), PollError>
    {
        let mut attempts: usize = 0;
        loop {
            if self.options.row_count > 0 && attempts > self.options.row_count {
                return Ok(());
            }
            attempts += 1;

            let timer = Instant::now();
            match self.sample_diff().await {
                Err(error) => {
                    if is_unsupported(&error) {
                        return Err(PollError::Unsupported(error));
                    }
                    if !self.has_data {
                        return Err(PollError::FatalStartup(error));
                    }
                    warn!("({}) {} sample failed: {:#}", self.source.connection_string(), T::NAME, error);
                    writeln!(diagnostics, "{} {:#}", "Error:".red(), error)?;
                },
                Ok(diff) => {
                    debug!("({}) {} sample {} in {:?}", self.source.connection_string(), T::NAME, attempts, timer.elapsed());
                    if !self.has_data && !self.options.json {
                        writeln!(diagnostics, "connected to: {}", self.source.connection_string())?;
                    }
                    self.has_data = true;
                    if let Some(diff) = diff {
                        self.emit(&diff, out)?;
                    }
                },
            }
            tokio::time::sleep(self.options.sleep_time).await;
        }
    }
}

/// Poll a single host with the mode selected in `options`.
pub async fn poll_host(
    hostname: &str,
    port: &str,
    options: &Opts,
    multiple_hosts: bool,
) -> Result<()>
{
    let source = HttpSource::new(hostname, port, Duration::from_secs(options.timeout))?;
    let context = SampleContext {
        num_cores: host_info::read_num_cores(&source, options.ignorecpu).await,
    };
    let poll_options = PollOptions::from_opts(options, &source.hostname_port, multiple_hosts);
    let mode = Mode::from_opts(options);
    info!("({}) polling in {:?} mode every {:?}", source.hostname_port, mode, poll_options.sleep_time);

    let mut out = io::stdout();
    let mut diagnostics = io::stderr();
    match mode {
        Mode::Top => Poller::<_, TopSnapshot>::new(source, poll_options, context).run(&mut out, &mut diagnostics).await?,
        Mode::Locks => Poller::<_, LockSnapshot>::new(source, poll_options, context).run(&mut out, &mut diagnostics).await?,
        Mode::OperationMetrics => Poller::<_, OperationMetricsSnapshot>::new(source, poll_options, context).run(&mut out, &mut diagnostics).await?,
        Mode::Stat => Poller::<_, ServerStatus>::new(source, poll_options, context).run(&mut out, &mut diagnostics).await?,
    }
    Ok(())
}

/// Poll every combination of host and port in its own task, and wait for all of them to finish.
pub async fn poll_hosts(
    hosts: Vec<String>,
    ports: Vec<String>,
    options: &Opts,
) -> Result<()>
{
    let multiple_hosts = hosts.len() * ports.len() > 1;
    let mut tasks = JoinSet::new();
    for host in &hosts {
        for port in &ports {
            let host = host.clone();
            let port = port.clone();
            let options = options.clone();
            tasks.spawn(async move {
                poll_host(&host, &port, &options, multiple_hosts)
                    .await
                    .map_err(|error| error.context(format!("{}:{}", host, port)))
            });
        }
    }
    join_hosts(tasks, &mut io::stderr()).await
}

/// Wait for the poll tasks in the order they finish.
///
/// A host that stops with an error is reported as soon as it stops, while the other hosts keep
/// polling. The error of the last failing host is returned.
pub async fn join_hosts<E: Write>(
    mut tasks: JoinSet<Result<()>>,
    diagnostics: &mut E,
) -> Result<()>
{
    let mut result = Ok(());
    while let Some(joined) = tasks.join_next().await {
        let error = match joined {
            Ok(Ok(())) => continue,
            Ok(Err(error)) => error,
            Err(join_error) => anyhow::Error::new(join_error).context("poll task failed"),
        };
        error!("{:#}", error);
        writeln!(diagnostics, "{} {:#}", "Error:".red(), error)?;
        result = Err(error);
    }
    result
}
