//! The impls and functions
//!
use std::time::{Duration, Instant};
use log::*;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use crate::source::{CommandSource, Cursor, HttpSource};

impl HttpSource {
    pub fn new(
        host: &str,
        port: &str,
        timeout: Duration,
    ) -> Result<Self>
    {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| "Unable to create http client")?;
        Ok(HttpSource { hostname_port: format!("{}:{}", host, port), client })
    }
    async fn http_get(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<String>
    {
        let timer = Instant::now();
        let mut request = self.client.get(format!("http://{}/{}", self.hostname_port, url));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Error reading http://{}/{}", self.hostname_port, url))?;
        if !response.status().is_success() {
            debug!("Non success response: {}/{} = {}", self.hostname_port, url, response.status());
            bail!("Non success response from http://{}/{}: {}", self.hostname_port, url, response.status());
        }
        debug!("Success response: {}/{} = {} in {:?}", self.hostname_port, url, response.status(), timer.elapsed());
        response
            .text()
            .await
            .with_context(|| format!("Error reading body of http://{}/{}", self.hostname_port, url))
    }
}

impl CommandSource for HttpSource {
    async fn run_command(
        &self,
        command: &str,
    ) -> Result<Value>
    {
        let http_data = self.http_get(command, None).await?;
        parse_command_reply(&http_data)
            .with_context(|| format!("({}) command {} failed", self.hostname_port, command))
    }
    async fn aggregate(
        &self,
        stage: &str,
        timeout: Duration,
    ) -> Result<Cursor>
    {
        let http_data = self.http_get(stage.trim_start_matches('$'), Some(timeout)).await?;
        parse_cursor_reply(&http_data)
            .with_context(|| format!("({}) aggregation {} failed", self.hostname_port, stage))
    }
    fn connection_string(&self) -> String {
        format!("http://{}", self.hostname_port)
    }
}

/// Parse a command reply, and turn a reply with `ok: 0` into an error carrying `errmsg`.
pub fn parse_command_reply(
    http_data: &str,
) -> Result<Value>
{
    let reply: Value = serde_json::from_str(http_data)
        .with_context(|| "Json deserialization error")?;
    if let Some(ok) = reply.get("ok").and_then(Value::as_f64) {
        if ok == 0_f64 {
            let errmsg = reply.get("errmsg")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            bail!("server reported: {}", errmsg);
        }
    }
    Ok(reply)
}

/// Parse an aggregation reply.
///
/// The reply is either a plain array of documents, or a command reply with the documents in
/// `cursor.firstBatch`.
pub fn parse_cursor_reply(
    http_data: &str,
) -> Result<Cursor>
{
    let mut reply = parse_command_reply(http_data)?;
    let documents = if let Some(documents) = reply.as_array_mut() {
        std::mem::take(documents)
    } else if reply.is_object() {
        match reply.pointer_mut("/cursor/firstBatch").map(Value::take) {
            Some(Value::Array(documents)) => documents,
            _ => return Err(anyhow!("aggregation reply has no cursor.firstBatch array")),
        }
    } else {
        bail!("aggregation reply is not a document or an array");
    };
    Ok(documents.into_iter().map(Ok).collect())
}
