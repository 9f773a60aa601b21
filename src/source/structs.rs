//! The structs
//!
use std::time::Duration;
use anyhow::Result;
use serde_json::Value;

/// The documents returned by an aggregation.
///
/// Every document can fail on its own, which is how a failure halfway reading a cursor shows up.
pub type Cursor = Vec<Result<Value>>;

/// The dispatch of administrative commands.
#[allow(async_fn_in_trait)]
pub trait CommandSource {
    /// Run a command against the admin database, and return the reply document.
    async fn run_command(&self, command: &str) -> Result<Value>;
    /// Run an aggregation consisting of a single stage against the admin database.
    async fn aggregate(&self, stage: &str, timeout: Duration) -> Result<Cursor>;
    /// A description of the connection, without credentials.
    fn connection_string(&self) -> String;
}

/// A [CommandSource] reading JSON replies via HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    pub hostname_port: String,
    pub client: reqwest::Client,
}
