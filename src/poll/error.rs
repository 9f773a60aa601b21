//! Errors that end a poll loop.
//!
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    /// The very first sample failed.
    #[error("{0:#}")]
    FatalStartup(anyhow::Error),
    /// The server can not report what the mode needs.
    #[error("{0:#}")]
    Unsupported(anyhow::Error),
    #[error("unable to render output: {0:#}")]
    Render(anyhow::Error),
    #[error("unable to write output: {0}")]
    Output(#[from] std::io::Error),
}
