use thiserror::Error;

use super::{FetchError, StepError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("pipeline step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: StepError,
    },
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("host restart required to continue the pipeline at step {next_step}")]
    RestartRequired { next_step: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("run cancelled by user")]
    Cancelled,
    #[error("tool exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("plugin error: {0}")]
    Plugin(#[from] anyhow::Error),
}

impl RunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
