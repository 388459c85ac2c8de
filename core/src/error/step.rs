use std::path::PathBuf;

use thiserror::Error;

use super::{FetchError, RunError};

/// Which part of a step's lifecycle produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    Prepare,
    Fetch,
    Extraction,
    Run,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::Prepare => "prepare",
            Stage::Fetch => "fetch",
            Stage::Extraction => "extraction",
            Stage::Run => "run",
        }
    }
}

#[derive(Error, Debug)]
pub enum StepError {
    #[error("validation failed: {field} is not configured")]
    ConfigurationMissing { field: &'static str },

    #[error("prepare failed: {}: {source}", path.display())]
    Prepare {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("run failed: {0}")]
    Run(#[from] RunError),
}

impl StepError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::ConfigurationMissing { .. } => Stage::Validation,
            Self::Prepare { .. } => Stage::Prepare,
            Self::Fetch(FetchError::ExtractionFailed { .. }) => Stage::Extraction,
            Self::Fetch(_) => Stage::Fetch,
            Self::Run(_) => Stage::Run,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Run(RunError::Cancelled))
    }
}
