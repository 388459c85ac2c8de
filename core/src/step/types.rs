use async_trait::async_trait;

use crate::error::StepError;
use crate::progress::ProgressReporter;

/// Result of one pipeline step.
#[derive(Debug)]
pub enum StepOutcome {
    Success,
    Failure(StepError),
    /// The host must restart before the pipeline can continue after this step.
    RequiresHostRestart,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn failure(&self) -> Option<&StepError> {
        match self {
            Self::Failure(e) => Some(e),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, reporter: &dyn ProgressReporter) -> StepOutcome;
}
