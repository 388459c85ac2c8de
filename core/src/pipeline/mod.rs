//! Sequential step runner with a persisted resume position.
//!
//! Steps never overlap: each one may own directories the next one reads. When a step asks for
//! a host restart, the index of the following step is written to the state file and picked
//! up by the next `run`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StepError;
use crate::progress::ProgressReporter;
use crate::step::{Step, StepOutcome};

#[derive(Debug, Serialize, Deserialize)]
struct ResumeState {
    next_step: usize,
    #[serde(default)]
    step: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum PipelineReport {
    Completed {
        steps_run: usize,
    },
    Failed {
        step: String,
        index: usize,
        error: StepError,
    },
    RestartRequested {
        step: String,
        next_step: usize,
    },
}

pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
    state_file: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(state_file: Option<PathBuf>) -> Self {
        Self {
            steps: Vec::new(),
            state_file,
        }
    }

    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn push(&mut self, step: Box<dyn Step>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the first step the next `run` executes.
    pub async fn resume_position(&self) -> usize {
        let Some(path) = self.state_file.as_ref() else {
            return 0;
        };
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                tracing::warn!(error.kind = "pipeline.state_unreadable", path = %path.display(), error.message = %e);
                return 0;
            }
        };
        match serde_json::from_str::<ResumeState>(&raw) {
            Ok(state) if state.next_step < self.steps.len() => state.next_step,
            Ok(state) => {
                tracing::warn!(next_step = state.next_step, steps = self.steps.len(), "stale resume position ignored");
                0
            }
            Err(e) => {
                tracing::warn!(error.kind = "pipeline.state_invalid", path = %path.display(), error.message = %e);
                0
            }
        }
    }

    /// Forgets any persisted resume position.
    pub async fn reset(&self) -> std::io::Result<()> {
        let Some(path) = self.state_file.as_ref() else {
            return Ok(());
        };
        match tokio::fs::remove_file(path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    async fn persist(&self, next_step: usize, step: &str) -> std::io::Result<()> {
        let Some(path) = self.state_file.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let state = ResumeState {
            next_step,
            step: Some(step.to_string()),
            updated_at: Utc::now(),
        };
        let body = serde_json::to_string_pretty(&state)?;
        tokio::fs::write(path, body).await
    }

    pub async fn run(&self, reporter: &dyn ProgressReporter) -> PipelineReport {
        let start = self.resume_position().await;
        if start > 0 {
            tracing::info!(resume_at = start, "resuming pipeline");
        }

        let mut steps_run = 0;
        for (index, step) in self.steps.iter().enumerate().skip(start) {
            tracing::info!(step = step.name(), index, "step started");
            match step.run(reporter).await {
                StepOutcome::Success => {
                    steps_run += 1;
                    tracing::info!(step = step.name(), index, "step succeeded");
                }
                StepOutcome::Failure(error) => {
                    tracing::error!(step = step.name(), index, error.message = %error, "step failed");
                    if let Err(e) = self.reset().await {
                        tracing::warn!(error.kind = "pipeline.state_reset_failed", error.message = %e);
                    }
                    return PipelineReport::Failed {
                        step: step.name().to_string(),
                        index,
                        error,
                    };
                }
                StepOutcome::RequiresHostRestart => {
                    let next_step = index + 1;
                    tracing::warn!(step = step.name(), next_step, "host restart requested");
                    if let Err(e) = self.persist(next_step, step.name()).await {
                        tracing::error!(error.kind = "pipeline.state_write_failed", error.message = %e);
                    }
                    return PipelineReport::RestartRequested {
                        step: step.name().to_string(),
                        next_step,
                    };
                }
            }
        }

        if let Err(e) = self.reset().await {
            tracing::warn!(error.kind = "pipeline.state_reset_failed", error.message = %e);
        }
        PipelineReport::Completed { steps_run }
    }
}
