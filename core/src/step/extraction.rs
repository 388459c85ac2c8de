use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, PathsConfig, SupervisorConfig, ToolConfig};
use crate::error::StepError;
use crate::fetch::{ArchiveFetcher, ArchiveSource};
use crate::install::{ensure_installed, InstallStatus, ToolInstallation};
use crate::progress::ProgressReporter;
use crate::runner::{
    supervise, ProcessExitSummary, ProgressEstimator, RunnerPlugin, RunnerStartArgs,
    SuperviseArgs,
};

use super::types::{Step, StepOutcome};

/// Everything the extraction step reads from configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSettings {
    pub tool: ToolConfig,
    pub paths: PathsConfig,
    pub run_config: toml::Table,
    pub supervisor: SupervisorConfig,
}

impl From<&AppConfig> for ExtractionSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            tool: cfg.tool.clone(),
            paths: cfg.paths.clone(),
            run_config: cfg.run_config.clone(),
            supervisor: cfg.supervisor.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    Validating,
    Preparing,
    Fetching,
    CleaningOutput,
    Running,
    Finalizing,
}

struct ResolvedPaths {
    executable: PathBuf,
    input: PathBuf,
    output: PathBuf,
    run_config: PathBuf,
}

/// Ensures the extraction tool is installed, then runs it as
/// `<tool> <run_config> <output> <input>` under supervision.
pub struct AssetExtractionStep {
    settings: ExtractionSettings,
    runner: Arc<dyn RunnerPlugin>,
    source: Arc<dyn ArchiveSource>,
}

impl AssetExtractionStep {
    pub fn new(
        settings: ExtractionSettings,
        runner: Arc<dyn RunnerPlugin>,
        source: Arc<dyn ArchiveSource>,
    ) -> Self {
        Self {
            settings,
            runner,
            source,
        }
    }

    fn tool_label(&self) -> &str {
        &self.settings.tool.archive_name
    }

    fn enter(&self, state: ExtractionState) {
        tracing::debug!(step = self.name(), state = ?state, "step state");
    }

    fn validate(&self) -> Result<ResolvedPaths, StepError> {
        fn require(value: &Option<PathBuf>, field: &'static str) -> Result<PathBuf, StepError> {
            value
                .clone()
                .filter(|p| !p.as_os_str().is_empty())
                .ok_or(StepError::ConfigurationMissing { field })
        }

        Ok(ResolvedPaths {
            executable: require(&self.settings.tool.executable, "tool.executable")?,
            input: require(&self.settings.paths.input, "paths.input")?,
            output: require(&self.settings.paths.output, "paths.output")?,
            run_config: require(&self.settings.paths.run_config, "paths.run_config")?,
        })
    }

    async fn write_run_config(&self, path: &Path) -> Result<(), StepError> {
        let prepare_err = |source: std::io::Error| StepError::Prepare {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(prepare_err)?;
        }
        let body = serde_json::to_string_pretty(&self.settings.run_config)
            .map_err(|e| prepare_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        tokio::fs::write(path, body).await.map_err(prepare_err)?;

        tracing::info!(path = %path.display(), "run configuration written");
        Ok(())
    }

    async fn acquire(
        &self,
        executable: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallStatus, StepError> {
        let install_dir = self.settings.tool.resolved_install_dir().unwrap_or_default();
        let installation = ToolInstallation::new(install_dir, executable);
        let work_dir = self
            .settings
            .tool
            .resolved_work_dir()
            .unwrap_or_else(|| PathBuf::from("."));
        let fetcher = ArchiveFetcher::new(self.source.clone(), work_dir, self.tool_label());

        let status = ensure_installed(
            &installation,
            self.settings.tool.archive_url.as_deref(),
            &fetcher,
            reporter,
        )
        .await?;
        Ok(status)
    }

    async fn clean_output(&self, output: &Path) -> Result<(), StepError> {
        let prepare_err = |source: std::io::Error| StepError::Prepare {
            path: output.to_path_buf(),
            source,
        };

        match tokio::fs::symlink_metadata(output).await {
            Ok(meta) if meta.is_dir() => {
                tokio::fs::remove_dir_all(output).await.map_err(prepare_err)?
            }
            Ok(_) => tokio::fs::remove_file(output).await.map_err(prepare_err)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(prepare_err(e)),
        }
        tokio::fs::create_dir_all(output).await.map_err(prepare_err)?;
        Ok(())
    }

    async fn execute(
        &self,
        paths: &ResolvedPaths,
        reporter: &dyn ProgressReporter,
    ) -> Result<ProcessExitSummary, StepError> {
        tracing::info!(
            input = %paths.input.display(),
            output = %paths.output.display(),
            run_config = %paths.run_config.display(),
            "running extraction tool"
        );

        let start = RunnerStartArgs::new(&paths.executable)
            .arg(&paths.run_config)
            .arg(&paths.output)
            .arg(&paths.input);
        let title = format!("Running {}", self.tool_label());

        let summary = supervise(SuperviseArgs {
            runner: self.runner.as_ref(),
            start,
            reporter,
            estimator: ProgressEstimator::from_config(&self.settings.supervisor),
            title: &title,
            capture_bytes: self.settings.supervisor.capture_bytes,
            line_channel_capacity: self.settings.supervisor.line_channel_capacity,
        })
        .await?;
        Ok(summary)
    }

    async fn run_stages(
        &self,
        paths: &ResolvedPaths,
        reporter: &dyn ProgressReporter,
    ) -> Result<ProcessExitSummary, StepError> {
        self.enter(ExtractionState::Preparing);
        self.write_run_config(&paths.run_config).await?;

        self.enter(ExtractionState::Fetching);
        if let InstallStatus::Fetched(summary) = self.acquire(&paths.executable, reporter).await? {
            tracing::info!(bytes = summary.bytes, "tool fetched");
        }

        // The output directory belongs to this step until it returns.
        self.enter(ExtractionState::CleaningOutput);
        self.clean_output(&paths.output).await?;

        self.enter(ExtractionState::Running);
        self.execute(paths, reporter).await
    }
}

#[async_trait]
impl Step for AssetExtractionStep {
    fn name(&self) -> &str {
        "asset-extraction"
    }

    async fn run(&self, reporter: &dyn ProgressReporter) -> StepOutcome {
        self.enter(ExtractionState::Validating);
        let paths = match self.validate() {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!(error.kind = "step.validation", error.message = %e);
                return StepOutcome::Failure(e);
            }
        };

        let result = self.run_stages(&paths, reporter).await;

        // Fetch and run clear their own indicators; this covers early prepare failures too.
        self.enter(ExtractionState::Finalizing);
        reporter.clear_task();

        match result {
            Ok(summary) => {
                tracing::info!(
                    lines = summary.lines,
                    exported = summary.completed_units,
                    duration_ms = summary.duration_ms,
                    "asset extraction finished"
                );
                StepOutcome::Success
            }
            Err(e) => {
                tracing::error!(
                    error.kind = "step.failed",
                    stage = e.stage().as_str(),
                    error.message = %e
                );
                StepOutcome::Failure(e)
            }
        }
    }
}
