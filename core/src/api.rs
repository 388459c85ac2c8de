//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `ripkit_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, AppConfig, LoggingConfig, PathsConfig, PipelineConfig,
    SupervisorConfig, ToolConfig,
};
pub use crate::error::{CliError, FetchError, RunError, StepError};
pub use crate::fetch::{ArchiveFetcher, ArchiveSource, DownloadProgress, FetchSummary};
pub use crate::install::{ensure_installed, InstallStatus, ToolInstallation};
pub use crate::pipeline::{Pipeline, PipelineReport};
pub use crate::progress::{CancelFlag, LogReporter, ProgressReporter, RecordingReporter};
pub use crate::runner::{
    supervise, ProcessExitSummary, ProgressEstimator, RunnerPlugin, RunnerSession,
    RunnerStartArgs, SessionExit, SuperviseArgs,
};
pub use crate::step::{AssetExtractionStep, ExtractionSettings, Step, StepOutcome};
