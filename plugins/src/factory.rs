use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use ripkit_core::config::AppConfig;
use ripkit_core::fetch::ArchiveSource;
use ripkit_core::progress::{CancelFlag, LogReporter, ProgressReporter};
use ripkit_core::runner::RunnerPlugin;
use ripkit_core::step::{AssetExtractionStep, ExtractionSettings};

use crate::fetch::HttpArchiveSource;
use crate::progress::ConsoleReporter;
use crate::runner::ToolRunnerPlugin;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_runner() -> Arc<dyn RunnerPlugin> {
    Arc::new(ToolRunnerPlugin::new())
}

pub fn build_archive_source() -> Result<Arc<dyn ArchiveSource>> {
    Ok(Arc::new(HttpArchiveSource::new(Some(CONNECT_TIMEOUT))?))
}

/// Progress bar on the terminal, or plain log lines when `show_progress` is off.
pub fn build_reporter(cancel: CancelFlag, show_progress: bool) -> Box<dyn ProgressReporter> {
    if show_progress {
        Box::new(ConsoleReporter::new(cancel, true))
    } else {
        Box::new(LogReporter::new(cancel))
    }
}

pub fn build_extraction_step(cfg: &AppConfig) -> Result<AssetExtractionStep> {
    Ok(AssetExtractionStep::new(
        ExtractionSettings::from(cfg),
        build_runner(),
        build_archive_source()?,
    ))
}
