use ripkit_core::api as core_api;
use ripkit_core::error::CliError;
use ripkit_core::fetch::ArchiveFetcher;
use ripkit_core::install::{ensure_installed, InstallStatus, ToolInstallation};
use ripkit_core::pipeline::{Pipeline, PipelineReport};
use ripkit_core::progress::CancelFlag;
use ripkit_plugins::factory;

use crate::commands::cli::{InstallArgs, RunArgs};

/// Command-line flags win over config files and environment.
pub fn apply_run_overrides(cfg: &mut core_api::AppConfig, args: &RunArgs) {
    if let Some(p) = &args.tool_exe {
        cfg.tool.executable = Some(p.clone());
    }
    if let Some(p) = &args.input {
        cfg.paths.input = Some(p.clone());
    }
    if let Some(p) = &args.output {
        cfg.paths.output = Some(p.clone());
    }
    if let Some(p) = &args.run_config {
        cfg.paths.run_config = Some(p.clone());
    }
}

/// Sets `cancel` on the first Ctrl-C. Abort the handle once the work is done.
fn watch_ctrl_c(cancel: CancelFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    })
}

pub fn report_to_result(report: PipelineReport) -> Result<i32, CliError> {
    match report {
        PipelineReport::Completed { steps_run } => {
            tracing::info!(steps_run, "pipeline completed");
            Ok(0)
        }
        PipelineReport::Failed { step, error, .. } => Err(CliError::Step {
            step,
            source: error,
        }),
        PipelineReport::RestartRequested { next_step, .. } => {
            Err(CliError::RestartRequired { next_step })
        }
    }
}

pub async fn run_pipeline(cfg: &core_api::AppConfig, args: &RunArgs) -> Result<i32, CliError> {
    let cancel = CancelFlag::new();
    let watcher = watch_ctrl_c(cancel.clone());
    let reporter = factory::build_reporter(cancel, !args.quiet);

    let step = factory::build_extraction_step(cfg)?;
    let pipeline = Pipeline::new(cfg.pipeline.state_file.clone()).with_step(step);
    let report = pipeline.run(reporter.as_ref()).await;
    watcher.abort();

    report_to_result(report)
}

pub async fn install_tool(
    cfg: &core_api::AppConfig,
    args: &InstallArgs,
) -> Result<i32, CliError> {
    let mut tool = cfg.tool.clone();
    if let Some(p) = &args.tool_exe {
        tool.executable = Some(p.clone());
    }
    let installation = ToolInstallation::from_config(&tool)
        .ok_or_else(|| CliError::Config("tool.executable is not configured".into()))?;

    if args.check_only {
        if installation.is_present() {
            println!("{}", installation.executable().display());
            return Ok(0);
        }
        return Err(core_api::FetchError::InstallationIncomplete {
            executable: installation.executable().to_path_buf(),
        }
        .into());
    }

    let cancel = CancelFlag::new();
    let reporter = factory::build_reporter(cancel, true);
    let work_dir = tool
        .resolved_work_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let fetcher = ArchiveFetcher::new(
        factory::build_archive_source()?,
        work_dir,
        tool.archive_name.clone(),
    );

    match ensure_installed(
        &installation,
        tool.archive_url.as_deref(),
        &fetcher,
        reporter.as_ref(),
    )
    .await?
    {
        InstallStatus::AlreadyPresent => tracing::info!("tool already installed"),
        InstallStatus::Fetched(summary) => tracing::info!(
            bytes = summary.bytes,
            entries = summary.entries,
            "tool installed"
        ),
    }
    println!("{}", installation.executable().display());
    Ok(0)
}

pub async fn reset_pipeline(cfg: &core_api::AppConfig) -> Result<i32, CliError> {
    Pipeline::new(cfg.pipeline.state_file.clone()).reset().await?;
    Ok(0)
}
