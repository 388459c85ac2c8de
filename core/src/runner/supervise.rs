//! Process Supervisor: runs the tool, turns its stdout into progress, honours cancellation,
//! and classifies the exit.
use std::time::Instant;

use tokio::sync::mpsc;

use crate::error::RunError;
use crate::progress::{ProgressReporter, TaskGuard};
use crate::util::RingBytes;

use super::estimate::ProgressEstimator;
use super::io_pump;
use super::traits::{RunnerPlugin, RunnerSession};
use super::types::{ProcessExitSummary, RunnerStartArgs};

/// Floor for the longest stdout line forwarded in one piece.
const MIN_LINE_BYTES: usize = 4096;

pub struct SuperviseArgs<'a> {
    pub runner: &'a dyn RunnerPlugin,
    pub start: RunnerStartArgs,
    pub reporter: &'a dyn ProgressReporter,
    pub estimator: ProgressEstimator,
    /// Task title shown by the reporter, e.g. "Running AssetRipper".
    pub title: &'a str,
    pub capture_bytes: usize,
    pub line_channel_capacity: usize,
}

pub async fn supervise(args: SuperviseArgs<'_>) -> Result<ProcessExitSummary, RunError> {
    let SuperviseArgs {
        runner,
        start,
        reporter,
        mut estimator,
        title,
        capture_bytes,
        line_channel_capacity,
    } = args;

    tracing::info!(
        runner = runner.name(),
        cmd = %start.cmd.display(),
        args = ?start.args,
        "starting tool"
    );

    // Cleared on every return below, including `?` exits.
    let guard = TaskGuard::begin(reporter, title);
    let started_at = Instant::now();

    let mut session = runner
        .start_session(&start)
        .await
        .map_err(|e| RunError::Spawn(format!("{}: {e:#}", start.cmd.display())))?;

    let (stdout, stderr) = match (session.stdout(), session.stderr()) {
        (Some(out), Some(err)) => (out, err),
        _ => {
            kill_quietly(session.as_mut()).await;
            return Err(RunError::Spawn("tool session has no stdout/stderr".into()));
        }
    };

    let ring_err = RingBytes::new(capture_bytes);
    let (line_tx, mut line_rx) = mpsc::channel::<String>(line_channel_capacity.max(1));
    let out_task =
        io_pump::pump_stdout_lines(stdout, line_tx, capture_bytes.max(MIN_LINE_BYTES));
    let err_task = io_pump::pump_stderr_tail(stderr, ring_err.clone());

    let mut lines = 0u64;
    let mut cancelled = false;

    while let Some(line) = line_rx.recv().await {
        lines += 1;
        let fraction = estimator.observe(&line);
        tracing::info!(target: "ripkit.tool", "{line}");

        if guard.update(&line, Some(fraction)) {
            tracing::warn!(error.kind = "user.abort", lines, "tool run cancelled, killing process");
            kill_quietly(session.as_mut()).await;
            guard.update(&format!("{title} cancelled"), Some(fraction));
            cancelled = true;
            break;
        }
    }
    drop(line_rx);

    if cancelled {
        // Reap the killed child; its exit status no longer matters.
        if let Err(e) = session.wait().await {
            tracing::warn!(error.kind = "process.wait_failed", error.message = %e);
        }
        out_task.abort();
        err_task.abort();
        return Err(RunError::Cancelled);
    }

    // stdout is closed; surface a read failure before waiting on a child nobody drains.
    if let Err(e) = join_pump(out_task, "stdout").await {
        kill_quietly(session.as_mut()).await;
        let _ = session.wait().await;
        err_task.abort();
        return Err(e);
    }

    let exit = session.wait().await.map_err(RunError::Plugin)?;
    join_pump(err_task, "stderr").await?;

    let stderr_text = ring_err.to_string_lossy();
    let duration_ms = started_at.elapsed().as_millis() as u64;
    let exit_code = exit.exit_code.unwrap_or(-1);

    // A terminal interrupt reaches the child too, so it may die before printing the line
    // that would have carried the cancellation answer.
    if exit_code != 0 && guard.update(title, Some(estimator.fraction())) {
        tracing::warn!(
            error.kind = "user.abort",
            exit_code,
            lines,
            "tool exited after cancellation was requested"
        );
        return Err(RunError::Cancelled);
    }

    if exit_code != 0 {
        tracing::error!(
            error.kind = "process.non_zero_exit",
            exit_code,
            lines,
            duration_ms,
            stderr = %stderr_text
        );
        return Err(RunError::NonZeroExit {
            code: exit_code,
            stderr: stderr_text,
        });
    }

    if !stderr_text.is_empty() {
        tracing::debug!(stderr = %stderr_text, "tool wrote to stderr");
    }
    tracing::info!(
        exit_code,
        lines,
        completed_units = estimator.completed(),
        duration_ms,
        "tool finished"
    );

    Ok(ProcessExitSummary {
        exit_code,
        lines,
        completed_units: estimator.completed(),
        duration_ms,
    })
}

async fn kill_quietly(session: &mut dyn RunnerSession) {
    if let Err(e) = session.kill().await {
        tracing::error!(error.kind = "process.kill_failed", error.message = %e);
    }
}

async fn join_pump(
    task: tokio::task::JoinHandle<Result<u64, RunError>>,
    stream: &'static str,
) -> Result<u64, RunError> {
    match task.await {
        Ok(res) => res,
        Err(e) => {
            tracing::warn!(error.kind = "process.pump_join_failed", stream, error.message = %e);
            Ok(0)
        }
    }
}
