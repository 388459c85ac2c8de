use anyhow::{Context, Result};
use async_trait::async_trait;
use ripkit_core::runner::{RunnerPlugin, RunnerSession, RunnerStartArgs, SessionExit};
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

/// Runs the extraction tool as a local child process with piped stdout/stderr.
pub struct ToolRunnerPlugin {}

impl ToolRunnerPlugin {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for ToolRunnerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunnerPlugin for ToolRunnerPlugin {
    fn name(&self) -> &str {
        "process"
    }

    async fn start_session(&self, args: &RunnerStartArgs) -> Result<Box<dyn RunnerSession>> {
        let mut cmd = Command::new(&args.cmd);
        cmd.args(&args.args)
            .envs(&args.envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &args.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(windows)]
        cmd.creation_flags(windows::Win32::System::Threading::CREATE_NO_WINDOW.0);

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", args.cmd.display()))?;
        tracing::debug!(pid = child.id(), "tool process spawned");

        Ok(Box::new(ToolRunnerSession { child }))
    }
}

struct ToolRunnerSession {
    child: Child,
}

#[async_trait]
impl RunnerSession for ToolRunnerSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    async fn kill(&mut self) -> Result<()> {
        // An already reaped child is not an error.
        match self.child.start_kill() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn wait(&mut self) -> Result<SessionExit> {
        let status = self.child.wait().await?;
        Ok(SessionExit {
            exit_code: status.code(),
        })
    }
}
