//! Tool Acquisition: make sure the external tool is on disk, fetching it only when missing.

use std::path::{Path, PathBuf};

use crate::config::ToolConfig;
use crate::error::FetchError;
use crate::fetch::{ArchiveFetcher, FetchSummary};
use crate::progress::ProgressReporter;

/// The external tool as laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInstallation {
    pub install_dir: PathBuf,
    pub executable: PathBuf,
}

impl ToolInstallation {
    pub fn new(install_dir: impl Into<PathBuf>, executable: impl Into<PathBuf>) -> Self {
        let install_dir = install_dir.into();
        let install_dir = if install_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            install_dir
        };
        Self {
            install_dir,
            executable: executable.into(),
        }
    }

    /// `None` when no executable is configured.
    pub fn from_config(tool: &ToolConfig) -> Option<Self> {
        let executable = tool.executable.clone()?;
        let install_dir = tool.resolved_install_dir().unwrap_or_default();
        Some(Self::new(install_dir, executable))
    }

    /// A directory without its executable counts as absent.
    pub fn is_present(&self) -> bool {
        self.install_dir.is_dir() && self.executable.is_file()
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    AlreadyPresent,
    Fetched(FetchSummary),
}

pub async fn ensure_installed(
    installation: &ToolInstallation,
    url: Option<&str>,
    fetcher: &ArchiveFetcher,
    reporter: &dyn ProgressReporter,
) -> Result<InstallStatus, FetchError> {
    if installation.is_present() {
        tracing::debug!(
            executable = %installation.executable.display(),
            "tool already installed"
        );
        return Ok(InstallStatus::AlreadyPresent);
    }

    let url = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(FetchError::MissingSource)?;

    tracing::info!(
        install_dir = %installation.install_dir.display(),
        url = %url,
        "tool missing, fetching"
    );
    let summary = fetcher
        .fetch(url, &installation.install_dir, reporter)
        .await?;

    // A malformed archive can unpack fine and still lack the executable.
    if !installation.executable.is_file() {
        return Err(FetchError::InstallationIncomplete {
            executable: installation.executable.clone(),
        });
    }

    Ok(InstallStatus::Fetched(summary))
}
