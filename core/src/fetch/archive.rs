use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FetchError;
use crate::progress::{ProgressReporter, TaskGuard};

use super::extract;
use super::source::ArchiveSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub url: String,
    pub bytes: u64,
    pub entries: usize,
    pub destination: PathBuf,
}

/// Downloads a zip archive next to the working area and unpacks it.
pub struct ArchiveFetcher {
    source: Arc<dyn ArchiveSource>,
    work_dir: PathBuf,
    archive_name: String,
}

impl ArchiveFetcher {
    pub fn new(
        source: Arc<dyn ArchiveSource>,
        work_dir: impl Into<PathBuf>,
        archive_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            work_dir: work_dir.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Where the in-flight download lives. Never referenced outside the fetch.
    pub fn temp_archive_path(&self) -> PathBuf {
        self.work_dir
            .join(format!("{}.temp.zip", self.archive_name))
    }

    pub async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<FetchSummary, FetchError> {
        let temp = TempArchive::new(self.temp_archive_path());

        let result = self
            .download_and_extract(url, temp.path(), destination, reporter)
            .await;

        // Cleanup never changes the outcome of the fetch.
        if let Err(e) = temp.cleanup().await {
            tracing::warn!(error.kind = "fetch.cleanup_failed", error.message = %e);
        }

        match &result {
            Ok(summary) => tracing::info!(
                url = %summary.url,
                bytes = summary.bytes,
                entries = summary.entries,
                destination = %summary.destination.display(),
                "tool archive installed"
            ),
            Err(e) => tracing::error!(error.kind = "fetch.failed", url = %url, error.message = %e),
        }
        result
    }

    async fn download_and_extract(
        &self,
        url: &str,
        temp: &Path,
        destination: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<FetchSummary, FetchError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;

        let guard = TaskGuard::begin(reporter, &format!("Downloading {}", self.archive_name));
        let label = format!("Downloading from {url}");
        guard.update(&label, Some(0.0));

        tracing::info!(url = %url, temp = %temp.display(), source = self.source.name(), "downloading tool archive");
        let bytes = self
            .source
            .download(url, temp, &mut |p| {
                // Downloads are not cancellable; the answer is ignored.
                let _ = guard.update(&label, p.fraction());
            })
            .await
            .map_err(|e| FetchError::Download(format!("{e:#}")))?;

        match tokio::fs::metadata(temp).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {}
            _ => {
                return Err(FetchError::DownloadIncomplete {
                    path: temp.to_path_buf(),
                })
            }
        }

        guard.update(&format!("Extracting into {}", destination.display()), None);
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| FetchError::ExtractionFailed {
                archive: temp.to_path_buf(),
                destination: destination.to_path_buf(),
                reason: e.to_string(),
            })?;

        let archive = temp.to_path_buf();
        let target = destination.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || extract::extract_zip(&archive, &target))
            .await
            .map_err(|e| FetchError::ExtractionFailed {
                archive: temp.to_path_buf(),
                destination: destination.to_path_buf(),
                reason: e.to_string(),
            })??;

        Ok(FetchSummary {
            url: url.to_string(),
            bytes,
            entries,
            destination: destination.to_path_buf(),
        })
    }
}

/// Owns the temporary download. `cleanup` reports deletion failures; dropping without
/// cleanup (early return, cancelled future) still removes the file best-effort.
struct TempArchive {
    path: PathBuf,
    armed: bool,
}

impl TempArchive {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn cleanup(mut self) -> Result<(), FetchError> {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FetchError::CleanupFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
