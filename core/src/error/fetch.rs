use std::path::PathBuf;

use thiserror::Error;

/// Failures while acquiring the external tool.
///
/// `CleanupFailed` is only ever logged by the fetcher; it is a variant so callers that
/// manage their own temporary files can surface it the same way.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no archive url configured for the tool")]
    MissingSource,

    #[error("download failed: {0}")]
    Download(String),

    #[error("download incomplete: {} is missing or empty", path.display())]
    DownloadIncomplete { path: PathBuf },

    #[error("extraction failed: could not unpack {} into {}: {reason}", archive.display(), destination.display())]
    ExtractionFailed {
        archive: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    #[error("cleanup failed: could not delete {}: {source}", path.display())]
    CleanupFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("installation incomplete: {} not found after extraction", executable.display())]
    InstallationIncomplete { executable: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
