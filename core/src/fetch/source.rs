use std::path::Path;

use async_trait::async_trait;

/// Byte counts reported while an archive streams in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub transferred: u64,
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// `None` while the total size is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some((self.transferred as f64 / total as f64).min(1.0)),
            _ => None,
        }
    }
}

/// Transport that copies a remote archive into a local file.
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    fn name(&self) -> &str;

    /// Streams `url` into `dest`, creating or truncating it. Returns the bytes written.
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> anyhow::Result<u64>;
}
