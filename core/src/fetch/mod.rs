//! Archive Fetcher: download to a temporary archive, verify, unpack, always clean up.

mod archive;
pub(crate) mod extract;
mod source;

pub use archive::{ArchiveFetcher, FetchSummary};
pub use extract::extract_zip;
pub use source::{ArchiveSource, DownloadProgress};
