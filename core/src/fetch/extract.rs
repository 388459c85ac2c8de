use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::FetchError;

/// Unpacks a zip archive into `destination`, which must already exist.
/// Returns the number of archive entries.
pub fn extract_zip(archive: &Path, destination: &Path) -> Result<usize, FetchError> {
    let fail = |reason: String| FetchError::ExtractionFailed {
        archive: archive.to_path_buf(),
        destination: destination.to_path_buf(),
        reason,
    };

    let file = File::open(archive).map_err(|e| fail(e.to_string()))?;
    let mut zip =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| fail(format!("invalid zip: {e}")))?;
    let entries = zip.len();
    zip.extract(destination).map_err(|e| fail(e.to_string()))?;
    Ok(entries)
}
