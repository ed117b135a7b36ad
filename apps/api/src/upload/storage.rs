use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::upload::validator::ResumeFormat;

/// Every stored upload starts with this prefix, which is also what the
/// startup sweep looks for.
pub const UPLOAD_PREFIX: &str = "resume-";

const RANDOM_SUFFIX_LEN: usize = 10;

/// An accepted resume on local disk.
///
/// The file lives exactly as long as this value: `discard` removes it
/// explicitly, and dropping it (error paths, cancelled requests) removes it too.
#[derive(Debug)]
pub struct StoredUpload {
    path: TempPath,
    file_name: String,
    format: ResumeFormat,
    size: usize,
}

impl StoredUpload {
    /// Writes `content` to `resume-<millis>-<random><extension>` inside `dir`.
    /// The file is created exclusively, so concurrent uploads never collide.
    pub async fn materialize(
        dir: &Path,
        file_name: String,
        format: ResumeFormat,
        extension: String,
        content: Bytes,
    ) -> io::Result<Self> {
        let dir = dir.to_path_buf();
        let size = content.len();

        let path = tokio::task::spawn_blocking(move || -> io::Result<TempPath> {
            let prefix = format!("{UPLOAD_PREFIX}{}-", Utc::now().timestamp_millis());
            let mut file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(&extension)
                .rand_bytes(RANDOM_SUFFIX_LEN)
                .tempfile_in(&dir)?;
            file.write_all(&content)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        debug!("Stored upload {} at {}", file_name, path.display());

        Ok(Self {
            path,
            file_name,
            format,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> ResumeFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Removes the file now. A failed removal is logged, never propagated:
    /// the caller's outcome is already decided.
    pub fn discard(self) {
        let path: PathBuf = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => debug!("Removed temporary upload {}", path.display()),
            Err(e) => warn!("Failed to remove temporary upload {}: {e}", path.display()),
        }
    }
}

/// Creates the upload directory if needed and removes stored uploads left
/// behind by a previous process. Returns how many files were removed.
pub async fn prepare_upload_dir(dir: &Path) -> io::Result<usize> {
    tokio::fs::create_dir_all(dir).await?;

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let is_upload = entry.file_name().to_string_lossy().starts_with(UPLOAD_PREFIX);
        if is_upload && entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }

    if removed > 0 {
        info!("Removed {removed} stale upload(s) from {}", dir.display());
    }
    Ok(removed)
}
