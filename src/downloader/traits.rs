// Backend trait: the seam over the external download tool

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{DownloadOptions, VideoInfo};

/// The external extraction tool behind an object-safe seam, so tests can
/// substitute a stub for the real binary.
#[async_trait]
pub trait DownloaderBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Fetch metadata without downloading any media.
    async fn fetch_info(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<VideoInfo, DownloadError>;

    /// Download and merge into `dest_dir`, returning the final file path.
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        options: &DownloadOptions,
    ) -> Result<PathBuf, DownloadError>;
}
