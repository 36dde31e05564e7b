pub mod cli;
pub mod downloader;

pub use downloader::errors::DownloadError;
pub use downloader::models::{DownloadOptions, DownloadRequest, DownloadResult, VideoInfo};
pub use downloader::orchestrator::Downloader;
