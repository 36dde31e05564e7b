// Download orchestration: URL validation, tool preflight, yt-dlp driving

pub mod backends;
pub mod errors;
pub mod format;
pub mod models;
pub mod orchestrator;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::DownloadError;
pub use format::FormatPolicy;
pub use models::{DownloadOptions, DownloadRequest, DownloadResult, VideoInfo};
pub use orchestrator::{is_supported_url, Downloader};
pub use tools::{SystemTools, ToolInfo, ToolKind, ToolProbe};
pub use traits::DownloaderBackend;
