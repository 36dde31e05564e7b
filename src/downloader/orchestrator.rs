// Orchestrates one request: validate, preflight, fetch metadata, download

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::downloader::backends::YtDlpBackend;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{DownloadOptions, DownloadRequest, DownloadResult};
use crate::downloader::tools::{SystemTools, ToolKind, ToolProbe};
use crate::downloader::traits::DownloaderBackend;

lazy_static! {
    // Hosts the extraction tool is pointed at; anything else is rejected
    // before a single process is spawned.
    static ref SOURCE_URL_RE: Regex =
        Regex::new(r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/.+").unwrap();
}

pub fn is_supported_url(url: &str) -> bool {
    SOURCE_URL_RE.is_match(url)
}

pub struct Downloader {
    backend: Box<dyn DownloaderBackend>,
    tools: Box<dyn ToolProbe>,
}

impl Downloader {
    /// Backend and probe wired to the real system tools. When yt-dlp is not
    /// installed the preflight in [`run`](Self::run) reports it properly.
    pub fn new() -> Self {
        let probe = SystemTools;
        let backend = YtDlpBackend::detect(&probe)
            .unwrap_or_else(|| YtDlpBackend::new(PathBuf::from(ToolKind::YtDlp.binary())));
        Self::with_parts(Box::new(backend), Box::new(probe))
    }

    pub fn with_parts(backend: Box<dyn DownloaderBackend>, tools: Box<dyn ToolProbe>) -> Self {
        Self { backend, tools }
    }

    /// Run the whole request to completion: one linear
    /// validate → preflight → fetch → merge sequence, no retries.
    pub async fn run(
        &self,
        request: &DownloadRequest,
        options: &DownloadOptions,
    ) -> Result<DownloadResult, DownloadError> {
        if !is_supported_url(&request.url) {
            return Err(DownloadError::UnsupportedSource(format!(
                "not a recognized video page URL: {}",
                request.url
            )));
        }

        // Both tools must be present before anything touches the network, so
        // a missing muxer never wastes a full transfer.
        for kind in [ToolKind::YtDlp, ToolKind::Ffmpeg] {
            let tool = self.tools.probe(kind);
            match tool.path {
                Some(path) => debug!(
                    "{} found at {} ({})",
                    kind.binary(),
                    path.display(),
                    tool.version.as_deref().unwrap_or("unknown version")
                ),
                None => return Err(DownloadError::missing_tool(kind)),
            }
        }

        let video = self.backend.fetch_info(&request.url, options).await?;
        info!(
            title = %video.title,
            uploader = %video.uploader,
            duration_secs = video.duration_seconds,
            "fetched metadata via {}",
            self.backend.name()
        );

        let dest_dir = request.output_dir();
        let output_path = self
            .backend
            .download(&request.url, &dest_dir, options)
            .await?;
        info!("saved {}", output_path.display());

        Ok(DownloadResult { output_path })
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}
