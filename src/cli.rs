// Command-line surface

use std::path::PathBuf;

use clap::Parser;

use crate::downloader::errors::DownloadError;
use crate::downloader::format::FormatPolicy;
use crate::downloader::models::{DownloadOptions, DownloadRequest, DownloadResult};
use crate::downloader::orchestrator::Downloader;

/// Download a YouTube video at up to 1080p with audio merged in.
///
/// The file is named after the video title. Running the same URL twice
/// overwrites the first download.
#[derive(Debug, Parser)]
#[command(name = "ytfetch", version, about)]
pub struct Cli {
    /// Video page URL to download
    pub url: String,

    /// Directory the file is saved into (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Fetch the smallest available streams instead of the 1080p policy
    #[arg(long)]
    pub lowest: bool,

    /// Network timeout handed to the download tool, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    pub socket_timeout: u32,
}

impl Cli {
    pub fn request(&self) -> DownloadRequest {
        DownloadRequest::new(self.url.clone()).with_destination(self.output.clone())
    }

    pub fn options(&self) -> DownloadOptions {
        let format = if self.lowest {
            FormatPolicy::Lowest
        } else {
            FormatPolicy::Best
        };
        DownloadOptions::default()
            .with_format(format)
            .with_socket_timeout(self.socket_timeout)
    }

    pub async fn run(&self) -> Result<DownloadResult, DownloadError> {
        Downloader::new().run(&self.request(), &self.options()).await
    }
}
