// Common data models for one download invocation

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::downloader::format::FormatPolicy;

/// One download as requested on the command line.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    /// Directory to save into; `None` means the current working directory.
    pub destination: Option<PathBuf>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: None,
        }
    }

    pub fn with_destination(mut self, dir: Option<PathBuf>) -> Self {
        self.destination = dir;
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.destination
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// The recognized configuration surface for the external tool. A fixed set
/// of options rather than an open-ended map, so unsupported knobs fail to
/// compile instead of being silently ignored.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub format: FormatPolicy,
    /// Output template for the file name inside the target directory.
    pub output_template: String,
    /// Mux video and audio into a single mp4 once both streams are fetched.
    pub merge: bool,
    /// Passed through as `--socket-timeout`; no timeout logic of our own.
    pub socket_timeout_secs: u32,
    /// A repeat run replaces an existing file of the same name.
    pub overwrite: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            format: FormatPolicy::default(),
            output_template: "%(title)s.%(ext)s".to_string(),
            merge: true,
            socket_timeout_secs: 30,
            overwrite: true,
        }
    }
}

impl DownloadOptions {
    pub fn with_format(mut self, format: FormatPolicy) -> Self {
        self.format = format;
        self
    }

    pub fn with_socket_timeout(mut self, secs: u32) -> Self {
        self.socket_timeout_secs = secs;
        self
    }
}

/// Video metadata from the extraction step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub duration_seconds: u64,
    /// Vertical resolution of the selected video stream, when known.
    pub height: Option<u32>,
}

/// Successful outcome of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub output_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_the_documented_policy() {
        let options = DownloadOptions::default();
        assert_eq!(options.format, FormatPolicy::Best);
        assert_eq!(options.output_template, "%(title)s.%(ext)s");
        assert!(options.merge);
        assert!(options.overwrite);
        assert_eq!(options.socket_timeout_secs, 30);
    }

    #[test]
    fn output_dir_defaults_to_the_working_directory() {
        let request = DownloadRequest::new("https://youtu.be/abc123");
        assert_eq!(request.output_dir(), PathBuf::from("."));

        let request = request.with_destination(Some(PathBuf::from("/videos")));
        assert_eq!(request.output_dir(), PathBuf::from("/videos"));
    }
}
