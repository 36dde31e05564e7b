// yt-dlp backend: builds the invocation, streams tool output, and recovers
// the path of the merged file from the lines yt-dlp prints.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{DownloadOptions, VideoInfo};
use crate::downloader::tools::{ToolKind, ToolProbe};
use crate::downloader::traits::DownloaderBackend;
use crate::downloader::utils::run_output_with_timeout;

// Wall-clock grace on top of the socket timeout for the metadata call;
// extraction does several round trips before any media moves.
const INFO_TIMEOUT_GRACE_SECS: u64 = 30;

lazy_static! {
    static ref DEST_RE: Regex = Regex::new(r#"\[download\]\s+Destination:\s+(.+)"#).unwrap();
    static ref MERGE_RE: Regex =
        Regex::new(r#"\[Merger\]\s+Merging formats into\s+"(.+)""#).unwrap();
    static ref ALREADY_RE: Regex =
        Regex::new(r#"\[download\]\s+(.+)\s+has already been downloaded"#).unwrap();
}

pub struct YtDlpBackend {
    binary: PathBuf,
}

impl YtDlpBackend {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Resolve the binary through the given probe; `None` when absent.
    pub fn detect(probe: &dyn ToolProbe) -> Option<Self> {
        probe.probe(ToolKind::YtDlp).path.map(Self::new)
    }

    fn info_args(url: &str, options: &DownloadOptions) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            options.socket_timeout_secs.to_string(),
            "-f".to_string(),
            options.format.format_spec(),
            url.to_string(),
        ]
    }

    fn download_args(url: &str, dest_dir: &Path, options: &DownloadOptions) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            options.format.format_spec(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--newline".to_string(),
            "--socket-timeout".to_string(),
            options.socket_timeout_secs.to_string(),
            "-P".to_string(),
            dest_dir.to_string_lossy().to_string(),
            "-o".to_string(),
            options.output_template.clone(),
        ];

        if options.merge {
            args.push("--merge-output-format".to_string());
            args.push("mp4".to_string());
        }
        if options.overwrite {
            args.push("--force-overwrites".to_string());
        }

        args.push(url.to_string());
        args
    }

    fn parse_info(stdout: &[u8]) -> Result<VideoInfo, DownloadError> {
        let json: serde_json::Value = serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::Parse(format!("invalid metadata JSON: {}", e)))?;

        Ok(VideoInfo {
            id: json["id"].as_str().unwrap_or("unknown").to_string(),
            title: json["title"].as_str().unwrap_or("Unknown").to_string(),
            uploader: json["uploader"].as_str().unwrap_or("Unknown").to_string(),
            duration_seconds: json["duration"].as_f64().unwrap_or(0.0) as u64,
            height: json["height"].as_u64().map(|h| h as u32),
        })
    }
}

/// A path announced on one progress line, and whether it names the merged
/// output rather than a single stream.
fn parse_output_line(line: &str) -> Option<(PathBuf, bool)> {
    if let Some(caps) = MERGE_RE.captures(line) {
        return Some((PathBuf::from(caps.get(1)?.as_str().trim()), true));
    }
    if let Some(caps) = DEST_RE.captures(line) {
        let path = caps.get(1)?.as_str().trim();
        if !path.is_empty() {
            return Some((PathBuf::from(path), false));
        }
    }
    if let Some(caps) = ALREADY_RE.captures(line) {
        return Some((PathBuf::from(caps.get(1)?.as_str().trim()), false));
    }
    None
}

#[async_trait]
impl DownloaderBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch_info(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<VideoInfo, DownloadError> {
        let args = Self::info_args(url, options);
        debug!("running {} {}", self.binary.display(), args.join(" "));

        let deadline = u64::from(options.socket_timeout_secs) + INFO_TIMEOUT_GRACE_SECS;
        let output = run_output_with_timeout(&self.binary, args, deadline).await?;

        if !output.status.success() {
            return Err(DownloadError::from_tool_output(&String::from_utf8_lossy(
                &output.stderr,
            )));
        }

        Self::parse_info(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        options: &DownloadOptions,
    ) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(dest_dir).await.map_err(|e| {
            DownloadError::Storage(format!("cannot create {}: {}", dest_dir.display(), e))
        })?;

        let args = Self::download_args(url, dest_dir, options);
        info!("downloading {}", url);
        debug!("running {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DownloadError::Execution(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DownloadError::Execution("failed to capture stdout from yt-dlp".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            DownloadError::Execution("failed to capture stderr from yt-dlp".to_string())
        })?;

        // The merger line names the combined file and wins over the
        // per-stream destinations that precede it.
        let line_reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut last_dest: Option<PathBuf> = None;
            let mut merged: Option<PathBuf> = None;
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_output_line(&line) {
                    Some((path, true)) => merged = Some(path),
                    Some((path, false)) => last_dest = Some(path),
                    None => debug!("{}", line),
                }
            }
            merged.or(last_dest)
        });

        let stderr_reader = tokio::spawn(async move {
            let mut buf = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        let status = child.wait().await.map_err(|e| {
            DownloadError::Execution(format!("yt-dlp did not run to completion: {}", e))
        })?;
        let output_path = line_reader.await.unwrap_or(None);
        let stderr_buf = stderr_reader.await.unwrap_or_default();

        if !status.success() {
            return Err(DownloadError::from_tool_output(&stderr_buf));
        }

        output_path.ok_or_else(|| {
            DownloadError::Parse("download finished but no destination was reported".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::format::FormatPolicy;

    #[test]
    fn parse_destination_line() {
        let (path, merged) =
            parse_output_line("[download] Destination: ./My Clip.f137.mp4").unwrap();
        assert_eq!(path, PathBuf::from("./My Clip.f137.mp4"));
        assert!(!merged);
    }

    #[test]
    fn parse_merger_line() {
        let (path, merged) =
            parse_output_line("[Merger] Merging formats into \"./My Clip.mp4\"").unwrap();
        assert_eq!(path, PathBuf::from("./My Clip.mp4"));
        assert!(merged);
    }

    #[test]
    fn parse_already_downloaded_line() {
        let (path, merged) =
            parse_output_line("[download] ./My Clip.mp4 has already been downloaded").unwrap();
        assert_eq!(path, PathBuf::from("./My Clip.mp4"));
        assert!(!merged);
    }

    #[test]
    fn progress_lines_are_not_paths() {
        assert!(parse_output_line("[download]  42.0% of 10.00MiB at 1.00MiB/s").is_none());
        assert!(parse_output_line("").is_none());
    }

    #[test]
    fn download_args_carry_the_policy_and_overwrite_flag() {
        let options = DownloadOptions::default();
        let args = YtDlpBackend::download_args(
            "https://www.youtube.com/watch?v=abc123",
            Path::new("/videos"),
            &options,
        );

        let f = args.iter().position(|a| a == "-f").unwrap();
        assert!(args[f + 1].contains("height<=1080"));

        let p = args.iter().position(|a| a == "-P").unwrap();
        assert_eq!(args[p + 1], "/videos");

        let o = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o + 1], "%(title)s.%(ext)s");

        let m = args.iter().position(|a| a == "--merge-output-format").unwrap();
        assert_eq!(args[m + 1], "mp4");

        assert!(args.contains(&"--force-overwrites".to_string()));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn download_args_without_overwrite_or_merge() {
        let mut options = DownloadOptions::default();
        options.overwrite = false;
        options.merge = false;
        let args = YtDlpBackend::download_args("https://youtu.be/abc", Path::new("."), &options);

        assert!(!args.contains(&"--force-overwrites".to_string()));
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn lowest_policy_reaches_the_format_argument() {
        let options = DownloadOptions::default().with_format(FormatPolicy::Lowest);
        let args = YtDlpBackend::info_args("https://youtu.be/abc", &options);

        assert!(args.contains(&"--dump-json".to_string()));
        assert!(args.contains(&"--skip-download".to_string()));
        let f = args.iter().position(|a| a == "-f").unwrap();
        assert!(args[f + 1].starts_with("worstvideo"));
    }

    #[test]
    fn parse_info_extracts_fields() {
        let json = serde_json::json!({
            "id": "abc123",
            "title": "A short test video",
            "uploader": "someone",
            "duration": 12.5,
            "height": 1080
        });
        let info = YtDlpBackend::parse_info(json.to_string().as_bytes()).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.title, "A short test video");
        assert_eq!(info.duration_seconds, 12);
        assert_eq!(info.height, Some(1080));
    }

    #[test]
    fn parse_info_rejects_garbage() {
        let err = YtDlpBackend::parse_info(b"not json at all").unwrap_err();
        assert!(matches!(err, DownloadError::Parse(_)));
    }

    #[tokio::test]
    async fn download_creates_the_destination_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("saved");

        let backend = YtDlpBackend::new(PathBuf::from("/nonexistent/yt-dlp-test-binary"));
        let err = backend
            .download(
                "https://www.youtube.com/watch?v=abc123",
                &dest,
                &DownloadOptions::default(),
            )
            .await
            .unwrap_err();

        // The spawn fails, but the directory must already exist by then.
        assert!(matches!(err, DownloadError::Execution(_)));
        assert!(dest.is_dir());
    }
}
