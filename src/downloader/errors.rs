// Error types for the download pipeline

use std::fmt;

use crate::downloader::tools::ToolKind;

#[derive(Debug, Clone)]
pub enum DownloadError {
    /// Network-level failure reaching the video source (potentially transient)
    Transport(String),

    /// The URL does not correspond to a downloadable video: bad link,
    /// private, removed, age- or region-restricted
    UnsupportedSource(String),

    /// A required external tool is not installed
    MissingDependency { tool: ToolKind, hint: String },

    /// Cannot write the output file
    Storage(String),

    /// Tool produced output we could not make sense of
    Parse(String),

    /// Tool invocation failed for a reason outside the kinds above
    Execution(String),
}

impl DownloadError {
    pub fn missing_tool(tool: ToolKind) -> Self {
        Self::MissingDependency {
            tool,
            hint: tool.install_hint().to_string(),
        }
    }

    /// A transient error could succeed on a later run. Nothing retries it
    /// automatically; the kind is only surfaced to the user.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Classify a yt-dlp stderr dump into an error kind.
    pub fn from_tool_output(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();

        // ffmpeg vanishing mid-run is a dependency problem, not a download one
        if lower.contains("ffmpeg")
            && (lower.contains("not found")
                || lower.contains("not installed")
                || lower.contains("no such file"))
        {
            return Self::missing_tool(ToolKind::Ffmpeg);
        }

        if lower.contains("no space left")
            || lower.contains("disk full")
            || lower.contains("read-only file system")
            || lower.contains("permission denied")
            || lower.contains("errno 28")
        {
            return Self::Storage(summarize(stderr));
        }

        if lower.contains("video unavailable")
            || lower.contains("has been removed")
            || lower.contains("no longer available")
            || lower.contains("private video")
            || lower.contains("sign in to confirm")
            || lower.contains("age-restricted")
            || lower.contains("login required")
            || lower.contains("not available in your country")
            || lower.contains("blocked in your country")
            || lower.contains("members only")
            || lower.contains("members-only")
            || lower.contains("drm")
            || lower.contains("403")
            || lower.contains("forbidden")
            || lower.contains("unsupported url")
            || lower.contains("is not a valid url")
        {
            return Self::UnsupportedSource(summarize(stderr));
        }

        if lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("connection refused")
            || lower.contains("connection reset")
            || lower.contains("network unreachable")
            || lower.contains("name resolution")
            || lower.contains("unable to download webpage")
        {
            return Self::Transport(summarize(stderr));
        }

        Self::Execution(summarize(stderr))
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "network error: {}", msg),
            Self::UnsupportedSource(msg) => write!(f, "cannot download this URL: {}", msg),
            Self::MissingDependency { tool, hint } => write!(
                f,
                "{} is not installed or not on your PATH ({})",
                tool.binary(),
                hint
            ),
            Self::Storage(msg) => write!(f, "cannot write output: {}", msg),
            Self::Parse(msg) => write!(f, "unexpected yt-dlp output: {}", msg),
            Self::Execution(msg) => write!(f, "yt-dlp failed: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

/// Boil a multi-line stderr dump down to its most useful line, preferring
/// the last "ERROR:" line the tool printed.
fn summarize(stderr: &str) -> String {
    let line = stderr
        .lines()
        .rev()
        .find(|l| {
            let t = l.trim().to_lowercase();
            t.starts_with("error:") || t.starts_with("error ")
        })
        .or_else(|| stderr.lines().rev().find(|l| !l.trim().is_empty()))
        .unwrap_or("")
        .trim();

    line.strip_prefix("ERROR: ")
        .or_else(|| line.strip_prefix("ERROR:"))
        .unwrap_or(line)
        .to_string()
}
