use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    YtDlp,
    Ffmpeg,
}

impl ToolKind {
    pub fn binary(&self) -> &'static str {
        match self {
            ToolKind::YtDlp => "yt-dlp",
            ToolKind::Ffmpeg => "ffmpeg",
        }
    }

    /// Short install guidance for the running platform, surfaced when the
    /// tool cannot be found.
    pub fn install_hint(&self) -> &'static str {
        match self {
            ToolKind::Ffmpeg => {
                if cfg!(target_os = "macos") {
                    "install it with Homebrew: brew install ffmpeg"
                } else if cfg!(target_os = "windows") {
                    "download it from https://ffmpeg.org/download.html and add it to your PATH"
                } else {
                    "install it with your package manager, e.g. sudo apt-get install ffmpeg"
                }
            }
            ToolKind::YtDlp => {
                if cfg!(target_os = "macos") {
                    "install it with Homebrew: brew install yt-dlp"
                } else if cfg!(target_os = "windows") {
                    "install it with winget install yt-dlp, or pip install -U yt-dlp"
                } else {
                    "install it with pip install -U yt-dlp, or your package manager"
                }
            }
        }
    }
}

/// Where (and whether) a required external tool was found.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub kind: ToolKind,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

impl ToolInfo {
    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

/// Tool detection sits behind this seam so tests can fake an empty system.
pub trait ToolProbe: Send + Sync {
    fn probe(&self, kind: ToolKind) -> ToolInfo;
}

/// Probes the real machine: well-known install locations first, then PATH.
pub struct SystemTools;

impl ToolProbe for SystemTools {
    fn probe(&self, kind: ToolKind) -> ToolInfo {
        let binary = kind.binary();

        let common_paths = [
            format!("/opt/homebrew/bin/{}", binary),
            format!("/usr/local/bin/{}", binary),
            format!("/usr/bin/{}", binary),
        ];

        for path in common_paths {
            if Path::new(&path).exists() {
                let version = read_version(&path, kind);
                return ToolInfo {
                    kind,
                    path: Some(PathBuf::from(path)),
                    version,
                };
            }
        }

        if let Ok(output) = Command::new("which").arg(binary).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    let version = read_version(&path, kind);
                    return ToolInfo {
                        kind,
                        path: Some(PathBuf::from(path)),
                        version,
                    };
                }
            }
        }

        ToolInfo {
            kind,
            path: None,
            version: None,
        }
    }
}

fn read_version(path: &str, kind: ToolKind) -> Option<String> {
    // ffmpeg prints its banner on "-version"; yt-dlp wants "--version"
    let arg = match kind {
        ToolKind::YtDlp => "--version",
        ToolKind::Ffmpeg => "-version",
    };

    match Command::new(path).arg(arg).output() {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout);
            out.lines().next().map(|line| line.trim().to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_names() {
        assert_eq!(ToolKind::YtDlp.binary(), "yt-dlp");
        assert_eq!(ToolKind::Ffmpeg.binary(), "ffmpeg");
    }

    #[test]
    fn every_tool_has_an_install_hint() {
        for kind in [ToolKind::YtDlp, ToolKind::Ffmpeg] {
            assert!(!kind.install_hint().is_empty());
        }
    }

    #[test]
    fn availability_follows_path() {
        let found = ToolInfo {
            kind: ToolKind::Ffmpeg,
            path: Some(PathBuf::from("/usr/bin/ffmpeg")),
            version: None,
        };
        let missing = ToolInfo {
            kind: ToolKind::Ffmpeg,
            path: None,
            version: None,
        };
        assert!(found.is_available());
        assert!(!missing.is_available());
    }

    #[test]
    fn probe_reports_the_requested_kind() {
        let info = SystemTools.probe(ToolKind::YtDlp);
        assert_eq!(info.kind, ToolKind::YtDlp);
    }
}
