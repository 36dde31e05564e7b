// Format selection policy

/// Streams taller than this are never requested.
pub const MAX_HEIGHT: u32 = 1080;

/// Which stream pair to ask the extraction tool for. The expression is
/// evaluated by yt-dlp itself; the alternatives after each `/` are fallbacks
/// for sources that publish no split video/audio streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatPolicy {
    /// Best video capped at 1080p plus best audio, mp4/m4a preferred so the
    /// merge lands in a widely playable container.
    #[default]
    Best,
    /// Smallest available streams. Useful on slow links.
    Lowest,
}

impl FormatPolicy {
    pub fn format_spec(&self) -> String {
        match self {
            Self::Best => format!(
                "bv[height<={}][ext=mp4]+ba[ext=m4a]/best[ext=mp4]/best",
                MAX_HEIGHT
            ),
            Self::Lowest => {
                "worstvideo[ext=mp4]+worstaudio[ext=m4a]/worst[ext=mp4]/worst".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_caps_height_at_1080() {
        let spec = FormatPolicy::Best.format_spec();
        assert!(spec.contains("height<=1080"));
        assert!(spec.contains("+ba"));
        assert!(spec.ends_with("/best"));
    }

    #[test]
    fn lowest_requests_worst_streams() {
        let spec = FormatPolicy::Lowest.format_spec();
        assert!(spec.starts_with("worstvideo"));
        assert!(spec.ends_with("/worst"));
    }

    #[test]
    fn default_policy_is_best() {
        assert_eq!(FormatPolicy::default(), FormatPolicy::Best);
    }
}
