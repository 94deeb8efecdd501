//! Label-substring rules shared by every adapter: quality tier, hoster
//! name, file size and episode markers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use url::Url;

/// Quality tier of a stream, used for ranking only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    FourK,
    P1080,
    P720,
    P480,
    Unknown,
}

impl Quality {
    /// Ranking weight: 4K(4) > 1080p(3) > 720p(2) > 480p(1) > unknown(0).
    pub fn rank(self) -> u8 {
        match self {
            Quality::FourK => 4,
            Quality::P1080 => 3,
            Quality::P720 => 2,
            Quality::P480 => 1,
            Quality::Unknown => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::FourK => "4K",
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::Unknown => "Unknown",
        }
    }

    /// Classify free label text. First matching row wins; text with no
    /// marker at all is assumed to be 720p. Letter markers (`4K`, `UHD`,
    /// `FHD`, `SD`) only count as standalone tokens.
    pub fn classify(text: &str) -> Self {
        QUALITY_ROWS
            .iter()
            .find(|(pattern, _)| pattern.is_match(text))
            .map_or(Quality::P720, |&(_, quality)| quality)
    }
}

static QUALITY_ROWS: LazyLock<[(Regex, Quality); 4]> = LazyLock::new(|| {
    let row = |pattern: &str, quality| {
        (Regex::new(pattern).expect("quality pattern is valid"), quality)
    };
    [
        row(r"(?i)2160|\b4k\b|\buhd\b", Quality::FourK),
        row(r"(?i)1080|\bfhd\b", Quality::P1080),
        row(r"720", Quality::P720),
        row(r"(?i)480|\bsd\b", Quality::P480),
    ]
});

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Quality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Known hosters, matched as substrings of the lowercased host + path.
const HOSTERS: &[(&str, &str)] = &[
    ("hubcloud", "HubCloud"),
    ("hubdrive", "HubDrive"),
    ("pixeldrain", "Pixeldrain"),
    ("streamtape", "StreamTape"),
    ("voe", "VOE"),
    ("mixdrop", "Mixdrop"),
    ("dood", "DoodStream"),
];

/// Hoster name for a stream URL, `"Direct"` when unknown.
pub fn classify_server(url: &str) -> &'static str {
    let haystack = match Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()),
        Err(_) => url.to_string(),
    }
    .to_lowercase();

    HOSTERS
        .iter()
        .find(|(marker, _)| haystack.contains(marker))
        .map_or("Direct", |&(_, name)| name)
}

static SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(TB|GB|MB)\b").expect("size pattern is valid")
});

/// Size sentinel used when a label carries no size.
pub const UNKNOWN_SIZE: &str = "Unknown";

/// First `1.4GB` / `700 MB` style size in the label, normalized to `"1.4 GB"`.
pub fn parse_size(text: &str) -> String {
    SIZE.captures(text).map_or_else(
        || UNKNOWN_SIZE.to_string(),
        |caps| format!("{} {}", &caps[1], caps[2].to_uppercase()),
    )
}

/// Episode markers: `e5`, `E05`, `ep 5`, `Episode 5`. The marker must not
/// be the tail of a longer word; the number is taken whole, so `S01E15` is
/// episode 15 and never 5.
static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:e|ep|episode)[\s._-]*(\d+)").expect("episode pattern is valid")
});

/// Whether `text` carries a marker for episode `episode`.
pub fn matches_episode(text: &str, episode: u32) -> bool {
    EPISODE_MARKER
        .captures_iter(text)
        .any(|caps| caps[1].parse::<u32>() == Ok(episode))
}

/// `S01E05`-style tag for adapters whose resource is already episode-scoped.
pub fn episode_tag(season: u32, episode: u32) -> String {
    format!("S{season:02}E{episode:02}")
}
