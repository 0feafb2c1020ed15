//! URL classification into download platform categories.
//!
//! # Design
//! - Classification is a pure function over the URL text; no parsing or I/O.
//! - Matching is case-insensitive substring search over a fixed table, first
//!   match wins, and anything unmatched falls through to [`Platform::Direct`].

use std::fmt::{self, Display, Formatter};

/// Platform category that decides which download strategy handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Primary video site; audio is extracted.
    Youtube,
    /// Audio streaming site.
    Spotify,
    /// Audio streaming site.
    Deezer,
    /// Audio streaming site.
    SoundCloud,
    /// Restricted-content video sites.
    Restricted,
    /// Anything else; fetched over plain HTTP.
    Direct,
}

const PLATFORM_TABLE: &[(&str, Platform)] = &[
    ("youtube.com", Platform::Youtube),
    ("youtu.be", Platform::Youtube),
    ("spotify.com", Platform::Spotify),
    ("deezer.com", Platform::Deezer),
    ("soundcloud.com", Platform::SoundCloud),
    ("pornhub.com", Platform::Restricted),
    ("redtube.com", Platform::Restricted),
    ("xvideos.com", Platform::Restricted),
];

/// Classify `url` into a [`Platform`].
#[must_use]
pub fn classify(url: &str) -> Platform {
    let lowered = url.to_ascii_lowercase();
    PLATFORM_TABLE
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map_or(Platform::Direct, |(_, platform)| *platform)
}

impl Platform {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Spotify => "spotify",
            Self::Deezer => "deezer",
            Self::SoundCloud => "soundcloud",
            Self::Restricted => "restricted",
            Self::Direct => "direct",
        }
    }

    /// Whether the downloader should convert the output to audio.
    #[must_use]
    pub const fn wants_audio(self) -> bool {
        matches!(
            self,
            Self::Youtube | Self::Spotify | Self::Deezer | Self::SoundCloud
        )
    }
}

impl Display for Platform {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_site_urls_classify_as_youtube() {
        assert_eq!(classify("https://www.youtube.com/watch?v=x"), Platform::Youtube);
        assert_eq!(classify("https://youtu.be/abc"), Platform::Youtube);
        assert_eq!(classify("HTTPS://WWW.YOUTUBE.COM/watch?v=y"), Platform::Youtube);
    }

    #[test]
    fn streaming_sites_map_to_their_categories() {
        assert_eq!(
            classify("https://open.spotify.com/track/1"),
            Platform::Spotify
        );
        assert_eq!(classify("https://www.deezer.com/track/2"), Platform::Deezer);
        assert_eq!(
            classify("https://SoundCloud.com/artist/song"),
            Platform::SoundCloud
        );
    }

    #[test]
    fn restricted_sites_are_grouped() {
        assert_eq!(classify("https://pornhub.com/view"), Platform::Restricted);
        assert_eq!(classify("https://www.xvideos.com/v"), Platform::Restricted);
        assert_eq!(classify("https://redtube.com/1"), Platform::Restricted);
    }

    #[test]
    fn unknown_urls_fall_back_to_direct() {
        assert_eq!(classify("https://example.com/file.zip"), Platform::Direct);
        assert_eq!(classify(""), Platform::Direct);
    }

    #[test]
    fn first_table_entry_wins_when_several_fragments_match() {
        assert_eq!(
            classify("https://spotify.com/redirect?to=youtube.com"),
            Platform::Youtube
        );
    }

    #[test]
    fn only_music_categories_request_audio() {
        assert!(Platform::Youtube.wants_audio());
        assert!(Platform::SoundCloud.wants_audio());
        assert!(!Platform::Restricted.wants_audio());
        assert!(!Platform::Direct.wants_audio());
        assert_eq!(Platform::SoundCloud.to_string(), "soundcloud");
    }
}
