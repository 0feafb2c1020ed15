//! Display-name derivation for downloaded files.

use std::ffi::OsStr;
use std::path::Path;

use percent_encoding::percent_decode_str;
use url::Url;

/// Extension used when a URL path carries none.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Pick the name shown to the recipient: a non-empty custom name verbatim,
/// otherwise the sanitized derived name.
#[must_use]
pub fn display_name(custom_name: Option<&str>, derived: &str) -> String {
    match custom_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => sanitize_file_name(derived),
    }
}

/// Last non-empty path segment of `url`, percent-decoded, if any.
#[must_use]
pub fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
}

/// Extension (with leading dot) of the URL's last path segment, or `.bin`.
#[must_use]
pub fn url_extension(url: &Url) -> String {
    last_path_segment(url)
        .and_then(|segment| {
            Path::new(&segment)
                .extension()
                .and_then(OsStr::to_str)
                .filter(|ext| !ext.is_empty())
                .map(|ext| format!(".{}", sanitize_file_name(ext)))
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Default display name for a direct fetch: the last path segment, or
/// `file<ext>` when the path is empty.
#[must_use]
pub fn url_file_name(url: &Url, extension: &str) -> String {
    last_path_segment(url).unwrap_or_else(|| format!("file{extension}"))
}

/// File name component of `path` as UTF-8, lossily converted.
#[must_use]
pub fn path_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
