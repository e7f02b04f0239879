//! HLS playlist text rewriting.
//!
//! The upstream master playlists reference their variant chunklists by
//! relative name (`chunklist_b640000_slpt.m3u8` and the like). Those
//! references are routed back through this service so the player keeps
//! talking to us; everything else in the document is left untouched.

use regex::Regex;
use std::sync::OnceLock;

fn chunklist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"chunklist[\w.-]*\.m3u8").expect("chunklist regex"))
}

/// True if `name` has the shape of an upstream chunklist file name.
pub fn is_chunklist_name(name: &str) -> bool {
    chunklist_re()
        .find(name)
        .is_some_and(|m| m.start() == 0 && m.end() == name.len())
}

/// Rewrite every chunklist reference in a master playlist to point back at
/// this service's `/chunklist.m3u8` route.
///
/// Pure text substitution: line ordering, blank lines, and every other
/// playlist directive pass through byte-for-byte.
pub fn rewrite_playlist(body: &str, base_url: &str, channel: &str, proxy: bool) -> String {
    chunklist_re()
        .replace_all(body, |caps: &regex::Captures| {
            format!(
                "{base_url}/chunklist.m3u8?channel={channel}&proxy={proxy}&chunklist={}",
                &caps[0]
            )
        })
        .into_owned()
}

/// Rewrite relative segment URIs in a media playlist to absolute upstream
/// URLs, so players fetch media directly from the origin.
pub fn absolutize_segments(body: &str, upstream_base: &str) -> String {
    body.split('\n')
        .map(|line| {
            let trimmed = line.trim_end_matches('\r');
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.contains("://") {
                line.to_string()
            } else {
                format!("{upstream_base}/{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
