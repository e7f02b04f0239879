//! HTTP request handlers and the upstream target model they share.

pub mod chunklist;
pub mod playlist;

use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};

use crate::channels::ChannelRecord;
use crate::error::ProxyError;
use crate::hls;

/// Base URL for live TV repeaters.
pub const TV_BASE: &str = "https://streaming-live.rtp.pt/liverepeater";
/// Base URL for live radio streams.
pub const RADIO_BASE: &str = "http://streaming-live.rtp.pt/liveradio";
const REFERER_BASE: &str = "http://www.rtp.pt/play/direto";

/// Scheme and host of the inbound request, used only to build the URLs
/// that rewritten playlists point back at. It never influences the
/// outbound upstream URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOrigin {
    pub secure: bool,
    pub host: String,
}

impl RequestOrigin {
    pub fn from_request(headers: &HeaderMap) -> Self {
        let secure = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));

        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost")
            .to_string();

        Self { secure, host }
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}", self.host)
    }
}

/// One outbound fetch, fully determined by the channel record and the
/// request's proxy flag.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamTarget {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub use_proxy: bool,
}

impl UpstreamTarget {
    /// The master playlist for a channel. TV repeaters are always https,
    /// radio streams always plain http, whatever the inbound transport was.
    pub fn playlist(
        channel: &str,
        record: &ChannelRecord,
        proxy: bool,
    ) -> Result<Self, ProxyError> {
        let url = if record.is_tv {
            format!("{TV_BASE}/smil:{channel}.smil/playlist.m3u")
        } else {
            format!("{}/playlist.m3u8?DVR", upstream_dir(channel, record)?)
        };

        Ok(Self {
            url,
            headers: referer_headers(channel),
            use_proxy: proxy,
        })
    }

    /// A variant chunklist under the channel's upstream directory.
    pub fn chunklist(
        channel: &str,
        record: &ChannelRecord,
        proxy: bool,
        chunklist: &str,
    ) -> Result<Self, ProxyError> {
        if !hls::is_chunklist_name(chunklist) {
            return Err(ProxyError::InvalidChunklist(chunklist.to_string()));
        }

        Ok(Self {
            url: format!("{}/{chunklist}", upstream_dir(channel, record)?),
            headers: referer_headers(channel),
            use_proxy: proxy,
        })
    }
}

/// Upstream directory that a channel's playlists and segments live under.
pub fn upstream_dir(channel: &str, record: &ChannelRecord) -> Result<String, ProxyError> {
    if record.is_tv {
        Ok(format!("{TV_BASE}/smil:{channel}.smil"))
    } else {
        let name = record
            .name
            .as_deref()
            .ok_or_else(|| ProxyError::InvalidChannelConfig(channel.to_string()))?;
        Ok(format!("{RADIO_BASE}/{name}"))
    }
}

fn referer_headers(channel: &str) -> Vec<(String, String)> {
    // The referer always names the channel id, never the resolved stream
    // name, and always uses the plain-http form.
    vec![("Referer".to_string(), format!("{REFERER_BASE}/{channel}"))]
}

pub(crate) fn m3u8_response(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/vnd.apple.mpegurl"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}
