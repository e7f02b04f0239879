//! `GET /playlist.m3u8` — resolve a channel, fetch its upstream master
//! playlist, and return it with chunklist references routed back through
//! this service.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::channels::ChannelDirectory;
use crate::error::ProxyError;
use crate::fetch::HttpFetcher;
use crate::hls;
use crate::state::AppState;

use super::{m3u8_response, RequestOrigin, UpstreamTarget};

/// Query parameters accepted by the route. Anything beyond `channel` and
/// `proxy` is rejected at extraction time.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaylistQuery {
    pub channel: String,
    #[serde(default)]
    pub proxy: bool,
}

/// Whether the route requires authentication.
pub fn auth() -> bool {
    false
}

/// Query keys the route recognizes.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySchema {
    pub query: &'static [&'static str],
}

pub fn validate() -> QuerySchema {
    QuerySchema {
        query: &["channel", "proxy"],
    }
}

/// Cross-origin policy for the route.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsPolicy {
    pub origin: &'static [&'static str],
}

pub fn cors() -> CorsPolicy {
    CorsPolicy { origin: &["*"] }
}

pub async fn playlist_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlaylistQuery>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let origin = RequestOrigin::from_request(&headers);

    match serve_playlist(&state.channels, state.fetcher.as_ref(), &query, &origin).await {
        Ok(body) => Ok(m3u8_response(body)),
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(channel = %query.channel, error = %err, "playlist request failed");
            } else {
                debug!(channel = %query.channel, error = %err, "playlist request rejected");
            }
            Err(err)
        }
    }
}

/// The request-response flow proper: resolve, fetch once, rewrite.
pub async fn serve_playlist(
    channels: &ChannelDirectory,
    fetcher: &dyn HttpFetcher,
    query: &PlaylistQuery,
    origin: &RequestOrigin,
) -> Result<String, ProxyError> {
    let record = channels
        .get(&query.channel)
        .ok_or_else(|| ProxyError::ChannelNotFound(query.channel.clone()))?;

    let target = UpstreamTarget::playlist(&query.channel, record, query.proxy)?;
    let response = fetcher
        .get(&target.url, &target.headers, target.use_proxy)
        .await?;

    Ok(hls::rewrite_playlist(
        &response.body,
        &origin.base_url(),
        &query.channel,
        query.proxy,
    ))
}
