//! `GET /chunklist.m3u8` — the route the rewritten master playlists point
//! at. Fetches a variant chunklist from the channel's upstream directory
//! and absolutizes its segment URIs so players pull media straight from
//! the origin.

use axum::{
    extract::{Query, State},
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

use super::{m3u8_response, upstream_dir, UpstreamTarget};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunklistQuery {
    pub channel: String,
    #[serde(default)]
    pub proxy: bool,
    pub chunklist: String,
}

pub async fn chunklist_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChunklistQuery>,
) -> Result<Response, ProxyError> {
    match serve_chunklist(&state.channels, state.fetcher.as_ref(), &query).await {
        Ok(body) => Ok(m3u8_response(body)),
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(channel = %query.channel, error = %err, "chunklist request failed");
            } else {
                debug!(channel = %query.channel, error = %err, "chunklist request rejected");
            }
            Err(err)
        }
    }
}

pub async fn serve_chunklist(
    channels: &ChannelDirectory,
    fetcher: &dyn HttpFetcher,
    query: &ChunklistQuery,
) -> Result<String, ProxyError> {
    let record = channels
        .get(&query.channel)
        .ok_or_else(|| ProxyError::ChannelNotFound(query.channel.clone()))?;

    let target = UpstreamTarget::chunklist(&query.channel, record, query.proxy, &query.chunklist)?;
    let response = fetcher
        .get(&target.url, &target.headers, target.use_proxy)
        .await?;

    Ok(hls::absolutize_segments(
        &response.body,
        &upstream_dir(&query.channel, record)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelRecord;
    use crate::fetch::{FetchError, FetchResponse};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    const RADIO_CHUNKLIST: &str = "#EXTM3U\n\
#EXT-X-TARGETDURATION:6\n\
#EXT-X-MEDIA-SEQUENCE:100\n\
#EXTINF:6.0,\n\
media_w111_100.aac\n\
#EXTINF:6.0,\n\
media_w111_101.aac\n";

    struct MockFetcher {
        outcome: Result<String, String>,
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl MockFetcher {
        fn replying(body: &str) -> Self {
            Self {
                outcome: Ok(body.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpFetcher for MockFetcher {
        async fn get(
            &self,
            url: &str,
            _headers: &[(String, String)],
            use_proxy: bool,
        ) -> Result<FetchResponse, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), use_proxy));
            match &self.outcome {
                Ok(body) => Ok(FetchResponse { body: body.clone() }),
                Err(message) => Err(FetchError::Request(message.clone())),
            }
        }
    }

    fn radio_directory() -> ChannelDirectory {
        std::iter::once((
            "antena1".to_string(),
            ChannelRecord {
                is_tv: false,
                name: Some("antena180a".to_string()),
            },
        ))
        .collect()
    }

    fn query(chunklist: &str) -> ChunklistQuery {
        ChunklistQuery {
            channel: "antena1".to_string(),
            proxy: false,
            chunklist: chunklist.to_string(),
        }
    }

    #[tokio::test]
    async fn fetches_the_chunklist_from_the_channel_directory() {
        let fetcher = MockFetcher::replying(RADIO_CHUNKLIST);

        serve_chunklist(&radio_directory(), &fetcher, &query("chunklist_DVR.m3u8"))
            .await
            .unwrap();

        let calls = fetcher.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![(
                "http://streaming-live.rtp.pt/liveradio/antena180a/chunklist_DVR.m3u8".to_string(),
                false
            )]
        );
    }

    #[tokio::test]
    async fn absolutizes_segment_uris() {
        let fetcher = MockFetcher::replying(RADIO_CHUNKLIST);

        let body = serve_chunklist(&radio_directory(), &fetcher, &query("chunklist_DVR.m3u8"))
            .await
            .unwrap();

        assert!(body.contains(
            "http://streaming-live.rtp.pt/liveradio/antena180a/media_w111_100.aac"
        ));
        assert!(body.starts_with("#EXTM3U\n"));
    }

    #[tokio::test]
    async fn rejects_non_chunklist_names_without_fetching() {
        let fetcher = MockFetcher::replying(RADIO_CHUNKLIST);

        let err = serve_chunklist(&radio_directory(), &fetcher, &query("../smil:x.smil/playlist.m3u"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_channel_is_rejected() {
        let fetcher = MockFetcher::replying(RADIO_CHUNKLIST);
        let channels = ChannelDirectory::default();

        let err = serve_chunklist(&channels, &fetcher, &query("chunklist_DVR.m3u8"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
