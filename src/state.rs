//! Application state shared across request handlers.

use std::sync::Arc;

use crate::channels::ChannelDirectory;
use crate::fetch::HttpFetcher;

/// State injected into every handler. The channel directory is read-only
/// for the lifetime of the router; swapping it means building a new state.
pub struct AppState {
    pub channels: ChannelDirectory,
    pub fetcher: Arc<dyn HttpFetcher>,
}
