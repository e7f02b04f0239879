use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod channels;
mod config;
mod error;
mod fetch;
mod handler;
mod hls;
mod server;
mod state;

use channels::ChannelDirectory;
use config::Config;
use fetch::ReqwestFetcher;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rtp_play_proxy=info,tower_http=info".into()),
        )
        .init();

    let config = Config::parse();
    config.validate().map_err(std::io::Error::other)?;

    let channels = match &config.channels {
        Some(path) => ChannelDirectory::load(path)?,
        None => ChannelDirectory::bundled()?,
    };
    info!("Loaded {} channels", channels.len());

    let fetcher = ReqwestFetcher::new(config.proxy_url.as_deref())?;

    let state = Arc::new(AppState {
        channels,
        fetcher: Arc::new(fetcher),
    });

    let router = server::create_router(state);
    server::run_http_server(&config, router).await?;

    Ok(())
}
