//! Command-line configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// RTP Play live-stream proxy configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "rtp-play-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to bind the server to.
    #[arg(short = 'l', long, default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Outbound proxy URL used for fetches that request proxied delivery.
    #[arg(long)]
    pub proxy_url: Option<String>,

    /// Path to a channels JSON file overriding the bundled table.
    #[arg(long)]
    pub channels: Option<PathBuf>,
}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.proxy_url {
            if !url.starts_with("http://") && !url.starts_with("https://")
                && !url.starts_with("socks5://")
            {
                return Err(format!("Unsupported proxy URL scheme: {}", url));
            }
        }

        if let Some(ref path) = self.channels {
            if !path.exists() {
                return Err(format!("Channels file not found: {}", path.display()));
            }
        }

        Ok(())
    }
}
