//! Channel directory: a read-only mapping from channel id to upstream metadata.
//!
//! The directory is loaded once at startup and injected into the handler
//! state. Refreshing it means building a new directory and a new router;
//! request handling never mutates it.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Metadata for a single channel.
///
/// `name` is the upstream stream name and is only required for radio
/// channels, where it forms the URL path segment.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChannelRecord {
    pub is_tv: bool,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to read channels file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid channels JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only channel table.
#[derive(Debug, Clone, Default)]
pub struct ChannelDirectory {
    channels: HashMap<String, ChannelRecord>,
}

impl ChannelDirectory {
    /// The channel table bundled with the binary.
    pub fn bundled() -> Result<Self, DirectoryError> {
        Self::parse(include_str!("channels.json"))
    }

    /// Load a channel table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    fn parse(json: &str) -> Result<Self, DirectoryError> {
        Ok(Self {
            channels: serde_json::from_str(json)?,
        })
    }

    pub fn get(&self, id: &str) -> Option<&ChannelRecord> {
        self.channels.get(id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl FromIterator<(String, ChannelRecord)> for ChannelDirectory {
    fn from_iter<T: IntoIterator<Item = (String, ChannelRecord)>>(iter: T) -> Self {
        Self {
            channels: iter.into_iter().collect(),
        }
    }
}
