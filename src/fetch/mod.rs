// src/fetch/mod.rs
pub mod archive;

use crate::error::DataError;
use reqwest::blocking::Client;
use std::{fmt, fs, path::PathBuf, sync::Arc};
use tracing::{debug, info};
use url::Url;

/// Where a CSV comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(Url),
    /// Bytes already in memory; `id` keys the cache.
    Bytes { id: String, data: Arc<[u8]> },
}

impl Source {
    /// Absolute `http`/`https` URLs become `Url`, anything else a path.
    pub fn parse(s: &str) -> Self {
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Url(url),
            _ => Source::Path(PathBuf::from(s)),
        }
    }

    pub fn bytes(id: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Source::Bytes {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Cache key and log label.
    pub fn id(&self) -> String {
        match self {
            Source::Path(p) => p.display().to_string(),
            Source::Url(u) => u.to_string(),
            Source::Bytes { id, .. } => id.clone(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Read every byte of `source`. One attempt, no retries.
pub fn read_source(client: &Client, source: &Source) -> Result<Vec<u8>, DataError> {
    match source {
        Source::Path(path) => {
            let bytes = fs::read(path).map_err(|e| DataError::unavailable(source.id(), e))?;
            debug!(path = %path.display(), bytes = bytes.len(), "read file");
            Ok(bytes)
        }
        Source::Url(url) => {
            let bytes = download(client, url).map_err(|e| DataError::unavailable(source.id(), e))?;
            info!(url = %url, bytes = bytes.len(), "downloaded");
            Ok(bytes)
        }
        Source::Bytes { data, .. } => Ok(data.to_vec()),
    }
}

fn download(client: &Client, url: &Url) -> reqwest::Result<Vec<u8>> {
    let resp = client.get(url.clone()).send()?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}
