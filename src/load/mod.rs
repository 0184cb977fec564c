// src/load/mod.rs
mod cache;
mod decode;

pub use cache::DatasetCache;
pub use decode::{default_encodings, TextEncoding};

use crate::error::DataError;
use crate::fetch::{self, archive, Source};
use crate::table::{parse_csv, CollisionPolicy, Dataset};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Knobs for turning bytes into a Dataset.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Tried in order; the first that decodes and parses wins.
    pub encodings: Vec<TextEncoding>,
    pub on_collision: CollisionPolicy,
}

impl LoadOptions {
    /// Identifies these options inside a shared `DatasetCache`.
    pub fn cache_tag(&self) -> String {
        let encodings: Vec<&str> = self.encodings.iter().map(TextEncoding::name).collect();
        format!("{}|{:?}", encodings.join("+"), self.on_collision)
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

/// Reads CSV sources into Datasets, optionally through a shared cache.
pub struct Loader {
    options: LoadOptions,
    cache: Option<Arc<DatasetCache>>,
    client: OnceCell<Client>,
}

impl Loader {
    /// Loader backed by `cache`; repeated loads of a source id under the same
    /// options are served from it.
    pub fn new(cache: Arc<DatasetCache>) -> Self {
        Self::with_options(LoadOptions::default(), Some(cache))
    }

    /// Loader that re-reads its source every time.
    pub fn uncached() -> Self {
        Self::with_options(LoadOptions::default(), None)
    }

    pub fn with_options(options: LoadOptions, cache: Option<Arc<DatasetCache>>) -> Self {
        Self {
            options,
            cache,
            client: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn cache(&self) -> Option<&Arc<DatasetCache>> {
        self.cache.as_ref()
    }

    /// Load `source`, from cache when it has already been read.
    #[tracing::instrument(level = "info", skip(self, source), fields(source = %source))]
    pub fn load(&self, source: &Source) -> Result<Arc<Dataset>, DataError> {
        let id = source.id();
        let tag = self.options.cache_tag();
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&id, &tag)) {
            debug!("cache hit");
            return Ok(hit);
        }
        self.read_and_store(source, id)
    }

    /// Read `source` ignoring any cached copy, and refresh the cache with the result.
    #[tracing::instrument(level = "info", skip(self, source), fields(source = %source))]
    pub fn reload(&self, source: &Source) -> Result<Arc<Dataset>, DataError> {
        let id = source.id();
        self.read_and_store(source, id)
    }

    fn read_and_store(&self, source: &Source, id: String) -> Result<Arc<Dataset>, DataError> {
        let bytes = fetch::read_source(self.client(), source)?;
        let dataset = Arc::new(self.parse_bytes(&id, &bytes)?);
        info!(
            rows = dataset.len(),
            columns = ?dataset.columns(),
            "loaded dataset"
        );
        if let Some(cache) = &self.cache {
            cache.insert(id, self.options.cache_tag(), Arc::clone(&dataset));
        }
        Ok(dataset)
    }

    /// Decode and parse raw bytes, trying each configured encoding in turn.
    pub fn parse_bytes(&self, id: &str, bytes: &[u8]) -> Result<Dataset, DataError> {
        let unpacked;
        let bytes = if archive::is_zip(bytes) {
            let (entry, data) =
                archive::first_csv_entry(bytes).map_err(|reason| DataError::format(id, reason))?;
            debug!(entry = %entry, "using archive entry");
            unpacked = data;
            unpacked.as_slice()
        } else {
            bytes
        };

        let mut last_failure = String::from("no encodings configured");
        for (attempt, encoding) in self.options.encodings.iter().enumerate() {
            if attempt > 0 {
                warn!(encoding = encoding.name(), reason = %last_failure, "retrying with fallback encoding");
            }
            let text = match encoding.decode(bytes) {
                Some(text) => text,
                None => {
                    last_failure = format!("not valid {}", encoding.name());
                    continue;
                }
            };
            match parse_csv(&text, self.options.on_collision) {
                Ok(dataset) => {
                    debug!(encoding = encoding.name(), "decoded");
                    return Ok(dataset);
                }
                Err(reason) => last_failure = format!("{} ({})", reason, encoding.name()),
            }
        }
        Err(DataError::format(id, last_failure))
    }

    fn client(&self) -> &Client {
        self.client.get_or_init(Client::new)
    }
}
