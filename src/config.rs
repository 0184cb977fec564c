use crate::export::ExportFormat;
use crate::summary::DEFAULT_HISTOGRAM_BINS;
use crate::table::CollisionPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const CONFIG_ENV: &str = "ROCKFALL_CONFIG";
pub const SOURCE_ENV: &str = "ROCKFALL_SOURCE";
pub const LOCATION_ENV: &str = "ROCKFALL_LOCATION";
pub const YEAR_ENV: &str = "ROCKFALL_YEAR";
pub const EXPORT_DIR_ENV: &str = "ROCKFALL_EXPORT_DIR";

pub const DEFAULT_SOURCE: &str = "airockfalldata.csv";

/// Run settings. Precedence: YAML file < environment < command line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local path or http(s) URL of the observation CSV.
    pub source: String,
    pub location: Option<String>,
    pub year: Option<String>,
    /// When set, the filtered rows are written here.
    pub export_dir: Option<PathBuf>,
    pub export_format: ExportFormat,
    pub on_collision: CollisionPolicy,
    pub histogram_bins: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            location: None,
            year: None,
            export_dir: None,
            export_format: ExportFormat::default(),
            on_collision: CollisionPolicy::default(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl Config {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid config yaml")
    }

    /// File named by `ROCKFALL_CONFIG` (if any), then the other env overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match env::var(CONFIG_ENV) {
            Ok(path) => {
                debug!(path = %path, "loading config file");
                Self::from_yaml_file(path)?
            }
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok());
        Ok(cfg)
    }

    /// Override fields from a key lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(SOURCE_ENV) {
            self.source = v;
        }
        if let Some(v) = lookup(LOCATION_ENV) {
            self.location = Some(v);
        }
        if let Some(v) = lookup(YEAR_ENV) {
            self.year = Some(v);
        }
        if let Some(v) = lookup(EXPORT_DIR_ENV) {
            self.export_dir = Some(PathBuf::from(v));
        }
    }

    /// Positional arguments: `[SOURCE] [LOCATION] [YEAR]`.
    pub fn apply_args<I: IntoIterator<Item = String>>(&mut self, args: I) {
        let mut args = args.into_iter();
        if let Some(source) = args.next() {
            self.source = source;
        }
        if let Some(location) = args.next() {
            self.location = Some(location);
        }
        if let Some(year) = args.next() {
            self.year = Some(year);
        }
    }
}
