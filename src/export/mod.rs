// src/export/mod.rs
mod columnar;

pub use columnar::{arrow_schema, to_record_batch, write_parquet};

use crate::table::{Dataset, Value};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("file-name pattern should be valid"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Parquet,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Parquet => "parquet",
        }
    }
}

/// `rockfall_<location>_<year>.<ext>`, with anything outside `[A-Za-z0-9._-]`
/// collapsed to `_`.
pub fn export_file_name(location: &Value, year: &Value, format: ExportFormat) -> String {
    let raw = format!("rockfall_{}_{}", location, year);
    format!(
        "{}.{}",
        UNSAFE_CHARS.replace_all(&raw, "_"),
        format.extension()
    )
}

/// Header row of column names, then one line per row; missing cells are empty.
pub fn write_csv<W: Write>(ds: &Dataset, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ds.columns())
        .context("writing csv header")?;
    for (idx, row) in ds.rows().enumerate() {
        wtr.write_record(row.iter().map(Value::to_string))
            .with_context(|| format!("writing csv row {}", idx))?;
    }
    wtr.flush().context("flushing csv writer")?;
    Ok(())
}

/// Write `ds` into `dir` under its selection-derived name. Returns the path.
pub fn export_selection(
    ds: &Dataset,
    dir: &Path,
    location: &Value,
    year: &Value,
    format: ExportFormat,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating export directory {:?}", dir))?;
    let path = dir.join(export_file_name(location, year, format));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    match format {
        ExportFormat::Csv => write_csv(ds, file)?,
        ExportFormat::Parquet => {
            let rows = write_parquet(ds, file)?;
            info!(rows, "parquet written");
        }
    }
    info!(path = %path.display(), rows = ds.len(), "exported selection");
    Ok(path)
}
