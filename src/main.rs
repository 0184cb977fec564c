use anyhow::{Context, Result};
use rockfall::{
    export, summary, Config, DatasetCache, LoadOptions, Loader, Resolver, Selection, Source,
    Summary,
};
use std::{env, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    let mut cfg = Config::from_env()?;
    cfg.apply_args(env::args().skip(1));
    info!(source = %cfg.source, "startup");

    // ─── 3) load + resolve ───────────────────────────────────────────
    let loader = Loader::with_options(
        LoadOptions {
            on_collision: cfg.on_collision,
            ..LoadOptions::default()
        },
        Some(Arc::new(DatasetCache::new())),
    );
    let source = Source::parse(&cfg.source);
    let data = loader.load(&source)?;
    info!(columns = ?data.columns(), "columns detected");
    let mapping = Resolver::default().resolve(data.columns())?;

    // ─── 4) selection (first option when unset) ──────────────────────
    let (locations, years) = summary::filter_options(&data, &mapping);
    let location = match &cfg.location {
        Some(l) => l.clone(),
        None => locations
            .first()
            .map(ToString::to_string)
            .context("dataset has no location values")?,
    };
    let year = match &cfg.year {
        Some(y) => y.clone(),
        None => years
            .first()
            .map(ToString::to_string)
            .context("dataset has no year values")?,
    };
    let selection = Selection::parse(&location, &year);
    let filtered = data.filter_selection(&mapping, &selection);
    info!(
        location = %selection.location,
        year = %selection.year,
        rows = filtered.len(),
        "filtered"
    );

    // ─── 5) summary to stdout ────────────────────────────────────────
    let report = Summary::compute(&filtered, &mapping, &selection, cfg.histogram_bins);
    println!("{}", serde_json::to_string_pretty(&report)?);

    // ─── 6) optional export ──────────────────────────────────────────
    if let Some(dir) = &cfg.export_dir {
        let path = export::export_selection(
            &filtered,
            dir,
            &selection.location,
            &selection.year,
            cfg.export_format,
        )?;
        info!(path = %path.display(), "export written");
    }

    info!("all done");
    Ok(())
}
