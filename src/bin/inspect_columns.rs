use anyhow::{Context, Result};
use rockfall::{Loader, Resolver, Source};
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

/// Print the canonical columns of a CSV and how each role resolved.
fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = env::args()
        .nth(1)
        .context("usage: inspect_columns <csv path or url>")?;
    let data = Loader::uncached().load(&Source::parse(&source))?;

    println!("{} rows, {} columns", data.len(), data.columns().len());
    for (i, col) in data.columns().iter().enumerate() {
        println!("  [{:>2}] {}", i, col);
    }

    let resolver = Resolver::default();
    let mapping = resolver.resolve(data.columns())?;
    println!("\nroles:");
    for rule in resolver.rules() {
        match mapping.get(rule.role) {
            Some(col) => println!("  {:<24} -> {}", rule.role.to_string(), col),
            None => println!("  {:<24} -- unresolved", rule.role.to_string()),
        }
    }
    Ok(())
}
