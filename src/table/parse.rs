use crate::resolve::canonical;
use crate::table::{Dataset, Value};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// What to do when two header cells canonicalize to the same name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Refuse the table.
    #[default]
    Reject,
    /// The first column with the name survives.
    KeepFirst,
    /// The last column with the name survives, at the first one's position.
    KeepLast,
}

/// Parse decoded CSV text (header row first) into a Dataset.
///
/// Returns the failure reason as a string; the caller attaches the source id.
pub fn parse_csv(text: &str, policy: CollisionPolicy) -> Result<Dataset, String> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows are padded below
        .from_reader(text.as_bytes());

    let raw_headers = rdr
        .headers()
        .map_err(|e| format!("reading header row: {}", e))?
        .clone();
    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err("no header row".into());
    }

    let names: Vec<String> = raw_headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let name = canonical(h);
            if name.is_empty() {
                format!("unnamed: {}", i)
            } else {
                name
            }
        })
        .collect();
    let (columns, sources) = select_columns(&names, policy)?;
    let width = names.len();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| format!("record {}: {}", idx + 1, e))?;
        if record.len() > width {
            return Err(format!(
                "record {} has {} fields, header has {}",
                idx + 1,
                record.len(),
                width
            ));
        }
        let row: Vec<Value> = sources
            .iter()
            .map(|&src| record.get(src).map(Value::infer).unwrap_or(Value::Missing))
            .collect();
        rows.push(row);
    }

    debug!(columns = columns.len(), rows = rows.len(), "parsed csv");
    Ok(Dataset::new(columns, rows))
}

/// Pick the surviving column names and, for each, the raw field index it is
/// read from.
fn select_columns(
    names: &[String],
    policy: CollisionPolicy,
) -> Result<(Vec<String>, Vec<usize>), String> {
    let mut columns: Vec<String> = Vec::with_capacity(names.len());
    let mut sources: Vec<usize> = Vec::with_capacity(names.len());
    let mut position: HashMap<&str, usize> = HashMap::new();

    for (i, name) in names.iter().enumerate() {
        match position.get(name.as_str()) {
            None => {
                position.insert(name.as_str(), columns.len());
                columns.push(name.clone());
                sources.push(i);
            }
            Some(&slot) => match policy {
                CollisionPolicy::Reject => {
                    return Err(format!(
                        "columns {} and {} both canonicalize to `{}`",
                        sources[slot], i, name
                    ));
                }
                CollisionPolicy::KeepFirst => {
                    warn!(column = %name, index = i, "duplicate column dropped");
                }
                CollisionPolicy::KeepLast => {
                    warn!(column = %name, index = sources[slot], "duplicate column overwritten");
                    sources[slot] = i;
                }
            },
        }
    }
    Ok((columns, sources))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_headers() -> anyhow::Result<()> {
        let ds = parse_csv(" Location ,YEAR,Rockfall\nA,2020,Yes\n", CollisionPolicy::Reject)
            .map_err(anyhow::Error::msg)?;
        assert_eq!(ds.columns(), ["location", "year", "rockfall"]);
        assert_eq!(ds.value(0, "year"), Some(&Value::Int(2020)));
        Ok(())
    }

    #[test]
    fn blank_headers_get_positional_names() -> anyhow::Result<()> {
        let ds = parse_csv(",location\n1,A\n", CollisionPolicy::Reject).map_err(anyhow::Error::msg)?;
        assert_eq!(ds.columns(), ["unnamed: 0", "location"]);
        Ok(())
    }

    #[test]
    fn short_rows_are_padded_long_rows_rejected() {
        let ds = parse_csv("a,b,c\n1,2\n", CollisionPolicy::Reject).expect("short row parses");
        assert!(ds.value(0, "c").map(Value::is_missing).unwrap_or(false));

        let err = parse_csv("a,b\n1,2,3\n", CollisionPolicy::Reject).unwrap_err();
        assert!(err.contains("3 fields"), "{}", err);
    }

    #[test]
    fn empty_text_has_no_header() {
        assert!(parse_csv("", CollisionPolicy::Reject).is_err());
    }

    #[test]
    fn collision_policies() {
        let text = "Year,year ,x\n2019,2020,1\n";

        let err = parse_csv(text, CollisionPolicy::Reject).unwrap_err();
        assert!(err.contains("`year`"), "{}", err);

        let first = parse_csv(text, CollisionPolicy::KeepFirst).expect("keep first");
        assert_eq!(first.columns(), ["year", "x"]);
        assert_eq!(first.value(0, "year"), Some(&Value::Int(2019)));

        let last = parse_csv(text, CollisionPolicy::KeepLast).expect("keep last");
        assert_eq!(last.columns(), ["year", "x"]);
        assert_eq!(last.value(0, "year"), Some(&Value::Int(2020)));
    }
}
