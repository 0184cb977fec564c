// src/table/mod.rs
mod parse;
mod value;

pub use parse::{parse_csv, CollisionPolicy};
pub use value::{Value, NA_MARKERS};

use crate::resolve::RoleMapping;
use serde::Serialize;
use std::collections::HashMap;

/// An immutable table of observations.
///
/// Columns carry canonical names; every row holds exactly one `Value` per
/// column. Filtering returns a new `Dataset` and leaves this one untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Rows shorter than `columns` are padded with `Missing`, longer ones truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Value::Missing);
                r
            })
            .collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            rows,
            index,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Every value in `column`, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    /// Numeric cells of `column`; missing and text cells are skipped.
    pub fn numeric(&self, name: &str) -> Vec<f64> {
        match self.column(name) {
            Some(values) => values.filter_map(Value::as_f64).collect(),
            None => Vec::new(),
        }
    }

    /// Sorted distinct non-missing values of `column`.
    pub fn distinct_values(&self, name: &str) -> Vec<Value> {
        let mut values: Vec<Value> = match self.column(name) {
            Some(values) => values.filter(|v| !v.is_missing()).cloned().collect(),
            None => return Vec::new(),
        };
        values.sort_by(Value::total_cmp);
        values.dedup();
        values
    }

    /// Rows where every `(column, value)` predicate holds, in dataset order.
    /// A predicate on an unknown column, or one whose value is `Missing`,
    /// matches nothing: a missing cell never equals a selection.
    pub fn filter_eq(&self, predicates: &[(&str, &Value)]) -> Dataset {
        let resolved: Option<Vec<(usize, &Value)>> = predicates
            .iter()
            .map(|(name, v)| self.column_index(name).map(|i| (i, *v)))
            .collect();
        let rows = match resolved {
            Some(preds) if !preds.iter().any(|(_, v)| v.is_missing()) => self
                .rows
                .iter()
                .filter(|row| preds.iter().all(|(i, v)| row[*i] == **v))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        Dataset {
            columns: self.columns.clone(),
            rows,
            index: self.index.clone(),
        }
    }

    /// Rows for one location/year pair.
    pub fn filter_selection(&self, mapping: &RoleMapping, selection: &Selection) -> Dataset {
        self.filter_eq(&[
            (mapping.location(), &selection.location),
            (mapping.year(), &selection.year),
        ])
    }
}

/// The (location, year) pair a user picked.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Selection {
    pub location: Value,
    pub year: Value,
}

impl Selection {
    /// Inputs are inferred like cells so that `"2020"` selects integer years.
    pub fn parse(location: &str, year: &str) -> Self {
        Self {
            location: Value::infer(location),
            year: Value::infer(year),
        }
    }
}
