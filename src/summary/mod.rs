// src/summary/mod.rs
pub mod stats;

use crate::resolve::{Month, Role, RoleMapping};
use crate::table::{Dataset, Selection, Value};
use serde::Serialize;
use stats::{mean, value_counts, CategoricalStats, Histogram, NumericStats};
use tracing::warn;

/// Outcome value counted as a rockfall. Compared case-sensitively.
pub const ROCKFALL_YES: &str = "Yes";

pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub month: Month,
    pub rainfall: Option<f64>,
    pub temperature: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TerrainHistogram {
    pub role: Role,
    pub column: String,
    pub histogram: Histogram,
}

/// Everything the dashboard shows for one selection, computed from the
/// filtered rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub selection: Selection,
    pub sample_count: usize,
    pub avg_rainfall: Option<f64>,
    pub avg_temperature: Option<f64>,
    /// Percentage of rows whose outcome is exactly `"Yes"`.
    pub rockfall_rate: Option<f64>,
    pub monthly: Vec<MonthlyAverage>,
    pub rockfall_distribution: Vec<(String, usize)>,
    pub probability_stats: Option<NumericStats>,
    pub outcome_stats: Option<CategoricalStats>,
    pub terrain: Vec<TerrainHistogram>,
    /// `(latitude, longitude)`; `None` when either coordinate column is absent.
    pub map_points: Option<Vec<(f64, f64)>>,
    /// Degraded parts of the view, one line each.
    pub notices: Vec<String>,
}

impl Summary {
    pub fn compute(
        filtered: &Dataset,
        mapping: &RoleMapping,
        selection: &Selection,
        histogram_bins: usize,
    ) -> Self {
        let mut notices = Vec::new();

        let monthly: Vec<MonthlyAverage> = Month::ALL
            .iter()
            .map(|&month| MonthlyAverage {
                month,
                rainfall: mapping.rainfall(month).and_then(|c| mean(&filtered.numeric(c))),
                temperature: mapping
                    .temperature(month)
                    .and_then(|c| mean(&filtered.numeric(c))),
            })
            .collect();

        let avg_rainfall = mean_of_means(filtered, &mapping.rainfall_columns());
        let avg_temperature = mean_of_means(filtered, &mapping.temperature_columns());
        if mapping.rainfall_columns().is_empty() {
            notices.push("No monthly rainfall columns available.".to_string());
        }
        if mapping.temperature_columns().is_empty() {
            notices.push("No monthly temperature columns available.".to_string());
        }

        let rockfall_rate = rockfall_rate(filtered, mapping.rockfall_outcome());
        let rockfall_distribution = filtered
            .column(mapping.rockfall_outcome())
            .map(value_counts)
            .unwrap_or_default();
        let outcome_stats = filtered
            .column(mapping.rockfall_outcome())
            .and_then(CategoricalStats::describe);
        let probability_stats =
            NumericStats::describe(&filtered.numeric(mapping.rockfall_probability()));

        let terrain = Role::TERRAIN
            .iter()
            .filter_map(|&role| {
                let column = mapping.get(role)?;
                let histogram = Histogram::build(&filtered.numeric(column), histogram_bins)?;
                Some(TerrainHistogram {
                    role,
                    column: column.to_string(),
                    histogram,
                })
            })
            .collect();

        let map_points = match mapping.coordinates() {
            Some((lat, lon)) => Some(coordinates(filtered, lat, lon)),
            None => {
                notices.push("No latitude/longitude data available.".to_string());
                None
            }
        };

        for notice in &notices {
            warn!(notice = %notice, "degraded view");
        }

        Self {
            selection: selection.clone(),
            sample_count: filtered.len(),
            avg_rainfall,
            avg_temperature,
            rockfall_rate,
            monthly,
            rockfall_distribution,
            probability_stats,
            outcome_stats,
            terrain,
            map_points,
            notices,
        }
    }
}

/// Mean of per-column means; columns without numeric data are skipped.
fn mean_of_means(ds: &Dataset, columns: &[&str]) -> Option<f64> {
    let means: Vec<f64> = columns
        .iter()
        .filter_map(|c| mean(&ds.numeric(c)))
        .collect();
    mean(&means)
}

fn rockfall_rate(ds: &Dataset, outcome: &str) -> Option<f64> {
    if ds.is_empty() {
        return None;
    }
    let yes = ds
        .column(outcome)?
        .filter(|v| v.as_text() == Some(ROCKFALL_YES))
        .count();
    Some(yes as f64 / ds.len() as f64 * 100.0)
}

/// Rows with both coordinates numeric.
fn coordinates(ds: &Dataset, lat: &str, lon: &str) -> Vec<(f64, f64)> {
    let (Some(li), Some(oi)) = (ds.column_index(lat), ds.column_index(lon)) else {
        return Vec::new();
    };
    ds.rows()
        .filter_map(|row| Some((row[li].as_f64()?, row[oi].as_f64()?)))
        .collect()
}

/// Distinct locations and years offered as filter options.
pub fn filter_options(ds: &Dataset, mapping: &RoleMapping) -> (Vec<Value>, Vec<Value>) {
    (
        ds.distinct_values(mapping.location()),
        ds.distinct_values(mapping.year()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Resolver;
    use crate::table::{parse_csv, CollisionPolicy};

    const CSV: &str = "\
location,year,janr,febr,jant,febt,rockfall,rockfall_probability,latitude,longitude,elevation
Ridge,2020,10,20,1,3,Yes,0.9,46.5,7.9,1200
Ridge,2020,30,,3,5,No,0.3,46.6,,1300
Ridge,2020,20,40,2,4,yes,0.6,46.7,8.1,1250
Valley,2020,99,99,9,9,Yes,0.1,40.0,8.0,300
";

    fn fixture() -> anyhow::Result<(Dataset, RoleMapping)> {
        let ds = parse_csv(CSV, CollisionPolicy::Reject).map_err(anyhow::Error::msg)?;
        let mapping = Resolver::default().resolve(ds.columns())?;
        Ok((ds, mapping))
    }

    fn ridge(ds: &Dataset, mapping: &RoleMapping) -> (Dataset, Selection) {
        let selection = Selection::parse("Ridge", "2020");
        (ds.filter_selection(mapping, &selection), selection)
    }

    #[test]
    fn metrics_for_selection() -> anyhow::Result<()> {
        let (ds, mapping) = fixture()?;
        let (filtered, selection) = ridge(&ds, &mapping);
        let s = Summary::compute(&filtered, &mapping, &selection, DEFAULT_HISTOGRAM_BINS);

        assert_eq!(s.sample_count, 3);
        // janr mean 20, febr mean 30
        assert_eq!(s.avg_rainfall, Some(25.0));
        // jant mean 2, febt mean 4
        assert_eq!(s.avg_temperature, Some(3.0));
        // "yes" is not "Yes"
        let rate = s.rockfall_rate.expect("non-empty selection");
        assert!((rate - 100.0 / 3.0).abs() < 1e-9);

        assert_eq!(s.monthly[0].rainfall, Some(20.0));
        assert_eq!(s.monthly[1].temperature, Some(4.0));
        assert_eq!(s.monthly[2].rainfall, None);
        Ok(())
    }

    #[test]
    fn distribution_and_descriptions() -> anyhow::Result<()> {
        let (ds, mapping) = fixture()?;
        let (filtered, selection) = ridge(&ds, &mapping);
        let s = Summary::compute(&filtered, &mapping, &selection, DEFAULT_HISTOGRAM_BINS);

        assert_eq!(
            s.rockfall_distribution,
            vec![("No".into(), 1), ("Yes".into(), 1), ("yes".into(), 1)]
        );
        let probs = s.probability_stats.expect("numeric probabilities");
        assert_eq!(probs.count, 3);
        assert_eq!(probs.median, 0.6);
        assert_eq!(s.outcome_stats.map(|o| o.unique), Some(3));
        Ok(())
    }

    #[test]
    fn map_points_skip_incomplete_rows() -> anyhow::Result<()> {
        let (ds, mapping) = fixture()?;
        let (filtered, selection) = ridge(&ds, &mapping);
        let s = Summary::compute(&filtered, &mapping, &selection, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(s.map_points, Some(vec![(46.5, 7.9), (46.7, 8.1)]));
        assert_eq!(s.terrain.len(), 1);
        assert_eq!(s.terrain[0].role, Role::Elevation);
        assert_eq!(s.terrain[0].histogram.counts.iter().sum::<usize>(), 3);
        Ok(())
    }

    #[test]
    fn missing_optional_roles_become_notices() -> anyhow::Result<()> {
        let ds = parse_csv(
            "location,year,rockfall,rockfall_probability\nA,2020,No,0.1\n",
            CollisionPolicy::Reject,
        )
        .map_err(anyhow::Error::msg)?;
        let mapping = Resolver::default().resolve(ds.columns())?;
        let selection = Selection::parse("A", "2020");
        let s = Summary::compute(&ds, &mapping, &selection, DEFAULT_HISTOGRAM_BINS);

        assert_eq!(s.map_points, None);
        assert_eq!(s.avg_rainfall, None);
        assert!(s.terrain.is_empty());
        assert_eq!(s.notices.len(), 3);
        assert!(s.notices.iter().any(|n| n.contains("latitude/longitude")));
        Ok(())
    }

    #[test]
    fn empty_selection_has_no_rate() -> anyhow::Result<()> {
        let (ds, mapping) = fixture()?;
        let selection = Selection::parse("Nowhere", "1900");
        let filtered = ds.filter_selection(&mapping, &selection);
        let s = Summary::compute(&filtered, &mapping, &selection, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(s.sample_count, 0);
        assert_eq!(s.rockfall_rate, None);
        assert_eq!(s.avg_rainfall, None);
        assert!(s.probability_stats.is_none());
        Ok(())
    }

    #[test]
    fn options_are_sorted() -> anyhow::Result<()> {
        let (ds, mapping) = fixture()?;
        let (locations, years) = filter_options(&ds, &mapping);
        assert_eq!(
            locations,
            vec![Value::Text("Ridge".into()), Value::Text("Valley".into())]
        );
        assert_eq!(years, vec![Value::Int(2020)]);
        Ok(())
    }
}
