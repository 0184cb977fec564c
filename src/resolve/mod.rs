// src/resolve/mod.rs
mod matcher;
mod role;

pub use matcher::{canonical, Matcher};
pub use role::{Month, Role};

use crate::error::DataError;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One resolution rule: the first column accepted by `matcher` fills `role`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub role: Role,
    pub matcher: Matcher,
    pub required: bool,
}

impl Rule {
    pub fn required(role: Role, matcher: Matcher) -> Self {
        Self {
            role,
            matcher,
            required: true,
        }
    }

    pub fn optional(role: Role, matcher: Matcher) -> Self {
        Self {
            role,
            matcher,
            required: false,
        }
    }
}

/// Ordered rule list mapping semantic roles onto concrete column names.
#[derive(Clone, Debug)]
pub struct Resolver {
    rules: Vec<Rule>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Resolver {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate every rule against `columns` (dataset order). Fails only when a
    /// required rule finds nothing; all such roles are reported together.
    pub fn resolve(&self, columns: &[String]) -> Result<RoleMapping, DataError> {
        let mut resolved = BTreeMap::new();
        let mut missing = Vec::new();

        for rule in &self.rules {
            match rule.matcher.first_match(columns) {
                Some(col) => {
                    debug!(role = %rule.role, column = col, "resolved");
                    // an earlier rule for the same role wins
                    resolved.entry(rule.role).or_insert_with(|| col.to_string());
                }
                None if rule.required => missing.push(rule.role),
                None => debug!(role = %rule.role, "optional role unresolved"),
            }
        }

        missing.retain(|role| !resolved.contains_key(role));
        if !missing.is_empty() {
            return Err(DataError::ColumnResolution { missing });
        }

        let mapping = RoleMapping::from_resolved(resolved)?;
        info!(
            location = mapping.location(),
            year = mapping.year(),
            rockfall = mapping.rockfall_outcome(),
            probability = mapping.rockfall_probability(),
            optional = mapping.optional_count(),
            "column roles resolved"
        );
        Ok(mapping)
    }
}

/// The rules the observation CSVs are read with.
pub fn default_rules() -> Vec<Rule> {
    let mut rules = vec![
        Rule::required(Role::Location, Matcher::contains("location")),
        Rule::required(Role::Year, Matcher::contains("year")),
        Rule::required(
            Role::RockfallOutcome,
            Matcher::contains_excluding("rockfall", "prob"),
        ),
        Rule::required(
            Role::RockfallProbability,
            Matcher::contains("rockfall_probability"),
        ),
        Rule::optional(Role::Latitude, Matcher::exact("latitude")),
        Rule::optional(Role::Longitude, Matcher::exact("longitude")),
    ];
    for month in Month::ALL {
        rules.push(Rule::optional(
            Role::Rainfall(month),
            Matcher::exact(format!("{}r", month.abbrev())),
        ));
        rules.push(Rule::optional(
            Role::Temperature(month),
            Matcher::exact(format!("{}t", month.abbrev())),
        ));
    }
    rules.push(Rule::optional(Role::Elevation, Matcher::exact("elevation")));
    rules.push(Rule::optional(Role::SlopeDeg, Matcher::exact("slope_deg")));
    rules.push(Rule::optional(Role::AspectDeg, Matcher::exact("aspect_deg")));
    rules
}

/// Resolved role → column association. Required roles are always present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleMapping {
    location: String,
    year: String,
    rockfall_outcome: String,
    rockfall_probability: String,
    optional: BTreeMap<Role, String>,
}

impl RoleMapping {
    fn from_resolved(mut resolved: BTreeMap<Role, String>) -> Result<Self, DataError> {
        let mut take = |role: Role| {
            resolved
                .remove(&role)
                .ok_or(DataError::ColumnResolution {
                    missing: vec![role],
                })
        };
        let location = take(Role::Location)?;
        let year = take(Role::Year)?;
        let rockfall_outcome = take(Role::RockfallOutcome)?;
        let rockfall_probability = take(Role::RockfallProbability)?;
        Ok(Self {
            location,
            year,
            rockfall_outcome,
            rockfall_probability,
            optional: resolved,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn rockfall_outcome(&self) -> &str {
        &self.rockfall_outcome
    }

    pub fn rockfall_probability(&self) -> &str {
        &self.rockfall_probability
    }

    /// Column for any role, required or optional.
    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::Location => Some(&self.location),
            Role::Year => Some(&self.year),
            Role::RockfallOutcome => Some(&self.rockfall_outcome),
            Role::RockfallProbability => Some(&self.rockfall_probability),
            other => self.optional.get(&other).map(String::as_str),
        }
    }

    pub fn rainfall(&self, month: Month) -> Option<&str> {
        self.get(Role::Rainfall(month))
    }

    pub fn temperature(&self, month: Month) -> Option<&str> {
        self.get(Role::Temperature(month))
    }

    /// Resolved rainfall columns in calendar order.
    pub fn rainfall_columns(&self) -> Vec<&str> {
        Month::ALL.iter().filter_map(|m| self.rainfall(*m)).collect()
    }

    /// Resolved temperature columns in calendar order.
    pub fn temperature_columns(&self) -> Vec<&str> {
        Month::ALL
            .iter()
            .filter_map(|m| self.temperature(*m))
            .collect()
    }

    /// `(latitude, longitude)` only when both resolve.
    pub fn coordinates(&self) -> Option<(&str, &str)> {
        Some((self.get(Role::Latitude)?, self.get(Role::Longitude)?))
    }

    /// Optional roles that did not resolve, in rule order of the default set.
    pub fn unresolved_optional(&self) -> Vec<Role> {
        default_rules()
            .into_iter()
            .filter(|r| !r.required && self.get(r.role).is_none())
            .map(|r| r.role)
            .collect()
    }

    fn optional_count(&self) -> usize {
        self.optional.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn base() -> Vec<String> {
        cols(&["location", "year", "rockfall", "rockfall_probability"])
    }

    #[test]
    fn resolves_required_roles_without_confusing_probability() -> anyhow::Result<()> {
        let columns = cols(&["rockfall_probability", "location", "year", "rockfall"]);
        let mapping = Resolver::default().resolve(&columns)?;
        assert_eq!(mapping.location(), "location");
        assert_eq!(mapping.year(), "year");
        assert_eq!(mapping.rockfall_outcome(), "rockfall");
        assert_eq!(mapping.rockfall_probability(), "rockfall_probability");
        Ok(())
    }

    #[test]
    fn missing_year_is_a_resolution_error() {
        let columns = cols(&["location", "rockfall", "rockfall_probability"]);
        match Resolver::default().resolve(&columns) {
            Err(DataError::ColumnResolution { missing }) => assert_eq!(missing, vec![Role::Year]),
            other => panic!("expected resolution error, got {:?}", other),
        }
    }

    #[test]
    fn all_missing_required_roles_are_reported() {
        let columns = cols(&["location"]);
        match Resolver::default().resolve(&columns) {
            Err(DataError::ColumnResolution { missing }) => assert_eq!(
                missing,
                vec![Role::Year, Role::RockfallOutcome, Role::RockfallProbability]
            ),
            other => panic!("expected resolution error, got {:?}", other),
        }
    }

    #[test]
    fn monthly_roles_need_exact_names() -> anyhow::Result<()> {
        let mut columns = base();
        columns.extend(cols(&["jant_extra", "jant", "febr_total"]));
        let mapping = Resolver::default().resolve(&columns)?;
        assert_eq!(mapping.temperature(Month::Jan), Some("jant"));
        assert_eq!(mapping.rainfall(Month::Feb), None);
        assert_eq!(mapping.temperature_columns(), vec!["jant"]);
        Ok(())
    }

    #[test]
    fn coordinates_require_both_columns() -> anyhow::Result<()> {
        let mut columns = base();
        columns.push("latitude".into());
        let mapping = Resolver::default().resolve(&columns)?;
        assert!(mapping.coordinates().is_none());
        assert!(mapping.unresolved_optional().contains(&Role::Longitude));

        columns.push("longitude".into());
        let mapping = Resolver::default().resolve(&columns)?;
        assert_eq!(mapping.coordinates(), Some(("latitude", "longitude")));
        Ok(())
    }

    #[test]
    fn coordinates_do_not_match_by_substring() -> anyhow::Result<()> {
        let mut columns = base();
        columns.extend(cols(&["latitude_deg", "longitude_deg"]));
        let mapping = Resolver::default().resolve(&columns)?;
        assert_eq!(mapping.get(Role::Latitude), None);
        Ok(())
    }

    #[test]
    fn resolution_is_pure() -> anyhow::Result<()> {
        let mut columns = base();
        columns.extend(cols(&["janr", "jant", "elevation"]));
        let resolver = Resolver::default();
        assert_eq!(resolver.resolve(&columns)?, resolver.resolve(&columns)?);
        Ok(())
    }

    #[test]
    fn custom_rules_are_honoured() -> anyhow::Result<()> {
        let mut rules = default_rules();
        rules.insert(0, Rule::required(Role::Location, Matcher::exact("site")));
        let columns = cols(&["location", "site", "year", "rockfall", "rockfall_probability"]);
        let mapping = Resolver::new(rules).resolve(&columns)?;
        assert_eq!(mapping.location(), "site");
        Ok(())
    }
}
