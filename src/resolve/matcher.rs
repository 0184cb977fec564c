/// How a rule recognises its column. Matching always runs against the
/// canonical (trimmed, lowercased) form of the column name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// The canonical name equals this string exactly.
    ExactName(String),
    /// The canonical name contains every substring.
    ContainsAll(Vec<String>),
    /// The canonical name contains every `include` and no `exclude` substring.
    ContainsButExcludes {
        include: Vec<String>,
        exclude: Vec<String>,
    },
}

impl Matcher {
    pub fn exact(name: impl Into<String>) -> Self {
        Matcher::ExactName(name.into())
    }

    pub fn contains(needle: impl Into<String>) -> Self {
        Matcher::ContainsAll(vec![needle.into()])
    }

    pub fn contains_excluding(include: impl Into<String>, exclude: impl Into<String>) -> Self {
        Matcher::ContainsButExcludes {
            include: vec![include.into()],
            exclude: vec![exclude.into()],
        }
    }

    pub fn matches(&self, column: &str) -> bool {
        let name = canonical(column);
        match self {
            Matcher::ExactName(expected) => name == *expected,
            Matcher::ContainsAll(needles) => needles.iter().all(|n| name.contains(n.as_str())),
            Matcher::ContainsButExcludes { include, exclude } => {
                include.iter().all(|n| name.contains(n.as_str()))
                    && !exclude.iter().any(|n| name.contains(n.as_str()))
            }
        }
    }

    /// First column, in the given order, that this matcher accepts.
    pub fn first_match<'a>(&self, columns: &'a [String]) -> Option<&'a str> {
        columns
            .iter()
            .find(|c| self.matches(c))
            .map(String::as_str)
    }
}

/// Trim + lowercase; the one normalisation applied to column names.
pub fn canonical(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_name_ignores_longer_columns() {
        let m = Matcher::exact("jant");
        let columns = cols(&["jant_extra", "jant"]);
        assert_eq!(m.first_match(&columns), Some("jant"));
        assert!(!m.matches("jant_extra"));
    }

    #[test]
    fn contains_picks_first_in_column_order() {
        let m = Matcher::contains("year");
        let columns = cols(&["id", "survey_year", "year"]);
        assert_eq!(m.first_match(&columns), Some("survey_year"));
    }

    #[test]
    fn exclusion_skips_probability_column() {
        let m = Matcher::contains_excluding("rockfall", "prob");
        let columns = cols(&["rockfall_probability", "rockfall"]);
        assert_eq!(m.first_match(&columns), Some("rockfall"));
    }

    #[test]
    fn matching_is_on_canonical_form() {
        assert!(Matcher::contains("location").matches("  LOCATION_ID "));
        assert!(Matcher::exact("latitude").matches("Latitude"));
    }

    #[test]
    fn contains_all_needs_every_substring() {
        let m = Matcher::ContainsAll(vec!["rock".into(), "fall".into()]);
        assert!(m.matches("rockfall"));
        assert!(!m.matches("rockslide"));
    }
}
