use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Lowercase three-letter abbreviation, the prefix of the monthly column names.
    pub fn abbrev(&self) -> &'static str {
        match self {
            Month::Jan => "jan",
            Month::Feb => "feb",
            Month::Mar => "mar",
            Month::Apr => "apr",
            Month::May => "may",
            Month::Jun => "jun",
            Month::Jul => "jul",
            Month::Aug => "aug",
            Month::Sep => "sep",
            Month::Oct => "oct",
            Month::Nov => "nov",
            Month::Dec => "dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Semantic meaning a column can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Location,
    Year,
    RockfallOutcome,
    RockfallProbability,
    Latitude,
    Longitude,
    Rainfall(Month),
    Temperature(Month),
    Elevation,
    SlopeDeg,
    AspectDeg,
}

impl Role {
    /// Roles without which nothing downstream can be computed.
    pub const REQUIRED: [Role; 4] = [
        Role::Location,
        Role::Year,
        Role::RockfallOutcome,
        Role::RockfallProbability,
    ];

    pub const TERRAIN: [Role; 3] = [Role::Elevation, Role::SlopeDeg, Role::AspectDeg];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Location => f.write_str("location"),
            Role::Year => f.write_str("year"),
            Role::RockfallOutcome => f.write_str("rockfall_outcome"),
            Role::RockfallProbability => f.write_str("rockfall_probability"),
            Role::Latitude => f.write_str("latitude"),
            Role::Longitude => f.write_str("longitude"),
            Role::Rainfall(m) => write!(f, "rainfall[{}]", m),
            Role::Temperature(m) => write!(f, "temperature[{}]", m),
            Role::Elevation => f.write_str("elevation"),
            Role::SlopeDeg => f.write_str("slope_deg"),
            Role::AspectDeg => f.write_str("aspect_deg"),
        }
    }
}

// Serialized by display name so mappings read naturally in JSON output.
impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
