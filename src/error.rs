use crate::resolve::Role;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of the load → resolve path. Every variant aborts the current run;
/// nothing partial is handed back.
#[derive(Error, Debug)]
pub enum DataError {
    /// The source could not be opened or fetched at all.
    #[error("source `{id}` is unavailable: {cause}")]
    SourceUnavailable {
        id: String,
        #[source]
        cause: BoxError,
    },

    /// The bytes arrived but no attempted encoding produced a table.
    #[error("source `{id}` is not readable as a table: {reason}")]
    DataFormat { id: String, reason: String },

    /// One or more required roles matched no column.
    #[error("no column found for required role(s): {}", join_roles(.missing))]
    ColumnResolution { missing: Vec<Role> },
}

impl DataError {
    pub(crate) fn unavailable(id: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        DataError::SourceUnavailable {
            id: id.into(),
            cause: cause.into(),
        }
    }

    pub(crate) fn format(id: impl Into<String>, reason: impl Into<String>) -> Self {
        DataError::DataFormat {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_message_lists_every_missing_role() {
        let err = DataError::ColumnResolution {
            missing: vec![Role::Year, Role::RockfallProbability],
        };
        assert_eq!(
            err.to_string(),
            "no column found for required role(s): year, rockfall_probability"
        );
    }

    #[test]
    fn unavailable_keeps_cause_as_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DataError::unavailable("data.csv", io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("data.csv"));
    }
}
