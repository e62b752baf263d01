use crate::Day;
use std::fmt::{self, Display};
use std::io;

/// Provides `VaccinationError` and maps other errors to
/// convert to a `VaccinationError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum VaccinationError {
    /// The vaccination day of a record was assigned a second time. The record is left untouched
    /// and the simulation may continue.
    DoubleAssignment { existing: Day, attempted: Day },
    /// A record was asked to move backwards in time. The simulation clock must be monotonic.
    OutOfOrderUpdate { previous: Day, attempted: Day },
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    ConfigError(String),
}

impl VaccinationError {
    /// Returns `true` for errors that indicate a caller bug which does not invalidate the
    /// simulation state.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VaccinationError::DoubleAssignment { .. })
    }
}

impl From<io::Error> for VaccinationError {
    fn from(error: io::Error) -> Self {
        VaccinationError::IoError(error)
    }
}

impl From<serde_json::Error> for VaccinationError {
    fn from(error: serde_json::Error) -> Self {
        VaccinationError::JsonError(error)
    }
}

impl From<csv::Error> for VaccinationError {
    fn from(error: csv::Error) -> Self {
        VaccinationError::CsvError(error)
    }
}

impl From<String> for VaccinationError {
    fn from(error: String) -> Self {
        VaccinationError::ConfigError(error)
    }
}

impl From<&str> for VaccinationError {
    fn from(error: &str) -> Self {
        VaccinationError::ConfigError(error.to_string())
    }
}

impl std::error::Error for VaccinationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VaccinationError::IoError(e) => Some(e),
            VaccinationError::JsonError(e) => Some(e),
            VaccinationError::CsvError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for VaccinationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VaccinationError::DoubleAssignment {
                existing,
                attempted,
            } => write!(
                f,
                "Error: vaccination day already set to {existing}, refusing to set it to {attempted}"
            ),
            VaccinationError::OutOfOrderUpdate {
                previous,
                attempted,
            } => write!(
                f,
                "Error: update for day {attempted} after an update for day {previous}"
            ),
            VaccinationError::ConfigError(message) => write!(f, "Error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_assignment_is_recoverable() {
        let error = VaccinationError::DoubleAssignment {
            existing: 2,
            attempted: 5,
        };
        assert!(error.is_recoverable());
        assert_eq!(
            error.to_string(),
            "Error: vaccination day already set to 2, refusing to set it to 5"
        );
    }

    #[test]
    fn out_of_order_update_is_not_recoverable() {
        let error = VaccinationError::OutOfOrderUpdate {
            previous: 9,
            attempted: 3,
        };
        assert!(!error.is_recoverable());
    }

    #[test]
    fn converts_from_io_error() {
        let error: VaccinationError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, VaccinationError::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }
}
