//! Run parameters for a vaccination campaign, loaded from JSON.
//!
//! ```json
//! {
//!     "seed": 123,
//!     "max_day": 365,
//!     "population": 1000,
//!     "vaccination_day": 10,
//!     "age_range": [0.0, 90.0],
//!     "output_file": "vaccination_events.csv",
//!     "vaccines": [ ... ]
//! }
//! ```
//!
//! Every field except `vaccines` has a default.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::VaccinationError;
use crate::vaccine::VaccineCatalog;
use crate::Day;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationParameters {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_max_day")]
    pub max_day: Day,
    #[serde(default = "default_population")]
    pub population: usize,
    #[serde(default)]
    pub vaccination_day: Day,
    #[serde(default = "default_age_range")]
    pub age_range: (f64, f64),
    #[serde(default = "default_output_file")]
    pub output_file: String,
    pub vaccines: VaccineCatalog,
}

fn default_seed() -> u64 {
    0
}

fn default_max_day() -> Day {
    365
}

fn default_population() -> usize {
    1000
}

fn default_age_range() -> (f64, f64) {
    (0.0, 90.0)
}

fn default_output_file() -> String {
    "vaccination_events.csv".to_string()
}

impl VaccinationParameters {
    /// Checks the parameters for consistency.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<(), VaccinationError> {
        let (min_age, max_age) = self.age_range;
        if !(min_age.is_finite() && max_age.is_finite()) || min_age < 0.0 || min_age >= max_age {
            return Err(format!("invalid age range [{min_age}, {max_age})").into());
        }
        if self.vaccination_day > self.max_day {
            return Err(format!(
                "vaccination day {} is after the last day {}",
                self.vaccination_day, self.max_day
            )
            .into());
        }
        if self.vaccines.is_empty() {
            return Err("no vaccines defined".into());
        }
        self.vaccines.validate()
    }

    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the parameters are invalid.
    pub fn from_json_str(json: &str) -> Result<Self, VaccinationError> {
        let parameters: VaccinationParameters = serde_json::from_str(json)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the parameters are invalid.
    pub fn load(path: &Path) -> Result<Self, VaccinationError> {
        debug!("loading parameters from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let parameters: VaccinationParameters = serde_json::from_reader(reader)?;
        parameters.validate()?;
        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VACCINES: &str = r#"[{
        "name": "single",
        "doses": [{"efficacy": 0.9, "efficacy_delay": 14, "efficacy_duration": 180}]
    }]"#;

    #[test]
    fn defaults_fill_missing_fields() {
        let parameters =
            VaccinationParameters::from_json_str(&format!(r#"{{"vaccines": {VACCINES}}}"#))
                .unwrap();
        assert_eq!(parameters.seed, 0);
        assert_eq!(parameters.max_day, 365);
        assert_eq!(parameters.population, 1000);
        assert_eq!(parameters.vaccination_day, 0);
        assert_eq!(parameters.age_range, (0.0, 90.0));
        assert_eq!(parameters.output_file, "vaccination_events.csv");
        assert_eq!(parameters.vaccines.len(), 1);
    }

    #[test]
    fn invalid_age_range_is_rejected() {
        let json = format!(r#"{{"age_range": [50.0, 10.0], "vaccines": {VACCINES}}}"#);
        assert!(matches!(
            VaccinationParameters::from_json_str(&json),
            Err(VaccinationError::ConfigError(_))
        ));
    }

    #[test]
    fn vaccination_after_last_day_is_rejected() {
        let json = format!(r#"{{"max_day": 5, "vaccination_day": 6, "vaccines": {VACCINES}}}"#);
        assert!(VaccinationParameters::from_json_str(&json).is_err());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(VaccinationParameters::from_json_str(r#"{"vaccines": []}"#).is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"seed": 8, "max_day": 100, "population": 20, "vaccines": {VACCINES}}}"#
        )
        .unwrap();
        let parameters = VaccinationParameters::load(file.path()).unwrap();
        assert_eq!(parameters.seed, 8);
        assert_eq!(parameters.max_day, 100);
        assert_eq!(parameters.population, 20);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            VaccinationParameters::load(file.path()),
            Err(VaccinationError::JsonError(_))
        ));
    }
}
