//! Vaccine products and their dose regimens.
//!
//! A [`Vaccine`] is an ordered list of [`VaccineDose`]s. Each dose carries age-specific efficacy
//! (the probability that the dose produces immunity at all), the delay until immunity develops,
//! the expected duration of immunity, and the number of days until the following dose is due.
//!
//! The [`VaccineCatalog`] owns every product used in a simulation and hands out [`VaccineId`]s.
//! It is the dose schedule consulted by vaccination records.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::age_map::AgeMap;
use crate::delay::DoseSchedule;
use crate::error::VaccinationError;
use crate::ids::VaccineId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccineDose {
    /// Probability that the dose produces immunity
    pub efficacy: AgeMap,
    /// Days from administration until immunity develops
    pub efficacy_delay: AgeMap,
    /// Mean number of days immunity lasts once developed
    pub efficacy_duration: AgeMap,
    /// Days from this dose until the next one is administered
    #[serde(default)]
    pub days_between_doses: u32,
}

impl VaccineDose {
    #[must_use]
    pub fn new(
        efficacy: AgeMap,
        efficacy_delay: AgeMap,
        efficacy_duration: AgeMap,
        days_between_doses: u32,
    ) -> Self {
        VaccineDose {
            efficacy,
            efficacy_delay,
            efficacy_duration,
            days_between_doses,
        }
    }

    /// A dose is only given to people in an age group for which it has non-zero efficacy.
    #[must_use]
    pub fn is_within_age(&self, age: f64) -> bool {
        self.efficacy(age) != 0.0
    }

    #[must_use]
    pub fn efficacy(&self, age: f64) -> f64 {
        self.efficacy.find_value(age)
    }

    #[must_use]
    pub fn efficacy_delay(&self, age: f64) -> f64 {
        self.efficacy_delay.find_value(age)
    }

    #[must_use]
    pub fn expected_duration(&self, age: f64) -> f64 {
        self.efficacy_duration.find_value(age)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaccine {
    pub name: String,
    /// Index of the disease this vaccine protects against
    #[serde(default)]
    pub disease: usize,
    pub doses: Vec<VaccineDose>,
}

impl Vaccine {
    #[must_use]
    pub fn new(name: &str, disease: usize) -> Self {
        Vaccine {
            name: name.to_string(),
            disease,
            doses: Vec::new(),
        }
    }

    pub fn add_dose(&mut self, dose: VaccineDose) {
        self.doses.push(dose);
    }

    #[must_use]
    pub fn with_dose(mut self, dose: VaccineDose) -> Self {
        self.add_dose(dose);
        self
    }

    #[must_use]
    pub fn number_of_doses(&self) -> usize {
        self.doses.len()
    }

    #[must_use]
    pub fn dose(&self, index: usize) -> Option<&VaccineDose> {
        self.doses.get(index)
    }

    /// Whether the first dose of this vaccine may be given to someone of this age.
    #[must_use]
    pub fn is_within_age(&self, age: f64) -> bool {
        self.dose(0).is_some_and(|dose| dose.is_within_age(age))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaccineCatalog {
    vaccines: Vec<Vaccine>,
}

impl VaccineCatalog {
    #[must_use]
    pub fn new() -> Self {
        VaccineCatalog::default()
    }

    /// Adds a vaccine product and returns its handle.
    pub fn add_vaccine(&mut self, vaccine: Vaccine) -> VaccineId {
        let id = VaccineId::new(self.vaccines.len());
        trace!("adding {:?} as {id:?}", vaccine.name);
        self.vaccines.push(vaccine);
        id
    }

    #[must_use]
    pub fn get(&self, id: VaccineId) -> Option<&Vaccine> {
        self.vaccines.get(id.id())
    }

    #[must_use]
    pub fn dose(&self, id: VaccineId, dose: usize) -> Option<&VaccineDose> {
        self.get(id).and_then(|vaccine| vaccine.dose(dose))
    }

    /// Looks up a vaccine by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<VaccineId> {
        self.vaccines
            .iter()
            .position(|vaccine| vaccine.name == name)
            .map(VaccineId::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VaccineId, &Vaccine)> {
        self.vaccines
            .iter()
            .enumerate()
            .map(|(index, vaccine)| (VaccineId::new(index), vaccine))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vaccines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vaccines.is_empty()
    }

    /// Checks that every product has at least one dose, and that every dose but the last is
    /// followed by the next one at least a day later.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first product that fails.
    pub fn validate(&self) -> Result<(), VaccinationError> {
        for vaccine in &self.vaccines {
            let Some((_, earlier_doses)) = vaccine.doses.split_last() else {
                return Err(format!("vaccine {:?} has no doses", vaccine.name).into());
            };
            if let Some(dose) = earlier_doses
                .iter()
                .position(|dose| dose.days_between_doses == 0)
            {
                return Err(format!(
                    "dose {dose} of vaccine {:?} needs days_between_doses of at least 1",
                    vaccine.name
                )
                .into());
            }
        }
        Ok(())
    }

    /// Parses a catalog from a JSON list of vaccines.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, VaccinationError> {
        let catalog: VaccineCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the catalog is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, VaccinationError> {
        debug!("loading vaccine catalog from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let catalog: VaccineCatalog = serde_json::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }
}

impl DoseSchedule for VaccineCatalog {
    fn days_until_next_dose(&self, vaccine: VaccineId, dose: usize, _age: f64) -> Option<u32> {
        let product = self.get(vaccine)?;
        if dose + 1 < product.number_of_doses() {
            product.dose(dose).map(|current| current.days_between_doses)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn two_dose_vaccine() -> Vaccine {
        Vaccine::new("two-dose", 0)
            .with_dose(VaccineDose::new(
                AgeMap::uniform(0.5),
                AgeMap::uniform(14.0),
                AgeMap::uniform(180.0),
                21,
            ))
            .with_dose(VaccineDose::new(
                AgeMap::uniform(0.9),
                AgeMap::uniform(7.0),
                AgeMap::uniform(365.0),
                0,
            ))
    }

    #[test]
    fn schedule_follows_days_between_doses() {
        let mut catalog = VaccineCatalog::new();
        let id = catalog.add_vaccine(two_dose_vaccine());
        assert_eq!(catalog.days_until_next_dose(id, 0, 30.0), Some(21));
        assert_eq!(catalog.days_until_next_dose(id, 1, 30.0), None);
        assert_eq!(catalog.days_until_next_dose(id, 5, 30.0), None);
        assert_eq!(
            catalog.days_until_next_dose(VaccineId::new(9), 0, 30.0),
            None
        );
    }

    #[test]
    fn lookup_by_name_and_id() {
        let mut catalog = VaccineCatalog::new();
        catalog.add_vaccine(Vaccine::new("first", 0));
        let id = catalog.add_vaccine(two_dose_vaccine());
        assert_eq!(catalog.find("two-dose"), Some(id));
        assert_eq!(catalog.find("missing"), None);
        assert_eq!(catalog.get(id).unwrap().number_of_doses(), 2);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.iter().count(), 2);
    }

    #[test]
    fn dose_age_eligibility() {
        let dose = VaccineDose::new(
            AgeMap::from_brackets(vec![crate::age_map::AgeBracket {
                min_age: 12.0,
                max_age: 120.0,
                value: 0.8,
            }])
            .unwrap(),
            AgeMap::uniform(10.0),
            AgeMap::uniform(100.0),
            0,
        );
        assert!(!dose.is_within_age(5.0));
        assert!(dose.is_within_age(40.0));
    }

    #[test]
    fn catalog_without_doses_is_invalid() {
        let result = VaccineCatalog::from_json_str(r#"[{"name": "empty", "doses": []}]"#);
        assert!(matches!(result, Err(VaccinationError::ConfigError(_))));
    }

    #[test]
    fn multi_dose_vaccine_needs_gap_between_doses() {
        let json = r#"[{
            "name": "two-dose",
            "doses": [
                {"efficacy": 0.5, "efficacy_delay": 14, "efficacy_duration": 180},
                {"efficacy": 0.9, "efficacy_delay": 7, "efficacy_duration": 365}
            ]
        }]"#;
        match VaccineCatalog::from_json_str(json) {
            Err(VaccinationError::ConfigError(message)) => {
                assert!(message.contains("dose 0"), "{message}");
            }
            other => panic!("expected a ConfigError, got {other:?}"),
        }

        let mut catalog = VaccineCatalog::new();
        catalog.add_vaccine(two_dose_vaccine());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn load_catalog_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "name": "single",
                "doses": [{{
                    "efficacy": 0.8,
                    "efficacy_delay": 14,
                    "efficacy_duration": [{{"min_age": 0.0, "max_age": 65.0, "value": 200.0}}]
                }}]
            }}]"#
        )
        .unwrap();

        let catalog = VaccineCatalog::load_from_file(file.path()).unwrap();
        let id = catalog.find("single").unwrap();
        let dose = catalog.dose(id, 0).unwrap();
        assert_eq!(dose.days_between_doses, 0);
        assert!((dose.expected_duration(70.0)).abs() < f64::EPSILON);
        assert_eq!(catalog.days_until_next_dose(id, 0, 20.0), None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = VaccineCatalog::load_from_file(Path::new("/nonexistent/vaccines.json"));
        assert!(matches!(result, Err(VaccinationError::IoError(_))));
    }
}
