use crate::error::VaccinationError;
use crate::ids::{PersonId, VaccineId};
use crate::vaccination_record::{ProtectionChange, UpdateOutcome};
use crate::Day;
use csv::Writer;
use log::trace;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaccinationEvent {
    DoseAdministered,
    ProtectionGained,
    ProtectionLost,
}

/// One row of the vaccination event report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationEventRow {
    pub day: Day,
    pub person_id: usize,
    pub vaccine_id: usize,
    pub dose: usize,
    pub event: VaccinationEvent,
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path) -> Result<File, VaccinationError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(VaccinationError::ConfigError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// Writes vaccination events as CSV rows.
pub struct VaccinationReport<W: Write = File> {
    writer: Writer<W>,
    rows: usize,
}

impl VaccinationReport<File> {
    /// Creates the report file at `path`, along with any missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a `.csv` file or cannot be created.
    pub fn create(path: &Path) -> Result<Self, VaccinationError> {
        let file = generate_validate_filepath(path)?;
        trace!("writing vaccination report to {}", path.display());
        Ok(VaccinationReport::from_writer(file))
    }
}

impl<W: Write> VaccinationReport<W> {
    pub fn from_writer(writer: W) -> Self {
        VaccinationReport {
            writer: Writer::from_writer(writer),
            rows: 0,
        }
    }

    /// Write a new row to the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized or written.
    pub fn send(&mut self, row: &VaccinationEventRow) -> Result<(), VaccinationError> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Writes one row for each change in `outcome`. `dose` is the dose the agent is on.
    ///
    /// # Errors
    ///
    /// Returns an error if a row cannot be written.
    pub fn send_outcome(
        &mut self,
        day: Day,
        person: PersonId,
        vaccine: VaccineId,
        dose: usize,
        outcome: &UpdateOutcome,
    ) -> Result<(), VaccinationError> {
        let row = |event| VaccinationEventRow {
            day,
            person_id: person.id(),
            vaccine_id: vaccine.id(),
            dose,
            event,
        };
        if outcome.dose_administered.is_some() {
            self.send(&row(VaccinationEvent::DoseAdministered))?;
        }
        match outcome.protection {
            Some(ProtectionChange::Gained) => self.send(&row(VaccinationEvent::ProtectionGained)),
            Some(ProtectionChange::Lost) => self.send(&row(VaccinationEvent::ProtectionLost)),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be written.
    pub fn flush(&mut self) -> Result<(), VaccinationError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the report and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be written.
    pub fn into_inner(self) -> Result<W, VaccinationError> {
        self.writer
            .into_inner()
            .map_err(|error| VaccinationError::IoError(error.into_error()))
    }
}
