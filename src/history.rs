//! All vaccination courses of one agent.
//!
//! An agent may receive several vaccine products over a simulation. The history keeps one
//! [`VaccinationRecord`] per product: the first dose of a product starts a new course, later
//! doses of the same product advance the existing one.
use log::{error, trace};
use serde::{Deserialize, Serialize};

use crate::delay::{DelaySampler, DoseSchedule};
use crate::error::VaccinationError;
use crate::ids::{ManagerId, PersonId, VaccineId};
use crate::vaccination_record::{UpdateOutcome, VaccinationRecord};
use crate::Day;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaccinationHistory {
    records: Vec<VaccinationRecord>,
}

impl VaccinationHistory {
    #[must_use]
    pub fn new() -> Self {
        VaccinationHistory::default()
    }

    /// Gives `person` a dose of `vaccine` on `day` and returns the index of the dose given.
    ///
    /// # Errors
    ///
    /// Returns `OutOfOrderUpdate` if `person` already has a course of `vaccine` that was started
    /// or updated after `day`.
    #[allow(clippy::too_many_arguments)]
    pub fn take_vaccine<S, D>(
        &mut self,
        day: Day,
        vaccine: VaccineId,
        age: f64,
        person: PersonId,
        manager: ManagerId,
        sampler: &mut S,
        schedule: &D,
    ) -> Result<usize, VaccinationError>
    where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        if let Some(record) = self.record_for_mut(vaccine) {
            record.advance_dose(day, age, sampler, schedule)?;
            return Ok(record.current_dose());
        }
        trace!("{person:?} starting a course of {vaccine:?} on day {day}");
        let record =
            VaccinationRecord::activated(day, vaccine, age, person, manager, sampler, schedule);
        self.records.push(record);
        Ok(0)
    }

    /// Updates every course for `day`, returning the outcome of each course that changed.
    ///
    /// # Errors
    ///
    /// Returns `OutOfOrderUpdate` if `day` precedes a previous update. Courses are checked
    /// before any of them is changed.
    pub fn update<S, D>(
        &mut self,
        day: Day,
        age: f64,
        sampler: &mut S,
        schedule: &D,
    ) -> Result<Vec<(VaccineId, UpdateOutcome)>, VaccinationError>
    where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        if let Some((record, previous)) = self.records.iter().find_map(|record| {
            record
                .last_update_day()
                .filter(|&previous| day < previous)
                .map(|previous| (record, previous))
        }) {
            error!(
                "update of {:?} for day {day} after {:?} was updated on day {previous}",
                record.person(),
                record.vaccine()
            );
            return Err(VaccinationError::OutOfOrderUpdate {
                previous,
                attempted: day,
            });
        }
        let mut changes = Vec::new();
        for record in &mut self.records {
            let outcome = record.update(day, age, &mut *sampler, schedule)?;
            if let (false, Some(vaccine)) = (outcome.is_unchanged(), record.vaccine()) {
                changes.push((vaccine, outcome));
            }
        }
        Ok(changes)
    }

    /// Whether any course protected the agent on the day of the last update.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.records.iter().any(VaccinationRecord::is_effective)
    }

    #[must_use]
    pub fn record_for(&self, vaccine: VaccineId) -> Option<&VaccinationRecord> {
        self.records
            .iter()
            .find(|record| record.vaccine() == Some(vaccine))
    }

    fn record_for_mut(&mut self, vaccine: VaccineId) -> Option<&mut VaccinationRecord> {
        self.records
            .iter_mut()
            .find(|record| record.vaccine() == Some(vaccine))
    }

    #[must_use]
    pub fn records(&self) -> &[VaccinationRecord] {
        &self.records
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::{FixedDelays, FixedDose};
    use crate::vaccination_record::ProtectionChange;

    const PERSON: PersonId = PersonId::new(3);
    const MANAGER: ManagerId = ManagerId::new(0);

    fn regimen() -> FixedDelays {
        FixedDelays::new(vec![
            FixedDose {
                efficacy_delay: 2,
                waning_delay: 10,
                days_until_next_dose: Some(30),
            },
            FixedDose {
                efficacy_delay: 1,
                waning_delay: 50,
                days_until_next_dose: None,
            },
        ])
    }

    fn take(
        history: &mut VaccinationHistory,
        day: Day,
        vaccine: VaccineId,
        schedule: &FixedDelays,
    ) -> Result<usize, VaccinationError> {
        let mut sampler = schedule.clone();
        history.take_vaccine(day, vaccine, 30.0, PERSON, MANAGER, &mut sampler, schedule)
    }

    #[test]
    fn second_dose_of_same_vaccine_advances_course() {
        let schedule = regimen();
        let mut history = VaccinationHistory::new();
        let vaccine = VaccineId::new(0);

        let first = take(&mut history, 0, vaccine, &schedule).unwrap();
        let second = take(&mut history, 5, vaccine, &schedule).unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(history.records().len(), 1);
        let record = history.record_for(vaccine).unwrap();
        assert_eq!(record.vaccination_day(), Some(0));
        assert_eq!(record.effective_day(), Some(6));
    }

    #[test]
    fn earlier_dose_of_same_vaccine_is_rejected() {
        let schedule = regimen();
        let mut history = VaccinationHistory::new();
        let vaccine = VaccineId::new(0);
        take(&mut history, 10, vaccine, &schedule).unwrap();
        let before = history.clone();

        let result = take(&mut history, 4, vaccine, &schedule);
        assert!(matches!(
            result,
            Err(VaccinationError::OutOfOrderUpdate {
                previous: 10,
                attempted: 4
            })
        ));
        assert_eq!(history, before);
        let record = history.record_for(vaccine).unwrap();
        assert!(record.effective_day() >= record.vaccination_day());
    }

    #[test]
    fn different_vaccines_get_separate_courses() {
        let schedule = regimen();
        let mut history = VaccinationHistory::new();
        take(&mut history, 0, VaccineId::new(0), &schedule).unwrap();
        take(&mut history, 3, VaccineId::new(1), &schedule).unwrap();
        assert_eq!(history.records().len(), 2);
        assert!(history.record_for(VaccineId::new(2)).is_none());
    }

    #[test]
    fn update_reports_changed_courses() {
        let schedule = regimen();
        let mut sampler = schedule.clone();
        let mut history = VaccinationHistory::new();
        let vaccine = VaccineId::new(0);
        take(&mut history, 0, vaccine, &schedule).unwrap();
        assert!(!history.is_protected());

        assert!(history
            .update(1, 30.0, &mut sampler, &schedule)
            .unwrap()
            .is_empty());
        let changes = history.update(2, 30.0, &mut sampler, &schedule).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, vaccine);
        assert_eq!(changes[0].1.protection, Some(ProtectionChange::Gained));
        assert!(history.is_protected());

        let changes = history.update(12, 30.0, &mut sampler, &schedule).unwrap();
        assert_eq!(changes[0].1.protection, Some(ProtectionChange::Lost));
        assert!(!history.is_protected());

        let changes = history.update(30, 30.0, &mut sampler, &schedule).unwrap();
        assert_eq!(changes[0].1.dose_administered, Some(1));
    }

    #[test]
    fn update_rejects_rewinding() {
        let schedule = regimen();
        let mut sampler = schedule.clone();
        let mut history = VaccinationHistory::new();
        take(&mut history, 4, VaccineId::new(0), &schedule).unwrap();
        assert!(history.update(3, 30.0, &mut sampler, &schedule).is_err());
    }

    #[test]
    fn rewind_of_any_course_leaves_every_course_unchanged() {
        let schedule = regimen();
        let mut sampler = schedule.clone();
        let mut history = VaccinationHistory::new();
        // The first course is only updated through day 2, the second starts on day 9.
        take(&mut history, 0, VaccineId::new(0), &schedule).unwrap();
        history.update(2, 30.0, &mut sampler, &schedule).unwrap();
        take(&mut history, 9, VaccineId::new(1), &schedule).unwrap();
        let before = history.clone();

        let result = history.update(5, 30.0, &mut sampler, &schedule);
        assert!(matches!(
            result,
            Err(VaccinationError::OutOfOrderUpdate {
                previous: 9,
                attempted: 5
            })
        ));
        assert_eq!(history, before);
        assert_eq!(
            history.record_for(VaccineId::new(0)).unwrap().last_update_day(),
            Some(2)
        );

        history.update(9, 30.0, &mut sampler, &schedule).unwrap();
        assert!(history
            .records()
            .iter()
            .all(|record| record.last_update_day() == Some(9)));
    }
}
