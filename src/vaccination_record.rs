//! Per-agent state of one vaccination course.
//!
//! A [`VaccinationRecord`] is created by a policy manager when it decides to vaccinate someone,
//! either empty (a placeholder that is activated later) or already activated with the first dose.
//! From then on the owner calls [`VaccinationRecord::update`] once per simulated day. When the
//! regimen calls for another dose, the countdown kept by the record reaches zero and the next
//! dose is administered automatically; a manager may also administer it directly with
//! [`VaccinationRecord::advance_dose`].
//!
//! Every dose that takes contributes a protection window `[effective_day, immunity_loss_day)`.
//! The agent is protected on a day when any of the windows of the course covers it, so a booster
//! given while an earlier dose still protects extends protection without a gap.
//!
//! Records are touched by one worker at a time and do no locking of their own.
use std::fmt::{self, Display};
use std::io::{self, Write};

use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};

use crate::delay::{DelaySampler, DoseSchedule};
use crate::error::VaccinationError;
use crate::ids::{ManagerId, PersonId, VaccineId};
use crate::Day;

/// The half-open range of days `[start, end)` on which a dose protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionWindow {
    pub start: Day,
    pub end: Day,
}

impl ProtectionWindow {
    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day < self.end
    }

    /// A dose that did not take has an empty window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionChange {
    Gained,
    Lost,
}

/// What changed during a call to [`VaccinationRecord::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Set when the agent became protected or lost protection on this day.
    pub protection: Option<ProtectionChange>,
    /// Index of the dose administered on this day, if one came due.
    pub dose_administered: Option<usize>,
}

impl UpdateOutcome {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.protection.is_none() && self.dose_administered.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    vaccination_day: Option<Day>,
    vaccination_effective_day: Option<Day>,
    vaccination_immunity_loss_day: Option<Day>,
    current_dose: usize,
    days_to_next_dose: Option<u32>,
    effective: bool,
    last_update_day: Option<Day>,
    windows: Vec<ProtectionWindow>,
    vaccine: Option<VaccineId>,
    person: Option<PersonId>,
    manager: Option<ManagerId>,
}

fn day_or_unset(day: Option<Day>) -> i64 {
    day.map_or(-1, i64::from)
}

impl VaccinationRecord {
    /// Creates a record for someone who has not been vaccinated yet.
    #[must_use]
    pub fn new() -> Self {
        VaccinationRecord::default()
    }

    /// Creates a record for someone who receives the first dose of `vaccine` on `day`.
    #[must_use]
    pub fn activated<S, D>(
        day: Day,
        vaccine: VaccineId,
        age: f64,
        person: PersonId,
        manager: ManagerId,
        sampler: &mut S,
        schedule: &D,
    ) -> Self
    where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        let mut record = VaccinationRecord {
            vaccination_day: Some(day),
            ..VaccinationRecord::default()
        };
        record.start_course(day, vaccine, age, person, manager, sampler, schedule);
        record
    }

    /// Activates an empty record with the first dose of `vaccine` on `day`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfOrderUpdate` if the record was already updated on a later day, or
    /// `DoubleAssignment` if it was already vaccinated. The record is left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn activate<S, D>(
        &mut self,
        day: Day,
        vaccine: VaccineId,
        age: f64,
        person: PersonId,
        manager: ManagerId,
        sampler: &mut S,
        schedule: &D,
    ) -> Result<(), VaccinationError>
    where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        self.reject_rewind(self.last_update_day, day)?;
        self.set_vaccination_day(day)?;
        self.start_course(day, vaccine, age, person, manager, sampler, schedule);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn start_course<S, D>(
        &mut self,
        day: Day,
        vaccine: VaccineId,
        age: f64,
        person: PersonId,
        manager: ManagerId,
        sampler: &mut S,
        schedule: &D,
    ) where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        self.vaccine = Some(vaccine);
        self.person = Some(person);
        self.manager = Some(manager);
        self.last_update_day = Some(day);
        self.administer(day, vaccine, age, sampler, schedule);
        debug!(
            "{person:?} took dose {} of {vaccine:?} on day {day}",
            self.current_dose
        );
    }

    /// Samples the protection window and next-dose countdown of the current dose given on `day`.
    fn administer<S, D>(
        &mut self,
        day: Day,
        vaccine: VaccineId,
        age: f64,
        sampler: &mut S,
        schedule: &D,
    ) where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        let dose = self.current_dose;
        let effective_day = day.saturating_add(sampler.efficacy_delay(vaccine, dose, age));
        let immunity_loss_day =
            effective_day.saturating_add(sampler.waning_delay(vaccine, dose, age));
        self.vaccination_effective_day = Some(effective_day);
        self.vaccination_immunity_loss_day = Some(immunity_loss_day);

        let window = ProtectionWindow {
            start: effective_day,
            end: immunity_loss_day,
        };
        if window.is_empty() {
            trace!(
                "dose {dose} of {vaccine:?} for {:?} gives no protection",
                self.person
            );
        } else {
            self.windows.push(window);
        }

        self.days_to_next_dose = schedule.days_until_next_dose(vaccine, dose, age);
        self.effective = self.is_effective_on(day);
    }

    /// Advances the record to `current_day`.
    ///
    /// Recomputes whether the agent is protected, counts down to the next dose and, when it
    /// comes due, administers it. Calling this twice for the same day changes nothing the second
    /// time.
    ///
    /// # Errors
    ///
    /// Returns `OutOfOrderUpdate` without changing the record if `current_day` is earlier than
    /// the day of a previous update, or if a dose comes due before the day of vaccination.
    pub fn update<S, D>(
        &mut self,
        current_day: Day,
        age: f64,
        sampler: &mut S,
        schedule: &D,
    ) -> Result<UpdateOutcome, VaccinationError>
    where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        self.reject_rewind(self.last_update_day, current_day)?;
        let elapsed = self
            .last_update_day
            .map_or(0, |previous| current_day - previous);
        let remaining = self
            .days_to_next_dose
            .map(|remaining| remaining.saturating_sub(elapsed));
        if remaining == Some(0) {
            self.reject_rewind(self.vaccination_day, current_day)?;
        }

        self.last_update_day = Some(current_day);
        let was_effective = self.effective;
        self.effective = self.is_effective_on(current_day);
        self.days_to_next_dose = remaining;

        let mut outcome = UpdateOutcome::default();
        if remaining == Some(0) {
            self.advance_dose(current_day, age, sampler, schedule)?;
            outcome.dose_administered = Some(self.current_dose);
        }

        outcome.protection = match (was_effective, self.effective) {
            (false, true) => Some(ProtectionChange::Gained),
            (true, false) => Some(ProtectionChange::Lost),
            _ => None,
        };
        match outcome.protection {
            Some(ProtectionChange::Gained) => debug!(
                "{:?} became immune from dose {} on day {current_day}",
                self.person, self.current_dose
            ),
            Some(ProtectionChange::Lost) => debug!(
                "{:?} lost vaccine immunity on day {current_day}",
                self.person
            ),
            None => {}
        }
        Ok(outcome)
    }

    /// Administers the next dose of the regimen on `current_day`.
    ///
    /// Called by [`update`](Self::update) when a scheduled dose comes due, or by a policy manager
    /// giving the dose itself. Protection windows of earlier doses are kept.
    ///
    /// # Errors
    ///
    /// Returns `OutOfOrderUpdate` without changing the record if `current_day` is earlier than
    /// the day of vaccination or of a previous update.
    pub fn advance_dose<S, D>(
        &mut self,
        current_day: Day,
        age: f64,
        sampler: &mut S,
        schedule: &D,
    ) -> Result<(), VaccinationError>
    where
        S: DelaySampler + ?Sized,
        D: DoseSchedule + ?Sized,
    {
        self.reject_rewind(self.last_update_day.max(self.vaccination_day), current_day)?;
        self.current_dose += 1;
        if self.vaccination_day.is_none() {
            self.vaccination_day = Some(current_day);
        }
        if self.last_update_day.is_none_or(|previous| previous < current_day) {
            self.last_update_day = Some(current_day);
        }

        match self.vaccine {
            Some(vaccine) => {
                self.administer(current_day, vaccine, age, sampler, schedule);
                debug!(
                    "{:?} took dose {} of {vaccine:?} on day {current_day}",
                    self.person, self.current_dose
                );
            }
            None => {
                warn!(
                    "dose {} given on day {current_day} to a record with no vaccine",
                    self.current_dose
                );
                self.days_to_next_dose = None;
                self.effective = self.is_effective_on(current_day);
            }
        }
        Ok(())
    }

    /// Rejects `day` if it comes before `previous`.
    fn reject_rewind(&self, previous: Option<Day>, day: Day) -> Result<(), VaccinationError> {
        match previous {
            Some(previous) if day < previous => {
                error!("{:?} asked to go back from day {previous} to day {day}", self.person);
                Err(VaccinationError::OutOfOrderUpdate {
                    previous,
                    attempted: day,
                })
            }
            _ => Ok(()),
        }
    }

    /// Records the day of vaccination of a record that has none.
    ///
    /// # Errors
    ///
    /// Returns `DoubleAssignment` and leaves the record unchanged if the day was already set.
    pub fn set_vaccination_day(&mut self, day: Day) -> Result<(), VaccinationError> {
        match self.vaccination_day {
            None => {
                self.vaccination_day = Some(day);
                Ok(())
            }
            Some(existing) => {
                warn!(
                    "setting vaccination day of {:?} to {day}, already vaccinated on day {existing}",
                    self.person
                );
                Err(VaccinationError::DoubleAssignment {
                    existing,
                    attempted: day,
                })
            }
        }
    }

    #[must_use]
    pub fn vaccination_day(&self) -> Option<Day> {
        self.vaccination_day
    }

    /// First day of protection from the most recent dose.
    #[must_use]
    pub fn effective_day(&self) -> Option<Day> {
        self.vaccination_effective_day
    }

    /// First day without protection from the most recent dose.
    #[must_use]
    pub fn immunity_loss_day(&self) -> Option<Day> {
        self.vaccination_immunity_loss_day
    }

    /// Whether the agent was protected on the day of the last update.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.effective
    }

    /// Whether any dose of this course protects on `day`.
    #[must_use]
    pub fn is_effective_on(&self, day: Day) -> bool {
        self.windows.iter().any(|window| window.contains(day))
    }

    /// Day of the most recent update, activation or dose.
    #[must_use]
    pub fn last_update_day(&self) -> Option<Day> {
        self.last_update_day
    }

    #[must_use]
    pub fn vaccine(&self) -> Option<VaccineId> {
        self.vaccine
    }

    #[must_use]
    pub fn person(&self) -> Option<PersonId> {
        self.person
    }

    #[must_use]
    pub fn manager(&self) -> Option<ManagerId> {
        self.manager
    }

    #[must_use]
    pub fn current_dose(&self) -> usize {
        self.current_dose
    }

    /// Days until the next dose is due, or `None` once the regimen is complete.
    #[must_use]
    pub fn days_to_next_dose(&self) -> Option<u32> {
        self.days_to_next_dose
    }

    #[must_use]
    pub fn protection_windows(&self) -> &[ProtectionWindow] {
        &self.windows
    }

    /// Writes every field of the record.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn print<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{self}")
    }

    /// Writes the fixed-width one-line trace of the record. Unset days are written as `-1`.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn print_trace<W: Write>(&self, writer: &mut W, age: f64) -> io::Result<()> {
        write!(
            writer,
            " vaccday {:5} age {:5.1} iseff {:2} effday {:5} currentdose {:3}",
            day_or_unset(self.vaccination_day),
            age,
            u8::from(self.effective),
            day_or_unset(self.vaccination_effective_day),
            self.current_dose
        )?;
        writer.flush()
    }
}

impl Display for VaccinationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vaccine Status: vaccination_day {} effective_day {} immunity_loss_day {} \
             current_dose {} days_to_next_dose {} effective {}",
            day_or_unset(self.vaccination_day),
            day_or_unset(self.vaccination_effective_day),
            day_or_unset(self.vaccination_immunity_loss_day),
            self.current_dose,
            self.days_to_next_dose.map_or(-1, i64::from),
            self.effective
        )?;
        if let Some(vaccine) = self.vaccine {
            write!(f, " vaccine {vaccine}")?;
        }
        if let Some(person) = self.person {
            write!(f, " person {person}")?;
        }
        if let Some(manager) = self.manager {
            write!(f, " manager {manager}")?;
        }
        Ok(())
    }
}
