//! The two collaborators a vaccination record consults when a dose is administered.
//!
//! * A [`DelaySampler`] decides how long a dose takes to become effective and how long the
//!   resulting protection lasts.
//! * A [`DoseSchedule`] decides when the next dose of a regimen is due.
//!
//! Keeping randomness behind [`DelaySampler`] lets the record itself stay deterministic. Models
//! use [`CatalogDelaySampler`], which draws from the age-specific parameters of a
//! [`VaccineCatalog`]; tests use [`FixedDelays`].
use log::trace;
use rand::Rng;
use rand_distr::Exp;

use crate::ids::VaccineId;
use crate::vaccine::VaccineCatalog;

pub trait DelaySampler {
    /// Days from administration of `dose` until it becomes effective.
    fn efficacy_delay(&mut self, vaccine: VaccineId, dose: usize, age: f64) -> u32;

    /// Days from the effective day of `dose` until its protection is lost. Zero means the dose
    /// never protects.
    fn waning_delay(&mut self, vaccine: VaccineId, dose: usize, age: f64) -> u32;
}

pub trait DoseSchedule {
    /// Days from administration of `dose` until the next dose, or `None` if the regimen is
    /// complete.
    fn days_until_next_dose(&self, vaccine: VaccineId, dose: usize, age: f64) -> Option<u32>;
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_days(days: f64) -> u32 {
    if days.is_finite() && days > 0.0 {
        days.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Samples delays from the age-specific dose parameters of a [`VaccineCatalog`].
///
/// The delay to efficacy is the dose's age-specific delay rounded to whole days. Whether the
/// dose takes at all is decided when the waning delay is drawn: with probability
/// `efficacy(age)` the protection lasts an exponentially distributed number of days with mean
/// `expected_duration(age)` (at least one day), otherwise the window is empty.
pub struct CatalogDelaySampler<'a, R: Rng> {
    catalog: &'a VaccineCatalog,
    rng: &'a mut R,
}

impl<'a, R: Rng> CatalogDelaySampler<'a, R> {
    pub fn new(catalog: &'a VaccineCatalog, rng: &'a mut R) -> Self {
        CatalogDelaySampler { catalog, rng }
    }
}

impl<R: Rng> DelaySampler for CatalogDelaySampler<'_, R> {
    fn efficacy_delay(&mut self, vaccine: VaccineId, dose: usize, age: f64) -> u32 {
        self.catalog
            .dose(vaccine, dose)
            .map_or(0, |parameters| whole_days(parameters.efficacy_delay(age)))
    }

    fn waning_delay(&mut self, vaccine: VaccineId, dose: usize, age: f64) -> u32 {
        let Some(parameters) = self.catalog.dose(vaccine, dose) else {
            return 0;
        };
        let efficacy = parameters.efficacy(age);
        if efficacy.is_nan() || efficacy <= 0.0 || !self.rng.random_bool(efficacy.min(1.0)) {
            trace!("dose {dose} of {vaccine:?} did not take at age {age}");
            return 0;
        }
        let mean = parameters.expected_duration(age);
        if mean.is_nan() || mean <= 0.0 {
            return 0;
        }
        match Exp::new(1.0 / mean) {
            Ok(distribution) => {
                let duration: f64 = self.rng.sample(distribution);
                whole_days(duration.ceil()).max(1)
            }
            Err(_) => 0,
        }
    }
}

/// Per-dose parameters of a [`FixedDelays`] regimen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedDose {
    pub efficacy_delay: u32,
    pub waning_delay: u32,
    pub days_until_next_dose: Option<u32>,
}

/// A deterministic regimen that ignores the vaccine and age it is asked about. Doses past the
/// end of the list never protect and schedule nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedDelays {
    doses: Vec<FixedDose>,
}

impl FixedDelays {
    #[must_use]
    pub fn new(doses: Vec<FixedDose>) -> Self {
        FixedDelays { doses }
    }

    /// A one-dose regimen.
    #[must_use]
    pub fn single(efficacy_delay: u32, waning_delay: u32) -> Self {
        FixedDelays::new(vec![FixedDose {
            efficacy_delay,
            waning_delay,
            days_until_next_dose: None,
        }])
    }

    fn dose(&self, dose: usize) -> FixedDose {
        self.doses.get(dose).copied().unwrap_or_default()
    }
}

impl DelaySampler for FixedDelays {
    fn efficacy_delay(&mut self, _vaccine: VaccineId, dose: usize, _age: f64) -> u32 {
        self.dose(dose).efficacy_delay
    }

    fn waning_delay(&mut self, _vaccine: VaccineId, dose: usize, _age: f64) -> u32 {
        self.dose(dose).waning_delay
    }
}

impl DoseSchedule for FixedDelays {
    fn days_until_next_dose(&self, _vaccine: VaccineId, dose: usize, _age: f64) -> Option<u32> {
        self.dose(dose).days_until_next_dose
    }
}
