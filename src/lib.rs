//! Vaccination courses for agent-based disease models
//!
//! This crate tracks, for a single simulated person, how a course of vaccination unfolds over
//! simulated days: when each dose is given, when it starts to protect, when that protection
//! wanes and when the next dose of a multi-dose regimen is due.
//!
//! The central object is the [`VaccinationRecord`]. A policy manager creates one when it decides
//! to vaccinate someone, and the model advances it once per simulated day with
//! [`VaccinationRecord::update`]. The health model asks [`VaccinationRecord::is_effective`] each
//! day to decide whether the person is protected.
//!
//! A record does not decide anything random itself. It consults two collaborators:
//! * a [`DelaySampler`], which draws how long a dose takes to work and how long it lasts, and
//! * a [`DoseSchedule`], which says when the next dose is due.
//!
//! [`VaccineCatalog`] is the usual dose schedule and, together with an rng from
//! [`random::RandomSource`], backs the [`CatalogDelaySampler`].
//!
//! ```rust
//! use ixa_vaccination::{
//!     FixedDelays, ManagerId, PersonId, VaccinationRecord, VaccineId,
//! };
//!
//! // Effective five days after the dose, for thirty days.
//! let regimen = FixedDelays::single(5, 30);
//! let mut sampler = regimen.clone();
//! let mut record = VaccinationRecord::activated(
//!     10,
//!     VaccineId::new(0),
//!     45.0,
//!     PersonId::new(0),
//!     ManagerId::new(0),
//!     &mut sampler,
//!     &regimen,
//! );
//! record.update(15, 45.0, &mut sampler, &regimen).unwrap();
//! assert!(record.is_effective());
//! record.update(45, 45.0, &mut sampler, &regimen).unwrap();
//! assert!(!record.is_effective());
//! ```
pub mod age_map;
pub mod delay;
pub mod error;
pub mod hashing;
pub mod history;
pub mod ids;
pub mod log;
pub mod parameters;
pub mod random;
pub mod report;
pub mod vaccination_record;
pub mod vaccine;

/// A simulated day.
pub type Day = u32;

pub use age_map::{AgeBracket, AgeMap};
pub use delay::{CatalogDelaySampler, DelaySampler, DoseSchedule, FixedDelays, FixedDose};
pub use error::VaccinationError;
pub use history::VaccinationHistory;
pub use ids::{ManagerId, PersonId, VaccineId};
pub use parameters::VaccinationParameters;
pub use report::{VaccinationEvent, VaccinationEventRow, VaccinationReport};
pub use vaccination_record::{
    ProtectionChange, ProtectionWindow, UpdateOutcome, VaccinationRecord,
};
pub use vaccine::{Vaccine, VaccineCatalog, VaccineDose};

// Re-exports for macros
#[doc(hidden)]
pub use paste;
pub use rand;
