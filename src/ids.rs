//! Non-owning handles to the objects a vaccination record refers to.
//!
//! The population, the vaccine catalog and the policy managers all live outside of this crate.
//! A [`VaccinationRecord`](crate::VaccinationRecord) only stores an index into each of them, so
//! it can never keep its owner alive or free anything on drop.
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            #[must_use]
            pub const fn new(id: usize) -> Self {
                $name(id)
            }

            #[must_use]
            pub const fn id(self) -> usize {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", $label, self.0)
            }
        }
    };
}

define_handle!(
    /// Index of an agent in the population that owns it.
    PersonId,
    "Person"
);
define_handle!(
    /// Index of a vaccine product in a [`VaccineCatalog`](crate::VaccineCatalog).
    VaccineId,
    "Vaccine"
);
define_handle!(
    /// Identifies the policy manager that issued a vaccination. Stored for the manager's own
    /// bookkeeping and never dereferenced here.
    ManagerId,
    "Manager"
);
