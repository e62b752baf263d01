//! Seeded, independent random number streams.
//!
//! Each stream is keyed by a type declared with [`define_rng!`](crate::define_rng) and seeded
//! with the base seed offset by a hash of the stream's name, so adding draws to one stream never
//! shifts the values drawn from another. Streams are created lazily on first use.
//!
//! ```rust
//! use ixa_vaccination::define_rng;
//! use ixa_vaccination::random::RandomSource;
//!
//! define_rng!(AgeRng);
//!
//! let mut random = RandomSource::new(42);
//! let age: f64 = random.sample_range(AgeRng, 0.0..90.0);
//! assert!((0.0..90.0).contains(&age));
//! ```
mod macros;

use std::any::TypeId;

use log::trace;
use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::distr::Distribution;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

pub use macros::define_rng;

use crate::hashing::hash_str;

pub trait RngId: Copy + Clone + 'static {
    fn get_name() -> &'static str;
}

/// Holds the base seed and every stream created from it.
#[derive(Debug)]
pub struct RandomSource {
    base_seed: u64,
    rngs: FxHashMap<TypeId, SmallRng>,
}

impl RandomSource {
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        trace!("initializing random source with seed {base_seed}");
        RandomSource {
            base_seed,
            rngs: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Changes the base seed. Existing streams are dropped so they get re-seeded on next use.
    pub fn reseed(&mut self, base_seed: u64) {
        self.base_seed = base_seed;
        self.rngs.clear();
    }

    /// Gets a mutable reference to the stream associated with the given [`RngId`], creating it
    /// if it has not been used before.
    pub fn get_rng<R: RngId>(&mut self, _rng_id: R) -> &mut SmallRng {
        let base_seed = self.base_seed;
        self.rngs.entry(TypeId::of::<R>()).or_insert_with(|| {
            trace!("creating new RNG (seed={base_seed}) for {}", R::get_name());
            let seed_offset = hash_str(R::get_name());
            SmallRng::seed_from_u64(base_seed.wrapping_add(seed_offset))
        })
    }

    /// Gets a random sample from the specified distribution using the stream associated with
    /// the given [`RngId`].
    pub fn sample_distr<R: RngId, T>(&mut self, rng_id: R, distribution: impl Distribution<T>) -> T {
        distribution.sample(self.get_rng(rng_id))
    }

    /// Gets a random sample within the range provided by `range`.
    pub fn sample_range<R: RngId, S, T>(&mut self, rng_id: R, range: S) -> T
    where
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.get_rng(rng_id).random_range(range)
    }

    /// Gets a random boolean value which is true with probability `p`.
    pub fn sample_bool<R: RngId>(&mut self, rng_id: R, p: f64) -> bool {
        self.get_rng(rng_id).random_bool(p)
    }
}
