/// Declares a key type for an independent random stream of a [`RandomSource`].
///
/// Draws for different concerns (ages of the synthetic population, whether each dose takes,
/// how long it lasts) should come from different streams, so that adding draws to one never
/// changes the values drawn from another. The stream is seeded from the name given here, so
/// each name may only be declared once per binary.
///
/// ```rust
/// use ixa_vaccination::define_rng;
/// use ixa_vaccination::random::RandomSource;
///
/// define_rng!(pub(crate) DoseRng);
///
/// let mut random = RandomSource::new(1);
/// let takes = random.sample_bool(DoseRng, 0.9);
/// # let _ = takes;
/// ```
///
/// [`RandomSource`]: crate::random::RandomSource
#[macro_export]
macro_rules! define_rng {
    ($vis:vis $random_id:ident) => {
        #[derive(Copy, Clone, Debug)]
        $vis struct $random_id;

        impl $crate::random::RngId for $random_id {
            fn get_name() -> &'static str {
                stringify!($random_id)
            }
        }

        // Two streams with the same name would share a seed.
        $crate::paste::paste! {
            #[doc(hidden)]
            #[no_mangle]
            #[allow(non_upper_case_globals)]
            pub static [<vaccination_rng_stream_ $random_id>]: () = ();
        }
    };
}
pub use define_rng;
