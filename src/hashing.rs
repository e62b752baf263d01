//! Deterministic hashing used to derive per-stream seeds. The hash of a name must be stable
//! across runs and platforms, so the randomly seeded standard library hasher cannot be used.
use xxhash_rust::xxh3::xxh3_64;

/// A convenience method to compute the hash of a `&str`.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings() {
        let a = hash_str("hello");
        let b = hash_str("hello");
        let c = hash_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
