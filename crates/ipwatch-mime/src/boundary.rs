//! Multipart boundary generation.

use crate::error::Result;
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;

/// Number of random bytes drawn per boundary.
pub const BOUNDARY_BYTES: usize = 30;

/// Multipart boundary: 60 lowercase hex characters drawn from a secure
/// random source.
///
/// Only digits and `a`-`f` appear, so the value is a valid MIME token and
/// never needs quoting in a `Content-Type` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Generates a fresh boundary from the operating system's random source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Entropy`](crate::Error::Entropy) if the random source
    /// cannot supply bytes.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a fresh boundary from the given random source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Entropy`](crate::Error::Entropy) if the random source
    /// cannot supply bytes.
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut buf = [0u8; BOUNDARY_BYTES];
        rng.try_fill_bytes(&mut buf).inspect_err(|e| {
            tracing::warn!(error = %e, "Random source failed while generating boundary");
        })?;
        Ok(Self(hex::encode(buf)))
    }

    /// Returns the boundary as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Random source that always fails.
    pub(crate) struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other("no entropy")))
        }
    }

    fn is_lower_hex(s: &str) -> bool {
        s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    #[test]
    fn test_generate_shape() {
        let boundary = Boundary::generate().unwrap();
        assert_eq!(boundary.as_str().len(), 60);
        assert!(is_lower_hex(boundary.as_str()));
    }

    #[test]
    fn test_generate_distinct() {
        let a = Boundary::generate().unwrap();
        let b = Boundary::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entropy_failure_is_an_error() {
        let err = Boundary::generate_with(&mut FailingRng).unwrap_err();
        assert!(matches!(err, crate::Error::Entropy(_)));
    }

    #[test]
    fn test_display_matches_as_str() {
        let boundary = Boundary::generate().unwrap();
        assert_eq!(boundary.to_string(), boundary.as_str());
    }

    proptest! {
        #[test]
        fn prop_boundary_is_60_lower_hex(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let boundary = Boundary::generate_with(&mut rng).unwrap();
            prop_assert_eq!(boundary.as_str().len(), 60);
            prop_assert!(is_lower_hex(boundary.as_str()));
        }
    }
}
