use crate::{Error, Result};
use rand::TryRngCore;
use rand::rngs::OsRng;

/// A trait for random sources that return random integers.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests. The source is consulted exactly once or twice at
/// generator construction (salt, and the bare-host machine-id fallback) and
/// never on the generation hot path.
///
/// # Example
/// ```
/// use firn::{RandSource, Result};
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn try_rand(&self) -> Result<u64> {
///         Ok(1234)
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.try_rand().unwrap(), 1234);
/// ```
pub trait RandSource {
    /// Returns a random integer, or an error if the source cannot be read.
    fn try_rand(&self) -> Result<u64>;
}

/// A [`RandSource`] backed by the operating system's CSPRNG
/// ([`rand::rngs::OsRng`]).
///
/// Reading the OS random source can fail on exotic platforms or sandboxed
/// environments; that failure is surfaced as
/// [`Error::RandomSourceUnavailable`] so construction aborts instead of
/// seeding an identity from a broken source.
#[derive(Default, Clone, Debug)]
pub struct OsRandom;

impl RandSource for OsRandom {
    fn try_rand(&self) -> Result<u64> {
        OsRng
            .try_next_u64()
            .map_err(Error::RandomSourceUnavailable)
    }
}
