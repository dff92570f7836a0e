use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// All errors the generator can produce.
///
/// Every variant is fatal and surfaces at construction time. Identifier
/// generation itself ([`SnowflakeGenerator::generate`]) is infallible: there
/// is no safe degraded mode for an ID generator with an unverified machine
/// identity, so a failed construction must prevent the service from starting
/// rather than fall back silently.
///
/// [`SnowflakeGenerator::generate`]: crate::SnowflakeGenerator::generate
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A clustered deployment (container or orchestrator) was detected, but a
    /// machine identity could not be derived from the reported hostname.
    ///
    /// Substituting a random value here would mask misconfiguration in a
    /// clustered deployment, so construction aborts instead.
    #[error("invalid machine identity: {reason}")]
    InvalidMachineIdentity {
        /// Human-readable description of what failed to parse.
        reason: String,
    },

    /// The operating system's secure random source could not be read.
    #[error("random source unavailable")]
    RandomSourceUnavailable(#[source] rand::rand_core::OsError),

    /// Reserved for fallible time sources.
    ///
    /// The built-in [`UtcClock`] cannot fail, so this variant is never
    /// produced by the default wiring. A custom [`TimeSource`] whose clock
    /// can fail should surface this rather than emit a corrupt identifier.
    ///
    /// [`UtcClock`]: crate::UtcClock
    /// [`TimeSource`]: crate::TimeSource
    #[error("clock unavailable")]
    ClockUnavailable,
}
