use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{
    Deployment, DeploymentContext, HostEnvironment, OsRandom, RandSource, Result, SnowflakeId,
    TimeSource, UtcClock,
};

/// A coordination-free generator of 64-bit, roughly time-ordered
/// [`SnowflakeId`]s.
///
/// One generator instance is constructed per process at application startup
/// and shared (e.g. behind an `Arc`) with every request handler. Machine id
/// and salt are resolved exactly once at construction and stay immutable for
/// the generator's lifetime; the wrapping 12-bit sequence counter is the only
/// mutable state and is guarded by a mutex, so [`generate`] is safe to call
/// from many concurrent threads or tasks.
///
/// Uniqueness is best-effort: it holds as long as no more than 4096 ids are
/// requested from one instance within the same millisecond, and no two
/// concurrently running instances share both machine id and salt while
/// issuing ids in the same millisecond at overlapping sequence values. The
/// generator never stalls for the next millisecond on sequence wraparound;
/// that collision window is accepted rather than prevented by blocking.
///
/// # Example
///
/// ```
/// use firn::{Deployment, DeploymentContext, RandSource, Result, SnowflakeGenerator, UtcClock};
///
/// struct StaticPod;
/// impl DeploymentContext for StaticPod {
///     fn detect(&self) -> Result<Deployment> {
///         Ok(Deployment::Orchestrated { hostname: "api-7f9c-xkr12".into() })
///     }
/// }
///
/// struct FixedRandom;
/// impl RandSource for FixedRandom {
///     fn try_rand(&self) -> Result<u64> {
///         Ok(0x1b)
///     }
/// }
///
/// let generator = SnowflakeGenerator::with_context(&StaticPod, &FixedRandom, UtcClock::default())?;
/// let id = generator.generate();
/// assert_eq!(id.machine_id(), 0x7f9c & 0x1f);
/// assert_eq!(id.salt(), 0x1b);
/// # Ok::<(), firn::Error>(())
/// ```
///
/// [`generate`]: Self::generate
pub struct SnowflakeGenerator<T = UtcClock>
where
    T: TimeSource<u64>,
{
    salt: u64,
    machine_id: u64,
    sequence: Mutex<u64>,
    clock: T,
}

impl SnowflakeGenerator<UtcClock> {
    /// Constructs a generator wired to the production environment:
    /// [`HostEnvironment`] for deployment detection, [`OsRandom`] for the
    /// salt, and [`UtcClock`] for timestamps.
    ///
    /// # Errors
    /// - [`Error::InvalidMachineIdentity`] if a clustered deployment was
    ///   detected but no machine id could be derived from the hostname.
    /// - [`Error::RandomSourceUnavailable`] if the OS random source cannot
    ///   be read.
    ///
    /// Both are fatal: callers should abort startup rather than run with an
    /// unverified machine identity.
    ///
    /// # Example
    /// ```no_run
    /// use firn::SnowflakeGenerator;
    ///
    /// let generator = SnowflakeGenerator::from_env()?;
    /// let id = generator.generate();
    /// println!("first id: {id}");
    /// # Ok::<(), firn::Error>(())
    /// ```
    ///
    /// [`Error::InvalidMachineIdentity`]: crate::Error::InvalidMachineIdentity
    /// [`Error::RandomSourceUnavailable`]: crate::Error::RandomSourceUnavailable
    pub fn from_env() -> Result<Self> {
        Self::with_context(&HostEnvironment, &OsRandom, UtcClock::default())
    }
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource<u64>,
{
    /// Constructs a generator from explicit collaborators.
    ///
    /// The deployment context and random source are consulted once, here;
    /// only the clock is retained for the generator's lifetime. This is the
    /// constructor to use for dependency injection in tests, or to embed the
    /// generator under a custom clock.
    ///
    /// # Errors
    /// Same conditions as [`SnowflakeGenerator::from_env`].
    pub fn with_context<C, R>(context: &C, rand: &R, clock: T) -> Result<Self>
    where
        C: DeploymentContext,
        R: RandSource,
    {
        let deployment = context.detect()?;
        debug!(?deployment, "resolved deployment context");

        let machine_id = crate::resolve_machine_id(&deployment, rand)?;
        let salt = rand.try_rand()? & SnowflakeId::SALT_MASK;
        info!(
            machine_id,
            salt,
            bare_host = matches!(deployment, Deployment::BareHost),
            "snowflake generator initialized"
        );

        Ok(Self {
            salt,
            machine_id,
            sequence: Mutex::new(0),
            clock,
        })
    }

    /// The 5-bit machine id resolved at construction.
    pub fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// The 5-bit salt resolved at construction.
    pub fn salt(&self) -> u64 {
        self.salt
    }

    /// Generates the next identifier.
    ///
    /// Reads the clock, advances the sequence counter under the lock, and
    /// packs the result. This call never blocks on I/O, never waits for a
    /// millisecond boundary, and never fails; sequence wraparound within one
    /// millisecond is an accepted collision window rather than a stall.
    pub fn generate(&self) -> SnowflakeId {
        let timestamp = self.clock.current_millis();
        let sequence = self.next_sequence();
        SnowflakeId::from_components(timestamp, self.salt, self.machine_id, sequence)
    }

    /// Returns the pre-increment sequence value, then advances the counter
    /// modulo 4096 via bitmask. The read-then-advance is atomic as observed
    /// by all callers.
    pub(crate) fn next_sequence(&self) -> u64 {
        let mut seq = self.sequence.lock();
        let current = *seq;
        *seq = (current + 1) & SnowflakeId::SEQUENCE_MASK;
        current
    }
}
