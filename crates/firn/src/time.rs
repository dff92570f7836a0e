use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Custom epoch: Sunday, September 21, 2008 05:22:00 UTC
///
/// Timestamp offsets are measured in milliseconds from this instant. A 42-bit
/// offset keeps ids valid until roughly the year 2148.
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_221_974_520_000);

/// A trait for time sources that return a timestamp in milliseconds.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests.
///
/// The timestamp type `T` is generic (typically `u64`), and the unit is
/// expected to be **milliseconds** relative to a configurable origin.
///
/// # Example
///
/// ```
/// use firn::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> T;
}

/// A wall-clock time source measured against a fixed epoch.
///
/// Each call reads `SystemTime::now()` and subtracts the configured epoch,
/// truncating to whole milliseconds (integer truncation, not rounding). If the
/// local clock sits before the epoch the offset saturates to zero: identifiers
/// produced under such a clock are meaningless, but generation itself never
/// panics or fails.
#[derive(Clone, Debug)]
pub struct UtcClock {
    epoch: Duration,
}

impl Default for UtcClock {
    /// Constructs a clock aligned to the default [`CUSTOM_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(CUSTOM_EPOCH)
    }
}

impl UtcClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource<u64> for UtcClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|since_unix| since_unix.checked_sub(self.epoch))
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}
