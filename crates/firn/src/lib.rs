//! Coordination-free 64-bit snowflake IDs with deployment-aware machine
//! identity.
//!
//! A [`SnowflakeGenerator`] packs a 42-bit timestamp offset, a 5-bit
//! per-instance salt, a 5-bit machine id, and a 12-bit wrapping sequence into
//! one `u64`, with no external registry and no cross-instance coordination
//! at runtime. Construct one instance per process at startup (machine
//! identity and salt are resolved exactly once) and share it across request
//! handlers; [`SnowflakeGenerator::generate`] is thread-safe and infallible.

mod deploy;
mod error;
mod generator;
mod id;
mod random;
mod time;

pub use crate::deploy::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::random::*;
pub use crate::time::*;
