//! Environment abstraction for deterministic testing.
//!
//! Decouples protocol logic from the wall clock. State machines never read
//! time themselves; drivers call [`Environment::now`] and pass the instant in.
//! Production uses [`crate::SystemEnv`]; simulation uses a virtual clock that
//! only moves when the test advances it.

use std::{fmt::Debug, time::Duration};

/// Abstract environment providing time and async sleeping.
///
/// # Invariants
///
/// Implementations MUST guarantee that `now()` never goes backwards within a
/// single execution context.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, while simulation
    /// environments use a virtual instant.
    type Instant: Copy + Ord + Debug + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be used
    /// by driver code (not protocol logic).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
