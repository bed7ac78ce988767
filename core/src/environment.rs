//! Dependency injection traits.
//!
//! All external dependencies are abstracted behind traits and injected via
//! the Environment parameter of a reducer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use supperclub_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `IdGenerator` trait - abstracts identifier generation for testability
///
/// Production code generates random UUIDs; tests substitute a sequential
/// generator so identifiers are predictable.
pub trait IdGenerator: Send + Sync {
    /// Generate a fresh identifier
    fn next_id(&self) -> Uuid;
}

/// Production generator producing random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
