//! # Supperclub Testing
//!
//! Testing utilities for the supperclub reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (`FixedClock`,
//!   `SequentialIds`)
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for effect vectors
//!
//! ## Example
//!
//! ```ignore
//! use supperclub_testing::{ReducerTest, mocks::test_clock};
//!
//! ReducerTest::new(LedgerReducer::new())
//!     .with_env(test_env())
//!     .given_state(LedgerState::new())
//!     .when_action(LedgerAction::Reserve { event_id })
//!     .then_state(|state| assert_eq!(state.seats_left(&event_id), Some(9)))
//!     .run();
//! ```

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use supperclub_core::environment::{Clock, IdGenerator};
    use uuid::Uuid;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use supperclub_testing::mocks::FixedClock;
    /// use supperclub_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-06-01 12:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which should never
    /// happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Sequential identifier generator for predictable IDs in tests
    ///
    /// Produces UUIDs whose low 64 bits count up from zero.
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        counter: AtomicU64,
    }

    impl SequentialIds {
        /// Create a new generator starting at zero
        #[must_use]
        pub const fn new() -> Self {
            Self {
                counter: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            let n = self.counter.fetch_add(1, Ordering::Relaxed);
            Uuid::from_u64_pair(0, n)
        }
    }
}
