//! # Supperclub Core
//!
//! Kernel for the supperclub backend: the Reducer pattern with explicit
//! effects and an async Store runtime.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for an aggregate
//! - **Action**: All possible inputs to a reducer (commands and the events
//!   they produce)
//! - **Reducer**: Pure function `(State, Action, Environment) → Effects`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell
//! - Explicit effects (no hidden I/O in reducers)
//! - Dependency injection via Environment
//!
//! Reducers run under the owning [`store::Store`]'s write lock, so any
//! check-then-write a reducer performs is atomic with respect to every
//! other dispatch on the same store. Conditional updates (decrement a
//! counter only while it is positive) rely on this and must live inside a
//! single `reduce` call, never across two dispatches.

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub mod effect;
pub mod environment;
pub mod reducer;
pub mod store;
