//! Store runtime: owns state, runs reducers, executes effects.
//!
//! The store serializes every dispatch through a single write lock. That
//! lock is the concurrency guarantee the aggregates build on: a reducer
//! that checks state and mutates it in the same `reduce` call cannot be
//! interleaved with another dispatch on the same store.

use crate::effect::Effect;
use crate::reducer::Reducer;
use futures::future::BoxFuture;
use smallvec::SmallVec;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The Store runtime that manages state and executes effects
///
/// # Example
///
/// ```ignore
/// let store = Store::new(LedgerState::new(), LedgerReducer::new(), env);
///
/// // Send an action
/// store.send(LedgerAction::Reserve { event_id }).await;
///
/// // Read state
/// let left = store.state(|s| s.seats_left(&event_id)).await;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync,
    S: Send + Sync,
    A: Send + 'static,
    E: Send + Sync,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
        }
    }

    /// Send an action through the store
    ///
    /// Runs the reducer under the write lock, then executes the returned
    /// effects to completion, feeding any produced actions back through
    /// the reducer.
    pub async fn send(&self, action: A) {
        let effects = self.dispatch(action).await;
        for effect in effects {
            self.run_effect(effect).await;
        }
    }

    /// Send an action and read the resulting state in the same critical
    /// section
    ///
    /// The `read` closure observes the post-dispatch state before any other
    /// writer can interleave, so per-dispatch outcomes recorded in state
    /// (e.g. a rejection keyed to this command) are race-free. Effects run
    /// after the lock is released.
    pub async fn send_and_read<T, F>(&self, action: A, read: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let (value, effects) = {
            let mut state = self.state.write().await;
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            (read(&state), effects)
        };
        for effect in effects {
            self.run_effect(effect).await;
        }
        value
    }

    /// Read a snapshot of the current state through a closure
    pub async fn state<T, F>(&self, read: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        read(&state)
    }

    /// Run the reducer under the write lock and return its effects
    async fn dispatch(&self, action: A) -> SmallVec<[Effect<A>; 4]> {
        let mut state = self.state.write().await;
        self.reducer.reduce(&mut state, action, &self.environment)
    }

    /// Execute a single effect, dispatching feedback actions as they arrive
    fn run_effect(&self, effect: Effect<A>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Sequential(children) => {
                    for child in children {
                        self.run_effect(child).await;
                    }
                },
                Effect::Parallel(children) => {
                    futures::future::join_all(children.into_iter().map(|c| self.run_effect(c)))
                        .await;
                },
                Effect::Future(future) => {
                    if let Some(action) = future.await {
                        let effects = self.dispatch(action).await;
                        for child in effects {
                            self.run_effect(child).await;
                        }
                    }
                },
            }
        })
    }
}
