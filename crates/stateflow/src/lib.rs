//! # Stateflow
//!
//! A single-store, unidirectional state core where reducers decide, effects
//! execute, and follow-up actions flow back through one serialized dispatch.
//!
//! ## Core Concepts
//!
//! Stateflow separates **transitions** from **side effects**:
//! - [`Action`] = Intent or fact (what should happen / what happened)
//! - [`Reducer`] = Pure transition `(State, Action) -> State`
//! - [`Effect`] = Async work triggered by an action, yielding at most one
//!   follow-up action
//!
//! The key principle: **the reducer is the only writer**. Effects never touch
//! state; they return actions that go through `dispatch` like everything else.
//!
//! ## Architecture
//!
//! ```text
//! Caller
//!     │
//!     ▼ dispatch(action)
//! Store ─────────────────────────────────────────────┐
//!     │  (cycle mutex: one transition at a time)     │
//!     ├─► Reducer.reduce() ─► new State              │
//!     │                                              │
//!     ├─► StateStream (watch) ◄── readers            │
//!     ├─► subscribers, registration order            │
//!     │                                              │
//!     └─► EffectMiddleware                           │
//!            │                                       │
//!            ├─► registry.matching(action)           │
//!            │     selector(state) ─► None: skip     │
//!            │                                       │
//!            ├─► spawn Effect A ─► Some(follow-up) ──┤
//!            ├─► spawn Effect B ─► None              │
//!            └─► spawn Effect C ─► Err ─► on_failure ┘
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Single source of truth** - The store owns the only current state
//! 2. **Whole-value replacement** - States are never mutated; old snapshots stay valid
//! 3. **Serialized transitions** - Every dispatch is one atomic reduce/notify/effects cycle
//! 4. **Reduce before notify before effects** - Within a cycle, always in that order
//! 5. **Effects run concurrently** - Completion order between siblings is unspecified
//! 6. **Slices, not trees** - An effect only receives what its selector picks
//!
//! ## Example
//!
//! ```ignore
//! use stateflow::{Action, ActionFilter, Effect, EffectRegistry, Reducer, ReducerError, Store};
//!
//! let registry = EffectRegistry::builder()
//!     .with_effect("log", ActionFilter::Any, |s: &AppState| Some(s.clone()), LoggingEffect)
//!     .with_effect(
//!         "fetch",
//!         ActionFilter::Kind(ActionKind::Fetch),
//!         |s: &AppState| Some(s.home.clone()),
//!         FetchEffect::new(source),
//!     )
//!     .build();
//!
//! let store = Store::builder(AppReducer, AppState::default())
//!     .with_effects(registry)
//!     .build()?;
//!
//! store.dispatch(AppAction::Fetch)?;   // reducer has run when this returns
//! store.settled().await;                // effect and its follow-up have run
//! ```
//!
//! ## What This Is Not
//!
//! Stateflow is **not**:
//! - Persistent (state lives for one process)
//! - Multi-store
//! - A time-travel debugger

// Core modules
mod config;
mod core;
mod effect;
mod error;
mod inflight;
mod middleware;
mod projection;
mod reducer;
mod store;

// Concurrency tests (test-only)
#[cfg(test)]
mod stress_tests;

// Re-export core traits
pub use crate::core::{Action, ActionFilter, ActionTag, CorrelationId, State};

// Re-export error types
pub use crate::error::{EffectError, ReducerError, StoreError};

// Re-export reducer and store types
pub use reducer::Reducer;
pub use store::{Store, StoreBuilder, Subscription};

// Re-export effect types
pub use effect::{
    Effect, EffectFuture, EffectRegistration, EffectRegistry, EffectRegistryBuilder,
    FailureMapper,
};

// Re-export middleware types
pub use middleware::{EffectMiddleware, Middleware};

// Re-export projection and tracking types
pub use inflight::{InflightGuard, InflightTracker};
pub use projection::StateStream;

// Re-export config
pub use config::StoreConfig;

// Re-export commonly used external types
pub use async_trait::async_trait;
