//! Testing utilities for Stateflow stores.
//!
//! - [`RecordingObserver`] captures every state a store publishes
//! - [`ActionRecorder`] is an effect that records the actions it is invoked with
//! - [`ScriptedEffect`] returns a canned outcome after an optional delay
//! - [`wait_for`] awaits a state matching a predicate, with a deadline

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use stateflow::{
    Action, ActionFilter, Effect, EffectRegistration, Reducer, State, StateStream, Store,
    Subscription,
};

/// Records every state a store notifies its subscribers with.
pub struct RecordingObserver<S> {
    states: Arc<Mutex<Vec<Arc<S>>>>,
    subscription: Subscription,
}

impl<S: State> RecordingObserver<S> {
    pub fn attach<R>(store: &Store<R>) -> Self
    where
        R: Reducer<State = S>,
        R::Action: Action,
    {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        let subscription = store.subscribe(move |state| {
            sink.lock().unwrap().push(Arc::clone(state));
        });

        Self {
            states,
            subscription,
        }
    }

    pub fn states(&self) -> Vec<Arc<S>> {
        self.states.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<Arc<S>> {
        self.states.lock().unwrap().last().cloned()
    }

    pub fn detach(self) -> bool {
        self.subscription.unsubscribe()
    }
}

/// Effect that records every action it is invoked with and never produces
/// a follow-up.
pub struct ActionRecorder<A> {
    seen: Arc<Mutex<Vec<A>>>,
}

impl<A: Action> ActionRecorder<A> {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A registration wiring a clone of this recorder to `filter`.
    pub fn registration<S>(&self, filter: ActionFilter<A>) -> EffectRegistration<S, A>
    where
        S: Send + Sync + 'static,
    {
        EffectRegistration::new("recorder", filter, |_: &S| Some(()), self.clone())
    }

    pub fn actions(&self) -> Vec<A> {
        self.seen.lock().unwrap().clone()
    }
}

impl<A: Action> Default for ActionRecorder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for ActionRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            seen: Arc::clone(&self.seen),
        }
    }
}

#[async_trait]
impl<A: Action> Effect<(), A> for ActionRecorder<A> {
    async fn run(&self, _: (), action: A) -> Result<Option<A>> {
        self.seen.lock().unwrap().push(action);
        Ok(None)
    }
}

enum Outcome<A> {
    Emit(Option<A>),
    Fail(String),
}

/// Effect with a fixed outcome, for driving the pipeline in tests.
pub struct ScriptedEffect<A> {
    outcome: Outcome<A>,
    delay: Duration,
}

impl<A: Action> ScriptedEffect<A> {
    pub fn returning(action: A) -> Self {
        Self {
            outcome: Outcome::Emit(Some(action)),
            delay: Duration::ZERO,
        }
    }

    pub fn silent() -> Self {
        Self {
            outcome: Outcome::Emit(None),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail(message.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl<T, A> Effect<T, A> for ScriptedEffect<A>
where
    T: Send + 'static,
    A: Action,
{
    async fn run(&self, _slice: T, _action: A) -> Result<Option<A>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Emit(action) => Ok(action.clone()),
            Outcome::Fail(message) => Err(anyhow!("{message}")),
        }
    }
}

/// Wait until the stream publishes a state satisfying `predicate`.
///
/// Checks the current state first. Fails if `deadline` elapses or the store
/// goes away.
pub async fn wait_for<S, F>(
    stream: &mut StateStream<S>,
    deadline: Duration,
    mut predicate: F,
) -> Result<Arc<S>>
where
    S: Send + Sync + 'static,
    F: FnMut(&S) -> bool,
{
    let current = stream.current();
    if predicate(&current) {
        return Ok(current);
    }

    tokio::time::timeout(deadline, async {
        while let Some(state) = stream.changed().await {
            if predicate(&state) {
                return Ok(state);
            }
        }
        Err(anyhow!("store dropped before the state was reached"))
    })
    .await
    .map_err(|_| anyhow!("state not reached within {deadline:?}"))?
}
