//! Dispatch middleware.
//!
//! Middleware runs after the reducer has replaced the state and every
//! subscriber has been notified. [`EffectMiddleware`] is the one that turns
//! actions into concurrently running side effects.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, trace, warn, Instrument};

use crate::core::{Action, CorrelationId, State};
use crate::effect::{EffectFuture, EffectRegistry};
use crate::error::{EffectError, StoreError};
use crate::reducer::Reducer;
use crate::store::Store;

/// Observes every successfully reduced action.
///
/// Called synchronously inside the dispatch cycle, so implementations must
/// not block. A middleware may dispatch; such dispatches are queued and run
/// after the current cycle.
pub trait Middleware<R: Reducer>: Send + Sync + 'static {
    fn after_dispatch(
        &self,
        store: &Store<R>,
        state: &Arc<R::State>,
        action: &R::Action,
        correlation: CorrelationId,
    );
}

/// Runs matching effects as independent tasks and feeds their results back
/// into the store.
///
/// Matched effects are spawned concurrently: a slow effect never delays a
/// fast sibling, and each follow-up is dispatched as soon as its effect
/// completes.
pub struct EffectMiddleware<R>
where
    R: Reducer,
    R::Action: Action,
{
    registry: Arc<EffectRegistry<R::State, R::Action>>,
    runtime: Handle,
    default_timeout: Option<Duration>,
}

impl<R> EffectMiddleware<R>
where
    R: Reducer,
    R::State: State,
    R::Action: Action,
{
    pub fn new(
        registry: EffectRegistry<R::State, R::Action>,
        runtime: Handle,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            runtime,
            default_timeout,
        }
    }

    pub fn registry(&self) -> &EffectRegistry<R::State, R::Action> {
        &self.registry
    }
}

impl<R> Middleware<R> for EffectMiddleware<R>
where
    R: Reducer,
    R::State: State,
    R::Action: Action,
{
    fn after_dispatch(
        &self,
        store: &Store<R>,
        state: &Arc<R::State>,
        action: &R::Action,
        correlation: CorrelationId,
    ) {
        for registration in self.registry.matching(action) {
            let effect = registration.name();
            let Some(invocation) = registration.prepare(state, action) else {
                trace!(effect, kind = ?action.kind(), "selector miss, skipping effect");
                continue;
            };

            let guard = store.inflight().begin();
            let store = store.clone();
            let shutdown = store.shutdown_signal();
            let timeout = registration.timeout().or(self.default_timeout);
            let on_failure = registration.failure_mapper();
            let trigger = action.clone();
            let span = tracing::debug_span!("effect", effect, correlation_id = %correlation);

            self.runtime.spawn(
                async move {
                    let _guard = guard;

                    let outcome = tokio::select! {
                        _ = shutdown_requested(shutdown) => {
                            debug!("store shut down, effect cancelled");
                            return;
                        }
                        outcome = run_invocation(invocation, timeout) => outcome,
                    };

                    let follow_up = match outcome {
                        Ok(follow_up) => follow_up,
                        Err(err) => {
                            warn!(error = %err, "effect failed");
                            on_failure.and_then(|map| map(&err, &trigger))
                        }
                    };

                    let Some(next) = follow_up else {
                        return;
                    };

                    match store.dispatch_correlated(next, correlation) {
                        Ok(()) => {}
                        Err(StoreError::ShutDown) => {
                            debug!("store shut down before follow-up could be dispatched");
                        }
                        Err(err) => error!(error = %err, "follow-up dispatch failed"),
                    }
                }
                .instrument(span),
            );
        }
    }
}

async fn run_invocation<A>(
    invocation: EffectFuture<A>,
    timeout: Option<Duration>,
) -> Result<Option<A>, EffectError> {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, invocation).await {
            Ok(result) => result.map_err(EffectError::Failed),
            Err(_) => Err(EffectError::TimedOut(limit)),
        },
        None => invocation.await.map_err(EffectError::Failed),
    }
}

async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    // A closed channel means the store is gone, which is a shutdown too.
    let _ = rx.wait_for(|stopped| *stopped).await;
}
