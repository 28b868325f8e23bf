//! The store: single owner of the current state.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::core::{Action, CorrelationId, State};
use crate::effect::EffectRegistry;
use crate::error::{ReducerError, StoreError};
use crate::inflight::InflightTracker;
use crate::middleware::{EffectMiddleware, Middleware};
use crate::projection::StateStream;
use crate::reducer::Reducer;

type Observer<S> = dyn Fn(&Arc<S>) + Send + Sync;

/// Holds the authoritative state and serializes every transition.
///
/// A dispatch cycle is: reduce, replace the state, publish it to the
/// projection, notify subscribers in registration order, then hand the
/// action to each middleware. Cycles never overlap. A dispatch issued from
/// inside a cycle (a subscriber or middleware dispatching) is queued and runs
/// as its own full cycle before the outer `dispatch` returns.
///
/// `Store` is a cheap handle; clones share the same state.
pub struct Store<R: Reducer> {
    inner: Arc<Inner<R>>,
}

struct Inner<R: Reducer> {
    reducer: R,
    current: RwLock<Arc<R::State>>,
    last_action: Mutex<Option<R::Action>>,
    cycle: Mutex<()>,
    owner: Mutex<Option<ThreadId>>,
    deferred: Mutex<VecDeque<(R::Action, CorrelationId)>>,
    subscribers: Arc<Subscribers<R::State>>,
    projection: watch::Sender<Arc<R::State>>,
    middleware: Vec<Arc<dyn Middleware<R>>>,
    inflight: Arc<InflightTracker>,
    shutdown: watch::Sender<bool>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer,
    R::State: State,
    R::Action: Action,
{
    pub fn builder(reducer: R, initial_state: R::State) -> StoreBuilder<R> {
        StoreBuilder::new(reducer, initial_state)
    }

    /// Current state. The returned snapshot stays valid after later dispatches.
    pub fn state(&self) -> Arc<R::State> {
        Arc::clone(&read(&self.inner.current))
    }

    /// Most recent action passed to [`dispatch`](Self::dispatch) that was
    /// successfully reduced. Effect follow-ups and queued re-entrant
    /// dispatches do not replace it.
    pub fn last_action(&self) -> Option<R::Action> {
        lock(&self.inner.last_action).clone()
    }

    /// Apply `action` and run its effects.
    ///
    /// On a reducer error the state is unchanged, nobody is notified and the
    /// error is returned.
    pub fn dispatch(&self, action: R::Action) -> Result<(), StoreError> {
        self.dispatch_with(action, CorrelationId::new(), Origin::External)
    }

    /// Like [`dispatch`](Self::dispatch), but tags the cycle with an
    /// existing correlation id. Effects use this for follow-up actions, so
    /// it leaves [`last_action`](Self::last_action) alone.
    pub fn dispatch_correlated(
        &self,
        action: R::Action,
        correlation: CorrelationId,
    ) -> Result<(), StoreError> {
        self.dispatch_with(action, correlation, Origin::FollowUp)
    }

    fn dispatch_with(
        &self,
        action: R::Action,
        correlation: CorrelationId,
        origin: Origin,
    ) -> Result<(), StoreError> {
        if self.is_shut_down() {
            return Err(StoreError::ShutDown);
        }

        if self.cycle_held_by_current_thread() {
            debug!(
                kind = ?action.kind(),
                correlation_id = %correlation,
                "deferring re-entrant dispatch"
            );
            lock(&self.inner.deferred).push_back((action, correlation));
            return Ok(());
        }

        let _cycle = lock(&self.inner.cycle);
        let _owner = CycleOwner::claim(&self.inner.owner);

        self.run_cycle(action, correlation, origin)?;
        self.drain_deferred();
        Ok(())
    }

    /// Register an observer called with the new state after every dispatch.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Arc<R::State>) + Send + Sync + 'static,
    {
        let id = self.inner.subscribers.add(Arc::new(observer));
        let list: Arc<dyn Detach> = self.inner.subscribers.clone();
        Subscription {
            id,
            list: Arc::downgrade(&list),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    pub fn state_stream(&self) -> StateStream<R::State> {
        StateStream::new(self.inner.projection.subscribe())
    }

    /// Number of effect invocations currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.inflight.in_flight()
    }

    /// Wait until no effect is running, including effects started by
    /// follow-up actions.
    pub async fn settled(&self) {
        self.inner.inflight.settled().await
    }

    /// Cancel in-flight effects and refuse further dispatches.
    pub fn shutdown(&self) {
        if !self.inner.shutdown.send_replace(true) {
            debug!(in_flight = self.in_flight(), "store shutting down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    pub(crate) fn inflight(&self) -> &Arc<InflightTracker> {
        &self.inner.inflight
    }

    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    fn cycle_held_by_current_thread(&self) -> bool {
        *lock(&self.inner.owner) == Some(thread::current().id())
    }

    fn run_cycle(
        &self,
        action: R::Action,
        correlation: CorrelationId,
        origin: Origin,
    ) -> Result<(), ReducerError> {
        let span = tracing::debug_span!(
            "dispatch",
            kind = ?action.kind(),
            correlation_id = %correlation,
        );
        let _entered = span.enter();

        let previous = self.state();
        let next = Arc::new(self.inner.reducer.reduce(&previous, &action)?);

        *write(&self.inner.current) = Arc::clone(&next);
        if origin == Origin::External {
            *lock(&self.inner.last_action) = Some(action.clone());
        }
        self.inner.projection.send_replace(Arc::clone(&next));
        debug!("state replaced");

        for observer in self.inner.subscribers.snapshot() {
            observer(&next);
        }

        for middleware in &self.inner.middleware {
            middleware.after_dispatch(self, &next, &action, correlation);
        }

        Ok(())
    }

    fn drain_deferred(&self) {
        loop {
            let next = lock(&self.inner.deferred).pop_front();
            let Some((action, correlation)) = next else {
                break;
            };

            let kind = action.kind();
            if self.is_shut_down() {
                debug!(
                    ?kind,
                    correlation_id = %correlation,
                    "store shut down, dropping queued dispatch"
                );
                continue;
            }

            if let Err(err) = self.run_cycle(action, correlation, Origin::Deferred) {
                warn!(
                    ?kind,
                    correlation_id = %correlation,
                    error = %err,
                    "deferred dispatch rejected"
                );
            }
        }
    }
}

impl<R> fmt::Debug for Store<R>
where
    R: Reducer,
    R::State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*read(&self.inner.current))
            .field("subscribers", &self.inner.subscribers.len())
            .field("middleware", &self.inner.middleware.len())
            .field("in_flight", &self.inner.inflight.in_flight())
            .finish()
    }
}

/// Where a dispatch came from. Only external dispatches update
/// `last_action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    External,
    FollowUp,
    Deferred,
}

/// Marks the current thread as the one running a dispatch cycle.
struct CycleOwner<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> CycleOwner<'a> {
    fn claim(slot: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock(slot) = Some(thread::current().id());
        Self { slot }
    }
}

impl Drop for CycleOwner<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

struct Subscribers<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Arc<Observer<S>>)>>,
}

impl<S> Subscribers<S> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    fn add(&self, observer: Arc<Observer<S>>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((id, observer));
        id
    }

    fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    // Notification iterates a copy so observers can (un)subscribe re-entrantly.
    fn snapshot(&self) -> Vec<Arc<Observer<S>>> {
        lock(&self.entries)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64) -> bool;
}

impl<S: Send + Sync + 'static> Detach for Subscribers<S> {
    fn detach(&self, id: u64) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }
}

/// Capability to remove a subscriber.
///
/// Dropping the handle keeps the subscriber attached for the life of the
/// store.
#[must_use = "dropping a Subscription leaves the observer attached forever"]
pub struct Subscription {
    id: u64,
    list: Weak<dyn Detach>,
}

impl Subscription {
    /// Detach the observer. Returns `false` if it was already gone or the
    /// store has been dropped.
    pub fn unsubscribe(self) -> bool {
        self.list
            .upgrade()
            .map(|list| list.detach(self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Builder for [`Store`].
pub struct StoreBuilder<R>
where
    R: Reducer,
    R::Action: Action,
{
    reducer: R,
    initial_state: R::State,
    config: StoreConfig,
    effects: Option<EffectRegistry<R::State, R::Action>>,
    middleware: Vec<Arc<dyn Middleware<R>>>,
    runtime: Option<Handle>,
}

impl<R> StoreBuilder<R>
where
    R: Reducer,
    R::State: State,
    R::Action: Action,
{
    pub fn new(reducer: R, initial_state: R::State) -> Self {
        Self {
            reducer,
            initial_state,
            config: StoreConfig::default(),
            effects: None,
            middleware: Vec::new(),
            runtime: None,
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Effects run after every other middleware.
    pub fn with_effects(mut self, registry: EffectRegistry<R::State, R::Action>) -> Self {
        self.effects = Some(registry);
        self
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware<R>>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Runtime that effect tasks are spawned on. Defaults to the runtime
    /// `build` is called from.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Store<R>, StoreError> {
        let mut middleware = self.middleware;

        if let Some(registry) = self.effects.filter(|registry| !registry.is_empty()) {
            let runtime = match self.runtime {
                Some(runtime) => runtime,
                None => Handle::try_current().map_err(|_| StoreError::NoRuntime)?,
            };
            debug!(effects = registry.len(), "registering effect middleware");
            middleware.push(Arc::new(EffectMiddleware::new(
                registry,
                runtime,
                self.config.effect_timeout(),
            )));
        }

        let initial = Arc::new(self.initial_state);
        let (projection, _) = watch::channel(Arc::clone(&initial));
        let (shutdown, _) = watch::channel(false);

        Ok(Store {
            inner: Arc::new(Inner {
                reducer: self.reducer,
                current: RwLock::new(initial),
                last_action: Mutex::new(None),
                cycle: Mutex::new(()),
                owner: Mutex::new(None),
                deferred: Mutex::new(VecDeque::new()),
                subscribers: Arc::new(Subscribers::new()),
                projection,
                middleware,
                inflight: Arc::new(InflightTracker::new()),
                shutdown,
            }),
        })
    }
}

// A panicking observer must not wedge the store, so poisoned locks are
// recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
