//! Effects and the registry that maps actions to them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use smallvec::SmallVec;

use crate::core::{Action, ActionFilter};
use crate::error::EffectError;

/// Effect executes side effects for matched actions.
///
/// An effect only sees the slice of state its registration selects, never
/// the whole tree. It may suspend (network, timers) and returns at most one
/// follow-up action, which is dispatched back into the store.
///
/// # Example
///
/// ```ignore
/// struct FetchEffect { client: reqwest::Client }
///
/// #[async_trait]
/// impl Effect<HomeState, AppAction> for FetchEffect {
///     async fn run(&self, _home: HomeState, _action: AppAction) -> Result<Option<AppAction>> {
///         let body = self.client.get(URL).send().await?.text().await?;
///         Ok(Some(AppAction::Fetched(body)))
///     }
/// }
/// ```
#[async_trait]
pub trait Effect<T, A>: Send + Sync + 'static
where
    T: Send + 'static,
    A: Action,
{
    async fn run(&self, slice: T, action: A) -> Result<Option<A>>;
}

#[async_trait]
impl<T, A, E> Effect<T, A> for Arc<E>
where
    T: Send + 'static,
    A: Action,
    E: Effect<T, A> + ?Sized,
{
    async fn run(&self, slice: T, action: A) -> Result<Option<A>> {
        (**self).run(slice, action).await
    }
}

/// A prepared effect invocation, ready to be spawned.
pub type EffectFuture<A> = BoxFuture<'static, Result<Option<A>>>;

type Invoke<S, A> = dyn Fn(&S, &A) -> Option<EffectFuture<A>> + Send + Sync;

/// Maps an effect failure to a follow-up action.
pub type FailureMapper<A> = dyn Fn(&EffectError, &A) -> Option<A> + Send + Sync;

/// One (effect, filter, selector) triple.
pub struct EffectRegistration<S, A: Action> {
    name: &'static str,
    filter: ActionFilter<A>,
    invoke: Box<Invoke<S, A>>,
    on_failure: Option<Arc<FailureMapper<A>>>,
    timeout: Option<Duration>,
}

impl<S, A> EffectRegistration<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Register `effect` for actions accepted by `filter`.
    ///
    /// `selector` picks the slice of state the effect receives. A selector
    /// returning `None` means the effect does not apply right now and the
    /// invocation is skipped.
    pub fn new<T, F, E>(name: &'static str, filter: ActionFilter<A>, selector: F, effect: E) -> Self
    where
        T: Send + 'static,
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
        E: Effect<T, A>,
    {
        let effect = Arc::new(effect);
        let invoke = move |state: &S, action: &A| -> Option<EffectFuture<A>> {
            let slice = selector(state)?;
            let effect = Arc::clone(&effect);
            let action = action.clone();
            Some(Box::pin(async move { effect.run(slice, action).await }))
        };

        Self {
            name,
            filter,
            invoke: Box::new(invoke),
            on_failure: None,
            timeout: None,
        }
    }

    /// Bound each invocation. Elapsed invocations count as failures.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Turn failures into a follow-up action instead of dropping them.
    pub fn on_failure<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&EffectError, &A) -> Option<A> + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(mapper));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn filter(&self) -> &ActionFilter<A> {
        &self.filter
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn failure_mapper(&self) -> Option<Arc<FailureMapper<A>>> {
        self.on_failure.clone()
    }

    /// Apply the selector and build the invocation. `None` on a selector miss.
    pub fn prepare(&self, state: &S, action: &A) -> Option<EffectFuture<A>> {
        (self.invoke)(state, action)
    }
}

impl<S, A: Action> fmt::Debug for EffectRegistration<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistration")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("timeout", &self.timeout)
            .field("maps_failures", &self.on_failure.is_some())
            .finish()
    }
}

type Bucket = SmallVec<[usize; 4]>;

/// Immutable, indexed set of effect registrations.
///
/// Built once at startup and shared read-only by every dispatch; lookups
/// need no synchronization.
pub struct EffectRegistry<S, A: Action> {
    registrations: Vec<EffectRegistration<S, A>>,
    any: Bucket,
    by_family: HashMap<A::Family, Bucket>,
    by_kind: HashMap<A::Kind, Bucket>,
}

impl<S, A> EffectRegistry<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    pub fn builder() -> EffectRegistryBuilder<S, A> {
        EffectRegistryBuilder {
            registrations: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::builder().build()
    }

    fn index(registrations: Vec<EffectRegistration<S, A>>) -> Self {
        let mut any = Bucket::new();
        let mut by_family: HashMap<A::Family, Bucket> = HashMap::new();
        let mut by_kind: HashMap<A::Kind, Bucket> = HashMap::new();

        for (idx, registration) in registrations.iter().enumerate() {
            match registration.filter {
                ActionFilter::Any => any.push(idx),
                ActionFilter::Family(family) => by_family.entry(family).or_default().push(idx),
                ActionFilter::Kind(kind) => by_kind.entry(kind).or_default().push(idx),
            }
        }

        Self {
            registrations,
            any,
            by_family,
            by_kind,
        }
    }

    /// Registrations whose filter accepts `action`, in registration order.
    pub fn matching(&self, action: &A) -> impl Iterator<Item = &EffectRegistration<S, A>> + '_ {
        let mut hits: SmallVec<[usize; 8]> = SmallVec::new();
        hits.extend_from_slice(&self.any);
        if let Some(bucket) = self.by_family.get(&action.family()) {
            hits.extend_from_slice(bucket);
        }
        if let Some(bucket) = self.by_kind.get(&action.kind()) {
            hits.extend_from_slice(bucket);
        }
        hits.sort_unstable();

        hits.into_iter().map(move |idx| &self.registrations[idx])
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectRegistration<S, A>> {
        self.registrations.iter()
    }
}

impl<S, A: Action> fmt::Debug for EffectRegistry<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.registrations.iter()).finish()
    }
}

/// Collects registrations before freezing them into an [`EffectRegistry`].
pub struct EffectRegistryBuilder<S, A: Action> {
    registrations: Vec<EffectRegistration<S, A>>,
}

impl<S, A> EffectRegistryBuilder<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    pub fn register(mut self, registration: EffectRegistration<S, A>) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Shorthand for `register(EffectRegistration::new(..))`.
    pub fn with_effect<T, F, E>(
        self,
        name: &'static str,
        filter: ActionFilter<A>,
        selector: F,
        effect: E,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
        E: Effect<T, A>,
    {
        self.register(EffectRegistration::new(name, filter, selector, effect))
    }

    pub fn build(self) -> EffectRegistry<S, A> {
        EffectRegistry::index(self.registrations)
    }
}
