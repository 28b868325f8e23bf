//! Core traits and identifiers shared by every layer of the store.

use std::fmt::{self, Debug};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker trait for state trees held by a [`Store`](crate::Store).
///
/// States should be:
/// - Immutable (every transition produces a new value)
/// - Cheap to clone (share sub-trees through `Arc`)
/// - Comparable (PartialEq for detecting changes)
///
/// Auto-implemented for every type that satisfies the bounds.
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Tag types used to classify actions without runtime type introspection.
pub trait ActionTag: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> ActionTag for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

/// An immutable description of an intent or event.
///
/// Actions form a closed set. Each one reports a concrete [`Action::kind`]
/// and the [`Action::family`] it belongs to, so effects can subscribe to a
/// single variant, a whole family, or everything.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// enum CounterAction { Increment, Decrement, Reset }
///
/// impl Action for CounterAction {
///     type Kind = CounterAction;
///     type Family = ();
///
///     fn kind(&self) -> CounterAction { self.clone() }
///     fn family(&self) {}
/// }
/// ```
pub trait Action: Clone + Debug + Send + Sync + 'static {
    /// Tag naming the concrete variant.
    type Kind: ActionTag;

    /// Tag naming the super-kind ("any Home action").
    type Family: ActionTag;

    fn kind(&self) -> Self::Kind;

    fn family(&self) -> Self::Family;
}

/// Which actions an effect registration reacts to.
pub enum ActionFilter<A: Action> {
    /// Every action.
    Any,
    /// Every action of one family.
    Family(A::Family),
    /// Exactly one kind.
    Kind(A::Kind),
}

impl<A: Action> ActionFilter<A> {
    pub fn matches(&self, action: &A) -> bool {
        match self {
            ActionFilter::Any => true,
            ActionFilter::Family(family) => action.family() == *family,
            ActionFilter::Kind(kind) => action.kind() == *kind,
        }
    }
}

impl<A: Action> Clone for ActionFilter<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Action> Copy for ActionFilter<A> {}

impl<A: Action> Debug for ActionFilter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionFilter::Any => f.write_str("Any"),
            ActionFilter::Family(family) => f.debug_tuple("Family").field(family).finish(),
            ActionFilter::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
        }
    }
}

/// Identifier shared by an externally dispatched action and every follow-up
/// action its effects produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
