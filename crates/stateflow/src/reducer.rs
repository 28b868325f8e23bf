//! Reducer trait.

use crate::error::ReducerError;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Action) -> State. It must not
/// perform I/O and must pass through actions outside its scope unchanged.
///
/// Reducers compose: a root reducer matches on the action family and hands
/// the matching slice to a sub-reducer that implements this same trait over
/// its own state and action types.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: Clone + Send + Sync + 'static;

    /// The action type this reducer handles.
    type Action: Send + Sync + 'static;

    /// Compute the next state.
    ///
    /// Returning an error leaves the current state untouched.
    fn reduce(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Self::State, ReducerError>;
}

impl<R: Reducer> Reducer for std::sync::Arc<R> {
    type State = R::State;
    type Action = R::Action;

    fn reduce(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Self::State, ReducerError> {
        (**self).reduce(state, action)
    }
}
