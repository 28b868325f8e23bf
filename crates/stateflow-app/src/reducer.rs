//! Root reducer.

use std::sync::Arc;

use stateflow::{Reducer, ReducerError};

use crate::action::AppAction;
use crate::home::HomeReducer;
use crate::navigation::NavigationReducer;
use crate::profile::ProfileReducer;
use crate::settings::SettingsReducer;
use crate::state::AppState;

/// Routes each action family to its sub-reducer and leaves every other
/// slice shared with the previous state.
pub struct AppReducer;

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;

    fn reduce(&self, state: &AppState, action: &AppAction) -> Result<AppState, ReducerError> {
        let mut next = state.clone();
        match action {
            AppAction::Home(action) => {
                next.home = replace(&state.home, HomeReducer.reduce(&state.home, action)?);
            }
            AppAction::Profile(action) => {
                next.profile =
                    replace(&state.profile, ProfileReducer.reduce(&state.profile, action)?);
            }
            AppAction::Settings(action) => {
                next.settings =
                    replace(&state.settings, SettingsReducer.reduce(&state.settings, action)?);
            }
            AppAction::Navigation(action) => {
                next.navigation = replace(
                    &state.navigation,
                    NavigationReducer.reduce(&state.navigation, action)?,
                );
            }
            AppAction::ExitApp => next = AppState::default(),
        }
        Ok(next)
    }
}

// Keep the old allocation when a sub-reducer passed the slice through.
fn replace<T: PartialEq>(previous: &Arc<T>, next: T) -> Arc<T> {
    if **previous == next {
        Arc::clone(previous)
    } else {
        Arc::new(next)
    }
}
