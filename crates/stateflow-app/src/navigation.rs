use std::collections::BTreeMap;

use stateflow::{Reducer, ReducerError};

use crate::action::ActionKind;
use crate::state::{NavParam, NavigationState, Screen, FROM_SCREEN, USER_ID};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    NavigateToProfile { user_id: String },
    NavigateToSettings { from_screen: Screen },
    NavigateBack,
}

impl NavigationAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            NavigationAction::NavigateToProfile { .. } => ActionKind::NavigateToProfile,
            NavigationAction::NavigateToSettings { .. } => ActionKind::NavigateToSettings,
            NavigationAction::NavigateBack => ActionKind::NavigateBack,
        }
    }
}

/// Forward navigation replaces the parameter bag; back navigation moves to
/// the parent screen and clears it. Back from the root is a no-op.
pub struct NavigationReducer;

impl Reducer for NavigationReducer {
    type State = NavigationState;
    type Action = NavigationAction;

    fn reduce(
        &self,
        state: &NavigationState,
        action: &NavigationAction,
    ) -> Result<NavigationState, ReducerError> {
        Ok(match action {
            NavigationAction::NavigateToProfile { user_id } => NavigationState {
                current_screen: Screen::Profile,
                params: BTreeMap::from([(USER_ID.to_string(), NavParam::Text(user_id.clone()))]),
            },
            NavigationAction::NavigateToSettings { from_screen } => NavigationState {
                current_screen: Screen::Settings,
                params: BTreeMap::from([(
                    FROM_SCREEN.to_string(),
                    NavParam::Screen(*from_screen),
                )]),
            },
            NavigationAction::NavigateBack => match state.current_screen.parent() {
                Some(parent) => NavigationState {
                    current_screen: parent,
                    params: BTreeMap::new(),
                },
                None => state.clone(),
            },
        })
    }
}
