use serde::Serialize;
use stateflow::{Reducer, ReducerError};

use crate::action::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsState {
    pub is_dark_mode: bool,
    pub notifications_enabled: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            is_dark_mode: false,
            notifications_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    ToggleDarkMode,
    ToggleNotifications,
}

impl SettingsAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            SettingsAction::ToggleDarkMode => ActionKind::ToggleDarkMode,
            SettingsAction::ToggleNotifications => ActionKind::ToggleNotifications,
        }
    }
}

pub struct SettingsReducer;

impl Reducer for SettingsReducer {
    type State = SettingsState;
    type Action = SettingsAction;

    fn reduce(
        &self,
        state: &SettingsState,
        action: &SettingsAction,
    ) -> Result<SettingsState, ReducerError> {
        Ok(match action {
            SettingsAction::ToggleDarkMode => SettingsState {
                is_dark_mode: !state.is_dark_mode,
                ..state.clone()
            },
            SettingsAction::ToggleNotifications => SettingsState {
                notifications_enabled: !state.notifications_enabled,
                ..state.clone()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_one_flag() {
        let state = SettingsState::default();
        let dark = SettingsReducer
            .reduce(&state, &SettingsAction::ToggleDarkMode)
            .unwrap();
        assert!(dark.is_dark_mode);
        assert!(dark.notifications_enabled);

        let quiet = SettingsReducer
            .reduce(&dark, &SettingsAction::ToggleNotifications)
            .unwrap();
        assert!(quiet.is_dark_mode);
        assert!(!quiet.notifications_enabled);
    }

    #[test]
    fn double_toggle_restores() {
        let state = SettingsState::default();
        let once = SettingsReducer
            .reduce(&state, &SettingsAction::ToggleDarkMode)
            .unwrap();
        let twice = SettingsReducer
            .reduce(&once, &SettingsAction::ToggleDarkMode)
            .unwrap();
        assert_eq!(twice, state);
    }
}
