//! The closed set of application actions.

use stateflow::Action;

use crate::home::{HomeAction, Slot};
use crate::navigation::NavigationAction;
use crate::profile::ProfileAction;
use crate::settings::SettingsAction;

/// Every action the application can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Home(HomeAction),
    Profile(ProfileAction),
    Settings(SettingsAction),
    Navigation(NavigationAction),
    /// Reset everything to the initial state. The shell exits on this.
    ExitApp,
}

/// Super-kind of an action. Each family is handled by one sub-reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionFamily {
    Home,
    Profile,
    Settings,
    Navigation,
    Lifecycle,
}

/// Concrete kind of an action, payload stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Increment,
    Decrement,
    FetchData(Slot),
    DataFetched(Slot),
    FetchFailed(Slot),
    UpdateUsername,
    UpdateBio,
    FetchProfile,
    ProfileFetched,
    ProfileFetchFailed,
    ToggleDarkMode,
    ToggleNotifications,
    NavigateToProfile,
    NavigateToSettings,
    NavigateBack,
    ExitApp,
}

impl Action for AppAction {
    type Kind = ActionKind;
    type Family = ActionFamily;

    fn kind(&self) -> ActionKind {
        match self {
            AppAction::Home(action) => action.kind(),
            AppAction::Profile(action) => action.kind(),
            AppAction::Settings(action) => action.kind(),
            AppAction::Navigation(action) => action.kind(),
            AppAction::ExitApp => ActionKind::ExitApp,
        }
    }

    fn family(&self) -> ActionFamily {
        match self {
            AppAction::Home(_) => ActionFamily::Home,
            AppAction::Profile(_) => ActionFamily::Profile,
            AppAction::Settings(_) => ActionFamily::Settings,
            AppAction::Navigation(_) => ActionFamily::Navigation,
            AppAction::ExitApp => ActionFamily::Lifecycle,
        }
    }
}

impl From<HomeAction> for AppAction {
    fn from(action: HomeAction) -> Self {
        AppAction::Home(action)
    }
}

impl From<ProfileAction> for AppAction {
    fn from(action: ProfileAction) -> Self {
        AppAction::Profile(action)
    }
}

impl From<SettingsAction> for AppAction {
    fn from(action: SettingsAction) -> Self {
        AppAction::Settings(action)
    }
}

impl From<NavigationAction> for AppAction {
    fn from(action: NavigationAction) -> Self {
        AppAction::Navigation(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Screen;

    #[test]
    fn family_follows_the_wrapping_variant() {
        assert_eq!(AppAction::from(HomeAction::Increment).family(), ActionFamily::Home);
        assert_eq!(
            AppAction::from(ProfileAction::FetchProfile).family(),
            ActionFamily::Profile
        );
        assert_eq!(
            AppAction::from(SettingsAction::ToggleDarkMode).family(),
            ActionFamily::Settings
        );
        assert_eq!(
            AppAction::from(NavigationAction::NavigateBack).family(),
            ActionFamily::Navigation
        );
        assert_eq!(AppAction::ExitApp.family(), ActionFamily::Lifecycle);
    }

    #[test]
    fn kind_distinguishes_fetch_slots() {
        assert_eq!(
            AppAction::from(HomeAction::FetchData(Slot::One)).kind(),
            ActionKind::FetchData(Slot::One)
        );
        assert_ne!(
            AppAction::from(HomeAction::FetchData(Slot::One)).kind(),
            AppAction::from(HomeAction::FetchData(Slot::Two)).kind()
        );
    }

    #[test]
    fn actions_compare_by_value() {
        let a = AppAction::from(NavigationAction::NavigateToSettings {
            from_screen: Screen::Profile,
        });
        let b = AppAction::from(NavigationAction::NavigateToSettings {
            from_screen: Screen::Profile,
        });
        assert_eq!(a, b);
    }
}
