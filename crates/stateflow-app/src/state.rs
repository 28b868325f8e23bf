//! The application state tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::home::HomeState;
use crate::profile::ProfileState;
use crate::settings::SettingsState;

/// Root of the state tree.
///
/// Sub-states sit behind `Arc` so a transition that touches one family
/// shares the others with the previous root instead of copying them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AppState {
    pub home: Arc<HomeState>,
    pub profile: Arc<ProfileState>,
    pub settings: Arc<SettingsState>,
    pub navigation: Arc<NavigationState>,
}

impl AppState {
    pub fn current_screen(&self) -> Screen {
        self.navigation.current_screen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Screen {
    #[default]
    Home,
    Profile,
    Settings,
}

impl Screen {
    /// Screen that back navigation returns to. `None` for the root.
    pub fn parent(self) -> Option<Screen> {
        match self {
            Screen::Home => None,
            Screen::Profile => Some(Screen::Home),
            Screen::Settings => Some(Screen::Profile),
        }
    }
}

/// A value in the navigation parameter bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NavParam {
    Text(String),
    Screen(Screen),
}

pub const USER_ID: &str = "userId";
pub const FROM_SCREEN: &str = "fromScreen";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NavigationState {
    pub current_screen: Screen,
    pub params: BTreeMap<String, NavParam>,
}

impl NavigationState {
    pub fn user_id(&self) -> Option<&str> {
        match self.params.get(USER_ID) {
            Some(NavParam::Text(id)) => Some(id),
            _ => None,
        }
    }

    pub fn from_screen(&self) -> Option<Screen> {
        match self.params.get(FROM_SCREEN) {
            Some(NavParam::Screen(screen)) => Some(*screen),
            _ => None,
        }
    }
}
