//! # App Shell Demo
//!
//! Stands in for the presentation layer: bootstraps the store, clicks
//! through the same flow a user would, and prints each screen as it
//! changes. No UI toolkit - just dispatch and state reads.

use std::sync::Arc;

use anyhow::Result;
use stateflow_app::{
    bootstrap, exit_requested, AppAction, AppConfig, AppState, HomeAction, NavigationAction,
    ProfileAction, Screen, SettingsAction, SimulatedDataSource, Slot,
};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Rendering
// ============================================================================

fn render(state: &AppState) -> String {
    match state.current_screen() {
        Screen::Home => {
            let home = &state.home;
            let data = if home.is_loading() {
                "loading...".to_string()
            } else {
                format!(
                    "data 1: {} | data 2: {}",
                    home.fetch1.data.as_deref().unwrap_or("No data"),
                    home.fetch2.data.as_deref().unwrap_or("No data"),
                )
            };
            format!("[Home] counter: {} | {}", home.counter, data)
        }
        Screen::Profile => format!(
            "[Profile] user: {} | username: {} | bio: {}",
            state.navigation.user_id().unwrap_or("Unknown User"),
            state.profile.username,
            state.profile.bio,
        ),
        Screen::Settings => format!(
            "[Settings] from: {:?} | dark mode: {} | notifications: {}",
            state.navigation.from_screen(),
            if state.settings.is_dark_mode { "On" } else { "Off" },
            if state.settings.notifications_enabled {
                "Enabled"
            } else {
                "Disabled"
            },
        ),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let source = Arc::new(SimulatedDataSource::from_config(&config));
    let store = bootstrap(&config, source)?;

    let _screen = store.subscribe(|state| println!("{}", render(state)));

    // Home: bump the counter, then fetch both slots at once
    store.dispatch(HomeAction::Increment.into())?;
    store.dispatch(HomeAction::Increment.into())?;
    store.dispatch(HomeAction::Decrement.into())?;
    store.dispatch(HomeAction::FetchData(Slot::One).into())?;
    store.dispatch(HomeAction::FetchData(Slot::Two).into())?;
    store.settled().await;

    // Profile: navigate with a user id and load it
    store.dispatch(
        NavigationAction::NavigateToProfile {
            user_id: "myUserId".to_string(),
        }
        .into(),
    )?;
    store.dispatch(ProfileAction::FetchProfile.into())?;
    store.settled().await;

    // Settings and back out
    store.dispatch(
        NavigationAction::NavigateToSettings {
            from_screen: Screen::Profile,
        }
        .into(),
    )?;
    store.dispatch(SettingsAction::ToggleDarkMode.into())?;
    store.dispatch(NavigationAction::NavigateBack.into())?;
    store.dispatch(NavigationAction::NavigateBack.into())?;

    println!("Final state:\n{}", serde_json::to_string_pretty(&*store.state())?);

    store.dispatch(AppAction::ExitApp)?;
    if exit_requested(&store) {
        println!("Exit requested, shutting down");
    }
    store.settled().await;
    store.shutdown();

    Ok(())
}
