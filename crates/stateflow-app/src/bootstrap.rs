//! Explicit construction of the application store.

use std::sync::Arc;

use stateflow::{Store, StoreBuilder, StoreError};
use tracing::info;

use crate::action::AppAction;
use crate::config::AppConfig;
use crate::effects::effect_registry;
use crate::reducer::AppReducer;
use crate::source::DataSource;
use crate::state::AppState;

pub type AppStore = Store<AppReducer>;

/// Builder with the application's reducer, initial state, config and
/// effects already applied. Callers may still attach middleware or pick a
/// runtime before building.
pub fn app_store_builder(
    config: &AppConfig,
    source: Arc<dyn DataSource>,
) -> StoreBuilder<AppReducer> {
    Store::builder(AppReducer, AppState::default())
        .with_config(config.store_config())
        .with_effects(effect_registry(source))
}

/// Build the store on the current tokio runtime.
pub fn bootstrap(config: &AppConfig, source: Arc<dyn DataSource>) -> Result<AppStore, StoreError> {
    let store = app_store_builder(config, source).build()?;
    info!(timeout_ms = ?config.effect_timeout_ms, "application store ready");
    Ok(store)
}

/// Whether the last externally dispatched action asked the application to
/// exit. Effect follow-ups that land afterwards do not clear it.
pub fn exit_requested(store: &AppStore) -> bool {
    matches!(store.last_action(), Some(AppAction::ExitApp))
}
