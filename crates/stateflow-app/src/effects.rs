//! Side effects of the application and their registrations.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use stateflow::{Action, ActionFilter, Effect, EffectRegistration, EffectRegistry};
use tracing::info;

use crate::action::{ActionKind, AppAction};
use crate::home::{HomeAction, HomeState, Slot};
use crate::profile::ProfileAction;
use crate::source::DataSource;
use crate::state::AppState;

/// Logs every dispatched action. Never produces a follow-up.
pub struct LoggingEffect;

#[async_trait]
impl Effect<AppState, AppAction> for LoggingEffect {
    async fn run(&self, state: AppState, action: AppAction) -> Result<Option<AppAction>> {
        info!(
            kind = ?action.kind(),
            screen = ?state.current_screen(),
            ?action,
            "action dispatched"
        );
        Ok(None)
    }
}

/// Loads one home-screen slot and reports it with `DataFetched`.
pub struct FetchDataEffect {
    slot: Slot,
    source: Arc<dyn DataSource>,
}

impl FetchDataEffect {
    pub fn new(slot: Slot, source: Arc<dyn DataSource>) -> Self {
        Self { slot, source }
    }
}

#[async_trait]
impl Effect<Arc<HomeState>, AppAction> for FetchDataEffect {
    async fn run(&self, _home: Arc<HomeState>, _action: AppAction) -> Result<Option<AppAction>> {
        let data = self
            .source
            .fetch_data(self.slot)
            .await
            .with_context(|| format!("fetch slot {}", self.slot.number()))?;

        Ok(Some(
            HomeAction::DataFetched {
                slot: self.slot,
                data,
            }
            .into(),
        ))
    }
}

/// Loads the profile of the user named in the navigation parameters.
///
/// Without a `userId` parameter the fetch fails, so the loading flag set by
/// `FetchProfile` is always cleared by either `ProfileFetched` or
/// `ProfileFetchFailed`.
pub struct FetchProfileEffect {
    source: Arc<dyn DataSource>,
}

impl FetchProfileEffect {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Effect<Option<String>, AppAction> for FetchProfileEffect {
    async fn run(&self, user_id: Option<String>, _action: AppAction) -> Result<Option<AppAction>> {
        let Some(user_id) = user_id else {
            bail!("no user selected");
        };

        let profile = self
            .source
            .fetch_profile(&user_id)
            .await
            .with_context(|| format!("fetch profile {user_id}"))?;

        Ok(Some(
            ProfileAction::ProfileFetched {
                username: profile.username,
                bio: profile.bio,
            }
            .into(),
        ))
    }
}

fn fetch_registration(
    slot: Slot,
    source: Arc<dyn DataSource>,
) -> EffectRegistration<AppState, AppAction> {
    let name = match slot {
        Slot::One => "fetch_data_1",
        Slot::Two => "fetch_data_2",
    };

    EffectRegistration::new(
        name,
        ActionFilter::Kind(ActionKind::FetchData(slot)),
        |state: &AppState| Some(Arc::clone(&state.home)),
        FetchDataEffect::new(slot, source),
    )
    .on_failure(move |err, _trigger| {
        Some(
            HomeAction::FetchFailed {
                slot,
                reason: err.to_string(),
            }
            .into(),
        )
    })
}

/// The application's effect set, in registration order: logging, both
/// fetch slots, then the profile fetch.
///
/// The profile fetch reads the `userId` navigation parameter and reports a
/// failure when it is absent.
pub fn effect_registry(source: Arc<dyn DataSource>) -> EffectRegistry<AppState, AppAction> {
    EffectRegistry::builder()
        .with_effect(
            "logging",
            ActionFilter::Any,
            |state: &AppState| Some(state.clone()),
            LoggingEffect,
        )
        .register(fetch_registration(Slot::One, Arc::clone(&source)))
        .register(fetch_registration(Slot::Two, Arc::clone(&source)))
        .register(
            EffectRegistration::new(
                "fetch_profile",
                ActionFilter::Kind(ActionKind::FetchProfile),
                |state: &AppState| Some(state.navigation.user_id().map(str::to_owned)),
                FetchProfileEffect::new(source),
            )
            .on_failure(|err, _trigger| {
                Some(
                    ProfileAction::ProfileFetchFailed {
                        reason: err.to_string(),
                    }
                    .into(),
                )
            }),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SimulatedDataSource;

    fn names(action: AppAction) -> Vec<&'static str> {
        let registry = effect_registry(Arc::new(SimulatedDataSource::default()));
        registry.matching(&action).map(|r| r.name()).collect()
    }

    #[test]
    fn logging_sees_every_action() {
        assert_eq!(names(AppAction::ExitApp), vec!["logging"]);
        assert_eq!(names(HomeAction::Increment.into()), vec!["logging"]);
    }

    #[test]
    fn fetch_effects_are_keyed_by_slot() {
        assert_eq!(
            names(HomeAction::FetchData(Slot::One).into()),
            vec!["logging", "fetch_data_1"]
        );
        assert_eq!(
            names(HomeAction::FetchData(Slot::Two).into()),
            vec!["logging", "fetch_data_2"]
        );
    }

    #[test]
    fn profile_fetch_runs_even_without_a_user_id() {
        let registry = effect_registry(Arc::new(SimulatedDataSource::default()));
        let action: AppAction = ProfileAction::FetchProfile.into();
        let profile = registry
            .matching(&action)
            .find(|r| r.name() == "fetch_profile")
            .expect("registered");

        assert!(profile.prepare(&AppState::default(), &action).is_some());
    }

    #[tokio::test]
    async fn profile_fetch_without_user_fails() {
        let effect = FetchProfileEffect::new(Arc::new(SimulatedDataSource::default()));
        let err = effect
            .run(None, ProfileAction::FetchProfile.into())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no user selected");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_effect_reports_the_slot_value() {
        let effect = FetchDataEffect::new(Slot::Two, Arc::new(SimulatedDataSource::default()));
        let result = effect
            .run(Arc::new(HomeState::default()), HomeAction::FetchData(Slot::Two).into())
            .await
            .unwrap();

        assert_eq!(
            result,
            Some(AppAction::from(HomeAction::DataFetched {
                slot: Slot::Two,
                data: "Fetched data 2".into(),
            }))
        );
    }
}
