use serde::Serialize;
use stateflow::{Reducer, ReducerError};

use crate::action::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProfileState {
    pub username: String,
    pub bio: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    UpdateUsername(String),
    UpdateBio(String),
    FetchProfile,
    ProfileFetched { username: String, bio: String },
    ProfileFetchFailed { reason: String },
}

impl ProfileAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            ProfileAction::UpdateUsername(_) => ActionKind::UpdateUsername,
            ProfileAction::UpdateBio(_) => ActionKind::UpdateBio,
            ProfileAction::FetchProfile => ActionKind::FetchProfile,
            ProfileAction::ProfileFetched { .. } => ActionKind::ProfileFetched,
            ProfileAction::ProfileFetchFailed { .. } => ActionKind::ProfileFetchFailed,
        }
    }
}

pub struct ProfileReducer;

impl Reducer for ProfileReducer {
    type State = ProfileState;
    type Action = ProfileAction;

    fn reduce(
        &self,
        state: &ProfileState,
        action: &ProfileAction,
    ) -> Result<ProfileState, ReducerError> {
        let mut next = state.clone();
        match action {
            ProfileAction::UpdateUsername(username) => next.username = username.clone(),
            ProfileAction::UpdateBio(bio) => next.bio = bio.clone(),
            ProfileAction::FetchProfile => {
                next.is_loading = true;
                next.error = None;
            }
            ProfileAction::ProfileFetched { username, bio } => {
                next.username = username.clone();
                next.bio = bio.clone();
                next.is_loading = false;
                next.error = None;
            }
            ProfileAction::ProfileFetchFailed { reason } => {
                next.is_loading = false;
                next.error = Some(reason.clone());
            }
        }
        Ok(next)
    }
}
