use serde::Serialize;
use stateflow::{Reducer, ReducerError};

use crate::action::ActionKind;

/// One of the two independent fetch slots on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FetchSlot {
    pub data: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HomeState {
    pub counter: i64,
    pub fetch1: FetchSlot,
    pub fetch2: FetchSlot,
}

impl HomeState {
    pub fn slot(&self, slot: Slot) -> &FetchSlot {
        match slot {
            Slot::One => &self.fetch1,
            Slot::Two => &self.fetch2,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut FetchSlot {
        match slot {
            Slot::One => &mut self.fetch1,
            Slot::Two => &mut self.fetch2,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.fetch1.is_loading || self.fetch2.is_loading
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAction {
    Increment,
    Decrement,
    FetchData(Slot),
    DataFetched { slot: Slot, data: String },
    /// The fetch effect failed or timed out. Clears the loading flag.
    FetchFailed { slot: Slot, reason: String },
}

impl HomeAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            HomeAction::Increment => ActionKind::Increment,
            HomeAction::Decrement => ActionKind::Decrement,
            HomeAction::FetchData(slot) => ActionKind::FetchData(*slot),
            HomeAction::DataFetched { slot, .. } => ActionKind::DataFetched(*slot),
            HomeAction::FetchFailed { slot, .. } => ActionKind::FetchFailed(*slot),
        }
    }
}

pub struct HomeReducer;

impl Reducer for HomeReducer {
    type State = HomeState;
    type Action = HomeAction;

    fn reduce(&self, state: &HomeState, action: &HomeAction) -> Result<HomeState, ReducerError> {
        let mut next = state.clone();
        match action {
            HomeAction::Increment => {
                next.counter = state
                    .counter
                    .checked_add(1)
                    .ok_or(ReducerError::Overflow { field: "counter" })?;
            }
            HomeAction::Decrement => {
                next.counter = state
                    .counter
                    .checked_sub(1)
                    .ok_or(ReducerError::Overflow { field: "counter" })?;
            }
            HomeAction::FetchData(slot) => {
                *next.slot_mut(*slot) = FetchSlot {
                    data: None,
                    is_loading: true,
                    error: None,
                };
            }
            HomeAction::DataFetched { slot, data } => {
                *next.slot_mut(*slot) = FetchSlot {
                    data: Some(data.clone()),
                    is_loading: false,
                    error: None,
                };
            }
            HomeAction::FetchFailed { slot, reason } => {
                let target = next.slot_mut(*slot);
                target.is_loading = false;
                target.error = Some(reason.clone());
            }
        }
        Ok(next)
    }
}
