//! # Stateflow App
//!
//! The Home/Profile/Settings application built on the Stateflow store.
//!
//! ```text
//! AppState
//!   ├── home        counter, two independent fetch slots
//!   ├── profile     username, bio, loading flag
//!   ├── settings    dark mode, notifications
//!   └── navigation  current screen, parameter bag
//! ```
//!
//! Effects, in registration order:
//!
//! | Name            | Filter                     | Slice                |
//! |-----------------|----------------------------|----------------------|
//! | `logging`       | any action                 | whole state          |
//! | `fetch_data_1`  | `FetchData(Slot::One)`     | home                 |
//! | `fetch_data_2`  | `FetchData(Slot::Two)`     | home                 |
//! | `fetch_profile` | `FetchProfile`             | optional `userId`    |
//!
//! Every fetch ends in either its success or its failure action, so no
//! loading flag is left set.
//!
//! Presentation is out of scope: anything that reads [`AppStore::state`]
//! and calls [`AppStore::dispatch`] can drive it.

pub mod action;
pub mod bootstrap;
pub mod config;
pub mod effects;
pub mod home;
pub mod navigation;
pub mod profile;
pub mod reducer;
pub mod settings;
pub mod source;
pub mod state;

pub use action::{ActionFamily, ActionKind, AppAction};
pub use bootstrap::{app_store_builder, bootstrap, exit_requested, AppStore};
pub use config::AppConfig;
pub use home::{FetchSlot, HomeAction, HomeState, Slot};
pub use navigation::NavigationAction;
pub use profile::{ProfileAction, ProfileState};
pub use reducer::AppReducer;
pub use settings::{SettingsAction, SettingsState};
pub use source::{DataSource, Profile, SimulatedDataSource};
pub use state::{AppState, NavParam, NavigationState, Screen};
