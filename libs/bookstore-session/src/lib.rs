//! Client-side session for the bookstore storefront
//!
//! - [`storage`]: key/value persistence (in memory or one JSON file)
//! - [`SessionContext`]: the request context the HTTP pipeline reads
//! - [`SessionStore`]: login, registration, logout and the observable
//!   signed-in state
//! - [`LocaleService`]: language preference and text direction
//! - [`AuthGuard`] / [`GuestGuard`]: route pre-checks
//! - [`Storefront`]: all of the above wired over one storage
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod context;
mod guard;
mod locale;
mod model;
mod navigator;
pub mod storage;
mod store;
mod storefront;

pub use context::SessionContext;
pub use guard::{AuthGuard, GuardDecision, GuestGuard};
pub use locale::{Locale, LocaleError, LocaleService, TextDirection};
pub use model::{AuthOutcome, Credentials, RegisterForm, Session};
pub use navigator::{HOME_ROUTE, LOGIN_ROUTE, Navigator, RecordingNavigator};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{
    LOGIN_PATH, LOGIN_SUCCESS_MESSAGE, REGISTER_PATH, REGISTER_SUCCESS_MESSAGE, SessionStore,
};
pub use storefront::Storefront;
