//! Navigation pre-checks.
//!
//! Both guards are synchronous and local: nothing is validated against the
//! backend before a route is allowed. An expired token is caught later, when
//! a request comes back 401.

use crate::navigator::{HOME_ROUTE, LOGIN_ROUTE};
use crate::storage::keys;
use crate::store::SessionStore;

const GUEST_ONLY_ROUTES: [&str; 2] = ["/login", "/register"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect {
        to: String,
        /// Where to go back after signing in.
        return_url: Option<String>,
    },
}

impl GuardDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Lets a route through only for a signed-in user.
#[derive(Clone)]
pub struct AuthGuard {
    session: SessionStore,
}

impl AuthGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Allow iff there is an in-memory session and storage still holds a
    /// token; otherwise redirect to `/login` with `path` as the return URL.
    #[must_use]
    pub fn check(&self, path: &str) -> GuardDecision {
        let token_stored = self
            .session
            .storage()
            .get(keys::AUTH_TOKEN)
            .ok()
            .flatten()
            .is_some_and(|t| !t.is_empty());

        if self.session.is_logged_in() && token_stored {
            return GuardDecision::Allow;
        }

        tracing::debug!(path, "route requires login");
        GuardDecision::Redirect {
            to: LOGIN_ROUTE.to_owned(),
            return_url: Some(path.to_owned()),
        }
    }
}

/// Keeps signed-in users off the login and registration pages.
#[derive(Clone)]
pub struct GuestGuard {
    session: SessionStore,
}

impl GuestGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn check(&self, path: &str) -> GuardDecision {
        let route = path.split(['?', '#']).next().unwrap_or(path);
        if self.session.is_logged_in() && GUEST_ONLY_ROUTES.contains(&route) {
            return GuardDecision::Redirect {
                to: HOME_ROUTE.to_owned(),
                return_url: None,
            };
        }
        GuardDecision::Allow
    }
}
