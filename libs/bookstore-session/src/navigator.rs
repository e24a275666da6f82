use parking_lot::Mutex;

/// Route of the login page.
pub const LOGIN_ROUTE: &str = "/login";

/// Route of the storefront home page.
pub const HOME_ROUTE: &str = "/";

/// Whatever owns the current route.
///
/// The session store calls this when a backend response means the user has
/// to sign in again.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last navigation target.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.visited.lock().last().cloned()
    }

    /// Every navigation target, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.visited.lock().push(path.to_owned());
    }
}
