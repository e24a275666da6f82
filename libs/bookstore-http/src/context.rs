use crate::secret::SecretString;

/// Locale sent when none is stored.
pub const DEFAULT_LOCALE: &str = "ar";

/// Header carrying the session-correlation id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Source of per-request values for the header layers.
///
/// The client never reaches into global state: whoever builds the client
/// hands it an implementation of this trait, and the layers ask it on every
/// call. Reads must be cheap and non-blocking.
pub trait RequestContext: Send + Sync {
    /// Bearer token, if a user is signed in.
    fn bearer_token(&self) -> Option<SecretString>;

    /// Stored language tag. `None` means [`DEFAULT_LOCALE`].
    fn locale(&self) -> Option<String>;

    /// Stored session-correlation id.
    fn session_id(&self) -> Option<String>;
}

/// Context for anonymous clients: no token, default locale, no session id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl RequestContext for NoContext {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }

    fn locale(&self) -> Option<String> {
        None
    }

    fn session_id(&self) -> Option<String> {
        None
    }
}

/// Fixed-value context, handy for scripts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    pub token: Option<SecretString>,
    pub locale: Option<String>,
    pub session_id: Option<String>,
}

impl StaticContext {
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::new(token));
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }
}

impl RequestContext for StaticContext {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token.clone()
    }

    fn locale(&self) -> Option<String> {
        self.locale.clone()
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.clone()
    }
}
