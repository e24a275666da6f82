#![allow(clippy::non_ascii_literal)]

use std::sync::Arc;

use bookstore_errors::{ErrorKind, catalog};
use bookstore_http::{ApiClient, ApiError, Envelope, HttpError, SecretString};
use http::StatusCode;
use tokio::sync::watch;

use crate::model::{AuthData, AuthOutcome, Credentials, RegisterForm, Session};
use crate::navigator::{LOGIN_ROUTE, Navigator};
use crate::storage::{KeyValueStore, keys};

pub const LOGIN_PATH: &str = "Account/Login";
pub const REGISTER_PATH: &str = "Account/Register";

pub const LOGIN_SUCCESS_MESSAGE: &str = "تم تسجيل الدخول بنجاح";
pub const REGISTER_SUCCESS_MESSAGE: &str = "تم إنشاء الحساب بنجاح";

/// Holds the signed-in user.
///
/// The in-memory session lives in a `watch` channel so views can follow
/// "is a user logged in" without polling. Every change is mirrored into
/// storage under `auth_token`, `user_id` and `user_email` in the same call;
/// the two are not updated atomically.
///
/// Clones share state.
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    state: Arc<watch::Sender<Option<Session>>>,
}

impl SessionStore {
    /// Create the store and rehydrate it from storage.
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(None);
        let store = Self {
            api,
            storage,
            state: Arc::new(state),
        };
        store.restore();
        store
    }

    /// Reload the in-memory session from storage.
    ///
    /// A stored token is enough to count as signed in; missing id or email
    /// are left empty.
    pub fn restore(&self) {
        let token = self.read(keys::AUTH_TOKEN);
        let session = token.map(|token| Session {
            id: self.read(keys::USER_ID).unwrap_or_default(),
            email: self.read(keys::USER_EMAIL).unwrap_or_default(),
            token: SecretString::new(token),
        });
        tracing::debug!(restored = session.is_some(), "session restored from storage");
        self.state.send_replace(session);
    }

    /// Current user, without touching the network.
    #[must_use]
    pub fn user(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Follow session changes. The receiver sees the current value first.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Sign in with email and password.
    pub async fn login(&self, credentials: &Credentials) -> AuthOutcome {
        tracing::info!("login attempt");
        let envelope = self
            .api
            .post_envelope::<Option<AuthData>, _>(LOGIN_PATH, credentials)
            .await;

        let data = match Self::unwrap_envelope(envelope) {
            Ok(data) => data.unwrap_or_default(),
            Err(message) => {
                tracing::info!("login rejected");
                return AuthOutcome::Failure { message };
            }
        };

        match self.establish(data, &credentials.email) {
            Some(session) => {
                tracing::info!(user_id = %session.id, "login succeeded");
                AuthOutcome::Success {
                    message: LOGIN_SUCCESS_MESSAGE.to_owned(),
                    session: Some(session),
                }
            }
            None => {
                tracing::warn!("login response carried no token");
                AuthOutcome::Failure {
                    message: catalog::UNEXPECTED.message.to_owned(),
                }
            }
        }
    }

    /// Create an account. Signs the user in when the response carries a
    /// token.
    pub async fn register(&self, form: &RegisterForm) -> AuthOutcome {
        tracing::info!("registration attempt");
        let envelope = self
            .api
            .post_envelope::<Option<AuthData>, _>(REGISTER_PATH, form)
            .await;

        match Self::unwrap_envelope(envelope) {
            Ok(data) => {
                let session = data.and_then(|data| self.establish(data, &form.email));
                tracing::info!(signed_in = session.is_some(), "registration succeeded");
                AuthOutcome::Success {
                    message: REGISTER_SUCCESS_MESSAGE.to_owned(),
                    session,
                }
            }
            Err(message) => AuthOutcome::Failure { message },
        }
    }

    /// Forget the user locally. The backend is not told.
    pub fn logout(&self) {
        for key in [keys::AUTH_TOKEN, keys::USER_ID, keys::USER_EMAIL] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear session key");
            }
        }
        self.state.send_replace(None);
        tracing::info!("logged out");
    }

    /// React to a failed backend call.
    ///
    /// 401 clears the session and sends the user to the login page; 403
    /// sends them there without clearing it. Returns whether navigation
    /// happened.
    pub fn handle_api_error(&self, err: &HttpError, navigator: &dyn Navigator) -> bool {
        match err.kind() {
            ErrorKind::Unauthenticated => {
                tracing::info!("backend rejected the session token");
                self.logout();
                navigator.navigate(LOGIN_ROUTE);
                true
            }
            ErrorKind::Forbidden => {
                navigator.navigate(LOGIN_ROUTE);
                true
            }
            _ => false,
        }
    }

    fn unwrap_envelope<T>(result: Result<Envelope<T>, HttpError>) -> Result<T, String> {
        match result {
            Ok(Envelope::Success { data, .. }) => Ok(data),
            Ok(Envelope::Failure(failure)) => {
                Err(ApiError::from_envelope(StatusCode::OK, failure)
                    .localized_message()
                    .to_owned())
            }
            Err(err) => {
                tracing::debug!(kind = %err.kind(), error = %err, "auth request failed");
                Err(err.user_message().to_owned())
            }
        }
    }

    fn establish(&self, data: AuthData, fallback_email: &str) -> Option<Session> {
        let token = data.token.filter(|t| !t.is_empty())?;
        let session = Session {
            id: data.id.unwrap_or_default(),
            email: data.email.unwrap_or_else(|| fallback_email.to_owned()),
            token,
        };

        for (key, value) in [
            (keys::AUTH_TOKEN, session.token.expose()),
            (keys::USER_ID, session.id.as_str()),
            (keys::USER_EMAIL, session.email.as_str()),
        ] {
            if let Err(e) = self.storage.set(key, value) {
                tracing::warn!(key, error = %e, "failed to persist session key");
            }
        }
        self.state.send_replace(Some(session.clone()));
        Some(session)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read session key");
                None
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::navigator::RecordingNavigator;
    use crate::storage::MemoryStore;
    use bookstore_http::HttpClient;
    use httpmock::prelude::*;
    use serde_json::json;

    fn store(server: &MockServer) -> (SessionStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let http = HttpClient::builder().allow_insecure_http().build().unwrap();
        let api = ApiClient::new(http, &server.url("/api")).unwrap();
        (SessionStore::new(api, storage.clone()), storage)
    }

    #[tokio::test]
    async fn login_stores_session_in_memory_and_storage() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/Account/Login")
                .json_body(json!({"email": "reader@example.com", "password": "pw"}));
            then.status(200).json_body(json!({
                "data": {"token": "tok-1", "id": 7, "email": "reader@example.com"},
                "succeeded": true,
                "message": "Login successful"
            }));
        });

        let (store, storage) = store(&server);
        let mut rx = store.subscribe();
        let outcome = store
            .login(&Credentials::new("reader@example.com", "pw"))
            .await;

        assert_eq!(outcome.message(), LOGIN_SUCCESS_MESSAGE);
        assert!(store.is_logged_in());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_some());

        let user = store.user().unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.token.expose(), "tok-1");
        assert_eq!(storage.get(keys::AUTH_TOKEN).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(storage.get(keys::USER_ID).unwrap().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn login_failure_is_an_outcome_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/Account/Login");
            then.status(400)
                .json_body(json!({"message": "Invalid email or password", "succeeded": false}));
        });

        let (store, storage) = store(&server);
        let outcome = store.login(&Credentials::new("x@example.com", "bad")).await;

        assert_eq!(
            outcome,
            AuthOutcome::Failure {
                message: "البريد الإلكتروني أو كلمة المرور غير صحيحة".to_owned()
            }
        );
        assert!(!store.is_logged_in());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn taken_username_is_reported_in_arabic() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/Account/Register");
            then.status(400)
                .json_body(json!({"message": "Username is already taken"}));
        });

        let (store, storage) = store(&server);
        let outcome = store
            .register(&RegisterForm {
                user_name: "sara".to_owned(),
                email: "sara@example.com".to_owned(),
                password: SecretString::new("pw"),
                confirm_password: SecretString::new("pw"),
            })
            .await;

        assert_eq!(
            outcome,
            AuthOutcome::Failure {
                message: "اسم المستخدم موجود بالفعل".to_owned()
            }
        );
        assert!(!store.is_logged_in());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn login_without_token_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/Account/Login");
            then.status(200)
                .json_body(json!({"data": {"id": 1}, "succeeded": true}));
        });

        let (store, _) = store(&server);
        let outcome = store.login(&Credentials::new("x@example.com", "pw")).await;

        assert_eq!(outcome.message(), catalog::UNEXPECTED.message);
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn register_without_token_succeeds_signed_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/Account/Register")
                .body_includes(r#""userName":"sara""#);
            then.status(200)
                .json_body(json!({"data": null, "succeeded": true}));
        });

        let (store, _) = store(&server);
        let outcome = store
            .register(&RegisterForm {
                user_name: "sara".to_owned(),
                email: "sara@example.com".to_owned(),
                password: SecretString::new("pw"),
                confirm_password: SecretString::new("pw"),
            })
            .await;

        assert_eq!(
            outcome,
            AuthOutcome::Success {
                message: REGISTER_SUCCESS_MESSAGE.to_owned(),
                session: None
            }
        );
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn register_with_token_signs_in_and_falls_back_to_form_email() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/Account/Register");
            then.status(200)
                .json_body(json!({"data": {"token": "fresh"}, "succeeded": true}));
        });

        let (store, _) = store(&server);
        let outcome = store
            .register(&RegisterForm {
                user_name: "omar".to_owned(),
                email: "omar@example.com".to_owned(),
                password: SecretString::new("pw"),
                confirm_password: SecretString::new("pw"),
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(store.user().unwrap().email, "omar@example.com");
    }

    #[tokio::test]
    async fn logout_then_user_is_none_and_token_is_gone() {
        let server = MockServer::start();
        let (store, storage) = store(&server);
        storage.set(keys::AUTH_TOKEN, "tok").unwrap();
        storage.set(keys::LANG, "en").unwrap();
        store.restore();
        assert!(store.is_logged_in());

        store.logout();

        assert!(store.user().is_none());
        assert_eq!(storage.get(keys::AUTH_TOKEN).unwrap(), None);
        assert_eq!(storage.get(keys::LANG).unwrap().as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/Orders");
            then.status(401);
        });

        let (store, storage) = store(&server);
        storage.set(keys::AUTH_TOKEN, "stale").unwrap();
        store.restore();

        let err = store
            .api
            .get_data::<serde_json::Value>("Orders")
            .await
            .unwrap_err();
        let nav = RecordingNavigator::new();

        assert!(store.handle_api_error(&err, &nav));
        assert_eq!(nav.current().as_deref(), Some(LOGIN_ROUTE));
        assert!(!store.is_logged_in());
        assert_eq!(storage.get(keys::AUTH_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn forbidden_redirects_but_keeps_session() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/Admin");
            then.status(403);
        });

        let (store, storage) = store(&server);
        storage.set(keys::AUTH_TOKEN, "tok").unwrap();
        store.restore();

        let err = store
            .api
            .get_data::<serde_json::Value>("Admin")
            .await
            .unwrap_err();
        let nav = RecordingNavigator::new();

        assert!(store.handle_api_error(&err, &nav));
        assert_eq!(nav.history(), vec![LOGIN_ROUTE.to_owned()]);
        assert!(store.is_logged_in());
    }

    #[tokio::test]
    async fn other_failures_do_not_navigate() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/Books");
            then.status(500);
        });

        let (store, _) = store(&server);
        let err = store
            .api
            .get_data::<serde_json::Value>("Books")
            .await
            .unwrap_err();
        let nav = RecordingNavigator::new();

        assert!(!store.handle_api_error(&err, &nav));
        assert!(nav.current().is_none());
    }
}
