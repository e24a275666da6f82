use std::sync::Arc;

use bookstore_http::{ApiClient, HttpClientBuilder, HttpError};

use crate::context::SessionContext;
use crate::guard::{AuthGuard, GuestGuard};
use crate::locale::LocaleService;
use crate::storage::KeyValueStore;
use crate::store::SessionStore;

/// Everything the storefront needs, wired over one storage.
///
/// The HTTP client reads its headers through a [`SessionContext`] on the
/// same storage the session and locale services write to.
#[derive(Clone)]
pub struct Storefront {
    pub context: SessionContext,
    pub api: ApiClient,
    pub session: SessionStore,
    pub locale: LocaleService,
}

impl Storefront {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or `base_url` is
    /// not absolute.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        http: HttpClientBuilder,
        base_url: &str,
        default_lang: &str,
    ) -> Result<Self, HttpError> {
        let context = SessionContext::new(Arc::clone(&storage));
        let client = http.request_context(Arc::new(context.clone())).build()?;
        let api = ApiClient::new(client, base_url)?;
        let session = SessionStore::new(api.clone(), Arc::clone(&storage));
        let locale = LocaleService::new(storage, default_lang);

        tracing::debug!(
            base_url = %api.base_url(),
            logged_in = session.is_logged_in(),
            lang = %locale.current().lang,
            "storefront session ready"
        );

        Ok(Self {
            context,
            api,
            session,
            locale,
        })
    }

    #[must_use]
    pub fn auth_guard(&self) -> AuthGuard {
        AuthGuard::new(self.session.clone())
    }

    #[must_use]
    pub fn guest_guard(&self) -> GuestGuard {
        GuestGuard::new(self.session.clone())
    }
}
