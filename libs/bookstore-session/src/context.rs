use std::sync::Arc;

use bookstore_http::{RequestContext, SecretString};

use crate::storage::{KeyValueStore, StorageError, keys};

/// Request context read straight from storage.
///
/// This is what the client's header layers see. It holds no state of its
/// own: a login, logout or language switch written to the shared storage
/// shows up on the very next request.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Stored session-correlation id, creating a random one on first use.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the id cannot be read or saved.
    pub fn ensure_session_id(&self) -> Result<String, StorageError> {
        if let Some(id) = self.storage.get(keys::SESSION_ID)?.filter(|id| !id.is_empty()) {
            return Ok(id);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.storage.set(keys::SESSION_ID, &id)?;
        tracing::debug!(session_id = %id, "created session-correlation id");
        Ok(id)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed; treating key as absent");
                None
            }
        }
    }
}

impl RequestContext for SessionContext {
    fn bearer_token(&self) -> Option<SecretString> {
        self.read(keys::AUTH_TOKEN).map(SecretString::new)
    }

    fn locale(&self) -> Option<String> {
        self.read(keys::LANG)
    }

    fn session_id(&self) -> Option<String> {
        self.read(keys::SESSION_ID)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn reads_pipeline_values_from_storage() {
        let storage = Arc::new(MemoryStore::new());
        let ctx = SessionContext::new(storage.clone());
        assert!(ctx.bearer_token().is_none());
        assert!(ctx.locale().is_none());

        storage.set(keys::AUTH_TOKEN, "tok").unwrap();
        storage.set(keys::LANG, "en").unwrap();
        storage.set(keys::SESSION_ID, "s-1").unwrap();

        assert_eq!(ctx.bearer_token().unwrap().expose(), "tok");
        assert_eq!(ctx.locale().as_deref(), Some("en"));
        assert_eq!(ctx.session_id().as_deref(), Some("s-1"));
    }

    #[test]
    fn empty_values_count_as_absent() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::AUTH_TOKEN, "").unwrap();
        let ctx = SessionContext::new(storage);
        assert!(ctx.bearer_token().is_none());
    }

    #[test]
    fn ensure_session_id_is_stable() {
        let storage = Arc::new(MemoryStore::new());
        let ctx = SessionContext::new(storage.clone());

        let first = ctx.ensure_session_id().unwrap();
        let second = ctx.ensure_session_id().unwrap();

        assert_eq!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
        assert_eq!(storage.get(keys::SESSION_ID).unwrap(), Some(first));
    }
}
