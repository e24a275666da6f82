use std::fmt;
use std::sync::Arc;

use bookstore_http::DEFAULT_LOCALE;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::{KeyValueStore, StorageError, keys};

/// Writing direction of the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Rtl,
    Ltr,
}

impl TextDirection {
    /// `rtl` for Arabic, `ltr` for everything else.
    #[must_use]
    pub fn for_language(lang: &str) -> Self {
        if lang.eq_ignore_ascii_case("ar") {
            Self::Rtl
        } else {
            Self::Ltr
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rtl => "rtl",
            Self::Ltr => "ltr",
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language tag plus the direction derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub lang: String,
    pub dir: TextDirection,
}

impl Locale {
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        let lang = lang.into();
        let dir = TextDirection::for_language(&lang);
        Self { lang, dir }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LocaleError {
    #[error("invalid language tag {0:?}")]
    InvalidTag(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Current language preference, persisted under `lang` and `dir`.
///
/// Changes only through [`set_language`](Self::set_language). The request
/// pipeline reads `lang` from storage, so a switch applies to the next
/// request without rebuilding the client.
#[derive(Clone)]
pub struct LocaleService {
    storage: Arc<dyn KeyValueStore>,
    state: Arc<watch::Sender<Locale>>,
}

impl LocaleService {
    /// Load the stored preference, or `default_lang` when none is stored or
    /// the stored tag is unusable.
    pub fn new(storage: Arc<dyn KeyValueStore>, default_lang: &str) -> Self {
        let stored = match storage.get(keys::LANG) {
            Ok(lang) => lang,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored language");
                None
            }
        };
        let lang = stored
            .and_then(|l| normalize_tag(&l))
            .or_else(|| normalize_tag(default_lang))
            .unwrap_or_else(|| DEFAULT_LOCALE.to_owned());
        let (state, _) = watch::channel(Locale::new(lang));
        Self {
            storage,
            state: Arc::new(state),
        }
    }

    #[must_use]
    pub fn current(&self) -> Locale {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn direction(&self) -> TextDirection {
        self.state.borrow().dir
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Locale> {
        self.state.subscribe()
    }

    /// Switch language and persist `lang` and `dir`.
    ///
    /// # Errors
    /// [`LocaleError::InvalidTag`] if `lang` cannot be sent as an
    /// `Accept-Language` value, or a storage error.
    pub fn set_language(&self, lang: &str) -> Result<Locale, LocaleError> {
        let tag = normalize_tag(lang).ok_or_else(|| LocaleError::InvalidTag(lang.to_owned()))?;
        let locale = Locale::new(tag);

        self.storage.set(keys::LANG, &locale.lang)?;
        self.storage.set(keys::DIR, locale.dir.as_str())?;
        tracing::info!(lang = %locale.lang, dir = %locale.dir, "language switched");

        self.state.send_replace(locale.clone());
        Ok(locale)
    }
}

/// Trimmed, lowercased tag. `None` when blank or not a valid header value.
fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim();
    let valid = !tag.is_empty() && http::HeaderValue::from_str(tag).is_ok();
    valid.then(|| tag.to_ascii_lowercase())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn arabic_is_rtl_everything_else_ltr() {
        assert_eq!(TextDirection::for_language("ar"), TextDirection::Rtl);
        assert_eq!(TextDirection::for_language("AR"), TextDirection::Rtl);
        assert_eq!(TextDirection::for_language("en"), TextDirection::Ltr);
        assert_eq!(TextDirection::for_language("fr"), TextDirection::Ltr);
        assert_eq!(TextDirection::for_language("ar-EG"), TextDirection::Ltr);
    }

    #[test]
    fn defaults_to_arabic() {
        let svc = LocaleService::new(Arc::new(MemoryStore::new()), "ar");
        assert_eq!(svc.current(), Locale::default());
        assert_eq!(svc.direction(), TextDirection::Rtl);
    }

    #[test]
    fn stored_language_wins_over_default() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::LANG, "en").unwrap();
        let svc = LocaleService::new(storage, "ar");
        assert_eq!(svc.current().lang, "en");
        assert_eq!(svc.direction(), TextDirection::Ltr);
    }

    #[test]
    fn set_language_persists_lang_and_dir() {
        let storage = Arc::new(MemoryStore::new());
        let svc = LocaleService::new(storage.clone(), "ar");
        let mut rx = svc.subscribe();

        let locale = svc.set_language(" EN ").unwrap();

        assert_eq!(locale, Locale::new("en"));
        assert_eq!(storage.get(keys::LANG).unwrap().as_deref(), Some("en"));
        assert_eq!(storage.get(keys::DIR).unwrap().as_deref(), Some("ltr"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().dir, TextDirection::Ltr);
    }

    #[test]
    fn rejects_tags_that_are_not_header_safe() {
        let svc = LocaleService::new(Arc::new(MemoryStore::new()), "ar");
        assert!(matches!(
            svc.set_language("en\r\nx: y"),
            Err(LocaleError::InvalidTag(_))
        ));
        assert!(matches!(svc.set_language(""), Err(LocaleError::InvalidTag(_))));
        assert_eq!(svc.current().lang, "ar");
    }

    #[test]
    fn any_header_safe_tag_other_than_arabic_is_ltr() {
        let storage = Arc::new(MemoryStore::new());
        let svc = LocaleService::new(storage.clone(), "ar");

        for tag in ["en_US", "zh_Hant", "x-klingon"] {
            let locale = svc.set_language(tag).unwrap();
            assert_eq!(locale.dir, TextDirection::Ltr, "{tag}");
            assert_eq!(storage.get(keys::DIR).unwrap().as_deref(), Some("ltr"));
        }
        assert_eq!(storage.get(keys::LANG).unwrap().as_deref(), Some("x-klingon"));

        assert_eq!(svc.set_language("ar").unwrap().dir, TextDirection::Rtl);
        assert_eq!(storage.get(keys::DIR).unwrap().as_deref(), Some("rtl"));
    }

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TextDirection::Rtl).unwrap(),
            "\"rtl\""
        );
    }
}
