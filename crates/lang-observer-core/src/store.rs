//! Shared, incrementally-populated translation store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dictionary::{Dictionary, Language};

/// A shared mapping from language identifier to translation dictionary.
///
/// The store is a cheap handle: cloning it yields another view of the same
/// underlying map, so a page-level host, the observer engine and any number
/// of loaders can all hold one. Dictionaries are only ever inserted or
/// replaced wholesale under their language key, never deleted or partially
/// updated, so concurrent loads for different languages cannot corrupt
/// each other.
#[derive(Debug, Clone, Default)]
pub struct TranslationStore {
    inner: Arc<RwLock<HashMap<Language, Dictionary>>>,
}

impl TranslationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with the given dictionaries.
    #[must_use]
    pub fn seed<I, L>(dictionaries: I) -> Self
    where
        I: IntoIterator<Item = (L, Dictionary)>,
        L: Into<Language>,
    {
        let store = Self::new();
        for (language, dictionary) in dictionaries {
            store.insert(language, dictionary);
        }
        store
    }

    /// Inserts the dictionary for a language, replacing any prior entry.
    pub fn insert(&self, language: impl Into<Language>, dictionary: Dictionary) {
        let language = language.into();
        tracing::debug!(
            language = %language,
            entries = dictionary.len(),
            "storing translation dictionary"
        );
        self.inner.write().insert(language, dictionary);
    }

    /// Whether a dictionary is loaded for the given language.
    #[must_use]
    pub fn contains(&self, language: &str) -> bool {
        self.inner.read().contains_key(language)
    }

    /// Whether the store holds no dictionaries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// All loaded language identifiers, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.inner.read().keys().cloned().collect();
        languages.sort_unstable();
        languages
    }

    /// Resolves a dotted path against one language's dictionary.
    #[must_use]
    pub fn resolve(&self, language: &str, path: &str) -> Option<String> {
        self.inner
            .read()
            .get(language)
            .and_then(|dictionary| dictionary.resolve(path))
            .map(str::to_owned)
    }

    /// Resolves a dotted path with the fallback chain.
    ///
    /// The active language is probed first; on a miss the fallback
    /// language is probed only when it differs from the active one.
    #[must_use]
    pub fn resolve_or_fallback(
        &self,
        language: &str,
        fallback: &str,
        path: &str,
    ) -> Option<String> {
        let map = self.inner.read();
        if let Some(text) = map.get(language).and_then(|dict| dict.resolve(path)) {
            return Some(text.to_owned());
        }
        if fallback != language {
            return map
                .get(fallback)
                .and_then(|dict| dict.resolve(path))
                .map(str::to_owned);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(value: serde_json::Value) -> Dictionary {
        Dictionary::try_from(value).expect("fixture must be an object")
    }

    #[test]
    fn seeded_store_resolves() {
        let store = TranslationStore::seed([
            ("ru", dict(json!({"nav": {"home": "Главная"}}))),
            ("en", dict(json!({"nav": {"home": "Home"}}))),
        ]);

        assert!(store.contains("ru"));
        assert!(store.contains("en"));
        assert_eq!(store.languages(), vec!["en".to_owned(), "ru".to_owned()]);
        assert_eq!(store.resolve("en", "nav.home"), Some("Home".to_owned()));
    }

    #[test]
    fn insert_replaces_wholesale() {
        let store = TranslationStore::new();
        store.insert("en", dict(json!({"nav": {"home": "Home", "about": "About"}})));
        store.insert("en", dict(json!({"nav": {"home": "Start"}})));

        assert_eq!(store.resolve("en", "nav.home"), Some("Start".to_owned()));
        assert_eq!(store.resolve("en", "nav.about"), None);
    }

    #[test]
    fn fallback_covers_missing_keys() {
        let store = TranslationStore::seed([
            ("ru", dict(json!({"nav": {"home": "Главная", "about": "О нас"}}))),
            ("en", dict(json!({"nav": {"home": "Home"}}))),
        ]);

        assert_eq!(
            store.resolve_or_fallback("en", "ru", "nav.home"),
            Some("Home".to_owned())
        );
        assert_eq!(
            store.resolve_or_fallback("en", "ru", "nav.about"),
            Some("О нас".to_owned())
        );
        assert_eq!(store.resolve_or_fallback("en", "ru", "nav.missing"), None);
    }

    #[test]
    fn fallback_probe_skipped_when_same_language() {
        let store =
            TranslationStore::seed([("ru", dict(json!({"nav": {"home": "Главная"}})))]);

        assert_eq!(
            store.resolve_or_fallback("ru", "ru", "nav.home"),
            Some("Главная".to_owned())
        );
        assert_eq!(store.resolve_or_fallback("ru", "ru", "nav.missing"), None);
    }

    #[test]
    fn unknown_language_resolves_to_none() {
        let store = TranslationStore::new();
        assert!(store.is_empty());
        assert_eq!(store.resolve("fr", "nav.home"), None);
        assert_eq!(store.resolve_or_fallback("fr", "ru", "nav.home"), None);
    }

    #[test]
    fn clones_share_the_same_map() {
        let store = TranslationStore::new();
        let view = store.clone();
        store.insert("fr", dict(json!({"nav": {"home": "Accueil"}})));

        assert_eq!(view.resolve("fr", "nav.home"), Some("Accueil".to_owned()));
    }
}
