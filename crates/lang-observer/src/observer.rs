//! The localization engine: language state, determination, and the
//! reactive marker subscription.

use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use lang_observer_core::{Dictionary, Language, TranslationStore};
use lang_observer_dom::{ChangeRecord, DomDocument, WatchId};

use crate::apply::apply_pass;
use crate::config::ObserverConfig;

/// Options for [`LanguageObserver::init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Language to transition to. `None` leaves the observer untouched.
    pub language: Option<Language>,
}

/// Keeps the document's visible text and attributes synchronized with the
/// active language.
///
/// Construction registers exactly one subscription on the root's marker
/// attribute and performs one initial language determination. Every later
/// transition funnels through the same apply path, whether it comes from
/// an explicit call, an external marker mutation or a lazily arriving
/// dictionary, so a single code path produces all visible updates.
///
/// Dropping the observer (or calling [`dispose`](Self::dispose))
/// unregisters the subscription.
pub struct LanguageObserver<D: DomDocument + 'static> {
    inner: Arc<Inner<D>>,
    watch: WatchId,
}

struct Inner<D> {
    document: D,
    store: TranslationStore,
    config: ObserverConfig,
    language: RwLock<Language>,
}

impl<D: DomDocument + 'static> LanguageObserver<D> {
    /// Wires the marker subscription and performs the initial language
    /// determination and application.
    pub fn new(document: D, store: TranslationStore, config: ObserverConfig) -> Self {
        let language = RwLock::new(config.fallback_language.clone());
        let inner = Arc::new(Inner {
            document,
            store,
            config,
            language,
        });

        let weak: Weak<Inner<D>> = Arc::downgrade(&inner);
        let watch = inner.document.watch_root_attribute(
            &inner.config.marker_attribute,
            Arc::new(move |records: &[ChangeRecord]| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_marker_mutation(records);
                }
            }),
        );

        inner.check_initial_language();

        Self { inner, watch }
    }

    /// Rewrites the marker to the given language and transitions to it.
    ///
    /// With no language given this is a no-op.
    pub fn init(&self, options: InitOptions) {
        if let Some(language) = options.language {
            self.inner.write_marker(&language);
            self.inner.transition(&language);
        }
    }

    /// Transitions to the given language if its dictionary is loaded,
    /// otherwise to the fallback, then re-applies translations.
    pub fn load_language(&self, language: &str) {
        self.inner.transition(language);
    }

    /// Forces a full re-scan and re-application with the current state.
    ///
    /// Public re-entry point for hosts that mutated the document or the
    /// store directly.
    pub fn apply_translations(&self) {
        self.inner.apply();
    }

    /// Alias for [`apply_translations`](Self::apply_translations), kept
    /// for hosts that prefer the update-phrased name.
    pub fn update_translations(&self) {
        self.apply_translations();
    }

    /// Loads a dictionary through the caller's loader and merges it into
    /// the store under the given language key, replacing any prior entry.
    ///
    /// When the loaded language is still the active one, a full
    /// re-application runs immediately; otherwise the dictionary just
    /// waits in the store. Loader failures are swallowed: no retry, the
    /// store and the document stay untouched.
    pub async fn load_translations<F, Fut, E>(&self, language: &str, loader: F)
    where
        F: FnOnce(&str) -> Fut,
        Fut: Future<Output = Result<Dictionary, E>>,
        E: std::fmt::Display,
    {
        match loader(language).await {
            Ok(dictionary) => {
                self.inner.store.insert(language, dictionary);
                let still_active = self.inner.language.read().as_str() == language;
                if still_active {
                    self.inner.apply();
                }
            }
            Err(error) => {
                tracing::debug!(language, %error, "translation loader failed");
            }
        }
    }

    /// The currently active language.
    #[must_use]
    pub fn current_language(&self) -> Language {
        self.inner.language.read().clone()
    }

    /// The shared translation store this observer resolves against.
    #[must_use]
    pub fn store(&self) -> &TranslationStore {
        &self.inner.store
    }

    /// Detaches the marker subscription. Equivalent to dropping.
    pub fn dispose(self) {}
}

impl<D: DomDocument + 'static> Drop for LanguageObserver<D> {
    fn drop(&mut self) {
        self.inner.document.unwatch(self.watch);
    }
}

impl<D: DomDocument> Inner<D> {
    /// Initial determination: the URL query tier wins when it names a
    /// loaded language (and is reflected onto the marker), otherwise the
    /// marker tier decides.
    fn check_initial_language(&self) {
        if let Some(language) = self.language_from_query() {
            self.write_marker(&language);
            self.transition(&language);
            return;
        }
        let detected = self.language_from_marker();
        self.transition(&detected);
    }

    /// Marker-tier candidate: the suffix of the first root class carrying
    /// the marker prefix, demoted to the fallback when absent from the
    /// store.
    fn language_from_marker(&self) -> Language {
        let candidate = self
            .document
            .root_classes()
            .into_iter()
            .find_map(|class| {
                class
                    .strip_prefix(&self.config.marker_prefix)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| self.config.fallback_language.clone());

        if self.store.contains(&candidate) {
            candidate
        } else {
            self.config.fallback_language.clone()
        }
    }

    /// Query-tier candidate: honored only when its dictionary is already
    /// loaded.
    fn language_from_query(&self) -> Option<Language> {
        let candidate = self.document.query_param(&self.config.query_param)?;
        self.store.contains(&candidate).then_some(candidate)
    }

    /// Replaces all marker-prefixed root classes with the one for the
    /// given language.
    fn write_marker(&self, language: &str) {
        let mut classes: Vec<String> = self
            .document
            .root_classes()
            .into_iter()
            .filter(|class| !class.starts_with(&self.config.marker_prefix))
            .collect();
        classes.push(format!("{}{}", self.config.marker_prefix, language));
        self.document.set_root_classes(&classes);
    }

    /// Adopts the candidate if its dictionary is loaded, the fallback
    /// otherwise, then re-applies. The engine never ends on a language
    /// without data while the fallback is available.
    fn transition(&self, candidate: &str) {
        let next = if self.store.contains(candidate) {
            candidate.to_owned()
        } else {
            tracing::debug!(
                candidate,
                fallback = %self.config.fallback_language,
                "no dictionary for candidate language, falling back"
            );
            self.config.fallback_language.clone()
        };
        *self.language.write() = next;
        self.apply();
    }

    fn apply(&self) {
        let language = self.language.read().clone();
        apply_pass(&self.document, &self.store, &self.config, &language);
    }

    /// Reactive path: re-derive the marker-tier candidate per record and
    /// transition only on a change. The engine's own marker rewrite
    /// re-enters here with an identical candidate, so it cannot loop.
    fn on_marker_mutation(&self, records: &[ChangeRecord]) {
        for record in records {
            if record.attribute != self.config.marker_attribute {
                continue;
            }
            let candidate = self.language_from_marker();
            let current = self.language.read().clone();
            if candidate != current {
                self.transition(&candidate);
            }
        }
    }
}
