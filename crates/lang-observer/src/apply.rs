//! The full re-application pass over the live document.

use std::collections::HashMap;

use lang_observer_core::TranslationStore;
use lang_observer_dom::{DomDocument, DomElement};

use crate::config::ObserverConfig;

/// Re-scans every translatable element and pushes resolved strings into
/// the document.
///
/// The pass is idempotent: with an unchanged language and store, running
/// it again leaves the document byte-identical. Misses at every fallback
/// tier leave the existing content or attribute value untouched, and a
/// malformed attribute map skips only that element's attribute
/// translations for this pass.
pub(crate) fn apply_pass<D: DomDocument>(
    document: &D,
    store: &TranslationStore,
    config: &ObserverConfig,
    language: &str,
) {
    let elements = document.elements_with_attributes(&[
        config.text_attribute.as_str(),
        config.attr_map_attribute.as_str(),
    ]);
    tracing::trace!(language, elements = elements.len(), "applying translations");

    for element in elements {
        if let Some(key) = element.attribute(&config.text_attribute) {
            apply_text(&element, store, config, language, &key);
        }

        let Some(raw_map) = element.attribute(&config.attr_map_attribute) else {
            continue;
        };
        let map: HashMap<String, String> = match serde_json::from_str(&raw_map) {
            Ok(map) => map,
            Err(error) => {
                tracing::debug!(%error, "skipping malformed attribute translation map");
                continue;
            }
        };
        for (attribute, key) in &map {
            if let Some(text) =
                store.resolve_or_fallback(language, &config.fallback_language, key)
            {
                element.set_attribute(attribute, &text);
            }
        }
    }
}

fn apply_text<E: DomElement>(
    element: &E,
    store: &TranslationStore,
    config: &ObserverConfig,
    language: &str,
    key: &str,
) {
    let Some(text) = store.resolve_or_fallback(language, &config.fallback_language, key) else {
        return;
    };
    // Rewriting only text children keeps inline markup (icons etc.)
    // embedded alongside translatable text intact.
    if element.has_child_nodes() {
        element.rewrite_text_nodes(&text);
    } else {
        element.set_text_content(&text);
    }
}
