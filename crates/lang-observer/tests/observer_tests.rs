use futures::executor::block_on;
use lang_observer::dom::{DomDocument, DomElement, MemoryDocument, MemoryElement};
use lang_observer::{Dictionary, InitOptions, LanguageObserver, ObserverConfig, TranslationStore};
use serde_json::json;

fn dict(value: serde_json::Value) -> Dictionary {
    Dictionary::try_from(value).expect("fixture must be an object")
}

fn nav_store() -> TranslationStore {
    TranslationStore::seed([
        ("ru", dict(json!({"nav": {"home": "Главная", "about": "О нас"}}))),
        ("en", dict(json!({"nav": {"home": "Home"}}))),
    ])
}

fn text_element(document: &MemoryDocument, key: &str) -> MemoryElement {
    let element = document.create_element("span");
    element.set_attribute("data-i18n", key);
    element
}

fn observe(document: &MemoryDocument, store: TranslationStore) -> LanguageObserver<MemoryDocument> {
    LanguageObserver::new(document.clone(), store, ObserverConfig::default())
}

#[test]
fn initial_detection_from_marker() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");

    let observer = observe(&document, nav_store());

    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "Home");
}

#[test]
fn external_marker_change_retriggers_application() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());
    assert_eq!(span.text_content(), "Home");

    // A page-level locale switcher flips the marker; no engine call.
    document.set_root_classes(&["locale-ru".to_owned()]);

    assert_eq!(observer.current_language(), "ru");
    assert_eq!(span.text_content(), "Главная");
}

#[test]
fn absent_marker_uses_fallback_language() {
    let document = MemoryDocument::new();
    let span = text_element(&document, "nav.home");

    let observer = observe(&document, nav_store());

    assert_eq!(observer.current_language(), "ru");
    assert_eq!(span.text_content(), "Главная");
}

#[test]
fn marker_for_unloaded_language_falls_back() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-de");
    let span = text_element(&document, "nav.home");

    let observer = observe(&document, nav_store());

    assert_eq!(observer.current_language(), "ru");
    assert_eq!(span.text_content(), "Главная");
}

#[test]
fn query_param_beats_marker_and_rewrites_it() {
    let document = MemoryDocument::new();
    document.add_root_class("dark");
    document.add_root_class("locale-ru");
    document.set_query_param("land-geo", "en");
    let span = text_element(&document, "nav.home");

    let observer = observe(&document, nav_store());

    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "Home");
    let classes = document.root_classes();
    assert!(classes.contains(&"locale-en".to_owned()));
    assert!(!classes.contains(&"locale-ru".to_owned()));
    assert!(classes.contains(&"dark".to_owned()), "non-marker classes survive");
}

#[test]
fn query_param_for_unloaded_language_is_ignored() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    document.set_query_param("land-geo", "fr");
    let span = text_element(&document, "nav.home");

    let observer = observe(&document, nav_store());

    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "Home");
    assert!(document.root_classes().contains(&"locale-en".to_owned()));
}

#[test]
fn attribute_map_translates_named_attributes() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let link = document.create_element("a");
    link.set_attribute("data-i18n-attr", r#"{"title":"nav.home"}"#);

    let _observer = observe(&document, nav_store());

    assert_eq!(link.attribute("title"), Some("Home".to_owned()));
}

#[test]
fn malformed_attribute_map_skips_attributes_only() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let link = document.create_element("a");
    link.set_attribute("data-i18n", "nav.home");
    link.set_attribute("data-i18n-attr", "{not json");
    link.set_attribute("title", "untouched");

    let _observer = observe(&document, nav_store());

    assert_eq!(link.text_content(), "Home");
    assert_eq!(link.attribute("title"), Some("untouched".to_owned()));
}

#[test]
fn unresolved_keys_leave_existing_content() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = document.create_element("span");
    span.set_attribute("data-i18n", "nav.missing");
    span.append_text("placeholder");
    let link = document.create_element("a");
    link.set_attribute("data-i18n-attr", r#"{"title":"nav.missing"}"#);
    link.set_attribute("title", "kept");

    let _observer = observe(&document, nav_store());

    assert_eq!(span.text_content(), "placeholder");
    assert_eq!(link.attribute("title"), Some("kept".to_owned()));
}

#[test]
fn missing_key_resolves_through_fallback_language() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    // "nav.about" exists only in the fallback (ru) dictionary.
    let span = text_element(&document, "nav.about");

    let observer = observe(&document, nav_store());

    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "О нас");
}

#[test]
fn reapplication_is_idempotent() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());

    let after_first = span.text_content();
    observer.apply_translations();
    observer.update_translations();

    assert_eq!(span.text_content(), after_first);
}

#[test]
fn text_rewrite_preserves_inline_markup() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let button = document.create_element("button");
    button.set_attribute("data-i18n", "nav.home");
    let icon = button.append_element("i");
    icon.append_text("*");
    button.append_text("placeholder");

    let observer = observe(&document, nav_store());

    assert_eq!(button.text_content(), "*Home");
    assert_eq!(button.child_elements().len(), 1);

    observer.apply_translations();
    assert_eq!(button.text_content(), "*Home");
}

#[test]
fn load_language_switches_when_loaded() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());

    observer.load_language("ru");

    assert_eq!(observer.current_language(), "ru");
    assert_eq!(span.text_content(), "Главная");
}

#[test]
fn load_language_falls_back_for_unloaded() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());

    observer.load_language("fr");

    assert_eq!(observer.current_language(), "ru");
    assert_eq!(span.text_content(), "Главная");
}

#[test]
fn init_with_language_rewrites_marker_and_transitions() {
    let document = MemoryDocument::new();
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());
    assert_eq!(observer.current_language(), "ru");

    observer.init(InitOptions {
        language: Some("en".to_owned()),
    });

    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "Home");
    assert!(document.root_classes().contains(&"locale-en".to_owned()));
}

#[test]
fn init_without_language_is_a_noop() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());

    observer.init(InitOptions::default());

    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "Home");
}

#[test]
fn lazy_load_for_inactive_language_stays_invisible() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());

    block_on(observer.load_translations("fr", |_lang| async {
        Ok::<_, String>(dict(json!({"nav": {"home": "Accueil"}})))
    }));

    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "Home");
    assert!(observer.store().contains("fr"));

    observer.load_language("fr");
    assert_eq!(span.text_content(), "Accueil");
}

#[test]
fn lazy_load_for_active_language_reapplies_immediately() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());
    assert_eq!(span.text_content(), "Home");

    block_on(observer.load_translations("en", |_lang| async {
        Ok::<_, String>(dict(json!({"nav": {"home": "Start"}})))
    }));

    assert_eq!(span.text_content(), "Start");
}

#[test]
fn loader_failure_leaves_store_and_document_untouched() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());

    block_on(observer.load_translations("fr", |_lang| async {
        Err::<Dictionary, _>("network unreachable".to_owned())
    }));

    assert!(!observer.store().contains("fr"));
    assert_eq!(observer.current_language(), "en");
    assert_eq!(span.text_content(), "Home");
}

#[test]
fn host_store_mutation_shows_after_update_translations() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let store = nav_store();
    let observer = observe(&document, store.clone());

    store.insert("en", dict(json!({"nav": {"home": "Front page"}})));
    assert_eq!(span.text_content(), "Home", "store writes alone change nothing");

    observer.update_translations();
    assert_eq!(span.text_content(), "Front page");
}

#[test]
fn dispose_detaches_the_subscription() {
    let document = MemoryDocument::new();
    document.add_root_class("locale-en");
    let span = text_element(&document, "nav.home");
    let observer = observe(&document, nav_store());
    assert_eq!(span.text_content(), "Home");

    observer.dispose();
    document.set_root_classes(&["locale-ru".to_owned()]);

    assert_eq!(span.text_content(), "Home");
}
