use lang_observer_core::Language;

/// Configuration for a [`LanguageObserver`](crate::LanguageObserver).
///
/// The defaults reproduce the conventional page contract: a `locale-xx`
/// class on the document root names the active language, `data-i18n`
/// carries an element's text key, `data-i18n-attr` carries a JSON map from
/// attribute name to key, and the `land-geo` query parameter can force an
/// already-loaded language on page entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Language adopted whenever a candidate has no loaded dictionary.
    pub fallback_language: Language,
    /// Root attribute watched for marker changes.
    pub marker_attribute: String,
    /// Class prefix whose suffix names the candidate language.
    pub marker_prefix: String,
    /// Query-string parameter consulted once, on construction.
    pub query_param: String,
    /// Element attribute holding the text translation key.
    pub text_attribute: String,
    /// Element attribute holding the attribute-to-key JSON map.
    pub attr_map_attribute: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            fallback_language: "ru".to_owned(),
            marker_attribute: "class".to_owned(),
            marker_prefix: "locale-".to_owned(),
            query_param: "land-geo".to_owned(),
            text_attribute: "data-i18n".to_owned(),
            attr_map_attribute: "data-i18n-attr".to_owned(),
        }
    }
}
