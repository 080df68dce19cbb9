//! The document surface consumed by the observer engine.
//!
//! These traits are the minimal read/write contract against a live
//! document: the engine never models the node tree beyond them. A real
//! browser binding and the in-memory document in [`crate::memory`]
//! implement the same seam.

use std::sync::Arc;

/// Kind of mutation reported for a watched attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMutation {
    /// The attribute was added or its value replaced.
    Set,
    /// The attribute was removed.
    Removed,
}

/// One attribute mutation on the watched root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Name of the mutated attribute.
    pub attribute: String,
    /// What happened to it.
    pub mutation: AttributeMutation,
}

/// Opaque handle for one attribute-watch registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    /// Wraps a raw registration number. Implementors of [`DomDocument`]
    /// mint these; callers only pass them back to
    /// [`DomDocument::unwatch`].
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw registration number.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Callback invoked with each batch of change records.
///
/// Callbacks run on the document's single execution context and may
/// re-enter the document (read classes, query elements, set attributes).
pub type ChangeCallback = Arc<dyn Fn(&[ChangeRecord])>;

/// An element in the live document.
pub trait DomElement {
    /// Reads an attribute value.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Sets an attribute, replacing any existing value.
    fn set_attribute(&self, name: &str, value: &str);

    /// Whether the element has any child nodes (text or element).
    fn has_child_nodes(&self) -> bool;

    /// Rewrites every direct text child in place, leaving element
    /// children intact. A no-op when the element has no text children.
    fn rewrite_text_nodes(&self, text: &str);

    /// Replaces the element's entire content with a single text node.
    fn set_text_content(&self, text: &str);

    /// Concatenated text of the element's subtree.
    fn text_content(&self) -> String;
}

/// The single page document the engine operates on.
pub trait DomDocument {
    /// Element handle type produced by queries.
    type Element: DomElement;

    /// The class tokens currently present on the document root.
    fn root_classes(&self) -> Vec<String>;

    /// Replaces the root's class tokens wholesale.
    ///
    /// Replacing rather than removing-then-adding keeps a marker rewrite
    /// down to one change batch for watchers.
    fn set_root_classes(&self, classes: &[String]);

    /// Reads one named query-string parameter from the navigational
    /// context, if present.
    fn query_param(&self, name: &str) -> Option<String>;

    /// All elements carrying at least one of the named attributes, in
    /// document order.
    fn elements_with_attributes(&self, attributes: &[&str]) -> Vec<Self::Element>;

    /// Subscribes to mutations of one attribute on the document root.
    /// Each registration receives batches of [`ChangeRecord`]s filtered
    /// to that attribute.
    fn watch_root_attribute(&self, attribute: &str, callback: ChangeCallback) -> WatchId;

    /// Removes a previously registered subscription. Unknown ids are
    /// ignored.
    fn unwatch(&self, id: WatchId);
}
