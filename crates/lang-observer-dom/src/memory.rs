//! In-memory headless document.
//!
//! `MemoryDocument` implements the [`DomDocument`] contract over an
//! arena-backed element tree. Attribute mutations on the root element are
//! dispatched synchronously to registered watchers, with callbacks invoked
//! after every internal lock is released so they may freely re-enter the
//! document.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::document::{
    AttributeMutation, ChangeCallback, ChangeRecord, DomDocument, DomElement, WatchId,
};

const ROOT: usize = 0;

struct Node {
    kind: NodeKind,
}

enum NodeKind {
    Element {
        tag: String,
        attributes: HashMap<String, String>,
        children: Vec<usize>,
    },
    Text(String),
}

struct DocState {
    // Node 0 is the document root. Detached nodes stay in the arena.
    nodes: Vec<Node>,
    params: HashMap<String, String>,
}

struct Watcher {
    id: WatchId,
    attribute: String,
    callback: ChangeCallback,
}

struct DocInner {
    state: RwLock<DocState>,
    watchers: RwLock<Vec<Watcher>>,
    next_watch: AtomicU64,
}

/// A cheaply cloneable handle to an in-memory document.
#[derive(Clone)]
pub struct MemoryDocument {
    inner: Arc<DocInner>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Creates a document containing only an empty root element.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Element {
                tag: "body".to_owned(),
                attributes: HashMap::new(),
                children: Vec::new(),
            },
        };
        Self {
            inner: Arc::new(DocInner {
                state: RwLock::new(DocState {
                    nodes: vec![root],
                    params: HashMap::new(),
                }),
                watchers: RwLock::new(Vec::new()),
                next_watch: AtomicU64::new(1),
            }),
        }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> MemoryElement {
        MemoryElement {
            inner: Arc::clone(&self.inner),
            node: ROOT,
        }
    }

    /// Creates an element appended to the document root.
    pub fn create_element(&self, tag: &str) -> MemoryElement {
        self.root().append_element(tag)
    }

    /// Sets a query-string parameter on the navigational context.
    pub fn set_query_param(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .state
            .write()
            .params
            .insert(name.into(), value.into());
    }

    /// Adds one class token to the root, keeping the others.
    pub fn add_root_class(&self, class: &str) {
        let mut classes = self.root_classes();
        if !classes.iter().any(|existing| existing == class) {
            classes.push(class.to_owned());
        }
        self.set_root_classes(&classes);
    }
}

impl DomDocument for MemoryDocument {
    type Element = MemoryElement;

    fn root_classes(&self) -> Vec<String> {
        self.root()
            .attribute("class")
            .map(|value| value.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    fn set_root_classes(&self, classes: &[String]) {
        let root = self.root();
        if classes.is_empty() {
            root.remove_attribute("class");
        } else {
            root.set_attribute("class", &classes.join(" "));
        }
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.inner.state.read().params.get(name).cloned()
    }

    fn elements_with_attributes(&self, attributes: &[&str]) -> Vec<MemoryElement> {
        let ids = {
            let state = self.inner.state.read();
            let mut ids = Vec::new();
            collect_matching(&state, ROOT, attributes, &mut ids);
            ids
        };
        ids.into_iter()
            .map(|node| MemoryElement {
                inner: Arc::clone(&self.inner),
                node,
            })
            .collect()
    }

    fn watch_root_attribute(&self, attribute: &str, callback: ChangeCallback) -> WatchId {
        let id = WatchId::new(self.inner.next_watch.fetch_add(1, Ordering::Relaxed));
        self.inner.watchers.write().push(Watcher {
            id,
            attribute: attribute.to_owned(),
            callback,
        });
        id
    }

    fn unwatch(&self, id: WatchId) {
        self.inner.watchers.write().retain(|watcher| watcher.id != id);
    }
}

/// A handle to one element of a [`MemoryDocument`].
#[derive(Clone)]
pub struct MemoryElement {
    inner: Arc<DocInner>,
    node: usize,
}

impl MemoryElement {
    /// Appends a child element.
    pub fn append_element(&self, tag: &str) -> MemoryElement {
        let mut state = self.inner.state.write();
        let id = state.nodes.len();
        state.nodes.push(Node {
            kind: NodeKind::Element {
                tag: tag.to_owned(),
                attributes: HashMap::new(),
                children: Vec::new(),
            },
        });
        attach(&mut state, self.node, id);
        MemoryElement {
            inner: Arc::clone(&self.inner),
            node: id,
        }
    }

    /// Appends a text child.
    pub fn append_text(&self, text: &str) {
        let mut state = self.inner.state.write();
        let id = state.nodes.len();
        state.nodes.push(Node {
            kind: NodeKind::Text(text.to_owned()),
        });
        attach(&mut state, self.node, id);
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        match &self.inner.state.read().nodes[self.node].kind {
            NodeKind::Element { tag, .. } => tag.clone(),
            NodeKind::Text(_) => String::new(),
        }
    }

    /// Removes an attribute if present.
    pub fn remove_attribute(&self, name: &str) {
        let removed = {
            let mut state = self.inner.state.write();
            match &mut state.nodes[self.node].kind {
                NodeKind::Element { attributes, .. } => attributes.remove(name).is_some(),
                NodeKind::Text(_) => false,
            }
        };
        if removed && self.node == ROOT {
            dispatch(
                &self.inner,
                &[ChangeRecord {
                    attribute: name.to_owned(),
                    mutation: AttributeMutation::Removed,
                }],
            );
        }
    }

    /// Direct child elements, in order.
    #[must_use]
    pub fn child_elements(&self) -> Vec<MemoryElement> {
        let ids = {
            let state = self.inner.state.read();
            match &state.nodes[self.node].kind {
                NodeKind::Element { children, .. } => children
                    .iter()
                    .copied()
                    .filter(|&child| {
                        matches!(state.nodes[child].kind, NodeKind::Element { .. })
                    })
                    .collect(),
                NodeKind::Text(_) => Vec::new(),
            }
        };
        ids.into_iter()
            .map(|node| MemoryElement {
                inner: Arc::clone(&self.inner),
                node,
            })
            .collect()
    }
}

impl DomElement for MemoryElement {
    fn attribute(&self, name: &str) -> Option<String> {
        match &self.inner.state.read().nodes[self.node].kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).cloned(),
            NodeKind::Text(_) => None,
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        {
            let mut state = self.inner.state.write();
            if let NodeKind::Element { attributes, .. } = &mut state.nodes[self.node].kind {
                attributes.insert(name.to_owned(), value.to_owned());
            }
        }
        if self.node == ROOT {
            dispatch(
                &self.inner,
                &[ChangeRecord {
                    attribute: name.to_owned(),
                    mutation: AttributeMutation::Set,
                }],
            );
        }
    }

    fn has_child_nodes(&self) -> bool {
        match &self.inner.state.read().nodes[self.node].kind {
            NodeKind::Element { children, .. } => !children.is_empty(),
            NodeKind::Text(_) => false,
        }
    }

    fn rewrite_text_nodes(&self, text: &str) {
        let mut state = self.inner.state.write();
        let child_ids = match &state.nodes[self.node].kind {
            NodeKind::Element { children, .. } => children.clone(),
            NodeKind::Text(_) => return,
        };
        for id in child_ids {
            if let NodeKind::Text(content) = &mut state.nodes[id].kind {
                *content = text.to_owned();
            }
        }
    }

    fn set_text_content(&self, text: &str) {
        let mut state = self.inner.state.write();
        let id = state.nodes.len();
        state.nodes.push(Node {
            kind: NodeKind::Text(text.to_owned()),
        });
        if let NodeKind::Element { children, .. } = &mut state.nodes[self.node].kind {
            children.clear();
            children.push(id);
        }
    }

    fn text_content(&self) -> String {
        let state = self.inner.state.read();
        let mut out = String::new();
        collect_text(&state, self.node, &mut out);
        out
    }
}

fn attach(state: &mut DocState, parent: usize, child: usize) {
    if let NodeKind::Element { children, .. } = &mut state.nodes[parent].kind {
        children.push(child);
    }
}

fn collect_text(state: &DocState, node: usize, out: &mut String) {
    match &state.nodes[node].kind {
        NodeKind::Text(content) => out.push_str(content),
        NodeKind::Element { children, .. } => {
            for &child in children {
                collect_text(state, child, out);
            }
        }
    }
}

fn collect_matching(state: &DocState, node: usize, attributes: &[&str], out: &mut Vec<usize>) {
    if let NodeKind::Element {
        attributes: present,
        children,
        ..
    } = &state.nodes[node].kind
    {
        if attributes.iter().any(|name| present.contains_key(*name)) {
            out.push(node);
        }
        for &child in children {
            collect_matching(state, child, attributes, out);
        }
    }
}

// Callbacks run with no document lock held.
fn dispatch(inner: &Arc<DocInner>, records: &[ChangeRecord]) {
    let deliveries: Vec<(ChangeCallback, Vec<ChangeRecord>)> = {
        let watchers = inner.watchers.read();
        watchers
            .iter()
            .filter_map(|watcher| {
                let batch: Vec<ChangeRecord> = records
                    .iter()
                    .filter(|record| record.attribute == watcher.attribute)
                    .cloned()
                    .collect();
                if batch.is_empty() {
                    None
                } else {
                    Some((Arc::clone(&watcher.callback), batch))
                }
            })
            .collect()
    };

    for (callback, batch) in deliveries {
        tracing::trace!(records = batch.len(), "delivering attribute mutation batch");
        callback(&batch);
    }
}
