//! Arena-based DOM produced by the external tokenizer.
//!
//! html5ever parses into this tree through [`DomSink`](super::DomSink). The
//! engine only reads it; all nodes live in one vector and link to each other
//! by index.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName};

/// Index of a node in the [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomNodeId(pub u32);

/// Payload of a DOM node.
#[derive(Debug, Clone)]
pub enum DomNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted `id` attribute.
        id: Option<String>,
        /// Pre-extracted class list.
        classes: Vec<String>,
    },
    /// Character data, entities already decoded by the tokenizer.
    Text(String),
    /// Comment (kept for serialization, invisible to the engine).
    Comment(String),
    /// Document type declaration.
    Doctype { name: String },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Build an attribute in the null namespace.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, html5ever::ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }
}

/// A node in the arena DOM.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub data: DomNodeData,
    pub parent: Option<DomNodeId>,
    pub first_child: Option<DomNodeId>,
    pub last_child: Option<DomNodeId>,
    pub prev_sibling: Option<DomNodeId>,
    pub next_sibling: Option<DomNodeId>,
}

impl DomNode {
    fn new(data: DomNodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// Arena-based DOM tree.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<DomNode>,
    /// First element carrying each `id` attribute.
    id_map: HashMap<String, DomNodeId>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty DOM holding only the document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![DomNode::new(DomNodeData::Document)],
            id_map: HashMap::new(),
        }
    }

    fn alloc(&mut self, data: DomNodeData) -> DomNodeId {
        let id = DomNodeId(self.nodes.len() as u32);
        self.nodes.push(DomNode::new(data));
        id
    }

    /// The document root.
    pub fn document(&self) -> DomNodeId {
        DomNodeId(0)
    }

    pub fn get(&self, id: DomNodeId) -> Option<&DomNode> {
        self.nodes.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: DomNodeId) -> Option<&mut DomNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a detached HTML element.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> DomNodeId {
        let mut id = None;
        let mut classes = Vec::new();
        for attr in &attrs {
            match attr.name.local.as_ref() {
                "id" => id = Some(attr.value.clone()),
                "class" => {
                    classes = attr.value.split_whitespace().map(str::to_string).collect();
                }
                _ => {}
            }
        }

        let node_id = self.alloc(DomNodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        });
        if let Some(id) = id {
            self.id_map.entry(id).or_insert(node_id);
        }
        node_id
    }

    /// Create a detached element in the HTML namespace by tag name.
    pub fn create_html_element(&mut self, tag: &str, attrs: Vec<Attribute>) -> DomNodeId {
        let name = QualName::new(None, html5ever::ns!(html), LocalName::from(tag));
        self.create_element(name, attrs)
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> DomNodeId {
        self.alloc(DomNodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> DomNodeId {
        self.alloc(DomNodeData::Comment(text.into()))
    }

    pub fn create_doctype(&mut self, name: impl Into<String>) -> DomNodeId {
        self.alloc(DomNodeData::Doctype { name: name.into() })
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: DomNodeId, child: DomNodeId) {
        let last_child = self.get(parent).and_then(|n| n.last_child);

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = last_child;
            node.next_sibling = None;
        }
        if let Some(last) = last_child.and_then(|id| self.get_mut(id)) {
            last.next_sibling = Some(child);
        }
        if let Some(node) = self.get_mut(parent) {
            if node.first_child.is_none() {
                node.first_child = Some(child);
            }
            node.last_child = Some(child);
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: DomNodeId, new_node: DomNodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(node) = self.get_mut(new_node) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = Some(sibling);
        }
        if let Some(node) = self.get_mut(sibling) {
            node.prev_sibling = Some(new_node);
        }
        match prev {
            Some(prev) => {
                if let Some(node) = self.get_mut(prev) {
                    node.next_sibling = Some(new_node);
                }
            }
            None => {
                if let Some(node) = parent.and_then(|p| self.get_mut(p)) {
                    node.first_child = Some(new_node);
                }
            }
        }
    }

    /// Append text to `parent`, extending its last child when that is text.
    pub fn append_text(&mut self, parent: DomNodeId, text: &str) {
        let last_child = self.get(parent).and_then(|n| n.last_child);
        if let Some(node) = last_child.and_then(|id| self.get_mut(id))
            && let DomNodeData::Text(existing) = &mut node.data
        {
            existing.push_str(text);
            return;
        }
        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Insert text before `sibling`, extending the preceding text node if any.
    pub fn insert_text_before(&mut self, sibling: DomNodeId, text: &str) {
        let prev = self.get(sibling).and_then(|n| n.prev_sibling);
        if let Some(node) = prev.and_then(|id| self.get_mut(id))
            && let DomNodeData::Text(existing) = &mut node.data
        {
            existing.push_str(text);
            return;
        }
        let text_node = self.create_text(text);
        self.insert_before(sibling, text_node);
    }

    /// Unlink a node from its parent and siblings. Its own subtree stays intact.
    pub fn detach(&mut self, id: DomNodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        match prev.and_then(|p| self.get_mut(p)) {
            Some(node) => node.next_sibling = next,
            None => {
                if let Some(node) = parent.and_then(|p| self.get_mut(p)) {
                    node.first_child = next;
                }
            }
        }
        match next.and_then(|n| self.get_mut(n)) {
            Some(node) => node.prev_sibling = prev,
            None => {
                if let Some(node) = parent.and_then(|p| self.get_mut(p)) {
                    node.last_child = prev;
                }
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Add attributes the element does not carry yet.
    pub fn add_attrs_if_missing(&mut self, id: DomNodeId, new_attrs: Vec<Attribute>) {
        if let Some(node) = self.get_mut(id)
            && let DomNodeData::Element { attrs, .. } = &mut node.data
        {
            for attr in new_attrs {
                if !attrs.iter().any(|a| a.name == attr.name) {
                    attrs.push(attr);
                }
            }
        }
    }

    /// Look up the first element with the given `id` attribute.
    pub fn get_by_id(&self, id: &str) -> Option<DomNodeId> {
        self.id_map.get(id).copied()
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DOM holds nothing besides the document root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, parent: DomNodeId) -> Children<'_> {
        Children {
            dom: self,
            current: self.get(parent).and_then(|n| n.first_child),
        }
    }

    /// Find the first node matching a predicate in document order.
    pub fn find<F>(&self, predicate: F) -> Option<DomNodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        let mut stack = vec![self.document()];
        while let Some(id) = stack.pop() {
            let node = self.get(id)?;
            if predicate(node) {
                return Some(id);
            }
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    /// Find the first element with the given tag name.
    pub fn find_by_tag(&self, tag: &str) -> Option<DomNodeId> {
        self.find(|node| match &node.data {
            DomNodeData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
    }

    /// Tag name of an element.
    pub fn element_name(&self, id: DomNodeId) -> Option<&LocalName> {
        match &self.get(id)?.data {
            DomNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }

    pub fn element_namespace(&self, id: DomNodeId) -> Option<&Namespace> {
        match &self.get(id)?.data {
            DomNodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        }
    }

    pub fn attrs(&self, id: DomNodeId) -> &[Attribute] {
        match self.get(id).map(|n| &n.data) {
            Some(DomNodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    pub fn get_attr(&self, id: DomNodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    pub fn element_id(&self, id: DomNodeId) -> Option<&str> {
        match &self.get(id)?.data {
            DomNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    pub fn element_classes(&self, id: DomNodeId) -> &[String] {
        match self.get(id).map(|n| &n.data) {
            Some(DomNodeData::Element { classes, .. }) => classes,
            _ => &[],
        }
    }

    pub fn is_element(&self, id: DomNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, DomNodeData::Element { .. }))
    }

    pub fn text_content(&self, id: DomNodeId) -> Option<&str> {
        match &self.get(id)?.data {
            DomNodeData::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    dom: &'a Dom,
    current: Option<DomNodeId>,
}

impl Iterator for Children<'_> {
    type Item = DomNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.dom.get(id).and_then(|n| n.next_sibling);
        Some(id)
    }
}
