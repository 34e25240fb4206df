use std::collections::{BTreeMap, HashMap};

use hovertrans_types::{ElementSpec, NodeId, NodeSpec, Selection, Size};

use crate::error::DomError;

/// Ids at or above this value belong to nodes created by the core itself
pub const LOCAL_ID_BASE: u64 = 1 << 53;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(NodeId),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: NodeId,
    /// Upper-case tag name, as `Element.tagName` reports it
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub value: Option<String>,
    pub children: Vec<Node>,
    pub parent: Option<NodeId>,
    /// Markup written by the core, replaces `children` when set
    pub inner_html: Option<String>,
}

impl Element {
    fn new(id: NodeId, tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            id,
            tag: tag.to_ascii_uppercase(),
            attributes: BTreeMap::new(),
            value: None,
            children: Vec::new(),
            parent,
            inner_html: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn is_input_like(&self) -> bool {
        matches!(self.tag.as_str(), "INPUT" | "TEXTAREA")
    }
}

/// In-memory mirror of the host page
#[derive(Debug)]
pub struct Document {
    hostname: String,
    viewport: Size,
    root: Option<NodeId>,
    elements: HashMap<NodeId, Element>,
    selection: Option<Selection>,
    next_local_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            hostname: String::new(),
            viewport: Size::new(1024.0, 768.0),
            root: None,
            elements: HashMap::new(),
            selection: None,
            next_local_id: LOCAL_ID_BASE,
        }
    }

    /// Replace the whole document with a fresh snapshot
    pub fn load(&mut self, hostname: &str, viewport: Size, body: &ElementSpec) {
        self.hostname = hostname.to_string();
        self.viewport = viewport;
        self.elements.clear();
        self.selection = None;
        self.root = Some(body.id);
        self.adopt(body, None);
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn body(&self) -> Result<NodeId, DomError> {
        self.root.ok_or(DomError::NotLoaded)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append a host subtree under `parent`, returning every inserted element id
    pub fn insert(&mut self, parent: NodeId, spec: &ElementSpec) -> Result<Vec<NodeId>, DomError> {
        if !self.contains(parent) {
            return Err(DomError::UnknownNode(parent));
        }
        if self.contains(spec.id) {
            // re-parenting: detach the stale copy first
            self.remove(spec.id);
        }

        let inserted = self.adopt(spec, Some(parent));
        if let Some(parent) = self.elements.get_mut(&parent) {
            parent.children.push(Node::Element(spec.id));
        }
        Ok(inserted)
    }

    fn adopt(&mut self, spec: &ElementSpec, parent: Option<NodeId>) -> Vec<NodeId> {
        let mut element = Element::new(spec.id, &spec.tag, parent);
        element.attributes = spec.attributes.clone();
        element.value = spec.value.clone();

        let mut inserted = vec![spec.id];
        for child in &spec.children {
            match child {
                NodeSpec::Text(text) => element.children.push(Node::Text(text.clone())),
                NodeSpec::Element(child) => {
                    element.children.push(Node::Element(child.id));
                    inserted.extend(self.adopt(child, Some(spec.id)));
                }
            }
        }

        self.elements.insert(spec.id, element);
        inserted
    }

    /// Create an empty element owned by the core
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        if !self.contains(parent) {
            return Err(DomError::UnknownNode(parent));
        }

        let id = NodeId(self.next_local_id);
        self.next_local_id += 1;

        self.elements.insert(id, Element::new(id, tag, Some(parent)));
        if let Some(parent) = self.elements.get_mut(&parent) {
            parent.children.push(Node::Element(id));
        }
        Ok(id)
    }

    /// Detach and drop a subtree, returning the ids that left the document
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.elements.get(&id).map(|e| e.parent) else {
            return Vec::new();
        };

        if let Some(parent) = parent.and_then(|p| self.elements.get_mut(&p)) {
            parent.children.retain(|c| *c != Node::Element(id));
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.elements.remove(&next) {
                stack.extend(element.children.iter().filter_map(|c| match c {
                    Node::Element(child) => Some(*child),
                    Node::Text(_) => None,
                }));
                removed.push(next);
            }
        }
        removed
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        element.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.get_mut(id)?.attributes.remove(name)
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        let element = self.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        element.value = Some(value.to_string());
        Ok(())
    }

    pub fn set_inner_html(&mut self, id: NodeId, html: String) -> Result<(), DomError> {
        let element = self.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        element.inner_html = Some(html);
        Ok(())
    }

    /// Concatenated text of the element's own text-node children
    pub fn direct_text(&self, id: NodeId) -> String {
        let Some(element) = self.get(id) else {
            return String::new();
        };

        element
            .children
            .iter()
            .filter_map(|c| match c {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Full descendant text, like `Node.textContent`
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(element) = self.get(id) else {
            return;
        };
        for child in &element.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(child) => self.collect_text(*child, out),
            }
        }
    }

    /// The element itself followed by its ancestors, innermost first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &Element> {
        std::iter::successors(self.get(id), |e| e.parent.and_then(|p| self.get(p)))
    }

    /// Whether `id` is `ancestor` or lies inside it
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|e| e.id == ancestor)
    }

    /// Every element in `root`'s subtree, root included
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack = vec![root];
        while let Some(next) = stack.pop() {
            let Some(element) = self.get(next) else {
                continue;
            };
            ids.push(next);
            stack.extend(element.children.iter().rev().filter_map(|c| match c {
                Node::Element(child) => Some(*child),
                Node::Text(_) => None,
            }));
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        let body = ElementSpec::new(1, "body")
            .text("intro ")
            .child(
                ElementSpec::new(2, "div")
                    .text("outer ")
                    .child(ElementSpec::new(3, "span").text("inner")),
            );
        let mut doc = Document::new();
        doc.load("a.example.com", Size::new(800.0, 600.0), &body);
        doc
    }

    #[test]
    fn text_content_and_direct_text() {
        let doc = page();
        assert_eq!(doc.direct_text(NodeId(2)), "outer ");
        assert_eq!(doc.text_content(NodeId(2)), "outer inner");
        assert_eq!(doc.text_content(NodeId(1)), "intro outer inner");
        assert_eq!(doc.get(NodeId(3)).unwrap().tag, "SPAN");
    }

    #[test]
    fn remove_returns_whole_subtree() {
        let mut doc = page();
        let mut removed = doc.remove(NodeId(2));
        removed.sort();
        assert_eq!(removed, vec![NodeId(2), NodeId(3)]);
        assert!(!doc.contains(NodeId(3)));
        assert_eq!(doc.text_content(NodeId(1)), "intro ");
    }

    #[test]
    fn insert_under_unknown_parent_fails() {
        let mut doc = page();
        let result = doc.insert(NodeId(99), &ElementSpec::new(10, "p"));
        assert!(matches!(result, Err(DomError::UnknownNode(NodeId(99)))));
    }

    #[test]
    fn created_elements_use_local_ids() {
        let mut doc = page();
        let id = doc.create_element(NodeId(1), "div").unwrap();
        assert!(id.0 >= LOCAL_ID_BASE);
        assert!(doc.is_within(id, NodeId(1)));
        assert!(!doc.is_within(NodeId(3), id));
    }

    #[test]
    fn reinserting_moves_node() {
        let mut doc = page();
        doc.insert(NodeId(1), &ElementSpec::new(3, "span").text("moved")).unwrap();
        assert_eq!(doc.text_content(NodeId(2)), "outer ");
        assert_eq!(doc.get(NodeId(3)).unwrap().parent, Some(NodeId(1)));
    }
}
