use std::collections::HashMap;

use hovertrans_types::{HostCommand, NodeId};

use crate::dom::Document;

/// The platform tooltip attribute
pub const TITLE_ATTR: &str = "title";
/// Where a suppressed title is parked while the pointer is over its element
pub const AUX_TITLE_ATTR: &str = "data-original-title";

/// Original platform-tooltip text per element, captured once before stripping.
/// Entries are evicted when the element leaves the document.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    titles: HashMap<NodeId, String>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&str> {
        self.titles.get(&id).map(String::as_str)
    }

    /// Record `title` unless the element already has an entry
    pub fn record(&mut self, id: NodeId, title: &str) -> bool {
        if self.titles.contains_key(&id) {
            return false;
        }
        self.titles.insert(id, title.to_string());
        true
    }

    pub fn evict(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.titles.remove(id);
        }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Strips and restores native `title` tooltips so they never compete with ours
#[derive(Debug, Default)]
pub struct NativeTooltipSuppressor {
    registry: TitleRegistry,
}

impl NativeTooltipSuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &TitleRegistry {
        &self.registry
    }

    /// Capture-phase pointer enter: park the title in the auxiliary attribute
    pub fn on_pointer_over(&mut self, doc: &mut Document, target: NodeId) -> Vec<HostCommand> {
        let Some(title) = doc
            .get(target)
            .and_then(|e| e.attribute(TITLE_ATTR))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
        else {
            return Vec::new();
        };

        self.registry.record(target, &title);
        doc.remove_attribute(target, TITLE_ATTR);
        if doc.set_attribute(target, AUX_TITLE_ATTR, &title).is_err() {
            return Vec::new();
        }
        tracing::trace!("Suppressed native tooltip on {target:?}");

        vec![
            HostCommand::SetAttribute {
                target,
                name: AUX_TITLE_ATTR.to_string(),
                value: title,
            },
            HostCommand::RemoveAttribute {
                target,
                name: TITLE_ATTR.to_string(),
            },
        ]
    }

    /// Capture-phase pointer leave: put the parked title back
    pub fn on_pointer_out(&mut self, doc: &mut Document, target: NodeId) -> Vec<HostCommand> {
        let Some(title) = doc
            .remove_attribute(target, AUX_TITLE_ATTR)
            .filter(|t| !t.is_empty())
        else {
            return Vec::new();
        };

        if doc.set_attribute(target, TITLE_ATTR, &title).is_err() {
            return Vec::new();
        }

        vec![
            HostCommand::SetAttribute {
                target,
                name: TITLE_ATTR.to_string(),
                value: title,
            },
            HostCommand::RemoveAttribute {
                target,
                name: AUX_TITLE_ATTR.to_string(),
            },
        ]
    }

    /// Register every titled element under `root` ahead of its first hover
    pub fn scan(&mut self, doc: &Document, root: NodeId) -> usize {
        doc.subtree(root)
            .into_iter()
            .filter_map(|id| {
                let title = doc.get(id)?.attribute(TITLE_ATTR)?;
                (!title.is_empty()).then(|| self.registry.record(id, title))
            })
            .filter(|recorded| *recorded)
            .count()
    }

    pub fn on_removed(&mut self, removed: &[NodeId]) {
        self.registry.evict(removed);
    }
}
