use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable per-element identifier, assigned by the page host on first sight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Client-space rectangle, as reported by `getBoundingClientRect`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Current text selection on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    pub rect: Rect,
}

/// Serialized element subtree sent by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: NodeId,
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Live value of input-like elements
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl ElementSpec {
    pub fn new(id: u64, tag: &str) -> Self {
        Self {
            id: NodeId(id),
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            value: None,
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(NodeSpec::Text(text.to_string()));
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(NodeSpec::Element(child));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element(ElementSpec),
}

/// Page events mirrored into the core by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Load {
        hostname: String,
        viewport: Size,
        body: ElementSpec,
    },
    PointerOver {
        target: NodeId,
        x: f64,
        y: f64,
    },
    PointerOut {
        target: NodeId,
        #[serde(default)]
        related: Option<NodeId>,
    },
    PointerDown,
    Scroll,
    MouseUp,
    KeyUp,
    SelectionChanged {
        selection: Option<Selection>,
    },
    InputValue {
        target: NodeId,
        value: String,
    },
    NodesInserted {
        parent: NodeId,
        node: ElementSpec,
    },
    NodeRemoved {
        node: NodeId,
    },
    Resize {
        viewport: Size,
    },
}

/// Page mutations requested by the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    SetAttribute {
        target: NodeId,
        name: String,
        value: String,
    },
    RemoveAttribute {
        target: NodeId,
        name: String,
    },
    ShowTooltip {
        id: NodeId,
        x: f64,
        y: f64,
        html: String,
    },
    UpdateTooltip {
        id: NodeId,
        html: String,
        error: bool,
    },
    FadeTooltip {
        id: NodeId,
    },
    RemoveTooltip {
        id: NodeId,
    },
}
