//! Diagram model: nodes, edges, stored definitions and tree-shaped input.
//!
//! A [`DiagramDefinition`] is what the registry stores under a diagram id.
//! [`TreeNodeConfig`] is the recursive, declarative input accepted by the tree
//! factory; it is flattened into nodes and edges and then dropped.
//!
//! All types deserialize from the catalog format, e.g.:
//!
//! ```toml
//! [[nodes]]
//! id = "k-hws"
//! class = "komponenten-node"
//! data = { label = "Heißwasserspeicher", description = "Puffer" }
//!
//! [[edges]]
//! id = "k-e1"
//! source = "k-biomassekessel"
//! target = "k-hws"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{geometry::Point, options::LayoutOptions};

/// Display payload of a node: the label plus any extra string attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    label: String,

    /// Open attribute map (`description`, `icon`, ...), kept in input order.
    #[serde(flatten)]
    attributes: IndexMap<String, String>,
}

impl NodeData {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Adds an extra attribute (builder style).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }
}

/// A node of a diagram.
///
/// `position` is the top-left corner of the node box. It stays `(0, 0)` until
/// a layout pass places the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    id: String,

    data: NodeData,

    /// Space separated style-class string, e.g. `"tech-item-node technologies-item"`.
    #[serde(default, rename = "class")]
    style_class: Option<String>,

    #[serde(default)]
    kind: Option<String>,

    #[serde(default)]
    position: Point,
}

impl NodeSpec {
    /// Creates a node at the origin with no style class and no kind.
    pub fn new(id: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            data,
            style_class: None,
            kind: None,
            position: Point::default(),
        }
    }

    pub fn with_style_class(mut self, style_class: impl Into<String>) -> Self {
        self.style_class = Some(style_class.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn label(&self) -> &str {
        self.data.label()
    }

    pub fn style_class(&self) -> Option<&str> {
        self.style_class.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

/// A directed edge between two nodes of the same diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    id: String,
    source: String,
    target: String,
}

impl EdgeSpec {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the node the edge starts at.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Id of the node the edge points to.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// The stored form of a diagram.
///
/// The id a definition is known by is its registry key; the definition itself
/// only owns the graph and its optional layout-option overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramDefinition {
    #[serde(default)]
    nodes: Vec<NodeSpec>,

    #[serde(default)]
    edges: Vec<EdgeSpec>,

    #[serde(default)]
    layout_options: Option<LayoutOptions>,
}

impl DiagramDefinition {
    pub fn new(nodes: Vec<NodeSpec>, edges: Vec<EdgeSpec>) -> Self {
        Self {
            nodes,
            edges,
            layout_options: None,
        }
    }

    /// Attaches diagram-level layout options that override the global defaults.
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout_options = Some(options);
        self
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeSpec] {
        &self.edges
    }

    pub fn layout_options(&self) -> Option<&LayoutOptions> {
        self.layout_options.as_ref()
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|node| node.id() == id)
    }
}

/// One node of a declarative tree, with its children in display order.
///
/// Missing `id`, `class` and `kind` are filled in by the tree factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNodeConfig {
    #[serde(default)]
    id: Option<String>,

    #[serde(default, rename = "class")]
    style_class: Option<String>,

    #[serde(default)]
    kind: Option<String>,

    data: NodeData,

    #[serde(default)]
    children: Vec<TreeNodeConfig>,
}

impl TreeNodeConfig {
    pub fn new(data: NodeData) -> Self {
        Self {
            id: None,
            style_class: None,
            kind: None,
            data,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_style_class(mut self, style_class: impl Into<String>) -> Self {
        self.style_class = Some(style_class.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_child(mut self, child: TreeNodeConfig) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNodeConfig>) -> Self {
        self.children.extend(children);
        self
    }

    /// Explicit id, if one was given. An empty string counts as absent.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn style_class(&self) -> Option<&str> {
        self.style_class.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn children(&self) -> &[TreeNodeConfig] {
        &self.children
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNodeConfig::node_count)
            .sum::<usize>()
    }
}
