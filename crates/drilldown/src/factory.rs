//! Tree diagram factory.
//!
//! Converts a recursive [`TreeNodeConfig`] into a flat node list and edge
//! list and registers the result. The traversal is depth-first pre-order, so
//! nodes come out in the order a reader would list them, and every node but
//! the root gets exactly one incoming edge from its parent.
//!
//! Nodes without an explicit id get a synthetic `{prefix}-{n}` id, where `n`
//! counts visited nodes from 1 within one [`build_tree`] call. The counter
//! advances for every node, including those with explicit ids, so identical
//! input always yields identical ids.

use log::info;

use drilldown_core::{
    diagram::{DiagramDefinition, EdgeSpec, NodeSpec, TreeNodeConfig},
    options::LayoutOptions,
};

use crate::registry::{DiagramRegistry, Registration, RegistryError};

/// Style class for nodes that don't name one.
pub const DEFAULT_STYLE_CLASS: &str = "tree-node-default";

/// Prefix for synthetic node ids.
pub const DEFAULT_NODE_ID_PREFIX: &str = "treeN";

/// Kind for nodes that don't name one.
pub const DEFAULT_NODE_KIND: &str = "default";

/// Defaults applied while flattening a tree.
#[derive(Debug, Clone)]
pub struct TreeFactoryOptions {
    default_style_class: String,
    node_id_prefix: String,
    default_kind: String,
    layout_options: Option<LayoutOptions>,
}

impl Default for TreeFactoryOptions {
    fn default() -> Self {
        Self {
            default_style_class: DEFAULT_STYLE_CLASS.to_string(),
            node_id_prefix: DEFAULT_NODE_ID_PREFIX.to_string(),
            default_kind: DEFAULT_NODE_KIND.to_string(),
            layout_options: None,
        }
    }
}

impl TreeFactoryOptions {
    pub fn with_default_style_class(mut self, style_class: impl Into<String>) -> Self {
        self.default_style_class = style_class.into();
        self
    }

    pub fn with_node_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.node_id_prefix = prefix.into();
        self
    }

    pub fn with_default_kind(mut self, kind: impl Into<String>) -> Self {
        self.default_kind = kind.into();
        self
    }

    /// Layout options stored on the produced definition.
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout_options = Some(options);
        self
    }
}

/// Flattens `root` into a diagram definition without registering it.
///
/// # Examples
///
/// ```
/// # use drilldown::factory::{TreeFactoryOptions, build_tree};
/// # use drilldown_core::diagram::{NodeData, TreeNodeConfig};
/// let tree = TreeNodeConfig::new(NodeData::new("Root"))
///     .with_child(TreeNodeConfig::new(NodeData::new("Leaf")));
///
/// let definition = build_tree(&tree, &TreeFactoryOptions::default());
///
/// assert_eq!(definition.nodes()[0].id(), "treeN-1");
/// assert_eq!(definition.nodes()[1].id(), "treeN-2");
/// assert_eq!(definition.edges()[0].id(), "edge-treeN-1-treeN-2");
/// ```
pub fn build_tree(root: &TreeNodeConfig, options: &TreeFactoryOptions) -> DiagramDefinition {
    let mut flattener = Flattener {
        options,
        counter: 0,
        nodes: Vec::with_capacity(root.node_count()),
        edges: Vec::new(),
    };
    flattener.visit(root, None);

    let definition = DiagramDefinition::new(flattener.nodes, flattener.edges);
    match &options.layout_options {
        Some(layout_options) => definition.with_layout_options(layout_options.clone()),
        None => definition,
    }
}

/// Flattens `root` and registers it under `diagram_id`.
///
/// This calls [`DiagramRegistry::register`] directly, so an id that is already
/// taken keeps its existing definition. Wrap the call in
/// [`DiagramRegistry::register_if_absent`] to skip the flattening as well.
///
/// # Errors
///
/// Returns the [`RegistryError`] produced by registration, e.g. for an empty
/// `diagram_id` or a tree that repeats an explicit node id.
pub fn create_tree_diagram(
    registry: &mut DiagramRegistry,
    diagram_id: &str,
    root: &TreeNodeConfig,
    options: &TreeFactoryOptions,
) -> Result<Registration, RegistryError> {
    let definition = build_tree(root, options);
    let node_count = definition.nodes().len();
    let registration = registry.register(diagram_id, definition)?;
    info!(diagram_id = diagram_id, node_count = node_count; "Tree diagram created");
    Ok(registration)
}

struct Flattener<'a> {
    options: &'a TreeFactoryOptions,
    counter: usize,
    nodes: Vec<NodeSpec>,
    edges: Vec<EdgeSpec>,
}

impl Flattener<'_> {
    fn visit(&mut self, config: &TreeNodeConfig, parent_id: Option<&str>) {
        self.counter += 1;
        let node_id = match config.id() {
            Some(id) => id.to_string(),
            None => format!("{}-{}", self.options.node_id_prefix, self.counter),
        };

        let node = NodeSpec::new(node_id.clone(), config.data().clone())
            .with_style_class(
                config
                    .style_class()
                    .unwrap_or(&self.options.default_style_class),
            )
            .with_kind(config.kind().unwrap_or(&self.options.default_kind));
        self.nodes.push(node);

        if let Some(parent_id) = parent_id {
            self.edges.push(EdgeSpec::new(
                format!("edge-{parent_id}-{node_id}"),
                parent_id,
                node_id.as_str(),
            ));
        }

        for child in config.children() {
            self.visit(child, Some(node_id.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use drilldown_core::diagram::NodeData;

    use super::*;

    fn leaf(id: &str) -> TreeNodeConfig {
        TreeNodeConfig::new(NodeData::new(id.to_uppercase())).with_id(id)
    }

    fn sample_tree() -> TreeNodeConfig {
        leaf("r").with_children([leaf("a"), leaf("b").with_child(leaf("c"))])
    }

    fn endpoints(definition: &DiagramDefinition) -> Vec<(&str, &str)> {
        definition
            .edges()
            .iter()
            .map(|edge| (edge.source(), edge.target()))
            .collect()
    }

    #[test]
    fn test_preorder_nodes_and_edges() {
        let definition = build_tree(&sample_tree(), &TreeFactoryOptions::default());

        let ids: Vec<_> = definition.nodes().iter().map(NodeSpec::id).collect();
        assert_eq!(ids, ["r", "a", "b", "c"]);
        assert_eq!(endpoints(&definition), [("r", "a"), ("r", "b"), ("b", "c")]);
        assert_eq!(definition.edges()[2].id(), "edge-b-c");
    }

    #[test]
    fn test_defaults_are_applied() {
        let tree = TreeNodeConfig::new(NodeData::new("root"))
            .with_style_class("tech-logo-node")
            .with_child(TreeNodeConfig::new(NodeData::new("child")).with_kind("special"));

        let definition = build_tree(&tree, &TreeFactoryOptions::default());

        let root = &definition.nodes()[0];
        assert_eq!(root.style_class(), Some("tech-logo-node"));
        assert_eq!(root.kind(), Some(DEFAULT_NODE_KIND));
        assert!(root.position().is_zero());

        let child = &definition.nodes()[1];
        assert_eq!(child.style_class(), Some(DEFAULT_STYLE_CLASS));
        assert_eq!(child.kind(), Some("special"));
        assert_eq!(child.label(), "child");
    }

    #[test]
    fn test_synthetic_ids_count_every_visited_node() {
        let tree = TreeNodeConfig::new(NodeData::new("root")).with_children([
            leaf("explicit"),
            TreeNodeConfig::new(NodeData::new("anonymous")),
        ]);
        let options = TreeFactoryOptions::default().with_node_id_prefix("vsk-tree");

        let definition = build_tree(&tree, &options);

        let ids: Vec<_> = definition.nodes().iter().map(NodeSpec::id).collect();
        assert_eq!(ids, ["vsk-tree-1", "explicit", "vsk-tree-3"]);
    }

    #[test]
    fn test_repeated_invocations_are_identical() {
        let tree = TreeNodeConfig::new(NodeData::new("root"))
            .with_child(TreeNodeConfig::new(NodeData::new("leaf")));
        let options = TreeFactoryOptions::default();

        assert_eq!(build_tree(&tree, &options), build_tree(&tree, &options));
    }

    #[test]
    fn test_single_node_has_no_edges() {
        let definition = build_tree(&leaf("solo"), &TreeFactoryOptions::default());
        assert_eq!(definition.nodes().len(), 1);
        assert!(definition.edges().is_empty());
    }

    #[test]
    fn test_layout_options_are_attached() {
        let options = TreeFactoryOptions::default()
            .with_layout_options(LayoutOptions::new().with("algorithm", "layered"));

        let definition = build_tree(&leaf("r"), &options);

        assert_eq!(
            definition.layout_options().and_then(|o| o.get("algorithm")),
            Some("layered")
        );
    }

    #[test]
    fn test_create_registers_definition() {
        let mut registry = DiagramRegistry::new();

        let outcome = create_tree_diagram(
            &mut registry,
            "versorgungskonzepte",
            &sample_tree(),
            &TreeFactoryOptions::default(),
        );

        assert_eq!(outcome, Ok(Registration::Stored));
        assert_eq!(
            registry.lookup("versorgungskonzepte").map(|d| d.nodes().len()),
            Some(4)
        );
    }

    #[test]
    fn test_create_does_not_overwrite() {
        let mut registry = DiagramRegistry::new();
        let options = TreeFactoryOptions::default();
        create_tree_diagram(&mut registry, "tree", &sample_tree(), &options).unwrap();

        let outcome = create_tree_diagram(&mut registry, "tree", &leaf("other"), &options);

        assert_eq!(outcome, Ok(Registration::AlreadyRegistered));
        assert_eq!(registry.lookup("tree").map(|d| d.nodes().len()), Some(4));
    }

    #[test]
    fn test_repeated_explicit_id_is_rejected() {
        let mut registry = DiagramRegistry::new();
        let tree = leaf("r").with_children([leaf("x"), leaf("x")]);

        let outcome = create_tree_diagram(&mut registry, "tree", &tree, &TreeFactoryOptions::default());

        assert!(matches!(outcome, Err(RegistryError::DuplicateNodeId { .. })));
        assert!(registry.is_empty());
    }
}
