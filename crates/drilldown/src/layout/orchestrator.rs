//! One layout pass for a diagram.
//!
//! [`LayoutOrchestrator::compute`] resolves the diagram (falling back to the
//! root diagram), layers the layout options, sizes every node through the
//! [`DimensionTable`], calls the [`LayoutEngine`] and maps the answer back
//! onto copies of the registered nodes. It always produces a
//! [`PositionedGraph`]: engine failures degrade to the registered positions
//! and a missing diagram yields an empty graph.

use std::{collections::HashMap, sync::Arc};

use log::{debug, error, info, trace, warn};

use drilldown_core::{
    diagram::{DiagramDefinition, EdgeSpec, NodeSpec},
    dimension::DimensionTable,
    geometry::{Bounds, Point, Size},
    options::{LayoutOptions, keys, merge_layers},
};

use super::{
    engine::{LayoutEngine, LayoutRequest, LayoutResponse, RequestEdge, RequestNode},
    engines::MRTREE,
};
use crate::registry::{DiagramRegistry, ROOT_DIAGRAM_ID};

/// Widths below this use the responsive overrides.
pub const DEFAULT_RESPONSIVE_THRESHOLD: f32 = 768.0;

/// Global defaults: top-down tree with 60 units of spacing.
pub fn default_layout_options() -> LayoutOptions {
    LayoutOptions::new()
        .with(keys::ALGORITHM, MRTREE)
        .with(keys::DIRECTION, "DOWN")
        .with(keys::SPACING_NODE_NODE, "60")
        .with(keys::SPACING_EDGE_NODE, "60")
}

/// Overrides for narrow containers: tighter spacing.
pub fn default_responsive_options() -> LayoutOptions {
    LayoutOptions::new()
        .with(keys::SPACING_NODE_NODE, "10")
        .with(keys::SPACING_EDGE_NODE, "10")
}

/// Option overrides that apply when the container is narrow.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsivePolicy {
    threshold: f32,
    overrides: LayoutOptions,
}

impl Default for ResponsivePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSIVE_THRESHOLD, default_responsive_options())
    }
}

impl ResponsivePolicy {
    pub fn new(threshold: f32, overrides: LayoutOptions) -> Self {
        Self {
            threshold,
            overrides,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn overrides(&self) -> &LayoutOptions {
        &self.overrides
    }

    /// Whether a container of `width` gets the overrides.
    ///
    /// An unknown or non-positive width never does.
    pub fn applies(&self, width: Option<f32>) -> bool {
        width.is_some_and(|width| width > 0.0 && width < self.threshold)
    }
}

/// A node with its final position and resolved size.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    node: NodeSpec,
    size: Size,
}

impl PositionedNode {
    pub fn new(node: NodeSpec, size: Size) -> Self {
        Self { node, size }
    }

    pub fn node(&self) -> &NodeSpec {
        &self.node
    }

    pub fn id(&self) -> &str {
        self.node.id()
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        self.node.position()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position(), self.size)
    }
}

/// How a [`PositionedGraph`] came about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// The engine placed the nodes.
    Positioned,
    /// The engine failed; nodes keep their registered positions.
    Degraded,
    /// Neither the requested nor the root diagram exists.
    #[default]
    Empty,
}

/// The result of one layout pass, ready for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionedGraph {
    diagram_id: Option<String>,
    nodes: Vec<PositionedNode>,
    edges: Vec<EdgeSpec>,
    outcome: LayoutOutcome,
}

impl PositionedGraph {
    /// The graph reported when no diagram could be resolved.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        diagram_id: impl Into<String>,
        nodes: Vec<PositionedNode>,
        edges: Vec<EdgeSpec>,
        outcome: LayoutOutcome,
    ) -> Self {
        Self {
            diagram_id: Some(diagram_id.into()),
            nodes,
            edges,
            outcome,
        }
    }

    /// Id of the diagram that was laid out; `None` for an empty graph.
    ///
    /// This is the root id when the requested diagram fell back to it.
    pub fn diagram_id(&self) -> Option<&str> {
        self.diagram_id.as_deref()
    }

    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeSpec] {
        &self.edges
    }

    pub fn outcome(&self) -> LayoutOutcome {
        self.outcome
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Smallest box containing every node.
    pub fn bounds(&self) -> Bounds {
        let mut nodes = self.nodes.iter();
        let Some(first) = nodes.next() else {
            return Bounds::default();
        };
        nodes.fold(first.bounds(), |acc, node| acc.merge(&node.bounds()))
    }
}

/// Computes positioned graphs for registered diagrams.
pub struct LayoutOrchestrator {
    registry: Arc<DiagramRegistry>,
    engine: Arc<dyn LayoutEngine>,
    global_options: LayoutOptions,
    responsive: ResponsivePolicy,
    dimensions: DimensionTable,
}

impl std::fmt::Debug for LayoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOrchestrator")
            .field("diagrams", &self.registry.len())
            .field("global_options", &self.global_options)
            .field("responsive", &self.responsive)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl LayoutOrchestrator {
    /// Creates an orchestrator with the default options, responsive policy
    /// and dimension table.
    pub fn new(registry: Arc<DiagramRegistry>, engine: Arc<dyn LayoutEngine>) -> Self {
        Self {
            registry,
            engine,
            global_options: default_layout_options(),
            responsive: ResponsivePolicy::default(),
            dimensions: DimensionTable::default(),
        }
    }

    /// Replaces the lowest-precedence option layer.
    pub fn with_global_options(mut self, options: LayoutOptions) -> Self {
        self.global_options = options;
        self
    }

    pub fn with_responsive_policy(mut self, policy: ResponsivePolicy) -> Self {
        self.responsive = policy;
        self
    }

    pub fn with_dimensions(mut self, dimensions: DimensionTable) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn registry(&self) -> &Arc<DiagramRegistry> {
        &self.registry
    }

    pub fn dimensions(&self) -> &DimensionTable {
        &self.dimensions
    }

    /// Merges the option layers for `definition` at container `width`.
    ///
    /// Precedence, lowest first: global options, the diagram's own options,
    /// responsive overrides.
    pub fn resolve_options(&self, definition: &DiagramDefinition, width: Option<f32>) -> LayoutOptions {
        let mut layers = vec![&self.global_options];
        layers.extend(definition.layout_options());
        if self.responsive.applies(width) {
            layers.push(self.responsive.overrides());
        }
        merge_layers(layers)
    }

    /// Lays out `diagram_id`, or the root diagram if it is not registered.
    pub async fn compute(&self, diagram_id: &str, width: Option<f32>) -> PositionedGraph {
        let Some((resolved_id, definition)) = self.resolve(diagram_id) else {
            return PositionedGraph::empty();
        };

        let options = self.resolve_options(definition, width);
        debug!(diagram_id = resolved_id, width:?, options:%; "Resolved layout options");

        let sizes = self.node_sizes(definition);
        let request = LayoutRequest::new(
            definition
                .nodes()
                .iter()
                .zip(&sizes)
                .map(|(node, size)| RequestNode::new(node.id(), *size, node.label()))
                .collect(),
            definition
                .edges()
                .iter()
                .map(|edge| RequestEdge::new(edge.id(), edge.source(), edge.target()))
                .collect(),
            options,
        );
        trace!(
            nodes = request.nodes().len(),
            edges = request.edges().len();
            "Invoking layout engine"
        );

        match self.engine.layout(request).await {
            Ok(response) => {
                let nodes = apply_placements(definition, &sizes, response);
                info!(diagram_id = resolved_id, nodes = nodes.len(); "Layout complete");
                PositionedGraph::new(
                    resolved_id,
                    nodes,
                    definition.edges().to_vec(),
                    LayoutOutcome::Positioned,
                )
            }
            Err(err) => {
                error!(diagram_id = resolved_id, err:%; "Layout engine failed, keeping registered positions");
                self.unpositioned(resolved_id, definition)
            }
        }
    }

    /// The graph shown when a layout pass for `diagram_id` cannot complete.
    ///
    /// Nodes keep their registered positions and get table sizes.
    pub fn degraded(&self, diagram_id: &str) -> PositionedGraph {
        match self.resolve(diagram_id) {
            Some((resolved_id, definition)) => self.unpositioned(resolved_id, definition),
            None => PositionedGraph::empty(),
        }
    }

    fn resolve<'a>(&'a self, diagram_id: &'a str) -> Option<(&'a str, &'a DiagramDefinition)> {
        if let Some(definition) = self.registry.lookup(diagram_id) {
            return Some((diagram_id, definition));
        }

        match self.registry.lookup(ROOT_DIAGRAM_ID) {
            Some(definition) => {
                warn!(diagram_id; "Diagram not registered, showing the root diagram");
                Some((ROOT_DIAGRAM_ID, definition))
            }
            None => {
                error!(diagram_id; "Neither the diagram nor the root diagram is registered");
                None
            }
        }
    }

    fn node_sizes(&self, definition: &DiagramDefinition) -> Vec<Size> {
        definition
            .nodes()
            .iter()
            .map(|node| self.dimensions.resolve(node.style_class()))
            .collect()
    }

    fn unpositioned(&self, diagram_id: &str, definition: &DiagramDefinition) -> PositionedGraph {
        let nodes = definition
            .nodes()
            .iter()
            .zip(self.node_sizes(definition))
            .map(|(node, size)| PositionedNode::new(node.clone(), size))
            .collect();

        PositionedGraph::new(
            diagram_id,
            nodes,
            definition.edges().to_vec(),
            LayoutOutcome::Degraded,
        )
    }
}

/// Copies the registered nodes with the engine's positions and sizes.
///
/// A node the engine did not place ends up at the origin with its table size.
fn apply_placements(
    definition: &DiagramDefinition,
    sizes: &[Size],
    response: LayoutResponse,
) -> Vec<PositionedNode> {
    let mut placements: HashMap<String, _> = response
        .into_placements()
        .into_iter()
        .map(|placement| (placement.id().to_string(), placement))
        .collect();

    definition
        .nodes()
        .iter()
        .zip(sizes)
        .map(|(node, &size)| match placements.remove(node.id()) {
            Some(placement) => PositionedNode::new(
                node.clone().with_position(placement.position()),
                placement.size().unwrap_or(size),
            ),
            None => {
                debug!(node_id = node.id(); "Engine returned no placement for node");
                PositionedNode::new(node.clone().with_position(Point::default()), size)
            }
        })
        .collect()
}
