//! Tidy tree layout (`mrtree`).
//!
//! The graph is reduced to a spanning forest by breadth-first parent
//! assignment: nodes without incoming edges become roots in input order, and
//! any node still unvisited afterwards (it sits on a cycle) starts another
//! tree. Each subtree reserves a slot on the cross axis wide enough for
//! itself and its children; a parent is centred over its children and the
//! roots are laid side by side. Every depth forms one level on the main axis.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use log::debug;

use drilldown_core::geometry::Size;

use super::{FramePlacement, Settings, orient};
use crate::layout::engine::{EngineError, LayoutEngine, LayoutRequest, LayoutResponse};

/// Layered tree layout for hierarchies.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeEngine;

impl TreeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Lays out `request` synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOption`] for an unknown direction or a
    /// spacing that is not a non-negative number.
    pub fn arrange(&self, request: &LayoutRequest) -> Result<LayoutResponse, EngineError> {
        let settings = Settings::from_options(request.options())?;
        let frame_sizes: Vec<Size> = request
            .nodes()
            .iter()
            .map(|node| settings.direction.to_frame(node.size()))
            .collect();

        let forest = Forest::build(request);
        debug!(
            nodes = frame_sizes.len(),
            roots = forest.roots.len();
            "Arranging tree"
        );

        let placements = forest.place(&frame_sizes, &settings);
        Ok(orient(request.nodes(), &placements, settings.direction))
    }
}

#[async_trait]
impl LayoutEngine for TreeEngine {
    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResponse, EngineError> {
        self.arrange(&request)
    }
}

#[derive(Debug)]
struct Forest {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
    depth: Vec<usize>,
    /// Breadth-first visiting order; parents always precede their children.
    order: Vec<usize>,
}

impl Forest {
    fn build(request: &LayoutRequest) -> Self {
        let count = request.nodes().len();
        let index: HashMap<&str, usize> = request
            .nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id(), idx))
            .collect();

        let mut outgoing = vec![Vec::new(); count];
        let mut has_incoming = vec![false; count];
        for edge in request.edges() {
            let (Some(&source), Some(&target)) =
                (index.get(edge.source()), index.get(edge.target()))
            else {
                continue;
            };
            if source != target {
                outgoing[source].push(target);
                has_incoming[target] = true;
            }
        }

        let mut forest = Self {
            roots: Vec::new(),
            children: vec![Vec::new(); count],
            depth: vec![0; count],
            order: Vec::with_capacity(count),
        };
        let mut visited = vec![false; count];

        let candidates = (0..count).filter(|&idx| !has_incoming[idx]).chain(0..count);
        for root in candidates {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            forest.roots.push(root);

            let mut queue = VecDeque::from([root]);
            while let Some(parent) = queue.pop_front() {
                forest.order.push(parent);
                for &child in &outgoing[parent] {
                    if !visited[child] {
                        visited[child] = true;
                        forest.children[parent].push(child);
                        forest.depth[child] = forest.depth[parent] + 1;
                        queue.push_back(child);
                    }
                }
            }
        }

        forest
    }

    fn place(&self, frame_sizes: &[Size], settings: &Settings) -> Vec<FramePlacement> {
        let count = frame_sizes.len();

        // Children block width and full subtree width, computed bottom-up.
        let mut children_extent = vec![0.0_f32; count];
        let mut subtree_extent = vec![0.0_f32; count];
        for &node in self.order.iter().rev() {
            let children = &self.children[node];
            if !children.is_empty() {
                let widths: f32 = children.iter().map(|&child| subtree_extent[child]).sum();
                children_extent[node] = widths + settings.node_node * (children.len() - 1) as f32;
            }
            subtree_extent[node] = frame_sizes[node].width().max(children_extent[node]);
        }

        let level_count = self.depth.iter().max().map_or(0, |depth| depth + 1);
        let mut level_extent = vec![0.0_f32; level_count];
        for (node, size) in frame_sizes.iter().enumerate() {
            let level = &mut level_extent[self.depth[node]];
            *level = level.max(size.height());
        }
        let mut level_start = Vec::with_capacity(level_count);
        let mut cursor = 0.0_f32;
        for extent in &level_extent {
            level_start.push(cursor);
            cursor += extent + settings.level_gap();
        }

        let mut slot_start = vec![0.0_f32; count];
        let mut cursor = 0.0_f32;
        for &root in &self.roots {
            slot_start[root] = cursor;
            cursor += subtree_extent[root] + settings.node_node;
        }

        let mut placements = Vec::with_capacity(count);
        for &node in &self.order {
            let size = frame_sizes[node];
            let start = slot_start[node];
            let level = self.depth[node];

            placements.push(FramePlacement {
                node,
                cross: start + (subtree_extent[node] - size.width()) / 2.0,
                main: level_start[level] + (level_extent[level] - size.height()) / 2.0,
            });

            let mut child_cursor = start + (subtree_extent[node] - children_extent[node]) / 2.0;
            for &child in &self.children[node] {
                slot_start[child] = child_cursor;
                child_cursor += subtree_extent[child] + settings.node_node;
            }
        }

        placements
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use drilldown_core::{
        geometry::Point,
        options::{LayoutOptions, keys},
    };

    use super::*;
    use crate::layout::engine::{RequestEdge, RequestNode};

    fn node(id: &str) -> RequestNode {
        RequestNode::new(id, Size::new(100.0, 40.0), id)
    }

    fn edge(source: &str, target: &str) -> RequestEdge {
        RequestEdge::new(format!("{source}-{target}"), source, target)
    }

    fn positions(response: &LayoutResponse) -> HashMap<&str, Point> {
        response
            .placements()
            .iter()
            .map(|placement| (placement.id(), placement.position()))
            .collect()
    }

    fn assert_point(actual: Point, x: f32, y: f32) {
        assert_approx_eq!(f32, actual.x(), x);
        assert_approx_eq!(f32, actual.y(), y);
    }

    fn small_tree(options: LayoutOptions) -> LayoutRequest {
        LayoutRequest::new(
            vec![node("r"), node("a"), node("b")],
            vec![edge("r", "a"), edge("r", "b")],
            options,
        )
    }

    #[test]
    fn test_parent_centred_above_children() {
        let response = TreeEngine::new()
            .arrange(&small_tree(LayoutOptions::new()))
            .unwrap();
        let positions = positions(&response);

        assert_point(positions["r"], 80.0, 0.0);
        assert_point(positions["a"], 0.0, 160.0);
        assert_point(positions["b"], 160.0, 160.0);
    }

    #[test]
    fn test_direction_right() {
        let options = LayoutOptions::new().with(keys::DIRECTION, "RIGHT");
        let response = TreeEngine::new().arrange(&small_tree(options)).unwrap();
        let positions = positions(&response);

        assert_point(positions["r"], 0.0, 50.0);
        assert_point(positions["a"], 220.0, 0.0);
        assert_point(positions["b"], 220.0, 100.0);
    }

    #[test]
    fn test_spacing_options_are_used() {
        let options = LayoutOptions::new()
            .with(keys::SPACING_NODE_NODE, "10")
            .with(keys::SPACING_EDGE_NODE, "10");
        let response = TreeEngine::new().arrange(&small_tree(options)).unwrap();
        let positions = positions(&response);

        assert_point(positions["b"], 110.0, 60.0);
    }

    #[test]
    fn test_disconnected_roots_side_by_side() {
        let request = LayoutRequest::new(vec![node("a"), node("b")], vec![], LayoutOptions::new());

        let response = TreeEngine::new().arrange(&request).unwrap();
        let positions = positions(&response);

        assert_point(positions["a"], 0.0, 0.0);
        assert_point(positions["b"], 160.0, 0.0);
    }

    #[test]
    fn test_cycle_still_places_every_node() {
        let request = LayoutRequest::new(
            vec![node("a"), node("b"), node("c")],
            vec![edge("a", "b"), edge("b", "c"), edge("c", "a")],
            LayoutOptions::new(),
        );

        let response = TreeEngine::new().arrange(&request).unwrap();

        assert_eq!(response.placements().len(), 3);
        assert_point(positions(&response)["c"], 0.0, 320.0);
    }

    #[test]
    fn test_edges_to_unknown_nodes_are_ignored() {
        let request = LayoutRequest::new(
            vec![node("a")],
            vec![edge("a", "ghost"), edge("a", "a")],
            LayoutOptions::new(),
        );

        let response = TreeEngine::new().arrange(&request).unwrap();

        assert_eq!(response.placements().len(), 1);
    }

    #[test]
    fn test_empty_request() {
        let request = LayoutRequest::new(vec![], vec![], LayoutOptions::new());
        let response = TreeEngine::new().arrange(&request).unwrap();
        assert!(response.placements().is_empty());
    }

    #[test]
    fn test_invalid_spacing_is_an_error() {
        let options = LayoutOptions::new().with(keys::SPACING_NODE_NODE, "lots");
        let result = TreeEngine::new().arrange(&small_tree(options));
        assert!(matches!(result, Err(EngineError::InvalidOption { .. })));
    }
}
