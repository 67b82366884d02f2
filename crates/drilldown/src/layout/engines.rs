//! Built-in layout engines.
//!
//! [`EngineSet`] is the default [`LayoutEngine`]: it reads the `algorithm`
//! option and hands the request to one of the built-in engines.
//!
//! | `algorithm` | engine            |
//! |-------------|-------------------|
//! | `mrtree`    | [`TreeEngine`]     |
//! | `layered`   | [`SugiyamaEngine`] |
//!
//! Both engines first place nodes in an axis-aligned frame where the main
//! axis follows the edges and the cross axis separates siblings, then map
//! that frame onto x/y according to the `direction` option.

mod sugiyama;
mod tree;

pub use sugiyama::SugiyamaEngine;
pub use tree::TreeEngine;

use async_trait::async_trait;
use log::debug;

use drilldown_core::{
    geometry::{Point, Size},
    options::{LayoutOptions, keys},
};

use super::engine::{
    EngineError, LayoutEngine, LayoutRequest, LayoutResponse, NodePlacement, RequestNode,
};

/// Value of the `algorithm` option selecting [`TreeEngine`].
pub const MRTREE: &str = "mrtree";

/// Value of the `algorithm` option selecting [`SugiyamaEngine`].
pub const LAYERED: &str = "layered";

/// Spacing used when a spacing option is absent.
pub const DEFAULT_SPACING: f32 = 60.0;

/// Dispatches requests to the built-in engines by the `algorithm` option.
///
/// A request without an `algorithm` option is laid out as a tree.
#[derive(Debug, Default)]
pub struct EngineSet {
    tree: TreeEngine,
    layered: SugiyamaEngine,
}

impl EngineSet {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayoutEngine for EngineSet {
    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResponse, EngineError> {
        let algorithm = request
            .options()
            .get(keys::ALGORITHM)
            .unwrap_or(MRTREE)
            .to_string();
        debug!(algorithm = algorithm.as_str(); "Selecting layout engine");

        match algorithm.as_str() {
            MRTREE => self.tree.layout(request).await,
            LAYERED => self.layered.layout(request).await,
            _ => Err(EngineError::UnsupportedAlgorithm(algorithm)),
        }
    }
}

/// Flow direction of edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Down,
    Up,
    Right,
    Left,
}

impl Direction {
    /// Reads the `direction` option, defaulting to [`Direction::Down`].
    fn from_options(options: &LayoutOptions) -> Result<Self, EngineError> {
        let Some(value) = options.get(keys::DIRECTION) else {
            return Ok(Self::default());
        };

        match value.trim().to_ascii_uppercase().as_str() {
            "DOWN" => Ok(Self::Down),
            "UP" => Ok(Self::Up),
            "RIGHT" => Ok(Self::Right),
            "LEFT" => Ok(Self::Left),
            _ => Err(EngineError::InvalidOption {
                key: keys::DIRECTION.to_string(),
                value: value.to_string(),
            }),
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Self::Down | Self::Up)
    }

    /// Converts a node size into the (cross, main) frame.
    fn to_frame(self, size: Size) -> Size {
        if self.is_vertical() {
            size
        } else {
            size.transpose()
        }
    }
}

/// Engine settings shared by the built-in engines.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Settings {
    direction: Direction,
    /// Gap between neighbours on the cross axis.
    node_node: f32,
    /// Extra gap between consecutive levels, on top of `node_node`.
    edge_node: f32,
}

impl Settings {
    fn from_options(options: &LayoutOptions) -> Result<Self, EngineError> {
        Ok(Self {
            direction: Direction::from_options(options)?,
            node_node: spacing(options, keys::SPACING_NODE_NODE)?,
            edge_node: spacing(options, keys::SPACING_EDGE_NODE)?,
        })
    }

    fn level_gap(&self) -> f32 {
        self.node_node + self.edge_node
    }
}

fn spacing(options: &LayoutOptions, key: &str) -> Result<f32, EngineError> {
    let Some(value) = options.get(key) else {
        return Ok(DEFAULT_SPACING);
    };

    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|spacing| spacing.is_finite() && *spacing >= 0.0)
        .ok_or_else(|| EngineError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Top-left corner of a node in the (cross, main) frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FramePlacement {
    node: usize,
    cross: f32,
    main: f32,
}

/// Maps frame placements onto x/y for `direction`.
///
/// `UP` and `LEFT` mirror the main axis so the first level ends up at the
/// bottom or right edge of the drawing.
fn orient(
    nodes: &[RequestNode],
    placements: &[FramePlacement],
    direction: Direction,
) -> LayoutResponse {
    let main_extent = placements
        .iter()
        .map(|placement| placement.main + direction.to_frame(nodes[placement.node].size()).height())
        .fold(0.0_f32, f32::max);

    placements
        .iter()
        .map(|placement| {
            let node = &nodes[placement.node];
            let frame_size = direction.to_frame(node.size());
            let mirrored_main = main_extent - placement.main - frame_size.height();

            let position = match direction {
                Direction::Down => Point::new(placement.cross, placement.main),
                Direction::Up => Point::new(placement.cross, mirrored_main),
                Direction::Right => Point::new(placement.main, placement.cross),
                Direction::Left => Point::new(mirrored_main, placement.cross),
            };
            NodePlacement::new(node.id(), position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::layout::engine::RequestEdge;

    fn request(options: LayoutOptions) -> LayoutRequest {
        LayoutRequest::new(
            vec![
                RequestNode::new("a", Size::new(100.0, 40.0), "A"),
                RequestNode::new("b", Size::new(100.0, 40.0), "B"),
            ],
            vec![RequestEdge::new("e", "a", "b")],
            options,
        )
    }

    #[tokio::test]
    async fn test_dispatch_defaults_to_tree() {
        let response = EngineSet::new()
            .layout(request(LayoutOptions::new()))
            .await
            .unwrap();

        assert_eq!(response.placements().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_layered() {
        let response = EngineSet::new()
            .layout(request(LayoutOptions::new().with(keys::ALGORITHM, LAYERED)))
            .await
            .unwrap();

        assert_eq!(response.placements().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_algorithm_is_rejected() {
        let result = EngineSet::new()
            .layout(request(LayoutOptions::new().with(keys::ALGORITHM, "force")))
            .await;

        assert!(matches!(result, Err(EngineError::UnsupportedAlgorithm(name)) if name == "force"));
    }

    #[test]
    fn test_direction_parsing() {
        let parse = |value: &str| {
            Direction::from_options(&LayoutOptions::new().with(keys::DIRECTION, value))
        };

        assert_eq!(parse("DOWN").unwrap(), Direction::Down);
        assert_eq!(parse("right").unwrap(), Direction::Right);
        assert_eq!(Direction::from_options(&LayoutOptions::new()).unwrap(), Direction::Down);
        assert!(matches!(parse("sideways"), Err(EngineError::InvalidOption { .. })));
    }

    #[test]
    fn test_spacing_parsing() {
        let options = LayoutOptions::new()
            .with(keys::SPACING_NODE_NODE, "10")
            .with(keys::SPACING_EDGE_NODE, "wide");

        assert_approx_eq!(f32, spacing(&options, keys::SPACING_NODE_NODE).unwrap(), 10.0);
        assert!(matches!(
            spacing(&options, keys::SPACING_EDGE_NODE),
            Err(EngineError::InvalidOption { key, .. }) if key == keys::SPACING_EDGE_NODE
        ));
        assert_approx_eq!(f32, spacing(&LayoutOptions::new(), "missing").unwrap(), DEFAULT_SPACING);
    }

    #[test]
    fn test_negative_spacing_is_rejected() {
        let options = LayoutOptions::new().with(keys::SPACING_NODE_NODE, "-5");
        assert!(spacing(&options, keys::SPACING_NODE_NODE).is_err());
    }

    #[test]
    fn test_orient_mirrors_main_axis() {
        let nodes = [
            RequestNode::new("a", Size::new(100.0, 40.0), "A"),
            RequestNode::new("b", Size::new(100.0, 40.0), "B"),
        ];
        let placements = [
            FramePlacement { node: 0, cross: 0.0, main: 0.0 },
            FramePlacement { node: 1, cross: 0.0, main: 100.0 },
        ];

        let up = orient(&nodes, &placements, Direction::Up);
        assert_approx_eq!(f32, up.placements()[0].position().y(), 100.0);
        assert_approx_eq!(f32, up.placements()[1].position().y(), 0.0);

        let right = orient(&nodes, &placements, Direction::Right);
        assert_approx_eq!(f32, right.placements()[1].position().x(), 100.0);
        assert_approx_eq!(f32, right.placements()[1].position().y(), 0.0);
    }
}
