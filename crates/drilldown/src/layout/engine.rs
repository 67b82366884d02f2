//! The layout engine capability.
//!
//! A [`LayoutEngine`] receives node ids with their resolved sizes and labels,
//! the edge endpoint pairs and the merged option map, and answers with one
//! placement per node it managed to place. The call is asynchronous and may
//! fail; callers treat an [`EngineError`] as "leave the nodes where they are".

use async_trait::async_trait;
use thiserror::Error;

use drilldown_core::{
    geometry::{Point, Size},
    options::LayoutOptions,
};

/// A node as seen by the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestNode {
    id: String,
    size: Size,
    label: String,
}

impl RequestNode {
    pub fn new(id: impl Into<String>, size: Size, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size,
            label: label.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// An edge as seen by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEdge {
    id: String,
    source: String,
    target: String,
}

impl RequestEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Input of a single layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    nodes: Vec<RequestNode>,
    edges: Vec<RequestEdge>,
    options: LayoutOptions,
}

impl LayoutRequest {
    pub fn new(nodes: Vec<RequestNode>, edges: Vec<RequestEdge>, options: LayoutOptions) -> Self {
        Self {
            nodes,
            edges,
            options,
        }
    }

    pub fn nodes(&self) -> &[RequestNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RequestEdge] {
        &self.edges
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }
}

/// Where the engine put one node.
///
/// `position` is the top-left corner. `size` is only set when the engine
/// decided on a size different from the requested one.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    id: String,
    position: Point,
    size: Option<Size>,
}

impl NodePlacement {
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            size: None,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }
}

/// Output of a successful layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResponse {
    placements: Vec<NodePlacement>,
}

impl LayoutResponse {
    pub fn new(placements: Vec<NodePlacement>) -> Self {
        Self { placements }
    }

    pub fn placements(&self) -> &[NodePlacement] {
        &self.placements
    }

    pub fn into_placements(self) -> Vec<NodePlacement> {
        self.placements
    }
}

impl FromIterator<NodePlacement> for LayoutResponse {
    fn from_iter<I: IntoIterator<Item = NodePlacement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ways a layout pass can fail.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported layout algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("invalid value `{value}` for layout option `{key}`")]
    InvalidOption { key: String, value: String },

    #[error("layout failed: {0}")]
    Failed(String),

    #[error("layout engine panicked: {0}")]
    Panicked(String),

    #[error("layout task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Computes node coordinates for a graph.
#[async_trait]
pub trait LayoutEngine: Send + Sync {
    /// Lays out `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the options are not understood or the
    /// algorithm could not produce a result.
    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResponse, EngineError>;
}
