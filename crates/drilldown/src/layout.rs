//! Layout pipeline for the active diagram.
//!
//! # Pipeline Position
//!
//! ```text
//! NavigationState (current diagram id)
//!     ↓ LayoutDriver: first mount, navigation, debounced resize
//! LayoutOrchestrator
//!     ↓ registry lookup, option layering, dimension lookup
//! LayoutEngine (async, may fail)
//!     ↓
//! PositionedGraph → rendering collaborator
//! ```
//!
//! # Submodules
//!
//! - [`engine`] - The [`LayoutEngine`] capability and its request/response types
//! - `engines` - Built-in engines behind [`EngineSet`]
//! - `orchestrator` - One layout pass: [`LayoutOrchestrator::compute`]
//! - `driver` - Recomputation triggers and result publishing: [`LayoutDriver`]

pub mod engine;
mod driver;
mod engines;
mod orchestrator;

pub use driver::{LayoutDriver, LayoutView};
pub use engine::{EngineError, LayoutEngine, LayoutRequest, LayoutResponse, NodePlacement};
pub use engines::{DEFAULT_SPACING, Direction, EngineSet, LAYERED, MRTREE, SugiyamaEngine, TreeEngine};
pub use orchestrator::{
    DEFAULT_RESPONSIVE_THRESHOLD, LayoutOrchestrator, LayoutOutcome, PositionedGraph,
    PositionedNode, ResponsivePolicy, default_layout_options, default_responsive_options,
};
