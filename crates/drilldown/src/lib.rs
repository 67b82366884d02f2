//! Drilldown - navigable drill-down diagrams.
//!
//! A set of diagrams is registered under string ids. The diagram shown at any
//! time is selected by a shared navigation state; activating a node whose id
//! names another registered diagram drills down into it. The shown diagram is
//! laid out by an asynchronous engine on first mount, on every navigation and
//! after each burst of container resizes.
//!
//! # Overview
//!
//! - [`registry`] - The [`DiagramRegistry`](registry::DiagramRegistry) keyed by diagram id
//! - [`factory`] - Flattens nested tree descriptions into registered diagrams
//! - [`catalog`] - Loads diagrams and trees from TOML
//! - [`navigation`] - Current diagram id and the node click dispatcher
//! - [`layout`] - Layout orchestration, built-in engines and the layout driver
//! - [`export`] - SVG output of positioned diagrams
//! - [`config`] - Layout and dimension configuration

pub mod catalog;
pub mod config;
pub mod export;
pub mod factory;
pub mod layout;
pub mod navigation;
pub mod registry;

mod error;

pub use drilldown_core::{diagram, dimension, geometry, options};

pub use error::DrilldownError;

use std::{sync::Arc, time::Duration};

use log::{debug, info};

use config::AppConfig;
use layout::{EngineSet, LayoutDriver, LayoutEngine, LayoutOrchestrator, PositionedGraph};
use navigation::{ClickOutcome, NavigationState, NodeClickDispatcher};
use registry::DiagramRegistry;

/// Wires a populated registry to navigation, click handling and layout.
///
/// # Examples
///
/// ```rust,no_run
/// use drilldown::{Explorer, catalog::load_catalog, config::AppConfig, registry::DiagramRegistry};
///
/// # async fn demo(source: &str) -> Result<(), drilldown::DrilldownError> {
/// let mut registry = DiagramRegistry::new();
/// load_catalog(source, &mut registry)?;
///
/// let explorer = Explorer::new(registry, &AppConfig::default());
/// let driver = explorer.mount(Some(1280.0));
/// driver.settled("root").await?;
///
/// explorer.on_node_activated("komponenten");
/// let view = driver.settled("komponenten").await?;
/// println!("{} nodes", view.graph().nodes().len());
///
/// driver.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Explorer {
    registry: Arc<DiagramRegistry>,
    navigation: NavigationState,
    dispatcher: NodeClickDispatcher,
    orchestrator: Arc<LayoutOrchestrator>,
    debounce: Duration,
}

impl Explorer {
    /// Creates an explorer that lays out with the built-in engines.
    pub fn new(registry: DiagramRegistry, config: &AppConfig) -> Self {
        Self::with_engine(registry, config, Arc::new(EngineSet::new()))
    }

    /// Creates an explorer that lays out with `engine`.
    pub fn with_engine(
        registry: DiagramRegistry,
        config: &AppConfig,
        engine: Arc<dyn LayoutEngine>,
    ) -> Self {
        let registry = Arc::new(registry);
        let navigation = NavigationState::new();
        let dispatcher = NodeClickDispatcher::new(Arc::clone(&registry), navigation.clone());
        let orchestrator = LayoutOrchestrator::new(Arc::clone(&registry), engine)
            .with_global_options(config.layout().global_options())
            .with_responsive_policy(config.layout().responsive_policy())
            .with_dimensions(config.dimensions().clone());
        info!(diagrams = registry.len(); "Explorer created");

        Self {
            registry,
            navigation,
            dispatcher,
            orchestrator: Arc::new(orchestrator),
            debounce: config.layout().resize_debounce(),
        }
    }

    pub fn registry(&self) -> &DiagramRegistry {
        &self.registry
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn orchestrator(&self) -> &Arc<LayoutOrchestrator> {
        &self.orchestrator
    }

    /// Returns the id of the diagram currently selected.
    pub fn current_diagram(&self) -> String {
        self.navigation.current()
    }

    /// Handles activation of a node in the shown diagram.
    pub fn on_node_activated(&self, node_id: &str) -> ClickOutcome {
        self.dispatcher.on_node_activated(node_id)
    }

    /// Navigates back to the root diagram.
    pub fn go_back_to_root(&self) {
        self.navigation.go_to_root();
    }

    /// Lays out the current diagram once, outside of any driver.
    pub async fn layout_current(&self, width: Option<f32>) -> PositionedGraph {
        let diagram_id = self.current_diagram();
        debug!(diagram_id = diagram_id.as_str(), width:?; "One-off layout");
        self.orchestrator.compute(&diagram_id, width).await
    }

    /// Starts a layout driver that follows this explorer's navigation.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn mount(&self, initial_width: Option<f32>) -> LayoutDriver {
        LayoutDriver::spawn(
            Arc::clone(&self.orchestrator),
            &self.navigation,
            initial_width,
            self.debounce,
        )
    }
}
