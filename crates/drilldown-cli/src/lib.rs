//! Drilldown CLI library
//!
//! This module contains the core CLI logic: load a catalog, follow a path of
//! node activations from the root diagram, and export the diagram reached.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use error_adapter::{ErrorAdapter, Reportable, to_reportable};

use std::{fs, sync::Arc};

use log::{debug, info, warn};
use tokio::runtime;

use drilldown::{
    DrilldownError, Explorer,
    catalog::load_catalog,
    config::AppConfig,
    export::{Exporter, svg::SvgExporter},
    layout::{LayoutDriver, PositionedGraph},
    navigation::ClickOutcome,
    registry::DiagramRegistry,
};

/// Run the Drilldown CLI application
///
/// Registers the catalog, lays out the root diagram, activates each
/// `--click` node in turn and writes the diagram shown at the end as SVG.
/// A click on a node without a diagram of its own leaves the current
/// diagram in place.
///
/// # Errors
///
/// Returns `DrilldownError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Catalog syntax errors and rejected catalog entries
/// - Export errors, including a catalog without a root diagram
pub fn run(args: &Args) -> Result<(), DrilldownError> {
    info!(
        catalog_path = args.catalog,
        output_path = args.output;
        "Exploring catalog"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.catalog)?;
    let mut registry = DiagramRegistry::new();
    load_catalog(&source, &mut registry)?;

    let runtime = runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let graph = runtime.block_on(explore(registry, &app_config, args))?;

    SvgExporter::new(&args.output).export_graph(&graph)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

async fn explore(
    registry: DiagramRegistry,
    config: &AppConfig,
    args: &Args,
) -> Result<Arc<PositionedGraph>, DrilldownError> {
    let explorer = Explorer::new(registry, config);
    let driver = explorer.mount(args.width);

    let result = follow_clicks(&explorer, &driver, &args.clicks).await;
    driver.shutdown().await;
    result
}

async fn follow_clicks(
    explorer: &Explorer,
    driver: &LayoutDriver,
    clicks: &[String],
) -> Result<Arc<PositionedGraph>, DrilldownError> {
    let mut view = driver.settled(&explorer.current_diagram()).await?;

    for node_id in clicks {
        if view.graph().node(node_id).is_none() {
            warn!(node_id = node_id.as_str(); "Node is not part of the shown diagram");
        }

        match explorer.on_node_activated(node_id) {
            ClickOutcome::Navigated => {
                view = driver.settled(&explorer.current_diagram()).await?;
                debug!(
                    diagram_id = explorer.current_diagram(),
                    nodes = view.graph().nodes().len();
                    "Drilled down"
                );
            }
            ClickOutcome::Leaf => {
                warn!(node_id = node_id.as_str(); "Node has no diagram, staying on the current one");
            }
        }
    }

    Ok(Arc::clone(view.graph()))
}
