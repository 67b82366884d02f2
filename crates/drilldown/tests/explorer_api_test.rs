//! Integration tests for the Explorer API
//!
//! These tests drive catalogs through registration, navigation and layout
//! with the built-in engines.

use float_cmp::assert_approx_eq;

use drilldown::{
    Explorer,
    catalog::load_catalog,
    config::AppConfig,
    diagram::{DiagramDefinition, EdgeSpec, NodeData, NodeSpec},
    export::svg::SvgExporter,
    layout::{LayoutOutcome, PositionedGraph},
    navigation::ClickOutcome,
    registry::DiagramRegistry,
};

const CATALOG: &str = r#"
[[diagram]]
id = "root"

[[diagram.nodes]]
id = "komponenten"
data = { label = "Komponenten" }

[[diagram.nodes]]
id = "wetter"
data = { label = "Wetter" }

[[diagram.edges]]
id = "e1"
source = "wetter"
target = "komponenten"

[[diagram]]
id = "komponenten"
layout_options = { direction = "RIGHT" }

[[diagram.nodes]]
id = "k-hws"
class = "komponenten-node"
data = { label = "Heißwasserspeicher" }
"#;

fn tree_registry() -> DiagramRegistry {
    let mut registry = DiagramRegistry::new();
    let nodes = ["r", "a", "b", "c"]
        .into_iter()
        .map(|id| NodeSpec::new(id, NodeData::new(id.to_uppercase())))
        .collect();
    let edges = vec![
        EdgeSpec::new("e1", "r", "a"),
        EdgeSpec::new("e2", "r", "b"),
        EdgeSpec::new("e3", "b", "c"),
    ];
    registry
        .register("root", DiagramDefinition::new(nodes, edges))
        .unwrap();
    registry
}

fn assert_position(graph: &PositionedGraph, id: &str, x: f32, y: f32) {
    let node = graph.node(id).unwrap();
    assert_approx_eq!(f32, node.position().x(), x);
    assert_approx_eq!(f32, node.position().y(), y);
}

#[tokio::test]
async fn test_tree_layout_with_default_options() {
    let explorer = Explorer::new(tree_registry(), &AppConfig::default());

    let graph = explorer.layout_current(Some(1280.0)).await;

    assert_eq!(graph.outcome(), LayoutOutcome::Positioned);
    assert_eq!(graph.diagram_id(), Some("root"));
    assert_position(&graph, "r", 105.0, 0.0);
    assert_position(&graph, "a", 0.0, 170.0);
    assert_position(&graph, "b", 210.0, 170.0);
    assert_position(&graph, "c", 210.0, 340.0);
}

#[tokio::test]
async fn test_narrow_container_uses_tight_spacing() {
    let explorer = Explorer::new(tree_registry(), &AppConfig::default());

    let graph = explorer.layout_current(Some(500.0)).await;

    assert_position(&graph, "r", 80.0, 0.0);
    assert_position(&graph, "a", 0.0, 70.0);
    assert_position(&graph, "b", 160.0, 70.0);
    assert_position(&graph, "c", 160.0, 140.0);
}

#[tokio::test]
async fn test_empty_registry_yields_empty_graph() {
    let explorer = Explorer::new(DiagramRegistry::new(), &AppConfig::default());

    let graph = explorer.layout_current(None).await;

    assert_eq!(graph.outcome(), LayoutOutcome::Empty);
    assert!(graph.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drill_down_and_back() {
    let mut registry = DiagramRegistry::new();
    load_catalog(CATALOG, &mut registry).unwrap();
    let explorer = Explorer::new(registry, &AppConfig::default());
    let driver = explorer.mount(Some(1280.0));

    let view = driver.settled("root").await.unwrap();
    assert_eq!(view.graph().nodes().len(), 2);

    assert_eq!(explorer.on_node_activated("komponenten"), ClickOutcome::Navigated);
    let view = driver.settled("komponenten").await.unwrap();
    assert_eq!(view.graph().diagram_id(), Some("komponenten"));
    let node = view.graph().node("k-hws").unwrap();
    assert_approx_eq!(f32, node.size().width(), 470.0);

    assert_eq!(explorer.on_node_activated("k-hws"), ClickOutcome::Leaf);
    assert_eq!(explorer.current_diagram(), "komponenten");

    explorer.go_back_to_root();
    let view = driver.settled("root").await.unwrap();
    assert_eq!(view.graph().diagram_id(), Some("root"));

    driver.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_resize_relayouts_current_diagram() {
    let explorer = Explorer::new(tree_registry(), &AppConfig::default());
    let driver = explorer.mount(Some(1280.0));
    let first = driver.settled("root").await.unwrap();

    driver.notify_resize(500.0);
    let mut views = driver.subscribe();
    let view = views
        .wait_for(|view| view.generation() > first.generation() && !view.is_loading())
        .await
        .unwrap()
        .clone();

    assert_eq!(view.width(), Some(500.0));
    assert_position(view.graph(), "c", 160.0, 140.0);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_positioned_graph_exports_to_svg() {
    let explorer = Explorer::new(tree_registry(), &AppConfig::default());
    let graph = explorer.layout_current(None).await;

    let svg = SvgExporter::new("unused.svg").render(&graph).to_string();

    assert!(svg.contains("<svg"));
    assert!(svg.contains(r#"data-node-id="c""#));
    assert_eq!(svg.matches("<line").count(), 3);
}
