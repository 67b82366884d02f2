use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, info};
use svg::{
    Document,
    node::{
        Text as TextNode,
        element::{Group, Line, Rectangle, Text},
    },
};

use drilldown_core::geometry::{Point, Size};

use crate::{
    export::{self, Exporter},
    layout::{LayoutOutcome, PositionedGraph, PositionedNode},
};

/// Blank space around the diagram content.
pub const DEFAULT_MARGIN: f32 = 50.0;

const FONT_SIZE: f32 = 14.0;

/// Writes a [`PositionedGraph`] to an SVG file.
///
/// Nodes become labelled rectangles tagged with their id and style classes;
/// edges are straight lines between node centres, drawn underneath.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    output: PathBuf,
    margin: f32,
}

impl SvgExporter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Builds the SVG document for `graph`.
    ///
    /// Content is shifted so that its top-left corner sits at `(margin, margin)`.
    pub fn render(&self, graph: &PositionedGraph) -> Document {
        let bounds = graph.bounds();
        let offset = Point::new(self.margin - bounds.min_x(), self.margin - bounds.min_y());
        let canvas = Size::new(
            self.margin.mul_add(2.0, bounds.width()),
            self.margin.mul_add(2.0, bounds.height()),
        );
        debug!(width = canvas.width(), height = canvas.height(); "SVG canvas size");

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", canvas.width(), canvas.height()),
            )
            .set("width", canvas.width())
            .set("height", canvas.height());

        if let Some(diagram_id) = graph.diagram_id() {
            doc = doc.set("data-diagram-id", diagram_id);
        }
        if graph.outcome() == LayoutOutcome::Degraded {
            doc = doc.set("data-layout", "degraded");
        }

        let mut edges = Group::new().set("class", "edges");
        for edge in graph.edges() {
            let (Some(source), Some(target)) = (graph.node(edge.source()), graph.node(edge.target()))
            else {
                continue;
            };
            let from = source.bounds().center().add_point(offset);
            let to = target.bounds().center().add_point(offset);
            edges = edges.add(
                Line::new()
                    .set("data-edge-id", edge.id())
                    .set("x1", from.x())
                    .set("y1", from.y())
                    .set("x2", to.x())
                    .set("y2", to.y())
                    .set("stroke", "#555555")
                    .set("stroke-width", 1.5),
            );
        }

        let nodes = graph
            .nodes()
            .iter()
            .fold(Group::new().set("class", "nodes"), |group, node| {
                group.add(render_node(node, offset))
            });

        doc.add(edges).add(nodes)
    }

    fn write_document(&self, doc: &Document) -> Result<(), export::Error> {
        let file_name = self.output.display();
        info!(file_name:%; "Creating SVG file");

        let f = match File::create(&self.output) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name:%, err:%; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&f, "{doc}") {
            error!(file_name:%, err:%; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

impl Exporter for SvgExporter {
    fn export_graph(&mut self, graph: &PositionedGraph) -> Result<(), export::Error> {
        if graph.outcome() == LayoutOutcome::Empty {
            return Err(export::Error::Render(
                "no diagram is available to export".to_string(),
            ));
        }

        let doc = self.render(graph);
        debug!("SVG document rendered");

        self.write_document(&doc)
    }
}

fn render_node(node: &PositionedNode, offset: Point) -> Group {
    let top_left = node.position().add_point(offset);
    let size = node.size();
    let center = node.bounds().center().add_point(offset);

    let class = match node.node().style_class() {
        Some(style_class) => format!("node {style_class}"),
        None => "node".to_string(),
    };

    let frame = Rectangle::new()
        .set("x", top_left.x())
        .set("y", top_left.y())
        .set("width", size.width())
        .set("height", size.height())
        .set("rx", 6.0)
        .set("fill", "white")
        .set("stroke", "#333333")
        .set("stroke-width", 1.0);

    let label = Text::new("")
        .set("x", center.x())
        .set("y", center.y())
        .set("text-anchor", "middle")
        .set("dominant-baseline", "central")
        .set("font-family", "Arial")
        .set("font-size", FONT_SIZE)
        .add(TextNode::new(node.node().label()));

    Group::new()
        .set("class", class)
        .set("data-node-id", node.id())
        .add(frame)
        .add(label)
}
