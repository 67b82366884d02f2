//! Layered layout (`layered`) backed by `rust-sugiyama`.
//!
//! `rust-sugiyama` assigns every connected component a grid of (x, level)
//! coordinates. The grid is scaled by the largest node and the spacing
//! options, components are laid side by side, and nodes that take part in no
//! edge are appended in a final row of their own.

use std::{collections::HashMap, panic};

use async_trait::async_trait;
use log::{debug, trace};
use rust_sugiyama::configure::Config;

use drilldown_core::geometry::Size;

use super::{FramePlacement, Settings, orient};
use crate::layout::engine::{EngineError, LayoutEngine, LayoutRequest, LayoutResponse};

const VERTEX_SPACING: f64 = 3.0;

/// Grid coordinates per connected component, keyed by node index.
type Components = Vec<Vec<(usize, (f64, f64))>>;

/// Sugiyama-style layered layout for arbitrary directed graphs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SugiyamaEngine;

impl SugiyamaEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LayoutEngine for SugiyamaEngine {
    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResponse, EngineError> {
        let settings = Settings::from_options(request.options())?;

        let pairs = index_pairs(&request);
        // Self-loops don't influence the layering.
        let edges: Vec<(u32, u32)> = pairs
            .iter()
            .filter(|(source, target)| source != target)
            .map(|&(source, target)| (source as u32, target as u32))
            .collect();

        debug!(
            nodes = request.nodes().len(),
            edges = edges.len();
            "Applying Sugiyama algorithm"
        );

        let components = if edges.is_empty() {
            Vec::new()
        } else {
            tokio::task::spawn_blocking(move || {
                panic::catch_unwind(move || {
                    let config = Config {
                        minimum_length: 1,
                        vertex_spacing: VERTEX_SPACING,
                        ..Default::default()
                    };
                    rust_sugiyama::from_edges(&edges, &config)
                        .into_iter()
                        .map(|(coords, _, _)| {
                            coords
                                .into_iter()
                                .map(|(vertex, (x, y))| (vertex as usize, (x as f64, y as f64)))
                                .collect()
                        })
                        .collect::<Components>()
                })
            })
            .await?
            .map_err(|payload| EngineError::Panicked(panic_message(payload.as_ref())))?
        };
        trace!(components = components.len(); "Sugiyama components computed");

        let frame_sizes: Vec<Size> = request
            .nodes()
            .iter()
            .map(|node| settings.direction.to_frame(node.size()))
            .collect();
        let placements = arrange_components(&components, &frame_sizes, &settings, &pairs)?;

        Ok(orient(request.nodes(), &placements, settings.direction))
    }
}

fn index_pairs(request: &LayoutRequest) -> Vec<(usize, usize)> {
    let index: HashMap<&str, usize> = request
        .nodes()
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id(), idx))
        .collect();
    request
        .edges()
        .iter()
        .filter_map(|edge| Some((*index.get(edge.source())?, *index.get(edge.target())?)))
        .collect()
}

/// Turns the per-component grids into frame placements.
fn arrange_components(
    components: &Components,
    frame_sizes: &[Size],
    settings: &Settings,
    edges: &[(usize, usize)],
) -> Result<Vec<FramePlacement>, EngineError> {
    let cell = frame_sizes
        .iter()
        .fold(Size::default(), |largest, size| largest.max(*size));
    let column_pitch = cell.width() + settings.node_node;
    let level_pitch = cell.height() + settings.level_gap();

    let mut placements = Vec::with_capacity(frame_sizes.len());
    let mut placed = vec![false; frame_sizes.len()];
    let mut component_start = 0.0_f32;
    let mut deepest_level = None;

    for coords in components {
        let mut grid: Vec<(usize, f64, i64)> = Vec::with_capacity(coords.len());
        for &(node, (x, y)) in coords {
            if node >= frame_sizes.len() {
                return Err(EngineError::Failed(format!(
                    "layout returned unknown vertex {node}"
                )));
            }
            grid.push((node, x / VERTEX_SPACING, (y / VERTEX_SPACING).round() as i64));
        }

        let levels = level_ranks(&grid, edges);
        let min_column = grid
            .iter()
            .map(|&(_, column, _)| column)
            .fold(f64::INFINITY, f64::min);
        let mut max_column = 0.0_f32;

        for &(node, column, level) in &grid {
            let column = (column - min_column) as f32;
            let rank = levels[&level];
            let size = frame_sizes[node];
            max_column = max_column.max(column);
            deepest_level = deepest_level.max(Some(rank));

            placements.push(FramePlacement {
                node,
                cross: component_start + column * column_pitch + (cell.width() - size.width()) / 2.0,
                main: rank as f32 * level_pitch + (cell.height() - size.height()) / 2.0,
            });
            placed[node] = true;
        }

        component_start += (max_column + 1.0) * column_pitch;
    }

    // Nodes without edges go into a row below everything else.
    let isolated_row = deepest_level.map_or(0, |level| level + 1) as f32 * level_pitch;
    let mut column = 0.0_f32;
    for (node, size) in frame_sizes.iter().enumerate() {
        if placed[node] {
            continue;
        }
        placements.push(FramePlacement {
            node,
            cross: column * column_pitch + (cell.width() - size.width()) / 2.0,
            main: isolated_row + (cell.height() - size.height()) / 2.0,
        });
        column += 1.0;
    }

    Ok(placements)
}

/// Maps raw level keys to dense ranks so that most edges point to a higher
/// rank, whatever sign convention the grid uses.
fn level_ranks(grid: &[(usize, f64, i64)], edges: &[(usize, usize)]) -> HashMap<i64, usize> {
    let mut keys: Vec<i64> = grid.iter().map(|&(_, _, level)| level).collect();
    keys.sort_unstable();
    keys.dedup();

    let node_level: HashMap<usize, i64> = grid.iter().map(|&(node, _, level)| (node, level)).collect();
    let (forward, backward) = edges
        .iter()
        .filter_map(|(source, target)| Some((*node_level.get(source)?, *node_level.get(target)?)))
        .fold((0, 0), |(forward, backward), (source, target)| {
            if source < target {
                (forward + 1, backward)
            } else if source > target {
                (forward, backward + 1)
            } else {
                (forward, backward)
            }
        });
    if backward > forward {
        keys.reverse();
    }

    keys.into_iter()
        .enumerate()
        .map(|(rank, key)| (key, rank))
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}
