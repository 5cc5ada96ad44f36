use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, vec2};

use crate::doc::{EdgeRecord, KIND_ROWS, NodeRecord};
use crate::util::truncate_label;

use super::super::inspect::display_label;
use super::super::{EdgeMode, RowLabel, Scene, SceneCard, SceneEdge, ViewModel};

pub(in crate::app) const CARD_WIDTH: f32 = 200.0;
pub(in crate::app) const CARD_HEIGHT: f32 = 44.0;
pub(in crate::app) const CARD_GAP: f32 = 18.0;
pub(in crate::app) const ROW_HEIGHT: f32 = 104.0;
pub(in crate::app) const TOP_MARGIN: f32 = 64.0;
pub(in crate::app) const LEFT_MARGIN: f32 = 24.0;

impl ViewModel {
    fn visible_nodes(&self) -> Vec<&NodeRecord> {
        let term = self.search.trim().to_lowercase();

        self.graph
            .nodes
            .iter()
            .filter(|node| self.kind_filter.is_none_or(|kind| node.kind == kind))
            .filter(|node| node.effective_confidence() >= self.min_confidence)
            .filter(|node| {
                if term.is_empty() {
                    return true;
                }
                if node.label.to_lowercase().contains(&term) {
                    return true;
                }
                node.meta
                    .path
                    .as_deref()
                    .is_some_and(|path| path.to_lowercase().contains(&term))
            })
            .collect()
    }

    pub(in crate::app) fn rebuild_scene(&mut self) {
        self.scene_revision = self.scene_revision.wrapping_add(1);
        self.search_result_cache = None;

        let visible = self.visible_nodes();
        let positions = layout_positions(&visible);
        let edges = resolve_edges(
            &self.graph.edges,
            &positions,
            self.edge_mode,
            self.selected.as_deref(),
        );

        let cards = visible
            .iter()
            .filter_map(|node| {
                let top_left = positions.get(&node.id)?;
                Some(SceneCard {
                    id: node.id.clone(),
                    kind: node.kind,
                    title: truncate_label(display_label(node)),
                    hover: card_hover_text(node),
                    rect: Rect::from_min_size(*top_left, vec2(CARD_WIDTH, CARD_HEIGHT)),
                })
            })
            .collect::<Vec<_>>();

        let rows = KIND_ROWS
            .iter()
            .enumerate()
            .map(|(row, &kind)| RowLabel {
                kind,
                y: TOP_MARGIN + (row as f32 * ROW_HEIGHT),
            })
            .collect::<Vec<_>>();

        self.visible_node_count = cards.len();
        self.visible_edge_count = edges.len();
        self.scene_cache = Some(Scene { cards, edges, rows });
        self.scene_dirty = false;
    }
}

fn layout_positions(nodes: &[&NodeRecord]) -> HashMap<String, Pos2> {
    let mut next_slot = [0usize; KIND_ROWS.len()];
    let mut positions = HashMap::with_capacity(nodes.len());

    for node in nodes {
        let row = node.kind.row_index();
        let slot = next_slot[row];
        next_slot[row] += 1;

        positions.insert(
            node.id.clone(),
            Pos2::new(
                LEFT_MARGIN + (slot as f32 * (CARD_WIDTH + CARD_GAP)),
                TOP_MARGIN + (row as f32 * ROW_HEIGHT),
            ),
        );
    }

    positions
}

fn resolve_edges(
    edges: &[EdgeRecord],
    positions: &HashMap<String, Pos2>,
    mode: EdgeMode,
    selected: Option<&str>,
) -> Vec<SceneEdge> {
    edges
        .iter()
        .filter_map(|edge| {
            let from = positions.get(&edge.source)?;
            let to = positions.get(&edge.target)?;

            let incident = selected.is_some_and(|id| edge.source == id || edge.target == id);
            let eligible = match mode {
                EdgeMode::None => false,
                EdgeMode::All => true,
                EdgeMode::Selected => incident,
            };

            eligible.then(|| SceneEdge {
                from: card_center(*from),
                to: card_center(*to),
                incident,
            })
        })
        .collect()
}

fn card_center(top_left: Pos2) -> Pos2 {
    Pos2::new(
        top_left.x + (CARD_WIDTH * 0.5),
        top_left.y + (CARD_HEIGHT * 0.5),
    )
}

fn card_hover_text(node: &NodeRecord) -> String {
    let mut lines = vec![display_label(node).to_string()];
    lines.push(format!("kind: {}", node.kind.label()));

    if let Some(path) = node.meta.path.as_deref()
        && !path.is_empty()
    {
        lines.push(format!("path: {path}"));
    }
    if let Some(confidence) = node
        .reasoning
        .as_ref()
        .and_then(|reasoning| reasoning.confidence)
    {
        lines.push(format!("confidence: {confidence:.2}"));
    }

    lines.join("\n")
}
