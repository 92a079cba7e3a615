use std::collections::HashSet;

use anyhow::Result;
use eframe::egui::{Align2, Color32, Pos2, Stroke, vec2};

use super::render_utils::{
    CANDIDATE_HALO_COLOR, LINK_COLOR, LINK_LABEL_COLOR, NODE_LABEL_COLOR, OUTLINE_COLOR,
    SELECTED_OUTLINE_COLOR,
};
use super::{InteractionState, SimGraph};

pub(in crate::app) type DrawResult = Result<()>;

const LINK_WIDTH: f32 = 2.0;
const LINK_LABEL_SIZE: f32 = 10.0;
const LINK_LABEL_LIFT: f32 = 5.0;
const NODE_LABEL_SIZE: f32 = 12.0;
const NODE_LABEL_GAP: f32 = 15.0;
const OUTLINE_WIDTH: f32 = 1.0;
const SELECTED_OUTLINE_WIDTH: f32 = 3.0;
const CANDIDATE_HALO_GAP: f32 = 4.0;

/// Drawing target in logical surface units.
pub(in crate::app) trait Surface {
    fn clear(&mut self) -> DrawResult;

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) -> DrawResult;

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) -> DrawResult;

    fn text(
        &mut self,
        anchor: Pos2,
        align: Align2,
        text: &str,
        size: f32,
        color: Color32,
    ) -> DrawResult;
}

/// Draws one frame: links with their type labels, then nodes with outlines and names.
///
/// `candidates` are search candidates to ring while nothing is selected.
pub(in crate::app) fn render_frame(
    surface: &mut impl Surface,
    graph: &SimGraph,
    interaction: &InteractionState,
    candidates: Option<&HashSet<usize>>,
) -> DrawResult {
    surface.clear()?;

    let link_stroke = Stroke::new(LINK_WIDTH, LINK_COLOR);
    for link in &graph.links {
        let from = graph.nodes[link.source].position;
        let to = graph.nodes[link.target].position;
        surface.line(from, to, link_stroke)?;

        let midpoint = from + (to - from) * 0.5;
        surface.text(
            midpoint - vec2(0.0, LINK_LABEL_LIFT),
            Align2::CENTER_BOTTOM,
            &link.suffix,
            LINK_LABEL_SIZE,
            LINK_LABEL_COLOR,
        )?;
    }

    let show_candidates = interaction.selected.is_none();
    for (index, node) in graph.nodes.iter().enumerate() {
        if show_candidates && candidates.is_some_and(|matches| matches.contains(&index)) {
            surface.circle(
                node.position,
                node.radius + CANDIDATE_HALO_GAP,
                Color32::TRANSPARENT,
                Stroke::new(2.0, CANDIDATE_HALO_COLOR),
            )?;
        }

        let outline = if interaction.selected == Some(index) {
            Stroke::new(SELECTED_OUTLINE_WIDTH, SELECTED_OUTLINE_COLOR)
        } else {
            Stroke::new(OUTLINE_WIDTH, OUTLINE_COLOR)
        };
        surface.circle(node.position, node.radius, node.category.color(), outline)?;

        surface.text(
            node.position + vec2(0.0, node.radius + NODE_LABEL_GAP),
            Align2::CENTER_BOTTOM,
            &node.label,
            NODE_LABEL_SIZE,
            NODE_LABEL_COLOR,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::render_utils::NodeCategory;
    use super::super::test_support::{DrawOp, RecordingSurface, build_graph};
    use super::*;

    fn two_node_graph() -> SimGraph {
        let mut graph = build_graph(json!({
            "nodes": [
                { "id": "A", "labels": ["Class"], "properties": { "label": "NetworkElementType" } },
                { "id": "B", "labels": ["Individual"] }
            ],
            "relationships": [{ "source": "A", "target": "B", "type": "http://x#linksTo" }]
        }));
        graph.nodes[0].position = pos2(100.0, 100.0);
        graph.nodes[1].position = pos2(300.0, 200.0);
        graph
    }

    #[test]
    fn draws_links_before_nodes_with_labels() {
        let graph = two_node_graph();
        let mut surface = RecordingSurface::default();

        render_frame(&mut surface, &graph, &InteractionState::default(), None).unwrap();

        assert_eq!(surface.ops[0], DrawOp::Clear);
        assert_eq!(
            surface.ops[1],
            DrawOp::Line {
                from: pos2(100.0, 100.0),
                to: pos2(300.0, 200.0),
                stroke: Stroke::new(2.0, LINK_COLOR),
            }
        );
        assert_eq!(
            surface.ops[2],
            DrawOp::Text {
                anchor: pos2(200.0, 145.0),
                text: "linksTo".to_owned(),
                color: LINK_LABEL_COLOR,
            }
        );
        assert_eq!(surface.texts(), vec!["linksTo", "NetworkElementT", "Individual"]);
        assert_eq!(surface.ops.len(), 7);
    }

    #[test]
    fn fills_by_category_and_outlines_selection() {
        let graph = two_node_graph();
        let interaction = InteractionState {
            selected: Some(1),
            ..InteractionState::default()
        };
        let mut surface = RecordingSurface::default();

        render_frame(&mut surface, &graph, &interaction, None).unwrap();

        let circles = surface
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { fill, stroke, .. } => Some((*fill, *stroke)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            circles,
            vec![
                (NodeCategory::Class.color(), Stroke::new(1.0, OUTLINE_COLOR)),
                (
                    NodeCategory::Individual.color(),
                    Stroke::new(3.0, SELECTED_OUTLINE_COLOR)
                ),
            ]
        );
    }

    #[test]
    fn rings_candidates_only_without_selection() {
        let graph = two_node_graph();
        let candidates = HashSet::from([1]);
        let mut surface = RecordingSurface::default();

        render_frame(
            &mut surface,
            &graph,
            &InteractionState::default(),
            Some(&candidates),
        )
        .unwrap();
        let ringed = surface
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { radius, .. } if *radius > 20.0))
            .count();
        assert_eq!(ringed, 1);

        let selected = InteractionState {
            selected: Some(0),
            ..InteractionState::default()
        };
        render_frame(&mut surface, &graph, &selected, Some(&candidates)).unwrap();
        assert!(
            surface
                .ops
                .iter()
                .all(|op| !matches!(op, DrawOp::Circle { radius, .. } if *radius > 20.0))
        );
    }

    #[test]
    fn surface_errors_propagate() {
        let graph = two_node_graph();
        let mut surface = RecordingSurface {
            fail_on_text: true,
            ..RecordingSurface::default()
        };

        assert!(render_frame(&mut surface, &graph, &InteractionState::default(), None).is_err());
    }
}
