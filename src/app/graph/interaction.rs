use std::collections::HashSet;

use eframe::egui::{Pos2, Vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use log::warn;

use super::super::{InteractionState, SimGraph};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum SearchOutcome {
    Blank,
    Found(usize),
    Miss,
}

/// First node, in snapshot order, whose center lies strictly within its radius of `pointer`.
///
/// Overlapping nodes resolve to the earliest one, not the nearest.
pub(in crate::app) fn hit_test(graph: &SimGraph, pointer: Pos2) -> Option<usize> {
    graph
        .nodes
        .iter()
        .position(|node| node.position.distance(pointer) < node.radius)
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Nodes whose label or id fuzzy-matches `query`; highlighted while the user types.
pub(in crate::app) fn fuzzy_candidates(graph: &SimGraph, query: &str) -> HashSet<usize> {
    let query = query.trim();
    if query.is_empty() {
        return HashSet::new();
    }

    let matcher = SkimMatcherV2::default();
    graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| {
            fuzzy_match_score(&matcher, &node.label, query).is_some()
                || fuzzy_match_score(&matcher, &node.node.id, query).is_some()
        })
        .map(|(index, _)| index)
        .collect()
}

impl InteractionState {
    /// Returns true when the selection changed.
    pub(in crate::app) fn pointer_down(&mut self, graph: &mut SimGraph, pointer: Pos2) -> bool {
        let previous = self.selected;
        match hit_test(graph, pointer) {
            Some(index) => {
                self.dragged = Some(index);
                self.selected = Some(index);
                graph.nodes[index].velocity = Vec2::ZERO;
            }
            None => {
                self.selected = None;
            }
        }
        previous != self.selected
    }

    pub(in crate::app) fn pointer_move(&mut self, graph: &mut SimGraph, pointer: Pos2) {
        let Some(index) = self.dragged else {
            return;
        };
        let bounds = graph.bounds;
        let Some(node) = graph.nodes.get_mut(index) else {
            self.dragged = None;
            return;
        };

        node.position = bounds.clamp(pointer, node.radius);
        node.velocity = Vec2::ZERO;
    }

    pub(in crate::app) fn pointer_up(&mut self) {
        self.dragged = None;
    }

    /// Selects the first node whose serialized form contains `query`, ignoring case.
    pub(in crate::app) fn search(&mut self, graph: &SimGraph, query: &str) -> SearchOutcome {
        self.search_query = query.to_owned();
        if query.trim().is_empty() {
            return SearchOutcome::Blank;
        }

        let needle = query.to_lowercase();
        let found = graph.nodes.iter().position(|sim_node| {
            match serde_json::to_string(&sim_node.node) {
                Ok(serialized) => serialized.to_lowercase().contains(&needle),
                Err(error) => {
                    warn!("cannot serialize node {} for search: {error}", sim_node.node.id);
                    false
                }
            }
        });

        match found {
            Some(index) => {
                self.selected = Some(index);
                SearchOutcome::Found(index)
            }
            None => SearchOutcome::Miss,
        }
    }

    pub(in crate::app) fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    pub(in crate::app) fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub(in crate::app) fn search_query(&self) -> &str {
        &self.search_query
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::super::test_support::build_graph;
    use super::*;

    fn placed_graph() -> SimGraph {
        let mut graph = build_graph(json!({
            "nodes": [
                { "id": "http://x#BaseStation", "labels": ["Class"],
                  "properties": { "label": "Base Station", "comment": "Radio access node" } },
                { "id": "http://x#bs-001", "labels": ["NamedIndividual"],
                  "properties": { "label": "BS 001", "vendor": "Huawei" } },
                { "id": "http://x#hasVendor", "labels": ["DatatypeProperty"] }
            ]
        }));
        graph.nodes[0].position = pos2(100.0, 100.0);
        graph.nodes[1].position = pos2(120.0, 100.0);
        graph.nodes[2].position = pos2(400.0, 300.0);
        graph
    }

    #[test]
    fn hit_test_prefers_snapshot_order_over_distance() {
        let graph = placed_graph();
        // Closer to node 1, but node 0 comes first and still covers the pointer.
        assert_eq!(hit_test(&graph, pos2(115.0, 100.0)), Some(0));
        assert_eq!(hit_test(&graph, pos2(125.0, 100.0)), Some(1));
        assert_eq!(hit_test(&graph, pos2(400.0, 320.0)), None);
        assert_eq!(hit_test(&graph, pos2(700.0, 600.0)), None);
    }

    #[test]
    fn hit_test_is_idempotent() {
        let graph = placed_graph();
        let pointer = pos2(405.0, 295.0);
        let first = hit_test(&graph, pointer);
        for _ in 0..10 {
            assert_eq!(hit_test(&graph, pointer), first);
        }
        assert_eq!(first, Some(2));
    }

    #[test]
    fn drag_and_release_pins_node_at_pointer() {
        let mut graph = placed_graph();
        graph.nodes[2].velocity = Vec2::new(4.0, 4.0);
        let mut state = InteractionState::default();

        assert!(state.pointer_down(&mut graph, pos2(400.0, 300.0)));
        assert_eq!(state.dragged, Some(2));
        assert_eq!(state.selected, Some(2));
        assert_eq!(graph.nodes[2].velocity, Vec2::ZERO);

        state.pointer_move(&mut graph, pos2(500.0, 250.0));
        state.pointer_move(&mut graph, pos2(650.0, 410.0));
        state.pointer_up();

        assert_eq!(graph.nodes[2].position, pos2(650.0, 410.0));
        assert_eq!(graph.nodes[2].velocity, Vec2::ZERO);
        assert_eq!(state.dragged, None);
        assert_eq!(state.selected, Some(2));
    }

    #[test]
    fn drag_outside_surface_is_clamped() {
        let mut graph = placed_graph();
        let mut state = InteractionState::default();

        state.pointer_down(&mut graph, pos2(400.0, 300.0));
        state.pointer_move(&mut graph, pos2(-40.0, 900.0));

        assert_eq!(graph.nodes[2].position, pos2(20.0, 680.0));
    }

    #[test]
    fn miss_clears_selection_and_move_without_drag_is_ignored() {
        let mut graph = placed_graph();
        let mut state = InteractionState::default();

        state.pointer_down(&mut graph, pos2(100.0, 100.0));
        state.pointer_up();
        assert!(state.pointer_down(&mut graph, pos2(900.0, 600.0)));
        assert_eq!(state.selected, None);
        assert!(!state.is_dragging());

        let before = graph.nodes[0].position;
        state.pointer_move(&mut graph, pos2(10.0, 10.0));
        assert_eq!(graph.nodes[0].position, before);
    }

    #[test]
    fn search_matches_serialized_attributes() {
        let graph = placed_graph();
        let mut state = InteractionState::default();

        assert_eq!(state.search(&graph, "http://x#bs-001"), SearchOutcome::Found(1));
        assert_eq!(state.selected, Some(1));

        assert_eq!(state.search(&graph, "HUAWEI"), SearchOutcome::Found(1));
        assert_eq!(state.search(&graph, "radio access"), SearchOutcome::Found(0));
        assert_eq!(state.search(&graph, "datatypeproperty"), SearchOutcome::Found(2));
        assert_eq!(state.search_query(), "datatypeproperty");
    }

    #[test]
    fn search_sees_properties_in_delivered_order() {
        let graph = build_graph(
            serde_json::from_str(
                r#"{"nodes": [
                    {"id": "bs-7", "labels": ["NamedIndividual"],
                     "properties": {"zone": "north", "antenna": "4T4R"}}
                ]}"#,
            )
            .unwrap(),
        );
        let mut state = InteractionState::default();

        assert_eq!(
            state.search(&graph, r#""north","antenna""#),
            SearchOutcome::Found(0)
        );
    }

    #[test]
    fn search_miss_and_blank_keep_selection() {
        let graph = placed_graph();
        let mut state = InteractionState::default();
        state.search(&graph, "bs-001");

        assert_eq!(state.search(&graph, "antenna"), SearchOutcome::Miss);
        assert_eq!(state.selected, Some(1));
        assert_eq!(state.search(&graph, "   "), SearchOutcome::Blank);
        assert_eq!(state.selected, Some(1));
    }

    #[test]
    fn fuzzy_candidates_match_labels_and_ids() {
        let graph = placed_graph();

        assert_eq!(fuzzy_candidates(&graph, "bsta"), HashSet::from([0]));
        assert_eq!(fuzzy_candidates(&graph, "vendor"), HashSet::from([2]));
        assert!(fuzzy_candidates(&graph, "  ").is_empty());
    }
}
