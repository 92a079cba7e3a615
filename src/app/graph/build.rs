use std::collections::HashMap;
use std::collections::hash_map::Entry;

use eframe::egui::{Pos2, Vec2, vec2};
use log::debug;
use rand::Rng;

use crate::data::{GraphNode, GraphSnapshot, Stats};
use crate::util::{truncate_chars, type_suffix};

use super::super::render_utils::NodeCategory;
use super::super::{
    Bounds, INITIAL_JITTER, LABEL_MAX_CHARS, NODE_RADIUS, PhysicsScratch, SimGraph, SimLink,
    SimNode,
};

impl SimGraph {
    pub(in crate::app) fn from_snapshot<R: Rng + ?Sized>(
        snapshot: GraphSnapshot,
        bounds: Bounds,
        rng: &mut R,
    ) -> Self {
        let delivered = snapshot.stats();
        let center = bounds.center();

        let mut index_by_id = HashMap::with_capacity(snapshot.nodes.len());
        let mut nodes = Vec::with_capacity(snapshot.nodes.len());
        for node in snapshot.nodes {
            match index_by_id.entry(node.id.clone()) {
                Entry::Occupied(_) => {
                    debug!("ignoring duplicate node id {}", node.id);
                    continue;
                }
                Entry::Vacant(slot) => {
                    slot.insert(nodes.len());
                }
            }

            let jitter = vec2(
                rng.gen_range(-INITIAL_JITTER..=INITIAL_JITTER),
                rng.gen_range(-INITIAL_JITTER..=INITIAL_JITTER),
            );
            nodes.push(Self::make_sim_node(node, center + jitter));
        }

        let mut links = Vec::with_capacity(snapshot.relationships.len());
        for relationship in snapshot.relationships {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&relationship.source),
                index_by_id.get(&relationship.target),
            ) else {
                debug!(
                    "dropping relationship {} -> {}: endpoint not in snapshot",
                    relationship.source, relationship.target
                );
                continue;
            };

            let suffix = type_suffix(&relationship.kind).to_owned();
            links.push(SimLink {
                source,
                target,
                kind: relationship.kind,
                suffix,
            });
        }

        let stats = Stats {
            node_count: nodes.len(),
            ..delivered
        };
        Self {
            nodes,
            links,
            index_by_id,
            stats,
            bounds,
            physics_scratch: PhysicsScratch {
                forces: Vec::new(),
                positions: Vec::new(),
            },
        }
    }

    fn make_sim_node(node: GraphNode, position: Pos2) -> SimNode {
        let category = NodeCategory::from_labels(&node.labels);
        let label = truncate_chars(&node.display_label(), LABEL_MAX_CHARS).to_owned();

        SimNode {
            node,
            position,
            velocity: Vec2::ZERO,
            radius: NODE_RADIUS,
            category,
            label,
        }
    }

    pub(in crate::app) fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub(in crate::app) fn node(&self, index: usize) -> Option<&SimNode> {
        self.nodes.get(index)
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::super::test_support::build_graph as build;
    use super::*;

    #[test]
    fn derives_links_with_type_suffix() {
        let graph = build(json!({
            "nodes": [
                { "id": "A", "labels": ["Class"] },
                { "id": "B", "labels": ["Individual"] }
            ],
            "relationships": [{ "source": "A", "target": "B", "type": "http://x#linksTo" }]
        }));

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].suffix, "linksTo");
        assert_eq!((graph.links[0].source, graph.links[0].target), (0, 1));
        assert_eq!(graph.nodes[0].category, NodeCategory::Class);
        assert_eq!(graph.nodes[1].category, NodeCategory::Individual);
    }

    #[test]
    fn drops_unresolvable_relationships() {
        let graph = build(json!({
            "nodes": [{ "id": "A", "labels": ["Class"] }, { "id": "B", "labels": [] }],
            "relationships": [
                { "source": "A", "target": "C", "type": "t" },
                { "source": "Z", "target": "B", "type": "t" },
                { "source": "B", "target": "A", "type": "t" }
            ]
        }));

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.stats.relationship_count, 3);
        for link in &graph.links {
            assert!(graph.node(link.source).is_some());
            assert!(graph.node(link.target).is_some());
        }
    }

    #[test]
    fn initial_state_is_jittered_around_center_at_rest() {
        let nodes = (0..50)
            .map(|index| json!({ "id": format!("n{index}") }))
            .collect::<Vec<_>>();
        let graph = build(json!({ "nodes": nodes, "relationships": [] }));
        let center = Bounds::default().center();

        for sim_node in &graph.nodes {
            assert!((sim_node.position.x - center.x).abs() <= INITIAL_JITTER);
            assert!((sim_node.position.y - center.y).abs() <= INITIAL_JITTER);
            assert_eq!(sim_node.velocity, Vec2::ZERO);
            assert_eq!(sim_node.radius, NODE_RADIUS);
        }
    }

    #[test]
    fn labels_are_truncated_and_ids_indexed() {
        let graph = build(json!({
            "nodes": [
                { "id": "http://x#Long", "labels": ["Class"],
                  "properties": { "label": "TransmissionNetworkElement" } },
                { "id": "http://x#Long", "labels": ["Class"] }
            ]
        }));

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.stats.node_count, 1);
        assert_eq!(graph.nodes[0].label, "TransmissionNet");
        assert_eq!(graph.index_of("http://x#Long"), Some(0));
        assert_eq!(graph.index_of("missing"), None);
    }
}
