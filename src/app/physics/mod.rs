mod forces;
mod quadtree;

use eframe::egui::{Pos2, Vec2};

use super::{PhysicsConfig, RepulsionMode, SimGraph};
use forces::{accumulate_repulsion_for_node, centering, repulsion_between, spring_between};
use quadtree::QuadNode;

/// Advances the layout by one tick.
///
/// Pairwise repulsion is O(n²), which keeps a few hundred nodes interactive. The drag target
/// still pushes and pulls its neighbours but receives no force itself and is not integrated.
pub(super) fn step(graph: &mut SimGraph, dragged: Option<usize>, config: PhysicsConfig) {
    let SimGraph {
        nodes,
        links,
        bounds,
        physics_scratch: scratch,
        ..
    } = graph;

    let node_count = nodes.len();
    if node_count == 0 {
        return;
    }

    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.positions.extend(nodes.iter().map(|node| node.position));
    let forces = &mut scratch.forces;
    let positions = &scratch.positions;

    match config.repulsion_mode {
        RepulsionMode::Pairwise => accumulate_pairwise_repulsion(positions, config, forces),
        RepulsionMode::BarnesHut { theta } => {
            if let Some(tree) = QuadNode::build(positions) {
                for (index, force) in forces.iter_mut().enumerate() {
                    accumulate_repulsion_for_node(
                        &tree,
                        index,
                        positions,
                        config.repulsion,
                        theta,
                        force,
                    );
                }
            }
        }
    }

    for link in links.iter() {
        if link.source == link.target {
            continue;
        }
        let pull = spring_between(
            positions[link.source],
            positions[link.target],
            config.rest_length,
            config.spring_strength,
        );
        forces[link.source] += pull;
        forces[link.target] -= pull;
    }

    let center = bounds.center();
    for (force, &position) in forces.iter_mut().zip(positions.iter()) {
        *force += centering(position, center, config.center_pull);
    }

    for (index, node) in nodes.iter_mut().enumerate() {
        if dragged == Some(index) {
            node.velocity = Vec2::ZERO;
        } else {
            node.velocity += forces[index];
            node.position += node.velocity;
            node.velocity *= config.damping;
        }
        node.position = bounds.clamp(node.position, node.radius);
    }
}

fn accumulate_pairwise_repulsion(positions: &[Pos2], config: PhysicsConfig, forces: &mut [Vec2]) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let push = repulsion_between(positions[i], positions[j], config.repulsion);
            forces[i] += push;
            forces[j] -= push;
        }
    }
}
