use eframe::egui::{Pos2, Vec2};

use super::quadtree::QuadNode;

/// Distances below this are treated as this, so coincident nodes cannot blow up.
const MIN_DISTANCE: f32 = 1.0;

fn separation(from: Pos2, to: Pos2) -> (Vec2, f32) {
    let delta = to - from;
    (delta, delta.length().max(MIN_DISTANCE))
}

/// Push felt by the node at `point` from a node at `other`: `repulsion / d²` pointing away.
pub(super) fn repulsion_between(point: Pos2, other: Pos2, repulsion: f32) -> Vec2 {
    let (delta, distance) = separation(point, other);
    let magnitude = repulsion / (distance * distance);
    -(delta / distance) * magnitude
}

/// Pull felt by the link's source toward its target; the target feels the negation.
pub(super) fn spring_between(
    source: Pos2,
    target: Pos2,
    rest_length: f32,
    spring_strength: f32,
) -> Vec2 {
    let (delta, distance) = separation(source, target);
    let magnitude = (distance - rest_length) * spring_strength;
    (delta / distance) * magnitude
}

pub(super) fn centering(point: Pos2, center: Pos2, center_pull: f32) -> Vec2 {
    (center - point) * center_pull
}

/// Barnes-Hut approximation of the summed repulsion on `index`.
pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Pos2],
    repulsion: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if node.count == 0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index != index {
                *force += repulsion_between(point, positions[other_index], repulsion);
            }
        }
        return;
    }

    let (_, distance) = separation(node.centroid, point);
    let far_enough =
        !node.bounds.contains(point) && (node.bounds.side_length() / distance) < theta;

    if far_enough {
        *force += repulsion_between(point, node.centroid, repulsion * node.count as f32);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, repulsion, theta, force);
    }
}
