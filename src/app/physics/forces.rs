use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const MIN_DISTANCE_SQ: f32 = 1.0;

/// Deterministic fallback direction for coincident points.
pub(super) fn jiggle_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214 + 0.37) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    /// Share of the correction applied to the target; the better connected
    /// endpoint moves less.
    pub(super) bias: f32,
}

pub(super) fn apply_link_force(
    links: &[Link],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    distance: f32,
    strength: f32,
    alpha: f32,
) {
    for (link_index, link) in links.iter().enumerate() {
        let (source, target) = (link.source, link.target);
        if source == target {
            continue;
        }

        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() <= f32::EPSILON {
            delta = jiggle_direction(link_index, source) * 1e-3;
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * strength);

        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

/// Barnes-Hut many-body pass for a single body. Cells that look small enough
/// from `index` are treated as one point mass at their center of mass.
pub(super) fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength_alpha: f32,
    theta_sq: f32,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            if delta.length_sq() <= f32::EPSILON {
                delta = jiggle_direction(index, other) * 1e-3;
            }
            let distance_sq = soften(delta.length_sq());
            *velocity += delta * (strength_alpha / distance_sq);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_sq();
    let side = node.bounds.side_length();
    if !node.bounds.contains(point) && (side * side) / theta_sq < distance_sq {
        *velocity += delta * (strength_alpha * node.mass / soften(distance_sq));
        return;
    }

    for child in node.children() {
        accumulate_charge(child, index, positions, strength_alpha, theta_sq, velocity);
    }
}

fn soften(distance_sq: f32) -> f32 {
    if distance_sq < MIN_DISTANCE_SQ {
        (MIN_DISTANCE_SQ * distance_sq).sqrt().max(f32::EPSILON)
    } else {
        distance_sq
    }
}

/// Moves every position by the same offset so their mean lands on `center`.
pub(super) fn apply_centering(positions: &mut [Vec2], center: Vec2) {
    if positions.is_empty() {
        return;
    }

    let centroid = positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point)
        / positions.len() as f32;
    let shift = center - centroid;
    for position in positions {
        *position += shift;
    }
}

/// Dual-tree collision pass over predicted positions. Impulses are
/// accumulated and applied by the caller once the traversal finishes.
pub(super) fn accumulate_collisions(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    radii: &[f32],
    impulses: &mut [Vec2],
) {
    let reach = node_a.max_radius + node_b.max_radius;
    if reach <= 0.0 || node_a.bounds.gap_sq_to(node_b.bounds) > reach * reach {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_overlap(from, to, predicted, radii, impulses);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, predicted, radii, impulses);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collisions(child_a, child_a, true, predicted, radii, impulses);
            for child_b in &children[offset + 1..] {
                accumulate_collisions(child_a, child_b, false, predicted, radii, impulses);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collisions(child, node_b, false, predicted, radii, impulses);
        }
    } else {
        for child in node_b.children() {
            accumulate_collisions(node_a, child, false, predicted, radii, impulses);
        }
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    impulses: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    let delta = predicted[from] - predicted[to];
    let distance_sq = delta.length_sq();
    if min_distance <= 0.0 || distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 1e-4 {
        delta / distance
    } else {
        jiggle_direction(from, to)
    };

    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    // The smaller body gets pushed further.
    let from_share = to_sq / (from_sq + to_sq);
    let push = direction * (min_distance - distance);

    impulses[from] += push * from_share;
    impulses[to] -= push * (1.0 - from_share);
}
