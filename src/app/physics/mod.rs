mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use forces::{Link, accumulate_charge, accumulate_collisions, apply_centering, apply_link_force};
pub(in crate::app) use quadtree::QuadtreeCell;
use quadtree::{QuadNode, collect_quadtree_cells};

const BARNES_HUT_THETA: f32 = 0.9;
const INITIAL_RADIUS: f32 = 10.0;
const DRAG_ALPHA_TARGET: f32 = 0.3;

/// The three knobs exposed in the control panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForceParameter {
    ChargeStrength,
    CollisionPadding,
    LinkStrength,
}

impl ForceParameter {
    pub const ALL: [Self; 3] = [
        Self::ChargeStrength,
        Self::CollisionPadding,
        Self::LinkStrength,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ChargeStrength => "Charge strength",
            Self::CollisionPadding => "Collision padding",
            Self::LinkStrength => "Link strength",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    pub charge_strength: f32,
    pub collision_padding: f32,
    pub link_strength: f32,
    pub link_distance: f32,
    pub center: Vec2,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            charge_strength: -30.0,
            collision_padding: 2.0,
            link_strength: 0.5,
            link_distance: 30.0,
            center: Vec2::ZERO,
        }
    }
}

impl ForceParams {
    pub fn get(&self, parameter: ForceParameter) -> f32 {
        match parameter {
            ForceParameter::ChargeStrength => self.charge_strength,
            ForceParameter::CollisionPadding => self.collision_padding,
            ForceParameter::LinkStrength => self.link_strength,
        }
    }

    fn set(&mut self, parameter: ForceParameter, value: f32) {
        match parameter {
            ForceParameter::ChargeStrength => self.charge_strength = value,
            ForceParameter::CollisionPadding => self.collision_padding = value,
            ForceParameter::LinkStrength => self.link_strength = value,
        }
    }
}

#[derive(Clone, Debug)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    pinned: Option<Vec2>,
    radius: f32,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
    impulses: Vec<Vec2>,
}

/// Owned force-directed layout. The UI holds one of these per loaded network
/// and drives it one `tick` per frame; nothing about it is global.
pub struct ForceSimulation {
    bodies: Vec<Body>,
    links: Vec<Link>,
    params: ForceParams,
    alpha: f32,
    alpha_target: f32,
    alpha_min: f32,
    alpha_decay: f32,
    velocity_decay: f32,
    running: bool,
    scratch: Scratch,
}

impl ForceSimulation {
    /// `radii` are the visual radii of the bodies; the collision radius is
    /// that plus the configured padding.
    pub fn new(radii: &[f32], links: &[(usize, usize)], params: ForceParams) -> Self {
        let bodies = radii
            .iter()
            .enumerate()
            .map(|(index, &radius)| Body {
                position: params.center + phyllotaxis(index),
                velocity: Vec2::ZERO,
                pinned: None,
                radius,
            })
            .collect::<Vec<_>>();

        let mut link_counts = vec![0usize; bodies.len()];
        for &(source, target) in links {
            if source < bodies.len() && target < bodies.len() {
                link_counts[source] += 1;
                link_counts[target] += 1;
            }
        }
        let links = links
            .iter()
            .filter(|(source, target)| *source < bodies.len() && *target < bodies.len())
            .map(|&(source, target)| {
                let source_count = link_counts[source] as f32;
                let target_count = link_counts[target] as f32;
                Link {
                    source,
                    target,
                    bias: source_count / (source_count + target_count),
                }
            })
            .collect();

        let alpha_min = 0.001_f32;
        Self {
            bodies,
            links,
            params,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            running: true,
            scratch: Scratch::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn params(&self) -> ForceParams {
        self.params
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.bodies.get(index).map(|body| body.position)
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec2> + '_ {
        self.bodies.iter().map(|body| body.position)
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.bodies.get(index).is_some_and(|body| body.pinned.is_some())
    }

    pub fn link_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.links.iter().map(|link| (link.source, link.target))
    }

    /// Full reheat: energy back to 1 and ticking resumes.
    pub fn restart(&mut self) {
        self.alpha = 1.0;
        self.running = true;
        tracing::debug!("layout restarted");
    }

    /// Resume ticking without touching the current energy.
    pub fn reheat(&mut self) {
        self.running = true;
    }

    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target;
    }

    pub fn hold_active(&mut self) {
        self.set_alpha_target(DRAG_ALPHA_TARGET);
        self.reheat();
    }

    pub fn release_active(&mut self) {
        self.set_alpha_target(0.0);
    }

    pub fn set_parameter(&mut self, parameter: ForceParameter, value: f32) {
        self.params.set(parameter, value);
    }

    /// Fixes a body at `position` right away, so a dragged node follows the
    /// pointer even while no ticks run.
    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pinned = Some(position);
            body.position = position;
            body.velocity = Vec2::ZERO;
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pinned = None;
        }
    }

    /// Advances the layout by one step. Returns `false` when nothing moved,
    /// either because the network is empty or the energy already decayed.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.bodies.is_empty() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;
        let params = self.params;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.radii.clear();
        for body in &self.bodies {
            scratch.positions.push(body.position);
            scratch.velocities.push(body.velocity);
            scratch
                .radii
                .push((body.radius + params.collision_padding).max(0.0));
        }

        apply_link_force(
            &self.links,
            &scratch.positions,
            &mut scratch.velocities,
            params.link_distance,
            params.link_strength,
            alpha,
        );

        if params.charge_strength != 0.0
            && let Some(tree) = QuadNode::build(&scratch.positions, &scratch.radii)
        {
            let theta_sq = BARNES_HUT_THETA * BARNES_HUT_THETA;
            let strength_alpha = params.charge_strength * alpha;
            for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
                accumulate_charge(
                    &tree,
                    index,
                    &scratch.positions,
                    strength_alpha,
                    theta_sq,
                    velocity,
                );
            }
        }

        apply_centering(&mut scratch.positions, params.center);

        scratch.predicted.clear();
        scratch.predicted.extend(
            scratch
                .positions
                .iter()
                .zip(&scratch.velocities)
                .map(|(position, velocity)| *position + *velocity),
        );
        scratch.impulses.clear();
        scratch.impulses.resize(self.bodies.len(), Vec2::ZERO);
        if let Some(tree) = QuadNode::build(&scratch.predicted, &scratch.radii) {
            accumulate_collisions(
                &tree,
                &tree,
                true,
                &scratch.predicted,
                &scratch.radii,
                &mut scratch.impulses,
            );
        }

        let retain = 1.0 - self.velocity_decay;
        for (index, body) in self.bodies.iter_mut().enumerate() {
            if let Some(pin) = body.pinned {
                body.position = pin;
                body.velocity = Vec2::ZERO;
                continue;
            }

            body.velocity = (scratch.velocities[index] + scratch.impulses[index]) * retain;
            body.position = scratch.positions[index] + body.velocity;
        }

        if self.alpha < self.alpha_min {
            self.running = false;
            tracing::debug!(alpha = self.alpha, "layout settled");
        }

        true
    }

    /// Ticks until the energy decays, capped at `max_ticks`. Returns the
    /// number of ticks taken.
    #[cfg(test)]
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }

    pub(in crate::app) fn quadtree_cells(&self, cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let positions = self.positions().collect::<Vec<_>>();
        let radii = self
            .bodies
            .iter()
            .map(|body| body.radius + self.params.collision_padding)
            .collect::<Vec<_>>();
        if let Some(tree) = QuadNode::build(&positions, &radii) {
            collect_quadtree_cells(&tree, 0, cells);
        }
    }
}

/// Sunflower spiral: evenly spread, deterministic and free of coincident
/// starting points.
fn phyllotaxis(index: usize) -> Vec2 {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    vec2(radius * angle.cos(), radius * angle.sin())
}
