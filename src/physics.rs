//! Force-directed simulation over a [`LayoutModel`].
//!
//! Every non-fixed island is pushed away from every other island
//! (`repulsion / distance²`) and pulled towards the islands it is connected
//! to (`gravity * distance * strength`, zero rest length). Forces for a tick
//! are computed from the start-of-tick positions, then integrated with
//! damping and clamped against the container padding on the top/left edges.
//!
//! Fixed islands (pinned, or held by a drag/resize) still exert forces but
//! are never moved by [`PhysicsSimulator::step`].

use crate::geometry::Point;
use crate::model::{Island, LayoutModel};
use std::collections::HashMap;

/// Velocity multiplier applied once per tick.
pub const DAMPING: f32 = 0.95;

/// Kinetic energy below which the layout counts as settled.
pub const SETTLE_ENERGY: f32 = 0.01;

/// Per-island simulation state, parallel to [`LayoutModel::islands`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub velocity: Point,
    pub mass: f32,
    /// Mirrors [`Island::pinned`]; refreshed every step.
    pub pinned: bool,
    /// Set while the island is being dragged or resized.
    pub held: bool,
}

impl PhysicsBody {
    fn for_island(island: &Island) -> Self {
        Self {
            velocity: Point::ZERO,
            mass: island.mass(),
            pinned: island.pinned,
            held: false,
        }
    }

    /// Fixed bodies are anchors: they push and pull but never move.
    pub fn fixed(&self) -> bool {
        self.pinned || self.held
    }
}

/// Steps the simulation one tick at a time.
#[derive(Debug, Clone, Default)]
pub struct PhysicsSimulator {
    bodies: Vec<PhysicsBody>,
    kinetic_energy: f32,
}

impl PhysicsSimulator {
    /// Derive fresh state: zero velocity, `fixed = pinned`.
    pub fn from_model(model: &LayoutModel) -> Self {
        let mut sim = Self::default();
        sim.reset(model);
        sim
    }

    /// Re-derive state after the island list changed or physics was re-enabled.
    pub fn reset(&mut self, model: &LayoutModel) {
        self.bodies = model.islands().iter().map(PhysicsBody::for_island).collect();
        self.kinetic_energy = 0.0;
    }

    pub fn bodies(&self) -> &[PhysicsBody] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&PhysicsBody> {
        self.bodies.get(index)
    }

    /// Kinetic energy after the most recent step.
    pub fn kinetic_energy(&self) -> f32 {
        self.kinetic_energy
    }

    pub fn is_settled(&self) -> bool {
        self.kinetic_energy < SETTLE_ENERGY
    }

    /// Mark an island as held (dragged/resized) or released.
    ///
    /// Either way its velocity is zeroed, so a release never carries momentum.
    pub fn set_held(&mut self, index: usize, held: bool) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.held = held;
            body.velocity = Point::ZERO;
        }
    }

    /// Zero an island's velocity without changing whether it is held.
    pub fn stop(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.velocity = Point::ZERO;
        }
    }

    /// Advance the simulation by one tick and return the resulting kinetic energy.
    ///
    /// Deterministic for a given island order, positions and config.
    pub fn step(&mut self, model: &mut LayoutModel) -> f32 {
        if self.bodies.len() != model.len() {
            tracing::warn!(
                bodies = self.bodies.len(),
                islands = model.len(),
                "physics state out of sync with model, resetting"
            );
            self.reset(model);
        }

        for (body, island) in self.bodies.iter_mut().zip(model.islands()) {
            body.pinned = island.pinned;
            body.mass = island.mass();
        }

        let forces = self.accumulate_forces(model);
        let config = model.config().clone();
        let padding = config.container_padding;
        let mut energy = 0.0;

        for (idx, island) in model.islands_mut().iter_mut().enumerate() {
            let body = &mut self.bodies[idx];
            if body.fixed() {
                body.velocity = Point::ZERO;
                continue;
            }

            let mut velocity = body.velocity + forces[idx] / body.mass;
            velocity = velocity * DAMPING;
            let mut position = island.position + velocity * config.animation_speed;

            if !position.is_finite() || !velocity.is_finite() {
                tracing::warn!(id = %island.id, "non-finite integration result, island stopped");
                body.velocity = Point::ZERO;
                island.position.x = island.position.x.max(padding);
                island.position.y = island.position.y.max(padding);
                continue;
            }

            if position.x < padding {
                position.x = padding;
                velocity.x = 0.0;
            }
            if position.y < padding {
                position.y = padding;
                velocity.y = 0.0;
            }

            island.position = position;
            body.velocity = velocity;
            energy += 0.5 * body.mass * (velocity.x * velocity.x + velocity.y * velocity.y);
        }

        self.kinetic_energy = energy;
        tracing::trace!(energy, "physics step");
        energy
    }

    /// Step until the layout settles or `max_steps` is reached. Returns the steps taken.
    pub fn settle(&mut self, model: &mut LayoutModel, max_steps: usize) -> usize {
        for taken in 1..=max_steps {
            if self.step(model) < SETTLE_ENERGY {
                return taken;
            }
        }
        max_steps
    }

    fn accumulate_forces(&self, model: &LayoutModel) -> Vec<Point> {
        let config = model.config();
        let centers: Vec<Point> = model.islands().iter().map(Island::center).collect();
        let springs = spring_strengths(model);
        let mut forces = vec![Point::ZERO; centers.len()];

        for (a, force) in forces.iter_mut().enumerate() {
            if self.bodies[a].fixed() {
                continue;
            }
            for (b, &other) in centers.iter().enumerate() {
                if a == b {
                    continue;
                }
                let delta = other - centers[a];
                let distance = delta.length();
                if distance == 0.0 {
                    tracing::trace!(a, b, "skipping coincident island pair");
                    continue;
                }
                let direction = delta / distance;

                let repulsion = config.repulsion_strength / (distance * distance);
                *force -= direction * repulsion;

                if let Some(strength) = springs.get(&pair_key(a, b)) {
                    let attraction = config.gravity_strength * distance * strength;
                    *force += direction * attraction;
                }
            }
        }
        forces
    }
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Strongest connection per unordered island pair; dangling connections are skipped.
fn spring_strengths(model: &LayoutModel) -> HashMap<(usize, usize), f32> {
    let mut springs = HashMap::new();
    for link in model.resolved_connections() {
        if link.from == link.to {
            continue;
        }
        let entry = springs.entry(pair_key(link.from, link.to)).or_insert(0.0_f32);
        *entry = entry.max(link.connection.strength);
    }
    springs
}
