// src/nbody.rs

use crate::body::Body;
use crate::error::EngineError;
use crate::model::{DisplayPoint, FrameModel};
use crate::scale::{project_for_display, Surface, Vec2, G};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyId(pub usize);

/// Append-only storage; a `BodyId` stays valid for the arena's lifetime.
#[derive(Debug, Clone, Default)]
pub struct BodyArena {
    bodies: Vec<Body>,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: Body) -> BodyId {
        self.bodies.push(body);
        BodyId(self.bodies.len() - 1)
    }

    pub fn get(&self, id: BodyId) -> Result<&Body, EngineError> {
        self.bodies.get(id.0).ok_or(EngineError::UnknownBodyId(id.0))
    }

    pub fn get_mut(&mut self, id: BodyId) -> Result<&mut Body, EngineError> {
        self.bodies.get_mut(id.0).ok_or(EngineError::UnknownBodyId(id.0))
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.name == name).map(BodyId)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    members: Vec<BodyId>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` if absent. Returns whether membership changed.
    pub fn insert(&mut self, id: BodyId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.members.push(id);
        true
    }

    pub fn remove(&mut self, id: BodyId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    pub fn set(&mut self, id: BodyId, enabled: bool) -> bool {
        if enabled {
            self.insert(id)
        } else {
            self.remove(id)
        }
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.members.contains(&id)
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.members.iter().copied()
    }
}

/// Force that `c` exerts on `b`.
///
/// Coincident bodies give a non-finite result; `NBodyModel::step` rejects
/// them before this is reached.
pub fn pairwise_force(b: &Body, c: &Body) -> Vec2 {
    let delta = c.position - b.position;
    let distance = delta.norm();
    pairwise_force_at(b, c, distance)
}

#[inline(always)]
fn pairwise_force_at(b: &Body, c: &Body, distance: f64) -> Vec2 {
    let angle = (c.position.y - b.position.y).atan2(c.position.x - b.position.x);
    let magnitude = G * b.mass * c.mass / (distance * distance);
    Vec2::new(angle.cos() * magnitude, angle.sin() * magnitude)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    pub advanced: usize,
    pub max_speed: f64,
}

struct PendingUpdate {
    id: BodyId,
    force: Vec2,
    distance_to_reference: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct NBodyModel {
    pub(crate) arena: BodyArena,
    pub active: ActiveSet,
    /// `None` keeps the unsoftened force law and makes coincident bodies an error.
    min_separation: Option<f64>,
}

impl NBodyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_separation(mut self, min_separation: Option<f64>) -> Result<Self, EngineError> {
        if let Some(floor) = min_separation {
            if !floor.is_finite() || floor <= 0.0 {
                return Err(EngineError::InvalidRange(format!(
                    "min_separation must be positive, got {floor}"
                )));
            }
        }
        self.min_separation = min_separation;
        Ok(self)
    }

    pub fn min_separation(&self) -> Option<f64> {
        self.min_separation
    }

    pub fn insert(&mut self, body: Body) -> Result<BodyId, EngineError> {
        validate_stepping(&body)?;
        Ok(self.arena.insert(body))
    }

    pub fn insert_active(&mut self, body: Body) -> Result<BodyId, EngineError> {
        let id = self.insert(body)?;
        self.active.insert(id);
        Ok(id)
    }

    pub fn set_active(&mut self, id: BodyId, enabled: bool) -> Result<bool, EngineError> {
        let name = &self.arena.get(id)?.name;
        let changed = self.active.set(id, enabled);
        if changed {
            debug!(body = %name, enabled, "active set changed");
        }
        Ok(changed)
    }

    pub fn body(&self, id: BodyId) -> Result<&Body, EngineError> {
        self.arena.get(id)
    }

    pub fn replace(&mut self, id: BodyId, body: Body) -> Result<(), EngineError> {
        validate_stepping(&body)?;
        *self.arena.get_mut(id)? = body;
        Ok(())
    }

    pub fn active_bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.active
            .iter()
            .filter_map(move |id| self.arena.get(id).ok().map(|b| (id, b)))
    }

    /// Advances every active body by its own macro time step.
    ///
    /// On `Singularity` no body has been touched.
    pub fn step(&mut self) -> Result<StepReport, EngineError> {
        let pending = self.accumulate_forces()?;

        let mut max_speed: f64 = 0.0;
        for update in &pending {
            let body = self.arena.get_mut(update.id)?;
            if let Some(distance) = update.distance_to_reference {
                body.distance_to_reference = distance;
            }
            let dt = body.time_step_seconds;
            body.velocity += update.force / body.mass * dt;
            body.position += body.velocity * dt;
            max_speed = max_speed.max(body.velocity.norm());
        }

        let report = StepReport {
            advanced: pending.len(),
            max_speed,
        };
        trace!(?report, "n-body step");
        Ok(report)
    }

    fn accumulate_forces(&self) -> Result<Vec<PendingUpdate>, EngineError> {
        let active: Vec<(BodyId, &Body)> = self.active_bodies().collect();
        let mut pending = Vec::with_capacity(active.len());

        for &(id, b) in &active {
            let mut force = Vec2::zeros();
            let mut distance_to_reference = None;
            for &(other_id, c) in &active {
                if other_id == id {
                    continue;
                }
                let separation = (c.position - b.position).norm();
                let distance = match self.min_separation {
                    Some(floor) => separation.max(floor),
                    None if separation == 0.0 => {
                        warn!(first = %b.name, second = %c.name, "coincident bodies");
                        return Err(EngineError::Singularity {
                            first: b.name.clone(),
                            second: c.name.clone(),
                            distance: separation,
                        });
                    }
                    None => separation,
                };
                if c.is_reference {
                    distance_to_reference = Some(separation);
                }
                force += pairwise_force_at(b, c, distance);
            }
            pending.push(PendingUpdate {
                id,
                force,
                distance_to_reference,
            });
        }
        Ok(pending)
    }

    pub fn project_for_display(&self, id: BodyId, surface: &Surface) -> Result<Vec2, EngineError> {
        let body = self.arena.get(id)?;
        Ok(project_for_display(&body.position, body.display_scale, surface))
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.active_bodies().map(|(_, b)| b.kinetic_energy()).sum()
    }

    pub fn potential_energy(&self) -> f64 {
        let active: Vec<&Body> = self.active_bodies().map(|(_, b)| b).collect();
        active
            .iter()
            .tuple_combinations()
            .map(|(a, b)| {
                let r = (a.position - b.position).norm();
                if r > 0.0 {
                    -G * a.mass * b.mass / r
                } else {
                    0.0
                }
            })
            .sum()
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }
}

fn validate_stepping(body: &Body) -> Result<(), EngineError> {
    if !body.time_step_seconds.is_finite() || body.time_step_seconds <= 0.0 {
        return Err(EngineError::InvalidRange(format!(
            "time step of {} must be positive, got {}",
            body.name, body.time_step_seconds
        )));
    }
    if !body.display_scale.is_finite() || body.display_scale <= 0.0 {
        return Err(EngineError::InvalidRange(format!(
            "display scale of {} must be positive, got {}",
            body.name, body.display_scale
        )));
    }
    Ok(())
}

impl FrameModel for NBodyModel {
    fn name(&self) -> String {
        "NBody".to_string()
    }

    fn advance(&mut self) -> Result<(), EngineError> {
        self.step().map(|_| ())
    }

    fn display_points(&self, surface: &Surface) -> Vec<DisplayPoint> {
        self.active_bodies()
            .map(|(_, b)| {
                let p = project_for_display(&b.position, b.display_scale, surface);
                DisplayPoint {
                    label: b.name.clone(),
                    x: p.x,
                    y: p.y,
                    radius: b.radius,
                    color: b.color,
                }
            })
            .collect()
    }
}
