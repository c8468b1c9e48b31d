// src/sensitivity.rs

use crate::error::EngineError;
use crate::nbody::NBodyModel;
use crate::scale::Vec2;
use itertools::izip;
use rand::Rng;
use rand_distr::Uniform;

/// Nudges every active body by uniform noise in `[-position_jitter, position_jitter]`
/// metres and `[-velocity_jitter, velocity_jitter]` m/s per axis.
pub fn perturb_active<R: Rng>(
    model: &mut NBodyModel,
    position_jitter: f64,
    velocity_jitter: f64,
    rng: &mut R,
) -> Result<(), EngineError> {
    let pos_range = Uniform::new_inclusive(-position_jitter, position_jitter)
        .map_err(|e| EngineError::InvalidRange(e.to_string()))?;
    let vel_range = Uniform::new_inclusive(-velocity_jitter, velocity_jitter)
        .map_err(|e| EngineError::InvalidRange(e.to_string()))?;
    let ids: Vec<_> = model.active.iter().collect();
    for id in ids {
        let body = model.arena.get_mut(id)?;
        body.position += Vec2::new(rng.sample(&pos_range), rng.sample(&pos_range));
        body.velocity += Vec2::new(rng.sample(&vel_range), rng.sample(&vel_range));
    }
    Ok(())
}

/// Runs a reference and a perturbed copy side by side and tracks how far
/// their trajectories drift apart.
pub struct SensitivityRun {
    reference: NBodyModel,
    perturbed: NBodyModel,
    pub separations: Vec<f64>,
}

impl SensitivityRun {
    pub fn new(reference: NBodyModel, perturbed: NBodyModel) -> Result<Self, EngineError> {
        if reference.active.len() != perturbed.active.len() {
            return Err(EngineError::InvalidRange(format!(
                "active sets differ in size: {} vs {}",
                reference.active.len(),
                perturbed.active.len()
            )));
        }
        let mut run = SensitivityRun {
            reference,
            perturbed,
            separations: Vec::new(),
        };
        run.separations.push(run.mean_separation());
        Ok(run)
    }

    fn mean_separation(&self) -> f64 {
        let n = self.reference.active.len();
        if n == 0 {
            return 0.0;
        }
        let total: f64 = izip!(self.reference.active_bodies(), self.perturbed.active_bodies())
            .map(|((_, a), (_, b))| (a.position - b.position).norm())
            .sum();
        total / n as f64
    }

    pub fn run(&mut self, frames: usize) -> Result<(), EngineError> {
        for _ in 0..frames {
            self.reference.step()?;
            self.perturbed.step()?;
            self.separations.push(self.mean_separation());
        }
        Ok(())
    }

    /// Mean log growth of the separation per frame.
    pub fn divergence_rate(&self) -> Result<f64, EngineError> {
        let initial = self.separations.first().copied().unwrap_or(0.0);
        if !(initial > 0.0) {
            return Err(EngineError::InvalidRange(
                "initial separation must be greater than zero".to_string(),
            ));
        }
        let frames = self.separations.len() - 1;
        if frames == 0 {
            return Ok(0.0);
        }
        let sum: f64 = self
            .separations
            .iter()
            .enumerate()
            .skip(1)
            .map(|(frame, &sep)| (sep / initial).ln() / frame as f64)
            .sum();
        Ok(sum / frames as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar::{Planet, SolarSystem};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inner_system() -> NBodyModel {
        let mut system = SolarSystem::new().unwrap();
        system.set_enabled(Planet::Earth, true).unwrap();
        system.set_enabled(Planet::Venus, true).unwrap();
        system.model
    }

    #[test]
    fn zero_jitter_leaves_copies_identical() {
        let reference = inner_system();
        let mut perturbed = reference.clone();
        let mut rng = StdRng::seed_from_u64(7);
        perturb_active(&mut perturbed, 0.0, 0.0, &mut rng).unwrap();
        let run = SensitivityRun::new(reference, perturbed).unwrap();
        assert_eq!(run.separations[0], 0.0);
        assert!(run.divergence_rate().is_err());
    }

    #[test]
    fn perturbed_copy_starts_apart_and_stays_finite() {
        let reference = inner_system();
        let mut perturbed = reference.clone();
        let mut rng = StdRng::seed_from_u64(42);
        perturb_active(&mut perturbed, 1.0e6, 1.0, &mut rng).unwrap();
        let mut run = SensitivityRun::new(reference, perturbed).unwrap();
        assert!(run.separations[0] > 0.0);
        run.run(50).unwrap();
        assert_eq!(run.separations.len(), 51);
        assert!(run.divergence_rate().unwrap().is_finite());
    }

    #[test]
    fn mismatched_sets_are_rejected() {
        let reference = inner_system();
        let mut perturbed = reference.clone();
        perturbed.active.clear();
        assert!(SensitivityRun::new(reference, perturbed).is_err());
    }
}
