// src/body.rs

use crate::error::EngineError;
use crate::model::Rgb;
use crate::scale::{Vec2, ASTRO_UNIT, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_DISPLAY_SCALE: f64 = 100.0 / ASTRO_UNIT;
pub const DEFAULT_TIME_STEP: f64 = SECONDS_PER_DAY;

/// A massive body in the simulation frame.
///
/// `display_scale` and `time_step_seconds` are per-body settings. Bodies in
/// the same system may be advanced with different macro steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub radius: f64,
    pub color: Rgb,
    pub is_reference: bool,
    pub display_scale: f64,
    pub time_step_seconds: f64,
    /// Separation from the reference body at the start of the last step.
    pub distance_to_reference: f64,
}

impl Body {
    pub fn new(name: impl Into<String>, position: Vec2, mass: f64) -> Result<Self, EngineError> {
        let name = name.into();
        if !mass.is_finite() || mass <= 0.0 {
            return Err(EngineError::InvalidMass { name, mass });
        }
        Ok(Body {
            name,
            position,
            velocity: Vec2::zeros(),
            mass,
            radius: 1.0,
            color: Rgb::WHITE,
            is_reference: false,
            display_scale: DEFAULT_DISPLAY_SCALE,
            time_step_seconds: DEFAULT_TIME_STEP,
            distance_to_reference: 0.0,
        })
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn as_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn with_display_scale(mut self, display_scale: f64) -> Self {
        self.display_scale = display_scale;
        self
    }

    pub fn with_time_step(mut self, time_step_seconds: f64) -> Self {
        self.time_step_seconds = time_step_seconds;
        self
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(m={:.2e}, p=[{:.2e}, {:.2e}], v=[{:.2e}, {:.2e}])",
            self.name,
            self.mass,
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_mass() {
        let err = Body::new("dust", Vec2::zeros(), 0.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMass { .. }));
        assert!(Body::new("dust", Vec2::zeros(), -1.0).is_err());
        assert!(Body::new("dust", Vec2::zeros(), f64::NAN).is_err());
    }

    #[test]
    fn builder_sets_display_fields() {
        let b = Body::new("earth", Vec2::new(-ASTRO_UNIT, 0.0), 5.97e24)
            .unwrap()
            .with_velocity(Vec2::new(0.0, 29_800.0))
            .with_radius(10.0)
            .with_color(Rgb(13, 111, 212));
        assert_eq!(b.radius, 10.0);
        assert_eq!(b.color, Rgb(13, 111, 212));
        assert!(!b.is_reference);
        assert_eq!(b.time_step_seconds, SECONDS_PER_DAY);
        assert!(b.to_string().starts_with("earth(m=5.97e24"));
    }
}
