// src/pendulum.rs

//! Damped single-pivot pendulum.
//!
//! The equation of motion is the ideal (mass-independent) pendulum with
//! gravity scaled down by 10 and a multiplicative velocity damping, advanced
//! once per frame with semi-implicit Euler:
//!
//! ```text
//! alpha = -(g / 10) * sin(theta) / L
//! omega = (omega + alpha) * 0.991
//! theta = theta + omega
//! ```
//!
//! Angular velocity is in radians per step, not per second.

use crate::error::EngineError;
use crate::model::{DisplayPoint, FrameModel, Rgb};
use crate::scale::{
    clamp_min, floor_point, Surface, Vec2, MIN_LENGTH, MIN_MASS, MIN_RADIUS, PENDULUM_DAMPING,
    PENDULUM_GRAVITY, PENDULUM_PIVOT_Y,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const BOB_COLOR: Rgb = Rgb(172, 99, 249);
const PIVOT_COLOR: Rgb = Rgb(157, 157, 157);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialCondition {
    Angle(f64),
    /// Bob dragged to a display point; length and angle are derived from it.
    BobPosition(f64, f64),
}

impl InitialCondition {
    /// Accepts whole degrees in `[0, 90]`. Anything else releases from rest.
    pub fn from_degrees(degrees: i64) -> Self {
        if (0..=90).contains(&degrees) {
            InitialCondition::Angle((degrees as f64).to_radians())
        } else {
            InitialCondition::Angle(0.0)
        }
    }
}

impl Default for InitialCondition {
    fn default() -> Self {
        InitialCondition::Angle(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParams {
    pub mass: f64,
    pub length: f64,
    pub radius: f64,
    pub initial: InitialCondition,
}

impl Default for PendulumParams {
    fn default() -> Self {
        PendulumParams {
            mass: 5.0,
            length: 200.0,
            radius: 15.0,
            initial: InitialCondition::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendulumState {
    pub origin: (f64, f64),
    pub length: f64,
    pub mass: f64,
    pub radius: f64,
    pub angle: f64,
    pub angular_velocity: f64,
    pub bob_position: (f64, f64),
}

#[derive(Debug, Clone)]
pub struct Pendulum {
    origin: Vec2,
    length: f64,
    mass: f64,
    radius: f64,
    angle: f64,
    angular_velocity: f64,
    bob_position: Vec2,
}

impl Pendulum {
    /// Builds a pendulum hanging from `(surface_width / 2, 50)`.
    ///
    /// Mass, length and radius below their minimums are clamped rather than
    /// rejected. A `BobPosition` release fails only when it lies on the pivot.
    pub fn new(params: PendulumParams, surface_width: f64) -> Result<Self, EngineError> {
        let mut pendulum = Pendulum {
            origin: Vec2::new(surface_width / 2.0, PENDULUM_PIVOT_Y),
            length: clamp_min(params.length, MIN_LENGTH),
            mass: clamp_min(params.mass, MIN_MASS),
            radius: clamp_min(params.radius, MIN_RADIUS),
            angle: 0.0,
            angular_velocity: 0.0,
            bob_position: Vec2::zeros(),
        };
        match params.initial {
            InitialCondition::Angle(angle) => {
                pendulum.angle = angle;
                pendulum.bob_position = pendulum.derived_bob_position();
            }
            InitialCondition::BobPosition(x, y) => {
                pendulum.recalc_from_position(Vec2::new(x, y))?;
            }
        }
        Ok(pendulum)
    }

    pub fn reconfigure(&mut self, params: PendulumParams, surface_width: f64) -> Result<(), EngineError> {
        *self = Pendulum::new(params, surface_width)?;
        debug!(?params, "pendulum reconfigured");
        Ok(())
    }

    /// Re-seeds length and angle from an externally placed bob.
    ///
    /// `asin` folds points above the pivot onto the lower half-plane, so only
    /// the horizontal offset decides the sign of the angle.
    pub fn recalc_from_position(&mut self, point: Vec2) -> Result<(), EngineError> {
        let offset = point - self.origin;
        let length = offset.norm();
        if length == 0.0 {
            return Err(EngineError::DegenerateGeometry {
                x: point.x,
                y: point.y,
            });
        }
        self.angle = (offset.x / length).clamp(-1.0, 1.0).asin();
        self.angular_velocity = 0.0;
        self.length = clamp_min(length, MIN_LENGTH);
        self.bob_position = if self.length == length {
            point
        } else {
            self.derived_bob_position()
        };
        Ok(())
    }

    pub fn step(&mut self) {
        let angular_acceleration = -PENDULUM_GRAVITY / 10.0 * self.angle.sin() / self.length;
        self.angular_velocity = (self.angular_velocity + angular_acceleration) * PENDULUM_DAMPING;
        self.angle += self.angular_velocity;
        self.bob_position = self.derived_bob_position();
    }

    fn derived_bob_position(&self) -> Vec2 {
        floor_point(self.origin + self.length * Vec2::new(self.angle.sin(), self.angle.cos()))
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Clamped and reported, but the equation of motion does not use it.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn bob_position(&self) -> Vec2 {
        self.bob_position
    }

    /// Kinetic energy per unit mass in display units per step squared.
    pub fn kinetic_proxy(&self) -> f64 {
        0.5 * (self.length * self.angular_velocity).powi(2)
    }

    pub fn state(&self) -> PendulumState {
        PendulumState {
            origin: (self.origin.x, self.origin.y),
            length: self.length,
            mass: self.mass,
            radius: self.radius,
            angle: self.angle,
            angular_velocity: self.angular_velocity,
            bob_position: (self.bob_position.x, self.bob_position.y),
        }
    }
}

impl FrameModel for Pendulum {
    fn name(&self) -> String {
        "Pendulum".to_string()
    }

    fn advance(&mut self) -> Result<(), EngineError> {
        self.step();
        Ok(())
    }

    fn display_points(&self, _surface: &Surface) -> Vec<DisplayPoint> {
        vec![
            DisplayPoint {
                label: "pivot".to_string(),
                x: self.origin.x,
                y: self.origin.y,
                radius: 5.0,
                color: PIVOT_COLOR,
            },
            DisplayPoint {
                label: "bob".to_string(),
                x: self.bob_position.x,
                y: self.bob_position.y,
                radius: self.radius,
                color: BOB_COLOR,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn params(length: f64, initial: InitialCondition) -> PendulumParams {
        PendulumParams {
            length,
            initial,
            ..Default::default()
        }
    }

    #[test]
    fn clamps_invalid_configuration() {
        let p = Pendulum::new(
            PendulumParams {
                mass: 0.0,
                length: 5.0,
                radius: 0.0,
                initial: InitialCondition::Angle(0.0),
            },
            750.0,
        )
        .unwrap();
        assert_eq!(p.mass(), 1.0);
        assert_eq!(p.length(), 20.0);
        assert_eq!(p.radius(), 1.0);
    }

    #[test]
    fn hangs_straight_down_before_first_step() {
        let p = Pendulum::new(params(100.0, InitialCondition::Angle(0.0)), 200.0).unwrap();
        assert_eq!(p.origin(), Vec2::new(100.0, 50.0));
        assert_eq!(p.bob_position(), Vec2::new(100.0, 150.0));
    }

    #[test]
    fn damping_drains_angular_velocity() {
        let mut p = Pendulum::new(params(200.0, InitialCondition::Angle(FRAC_PI_4)), 750.0).unwrap();
        p.step();
        let first = p.angular_velocity().abs();
        assert!(first > 0.0);
        for _ in 1..10_000 {
            p.step();
        }
        assert!(p.angular_velocity().abs() < 0.01 * first);
    }

    #[test]
    fn first_step_matches_hand_computation() {
        let mut p = Pendulum::new(params(200.0, InitialCondition::Angle(FRAC_PI_4)), 750.0).unwrap();
        p.step();
        let expected_omega = (-0.98 * FRAC_PI_4.sin() / 200.0) * 0.991;
        assert!((p.angular_velocity() - expected_omega).abs() < 1e-15);
        assert!((p.angle() - (FRAC_PI_4 + expected_omega)).abs() < 1e-15);
        let bob = p.bob_position();
        assert_eq!(bob.x, bob.x.floor());
        assert_eq!(bob.y, bob.y.floor());
    }

    #[test]
    fn drag_release_derives_length_and_angle() {
        let p = Pendulum::new(params(200.0, InitialCondition::BobPosition(475.0, 50.0)), 750.0).unwrap();
        assert!((p.length() - 100.0).abs() < 1e-12);
        assert!((p.angle() - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(p.bob_position(), Vec2::new(475.0, 50.0));
        assert_eq!(p.angular_velocity(), 0.0);
    }

    #[test]
    fn drag_close_to_pivot_keeps_minimum_length() {
        let mut p = Pendulum::new(params(200.0, InitialCondition::Angle(0.0)), 750.0).unwrap();
        p.recalc_from_position(Vec2::new(375.0, 55.0)).unwrap();
        assert_eq!(p.length(), MIN_LENGTH);
        assert_eq!(p.angle(), 0.0);
        assert_eq!(p.bob_position(), Vec2::new(375.0, 70.0));
    }

    #[test]
    fn drag_onto_pivot_is_rejected() {
        let err = Pendulum::new(params(200.0, InitialCondition::BobPosition(375.0, 50.0)), 750.0)
            .unwrap_err();
        assert_eq!(err, EngineError::DegenerateGeometry { x: 375.0, y: 50.0 });
    }

    #[test]
    fn degrees_outside_range_release_from_rest() {
        assert_eq!(InitialCondition::from_degrees(120), InitialCondition::Angle(0.0));
        assert_eq!(InitialCondition::from_degrees(-3), InitialCondition::Angle(0.0));
        match InitialCondition::from_degrees(90) {
            InitialCondition::Angle(a) => assert!((a - FRAC_PI_2).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn reconfigure_resets_motion() {
        let mut p = Pendulum::new(params(200.0, InitialCondition::Angle(FRAC_PI_4)), 750.0).unwrap();
        p.advance_frames(30).unwrap();
        assert!(p.angular_velocity() != 0.0);
        p.reconfigure(params(150.0, InitialCondition::Angle(0.0)), 750.0).unwrap();
        assert_eq!(p.angular_velocity(), 0.0);
        assert_eq!(p.length(), 150.0);
    }
}
