// src/scale.rs

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub type Vec2 = Vector2<f64>;

/// Gravitational constant used by the solar-system force law.
pub const G: f64 = 6.67e-11;
pub const ASTRO_UNIT: f64 = 149_597_870_700.0;
pub const SECONDS_PER_DAY: f64 = 3600.0 * 24.0;

pub const PENDULUM_GRAVITY: f64 = 9.8;
/// Per-step velocity damping, tuned for a 60 steps/s cadence.
pub const PENDULUM_DAMPING: f64 = 0.991;
pub const PENDULUM_PIVOT_Y: f64 = 50.0;

pub const MIN_LENGTH: f64 = 20.0;
pub const MIN_MASS: f64 = 1.0;
pub const MIN_RADIUS: f64 = 1.0;

/// Pixel area the host draws the simulation into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Surface { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Surface {
    fn default() -> Self {
        // 1200x700 window minus the control panel and margins
        Surface::new(750.0, 650.0)
    }
}

/// Clamps `value` up to `min`. NaN clamps to `min` as well.
#[inline(always)]
pub fn clamp_min(value: f64, min: f64) -> f64 {
    value.max(min)
}

#[inline(always)]
pub fn floor_point(p: Vec2) -> Vec2 {
    Vec2::new(p.x.floor(), p.y.floor())
}

/// Maps a simulation-frame position (metres) to pixels, with the simulation
/// origin placed at the centre of `surface`.
pub fn project_for_display(position: &Vec2, display_scale: f64, surface: &Surface) -> Vec2 {
    position * display_scale + surface.center()
}

pub fn meters_to_au(meters: f64) -> f64 {
    meters / ASTRO_UNIT
}
