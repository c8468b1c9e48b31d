// src/profile.rs

use crate::body::Body;
use crate::error::EngineError;
use crate::scale::{ASTRO_UNIT, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Display scale and macro step handed to a group of bodies when it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupProfile {
    pub display_scale: f64,
    pub time_step_seconds: f64,
    pub reference_time_step_seconds: f64,
}

impl GroupProfile {
    pub fn new(
        display_scale: f64,
        time_step_seconds: f64,
        reference_time_step_seconds: f64,
    ) -> Result<Self, EngineError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(display_scale) || !positive(time_step_seconds) || !positive(reference_time_step_seconds) {
            return Err(EngineError::InvalidRange(format!(
                "group profile values must be positive: scale={display_scale}, step={time_step_seconds}, reference step={reference_time_step_seconds}"
            )));
        }
        Ok(GroupProfile {
            display_scale,
            time_step_seconds,
            reference_time_step_seconds,
        })
    }

    /// Mercury to Mars: 100 px per AU, one day per frame.
    pub fn inner() -> Self {
        GroupProfile {
            display_scale: 100.0 / ASTRO_UNIT,
            time_step_seconds: SECONDS_PER_DAY,
            reference_time_step_seconds: SECONDS_PER_DAY,
        }
    }

    /// Jupiter to Neptune: 10 px per AU and a week per frame so the outer
    /// planets move visibly. The reference body stays on a one-day step.
    pub fn outer() -> Self {
        GroupProfile {
            display_scale: 10.0 / ASTRO_UNIT,
            time_step_seconds: 7.0 * SECONDS_PER_DAY,
            reference_time_step_seconds: SECONDS_PER_DAY,
        }
    }

    pub fn apply(&self, body: &Body) -> Body {
        let time_step_seconds = if body.is_reference {
            self.reference_time_step_seconds
        } else {
            self.time_step_seconds
        };
        Body {
            display_scale: self.display_scale,
            time_step_seconds,
            ..body.clone()
        }
    }
}
