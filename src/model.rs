// src/model.rs

use crate::error::EngineError;
use crate::scale::Surface;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// What the host needs to draw one object this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Rgb,
}

/// Frame-driven contract between a host loop and a physical model.
///
/// The host owns the clock: it calls `advance` once per frame and then reads
/// `display_points` to draw. Models never block or perform I/O.
pub trait FrameModel {
    fn name(&self) -> String;
    fn advance(&mut self) -> Result<(), EngineError>;
    fn display_points(&self, surface: &Surface) -> Vec<DisplayPoint>;

    /// Advances `frames` times, stopping at the first error.
    fn advance_frames(&mut self, frames: usize) -> Result<(), EngineError> {
        for _ in 0..frames {
            self.advance()?;
        }
        Ok(())
    }
}
