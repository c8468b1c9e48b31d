// src/error.rs

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("bodies {first} and {second} are {distance:e} m apart, force is singular")]
    Singularity {
        first: String,
        second: String,
        distance: f64,
    },

    #[error("re-seed point ({x}, {y}) coincides with the pivot")]
    DegenerateGeometry { x: f64, y: f64 },

    #[error("body {name} has invalid mass {mass}")]
    InvalidMass { name: String, mass: f64 },

    #[error("unknown body: {0}")]
    UnknownBody(String),

    #[error("no body with id {0}")]
    UnknownBodyId(usize),

    #[error("invalid range: {0}")]
    InvalidRange(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
