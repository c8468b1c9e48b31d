pub mod body;
pub mod config;
pub mod error;
pub mod model;
pub mod nbody;
pub mod pendulum;
pub mod profile;
pub mod recorder;
pub mod scale;
pub mod sensitivity;
pub mod solar;
pub mod sweep;

pub use body::Body;
pub use config::SimulationConfig;
pub use error::{ConfigError, EngineError, RecordError};
pub use model::{DisplayPoint, FrameModel, Rgb};
pub use nbody::{pairwise_force, ActiveSet, BodyArena, BodyId, NBodyModel, StepReport};
pub use pendulum::{InitialCondition, Pendulum, PendulumParams, PendulumState};
pub use profile::GroupProfile;
pub use scale::{project_for_display, Surface, Vec2};
pub use solar::{Group, Planet, SolarSystem};
