// src/solar.rs

use crate::body::Body;
use crate::error::EngineError;
use crate::model::{DisplayPoint, FrameModel, Rgb};
use crate::nbody::{BodyId, NBodyModel, StepReport};
use crate::profile::GroupProfile;
use crate::scale::{Surface, Vec2, ASTRO_UNIT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const SUN_MASS: f64 = 1.98892e30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    #[default]
    Inner,
    Outer,
}

impl Group {
    pub fn profile(&self) -> GroupProfile {
        match self {
            Group::Inner => GroupProfile::inner(),
            Group::Outer => GroupProfile::outer(),
        }
    }

    pub fn planets(&self) -> impl Iterator<Item = Planet> + '_ {
        Planet::ALL.into_iter().filter(move |p| p.group() == *self)
    }
}

impl FromStr for Group {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inner" => Ok(Group::Inner),
            "outer" | "other" => Ok(Group::Outer),
            _ => Err(EngineError::InvalidRange(format!("unknown group: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Earth,
    Mars,
    Mercury,
    Venus,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

struct PlanetData {
    name: &'static str,
    distance_au: f64,
    mass: f64,
    speed: f64,
    radius: f64,
    color: Rgb,
}

impl Planet {
    pub const ALL: [Planet; 8] = [
        Planet::Earth,
        Planet::Mars,
        Planet::Mercury,
        Planet::Venus,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
    ];

    pub fn group(&self) -> Group {
        match self {
            Planet::Earth | Planet::Mars | Planet::Mercury | Planet::Venus => Group::Inner,
            _ => Group::Outer,
        }
    }

    pub fn name(&self) -> &'static str {
        self.data().name
    }

    fn data(&self) -> PlanetData {
        let (name, distance_au, mass, speed, radius, color) = match self {
            Planet::Earth => ("earth", 1.0, 5.97e24, 29.8e3, 10.0, Rgb(13, 111, 212)),
            Planet::Mars => ("mars", 1.52, 0.642e24, 24.1e3, 6.0, Rgb(168, 75, 75)),
            Planet::Mercury => ("mercury", 0.39, 0.330e24, 47.4e3, 4.0, Rgb(193, 193, 193)),
            Planet::Venus => ("venus", 0.72, 4.87e24, 35.0e3, 8.0, Rgb(255, 255, 255)),
            Planet::Jupiter => ("jupiter", 5.2, 1898e24, 13.1e3, 15.0, Rgb(216, 202, 157)),
            Planet::Saturn => ("saturn", 9.5, 568e24, 9.7e3, 10.0, Rgb(233, 199, 85)),
            Planet::Uranus => ("uranus", 19.2, 86.8e24, 6.8e3, 8.0, Rgb(89, 210, 187)),
            Planet::Neptune => ("neptune", 30.1, 102e24, 5.4e3, 6.0, Rgb(89, 169, 210)),
        };
        PlanetData {
            name,
            distance_au,
            mass,
            speed,
            radius,
            color,
        }
    }

    /// Initial state: `(-d AU, 0)` moving along +y at its mean orbital speed.
    pub fn body(&self) -> Result<Body, EngineError> {
        let d = self.data();
        Ok(Body::new(d.name, Vec2::new(-d.distance_au * ASTRO_UNIT, 0.0), d.mass)?
            .with_velocity(Vec2::new(0.0, d.speed))
            .with_radius(d.radius)
            .with_color(d.color))
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Planet {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Planet::ALL
            .into_iter()
            .find(|p| p.name() == lower)
            .ok_or_else(|| EngineError::UnknownBody(s.to_string()))
    }
}

pub fn sun() -> Result<Body, EngineError> {
    Ok(Body::new("sun", Vec2::zeros(), SUN_MASS)?
        .with_radius(30.0)
        .with_color(Rgb(240, 255, 0))
        .as_reference())
}

/// Solar system as a host sees it: one visible group at a time, each planet
/// of that group toggled on or off.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    pub model: NBodyModel,
    sun: BodyId,
    planets: [BodyId; 8],
    group: Group,
}

impl SolarSystem {
    pub fn new() -> Result<Self, EngineError> {
        let mut model = NBodyModel::new();
        let sun = model.insert_active(sun()?)?;
        let mut planets = [BodyId(0); 8];
        for (slot, planet) in planets.iter_mut().zip(Planet::ALL) {
            *slot = model.insert(planet.body()?)?;
        }
        let mut system = SolarSystem {
            model,
            sun,
            planets,
            group: Group::Inner,
        };
        system.activate_group(Group::Inner)?;
        Ok(system)
    }

    pub fn with_min_separation(mut self, min_separation: Option<f64>) -> Result<Self, EngineError> {
        self.model = self.model.with_min_separation(min_separation)?;
        Ok(self)
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn sun_id(&self) -> BodyId {
        self.sun
    }

    pub fn planet_id(&self, planet: Planet) -> BodyId {
        let index = Planet::ALL
            .iter()
            .position(|p| *p == planet)
            .unwrap_or_default();
        self.planets[index]
    }

    pub fn body(&self, planet: Planet) -> Result<&Body, EngineError> {
        self.model.body(self.planet_id(planet))
    }

    pub fn sun(&self) -> Result<&Body, EngineError> {
        self.model.body(self.sun)
    }

    /// Switches the visible group. The group's profile is applied to the sun
    /// and to the group's planets, and membership resets to the sun alone.
    pub fn activate_group(&mut self, group: Group) -> Result<(), EngineError> {
        let profile = group.profile();
        let ids: Vec<BodyId> = std::iter::once(self.sun)
            .chain(group.planets().map(|p| self.planet_id(p)))
            .collect();
        for id in ids {
            let updated = profile.apply(self.model.body(id)?);
            self.model.replace(id, updated)?;
        }
        self.model.active.clear();
        self.model.active.insert(self.sun);
        self.group = group;
        debug!(?group, "group activated");
        Ok(())
    }

    pub fn set_enabled(&mut self, planet: Planet, enabled: bool) -> Result<bool, EngineError> {
        if planet.group() != self.group {
            return Err(EngineError::InvalidRange(format!(
                "{planet} is not in the {:?} group",
                self.group
            )));
        }
        self.model.set_active(self.planet_id(planet), enabled)
    }

    pub fn is_enabled(&self, planet: Planet) -> bool {
        self.model.active.contains(self.planet_id(planet))
    }

    pub fn step(&mut self) -> Result<StepReport, EngineError> {
        self.model.step()
    }
}

impl FrameModel for SolarSystem {
    fn name(&self) -> String {
        "SolarSystem".to_string()
    }

    fn advance(&mut self) -> Result<(), EngineError> {
        self.model.advance()
    }

    fn display_points(&self, surface: &Surface) -> Vec<DisplayPoint> {
        self.model.display_points(surface)
    }
}
