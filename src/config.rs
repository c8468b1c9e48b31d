// src/config.rs

use crate::error::ConfigError;
use crate::pendulum::PendulumParams;
use crate::scale::Surface;
use crate::solar::{Group, Planet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarConfig {
    pub group: Group,
    pub enabled: Vec<String>,
    pub min_separation: Option<f64>,
}

impl Default for SolarConfig {
    fn default() -> Self {
        SolarConfig {
            group: Group::Inner,
            enabled: vec!["earth".to_string()],
            min_separation: None,
        }
    }
}

impl SolarConfig {
    pub fn planets(&self) -> Result<Vec<Planet>, ConfigError> {
        self.enabled
            .iter()
            .map(|name| {
                name.parse::<Planet>()
                    .map_err(|e| ConfigError::Validation(e.to_string()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub frames: usize,
    pub record_every: usize,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            // one minute at 60 fps
            frames: 3600,
            record_every: 1,
            output_dir: PathBuf::from("experiment_data"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub surface: Surface,
    pub pendulum: PendulumParams,
    pub solar: SolarConfig,
    pub run: RunConfig,
}

impl SimulationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.surface.width > 0.0 && self.surface.height > 0.0) {
            return Err(ConfigError::Validation(format!(
                "surface must be non-empty, got {}x{}",
                self.surface.width, self.surface.height
            )));
        }
        if self.run.frames == 0 {
            return Err(ConfigError::Validation("frames must be > 0".to_string()));
        }
        if self.run.record_every == 0 {
            return Err(ConfigError::Validation("record_every must be > 0".to_string()));
        }
        if let Some(floor) = self.solar.min_separation {
            if !floor.is_finite() || floor <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "min_separation must be > 0, got {floor}"
                )));
            }
        }
        for planet in self.solar.planets()? {
            if planet.group() != self.solar.group {
                return Err(ConfigError::Validation(format!(
                    "{planet} is not in the {:?} group",
                    self.solar.group
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pendulum::InitialCondition;

    #[test]
    fn empty_object_gives_defaults() {
        let config = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.surface, Surface::new(750.0, 650.0));
        assert_eq!(config.pendulum.length, 200.0);
    }

    #[test]
    fn parses_partial_sections() {
        let config = SimulationConfig::from_json(
            r#"{
                "pendulum": { "length": 120.0, "initial": { "bob_position": [400.0, 200.0] } },
                "solar": { "group": "outer", "enabled": ["Jupiter", "saturn"] },
                "run": { "frames": 10 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.pendulum.length, 120.0);
        assert_eq!(config.pendulum.mass, 5.0);
        assert_eq!(config.pendulum.initial, InitialCondition::BobPosition(400.0, 200.0));
        assert_eq!(config.solar.planets().unwrap(), vec![Planet::Jupiter, Planet::Saturn]);
        assert_eq!(config.run.frames, 10);
        assert_eq!(config.run.record_every, 1);
    }

    #[test]
    fn rejects_planet_outside_group() {
        let err = SimulationConfig::from_json(r#"{ "solar": { "group": "inner", "enabled": ["neptune"] } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SimulationConfig::from_json(r#"{ "run": { "frames": 0 } }"#).is_err());
        assert!(SimulationConfig::from_json(r#"{ "surface": { "width": 0.0, "height": 10.0 } }"#).is_err());
        assert!(SimulationConfig::from_json(r#"{ "solar": { "min_separation": -1.0 } }"#).is_err());
        assert!(SimulationConfig::from_json(r#"{ "solar": { "min_separation": 0.0 } }"#).is_err());
        let config = SimulationConfig::from_json(r#"{ "solar": { "min_separation": 1000.0 } }"#).unwrap();
        assert_eq!(config.solar.min_separation, Some(1000.0));
        assert!(matches!(
            SimulationConfig::from_json("not json").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
