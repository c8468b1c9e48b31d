// src/recorder.rs

use crate::error::RecordError;
use crate::nbody::NBodyModel;
use crate::pendulum::Pendulum;
use chrono::Utc;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Relative energy drifts whose first crossing is recorded.
pub const ENERGY_THRESHOLDS: [f64; 8] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySample {
    pub frame: usize,
    pub body: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub distance_to_reference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendulumSample {
    pub frame: usize,
    pub angle: f64,
    pub angular_velocity: f64,
    pub bob_x: f64,
    pub bob_y: f64,
}

#[derive(Debug, Clone)]
pub struct Trajectory {
    pub bodies: Vec<BodySample>,
    pub pendulum: Vec<PendulumSample>,
    pub total_energy: Vec<f64>,
    total_frames: usize,
    initial_energy: Option<f64>,
    pub energy_exceeded: HashMap<OrderedFloat<f64>, Option<f64>>,
}

impl Trajectory {
    pub fn new(total_frames: usize) -> Self {
        let energy_exceeded = ENERGY_THRESHOLDS
            .iter()
            .map(|&t| (OrderedFloat(t), None))
            .collect();
        Trajectory {
            bodies: Vec::new(),
            pendulum: Vec::new(),
            total_energy: Vec::new(),
            total_frames,
            initial_energy: None,
            energy_exceeded,
        }
    }

    pub fn record_nbody(&mut self, frame: usize, model: &NBodyModel) {
        for (_, b) in model.active_bodies() {
            self.bodies.push(BodySample {
                frame,
                body: b.name.clone(),
                x: b.position.x,
                y: b.position.y,
                vx: b.velocity.x,
                vy: b.velocity.y,
                distance_to_reference: b.distance_to_reference,
            });
        }
        self.record_energy(frame, model.total_energy());
    }

    pub fn record_pendulum(&mut self, frame: usize, pendulum: &Pendulum) {
        let bob = pendulum.bob_position();
        self.pendulum.push(PendulumSample {
            frame,
            angle: pendulum.angle(),
            angular_velocity: pendulum.angular_velocity(),
            bob_x: bob.x,
            bob_y: bob.y,
        });
    }

    fn record_energy(&mut self, frame: usize, energy: f64) {
        self.total_energy.push(energy);
        let initial = *self.initial_energy.get_or_insert(energy);
        let frames = self.total_frames.max(1) as f64;
        for (threshold, crossed) in self.energy_exceeded.iter_mut() {
            if crossed.is_none() && (energy - initial).abs() > threshold.into_inner() * initial.abs() {
                *crossed = Some(frame as f64 / frames);
            }
        }
    }

    pub fn energy_std_dev(&self) -> f64 {
        if self.total_energy.is_empty() {
            return 0.0;
        }
        let n = self.total_energy.len() as f64;
        let mean = self.total_energy.iter().sum::<f64>() / n;
        let variance = self
            .total_energy
            .iter()
            .map(|e| (e - mean).powi(2))
            .sum::<f64>()
            / n;
        variance.sqrt()
    }

    /// Thresholds sorted ascending, with the fraction of the run at which each
    /// was first exceeded.
    pub fn energy_crossings(&self) -> Vec<(f64, Option<f64>)> {
        let mut crossings: Vec<(f64, Option<f64>)> = self
            .energy_exceeded
            .iter()
            .map(|(k, v)| (k.into_inner(), *v))
            .collect();
        crossings.sort_by_key(|(k, _)| OrderedFloat(*k));
        crossings
    }

    pub fn export_bodies_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordError> {
        let mut wtr = csv::Writer::from_path(path)?;
        for sample in &self.bodies {
            wtr.serialize(sample)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn export_pendulum_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordError> {
        let mut wtr = csv::Writer::from_path(path)?;
        for sample in &self.pendulum {
            wtr.serialize(sample)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub date: String,
    pub model: String,
    pub frames: usize,
    pub bodies: Vec<String>,
    pub initial_energy: Option<f64>,
    pub final_energy: Option<f64>,
    pub energy_std_dev: f64,
    pub energy_thresholds: Vec<(f64, Option<f64>)>,
    pub execution_duration: f64,
    pub notes: String,
}

impl RunSummary {
    pub fn new(model: &str, trajectory: &Trajectory, bodies: Vec<String>, execution_duration: f64) -> Self {
        RunSummary {
            date: Utc::now().to_rfc3339(),
            model: model.to_string(),
            frames: trajectory.total_frames,
            bodies,
            initial_energy: trajectory.total_energy.first().copied(),
            final_energy: trajectory.total_energy.last().copied(),
            energy_std_dev: trajectory.energy_std_dev(),
            energy_thresholds: trajectory.energy_crossings(),
            execution_duration,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pendulum::{InitialCondition, PendulumParams};
    use crate::solar::{Planet, SolarSystem};

    fn recorded_inner_system(frames: usize) -> (SolarSystem, Trajectory) {
        let mut system = SolarSystem::new().unwrap();
        system.set_enabled(Planet::Earth, true).unwrap();
        system.set_enabled(Planet::Venus, true).unwrap();
        let mut t = Trajectory::new(frames);
        for frame in 0..frames {
            system.step().unwrap();
            t.record_nbody(frame, &system.model);
        }
        (system, t)
    }

    #[test]
    fn crossings_are_sorted_and_start_empty() {
        let t = Trajectory::new(10);
        let crossings = t.energy_crossings();
        assert_eq!(crossings.len(), ENERGY_THRESHOLDS.len());
        assert!(crossings.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(crossings.iter().all(|(_, c)| c.is_none()));
    }

    #[test]
    fn records_first_threshold_crossing() {
        let mut t = Trajectory::new(4);
        t.record_energy(0, -100.0);
        t.record_energy(1, -100.2);
        t.record_energy(2, -103.0);
        let crossings: HashMap<_, _> = t.energy_crossings().into_iter().map(|(k, v)| (OrderedFloat(k), v)).collect();
        assert_eq!(crossings[&OrderedFloat(0.001)], Some(0.25));
        assert_eq!(crossings[&OrderedFloat(0.01)], Some(0.5));
        assert_eq!(crossings[&OrderedFloat(0.05)], None);
    }

    #[test]
    fn pendulum_csv_has_one_row_per_frame() {
        let mut p = Pendulum::new(
            PendulumParams {
                initial: InitialCondition::Angle(0.5),
                ..Default::default()
            },
            750.0,
        )
        .unwrap();
        let mut t = Trajectory::new(5);
        for frame in 0..5 {
            p.step();
            t.record_pendulum(frame, &p);
        }
        let path = std::env::temp_dir().join("physproc_recorder_pendulum.csv");
        t.export_pendulum_csv(&path).unwrap();
        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(rdr.records().count(), 5);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn body_csv_has_one_row_per_active_body_per_frame() {
        let (system, t) = recorded_inner_system(4);
        assert_eq!(system.model.active.len(), 3);
        let path = std::env::temp_dir().join("physproc_recorder_bodies.csv");
        t.export_bodies_csv(&path).unwrap();
        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[1], "body");
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4 * 3);
        assert_eq!(&rows[0][1], "sun");
        assert_eq!(&rows[11][0], "3");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn run_summary_json_reads_back() {
        let (system, t) = recorded_inner_system(6);
        let bodies: Vec<String> = system.model.active_bodies().map(|(_, b)| b.name.clone()).collect();
        let summary = RunSummary::new("SolarSystem", &t, bodies, 0.25).with_notes("inner group");
        let path = std::env::temp_dir().join("physproc_recorder_summary.json");
        summary.write_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["frames"], 6);
        assert_eq!(value["model"], "SolarSystem");
        assert_eq!(value["notes"], "inner group");
        assert_eq!(value["bodies"], serde_json::json!(["sun", "earth", "venus"]));
        assert!(chrono::DateTime::parse_from_rfc3339(value["date"].as_str().unwrap()).is_ok());

        let thresholds: Vec<f64> = value["energy_thresholds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| pair[0].as_f64().unwrap())
            .collect();
        assert_eq!(thresholds, ENERGY_THRESHOLDS.to_vec());
        let _ = std::fs::remove_file(&path);
    }
}
