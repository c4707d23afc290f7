//! Node motion over simulated time.

use relaynet_core::Vec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Trait for node trajectories.
pub trait OrbitPath: Send + Sync {
    /// Absolute position at time t seconds from scenario start.
    fn position(&self, t: f64) -> Vec3;

    /// Approximate speed in meters per second.
    fn speed_mps(&self) -> f64 {
        // Default: estimate from position delta
        let dt = 0.1;
        (self.position(dt) - self.position(0.0)).length() / dt
    }
}

/// Node that does not move (ground stations, parked probes).
#[derive(Debug, Clone, Copy)]
pub struct FixedPoint {
    pub position: Vec3,
}

impl OrbitPath for FixedPoint {
    fn position(&self, _t: f64) -> Vec3 {
        self.position
    }

    fn speed_mps(&self) -> f64 {
        0.0
    }
}

/// Circular orbit around a center point, tilted about the x axis.
#[derive(Debug, Clone, Copy)]
pub struct CircularOrbit {
    pub center: Vec3,
    pub radius_m: f64,
    pub period_s: f64,
    pub phase_rad: f64,
    pub inclination_rad: f64,
}

impl CircularOrbit {
    /// Create a circular orbit.
    ///
    /// # Arguments
    /// * `center` - Center of the orbited body
    /// * `radius_m` - Orbit radius from the center
    /// * `period_s` - Time for one revolution
    /// * `phase_rad` - Angle along the orbit at t = 0
    /// * `inclination_rad` - Tilt of the orbital plane about the x axis
    pub fn new(
        center: Vec3,
        radius_m: f64,
        period_s: f64,
        phase_rad: f64,
        inclination_rad: f64,
    ) -> Self {
        Self {
            center,
            radius_m,
            period_s,
            phase_rad,
            inclination_rad,
        }
    }

    /// Orbit with the Keplerian period for gravitational parameter `mu`.
    pub fn keplerian(center: Vec3, radius_m: f64, mu: f64, phase_rad: f64, inclination_rad: f64) -> Self {
        let period_s = 2.0 * PI * (radius_m.powi(3) / mu).sqrt();
        Self::new(center, radius_m, period_s, phase_rad, inclination_rad)
    }
}

impl OrbitPath for CircularOrbit {
    fn position(&self, t: f64) -> Vec3 {
        let angle = if self.period_s > 0.0 {
            self.phase_rad + 2.0 * PI * t / self.period_s
        } else {
            self.phase_rad
        };

        let x = self.radius_m * angle.cos();
        let y = self.radius_m * angle.sin();
        let (sin_i, cos_i) = self.inclination_rad.sin_cos();

        self.center + Vec3::new(x, y * cos_i, y * sin_i)
    }

    fn speed_mps(&self) -> f64 {
        if self.period_s > 0.0 {
            2.0 * PI * self.radius_m / self.period_s
        } else {
            0.0
        }
    }
}

/// Serializable trajectory description used in scenario files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrbitSpec {
    Fixed,
    Circular {
        #[serde(default)]
        center: Vec3,
        radius_m: f64,
        period_s: f64,
        #[serde(default)]
        phase_rad: f64,
        #[serde(default)]
        inclination_rad: f64,
    },
}

impl OrbitSpec {
    /// Build the trajectory; `start` is used for fixed nodes.
    pub fn into_path(self, start: Vec3) -> Box<dyn OrbitPath> {
        match self {
            OrbitSpec::Fixed => Box::new(FixedPoint { position: start }),
            OrbitSpec::Circular {
                center,
                radius_m,
                period_s,
                phase_rad,
                inclination_rad,
            } => Box::new(CircularOrbit::new(
                center,
                radius_m,
                period_s,
                phase_rad,
                inclination_rad,
            )),
        }
    }
}
