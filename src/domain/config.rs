//! Solver configuration, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::core::constants::{DEFAULT_CELL_SIZE, DEFAULT_COLLISION_BUFFER, DEFAULT_ITERATIONS};
use crate::core::error::{Result, SolverError};
use crate::core::math::Vec2;

/// Contact response shared by every collision created by a world
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMaterial {
    pub stiffness: f32,
    pub damping: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    /// Tangential speed below which `static_friction` applies
    pub static_friction_velocity: f32,
    pub warm_start: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            stiffness: 0.2,
            damping: 1.0,
            static_friction: 0.8,
            dynamic_friction: 0.5,
            static_friction_velocity: 1.0,
            warm_start: 0.8,
        }
    }
}

/// Coefficients of a linear, fixed or angular spring
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    /// Fraction of the position error corrected per tick (0..=1)
    pub stiffness: f32,
    /// Fraction of the velocity error removed per tick (0..=1)
    pub damping: f32,
    /// Fraction of last tick's impulse used to seed this tick
    pub warm_start: f32,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 0.5,
            damping: 1.0,
            warm_start: 0.8,
        }
    }
}

/// Coefficients of a motor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorParams {
    pub damping: f32,
    pub warm_start: f32,
    /// Per-tick cap on the accumulated angular impulse; `None` is unlimited
    pub max_impulse: Option<f32>,
}

impl Default for MotorParams {
    fn default() -> Self {
        Self {
            damping: 1.0,
            warm_start: 0.8,
            max_impulse: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Gauss-Seidel passes per tick
    pub iterations: u32,
    /// Broad-phase cell size; should exceed the largest segment radius
    pub cell_size: f32,
    /// Hysteresis margin between contact creation and destruction
    pub collision_buffer: f32,
    /// Acceleration applied to every dynamic body (units/s²)
    pub gravity: Vec2,
    pub contact: ContactMaterial,
    pub spring: SpringParams,
    pub motor: MotorParams,
    pub perf_enabled: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            cell_size: DEFAULT_CELL_SIZE,
            collision_buffer: DEFAULT_COLLISION_BUFFER,
            gravity: Vec2::ZERO,
            contact: ContactMaterial::default(),
            spring: SpringParams::default(),
            motor: MotorParams::default(),
            perf_enabled: false,
        }
    }
}

impl SolverConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SolverConfig =
            serde_json::from_str(json).map_err(|e| SolverError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SolverError::InvalidConfig("iterations must be at least 1"));
        }
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return Err(SolverError::InvalidConfig("cell_size must be positive"));
        }
        if !(self.collision_buffer >= 0.0 && self.collision_buffer.is_finite()) {
            return Err(SolverError::InvalidConfig("collision_buffer must be non-negative"));
        }
        if !self.gravity.is_finite() {
            return Err(SolverError::InvalidConfig("gravity must be finite"));
        }
        let c = &self.contact;
        if c.static_friction < 0.0 || c.dynamic_friction < 0.0 {
            return Err(SolverError::InvalidConfig("friction must be non-negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SolverConfig::from_json(
            r#"{"iterations": 4, "gravity": {"x": 0.0, "y": 98.0},
                "contact": {"dynamic_friction": 0.1}}"#,
        )
        .expect("config should parse");
        assert_eq!(config.iterations, 4);
        assert_eq!(config.gravity, Vec2::new(0.0, 98.0));
        assert_eq!(config.contact.dynamic_friction, 0.1);
        assert_eq!(config.contact.static_friction, ContactMaterial::default().static_friction);
        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            SolverConfig::from_json(r#"{"iterations": 0}"#),
            Err(SolverError::InvalidConfig("iterations must be at least 1"))
        );
        assert!(matches!(
            SolverConfig::from_json(r#"{"cell_size": -1.0}"#),
            Err(SolverError::InvalidConfig(_))
        ));
        assert!(matches!(
            SolverConfig::from_json("not json"),
            Err(SolverError::ConfigParse(_))
        ));
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let mut config = SolverConfig::default();
        config.collision_buffer = 0.25;
        config.motor.max_impulse = Some(3.0);
        let parsed = SolverConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(parsed, config);
    }
}
