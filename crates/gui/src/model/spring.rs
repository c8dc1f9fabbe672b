//! Damped spring used to ease the model scale.
//!
//! Pure function of (value, velocity, target, dt); no frame-rate or engine
//! dependency beyond the fixed substep.

use serde::{Deserialize, Serialize};

/// Integration substep (seconds)
const SUBSTEP: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub mass: f32,
    pub tension: f32,
    pub friction: f32,
    /// Distance and speed below which the spring snaps to its target
    pub precision: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            tension: 170.0,
            friction: 26.0,
            precision: 0.0005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    /// A spring at rest at `value`.
    pub fn new(config: SpringConfig, value: f32) -> Self {
        Self {
            config,
            value,
            velocity: 0.0,
            target: value,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn step(&mut self, dt: f32) -> f32 {
        if self.is_settled() || dt <= 0.0 {
            return self.value;
        }

        let mass = self.config.mass.max(f32::EPSILON);
        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(SUBSTEP);
            let displacement = self.value - self.target;
            let force = -self.config.tension * displacement - self.config.friction * self.velocity;
            self.velocity += force / mass * h;
            self.value += self.velocity * h;
            remaining -= h;

            if (self.value - self.target).abs() < self.config.precision
                && self.velocity.abs() < self.config.precision
            {
                self.value = self.target;
                self.velocity = 0.0;
                break;
            }
        }
        self.value
    }
}
