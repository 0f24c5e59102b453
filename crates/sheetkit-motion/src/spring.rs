#![forbid(unsafe_code)]

//! Damped spring physics.
//!
//! Springs are integrated with semi-implicit Euler in fixed sub-steps so the
//! result does not depend on how the host slices frame time.
//!
//! # Invariants
//!
//! - A settled spring sits exactly on its target with zero velocity.
//! - Non-finite input never produces a non-finite position; the spring
//!   settles on the target instead.

use std::time::Duration;

/// Integration sub-step in seconds.
const SUBSTEP: f64 = 1.0 / 1000.0;

/// Spring parameters (unit mass by default).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpringParams {
    /// Damping coefficient.
    pub damping: f64,
    /// Stiffness coefficient.
    pub stiffness: f64,
    /// Mass of the simulated body.
    pub mass: f64,
    /// Distance from target under which the spring may settle.
    pub rest_displacement: f64,
    /// Speed under which the spring may settle.
    pub rest_speed: f64,
}

impl SpringParams {
    /// Sheet spring: damping 25, stiffness 120.
    pub const SHEET: Self = Self {
        damping: 25.0,
        stiffness: 120.0,
        mass: 1.0,
        rest_displacement: 0.01,
        rest_speed: 2.0,
    };

    /// Create parameters with the given damping and stiffness.
    pub fn new(damping: f64, stiffness: f64) -> Self {
        Self {
            damping,
            stiffness,
            ..Self::SHEET
        }
    }

    /// Set the simulated mass.
    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set the rest thresholds.
    pub fn rest(mut self, displacement: f64, speed: f64) -> Self {
        self.rest_displacement = displacement;
        self.rest_speed = speed;
        self
    }

    /// Whether the parameters describe a physically valid spring.
    pub fn is_valid(&self) -> bool {
        self.damping.is_finite()
            && self.damping >= 0.0
            && self.stiffness.is_finite()
            && self.stiffness > 0.0
            && self.mass.is_finite()
            && self.mass > 0.0
            && self.rest_displacement > 0.0
            && self.rest_speed > 0.0
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::SHEET
    }
}

/// Position and velocity of a spring in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState {
    pub position: f64,
    pub velocity: f64,
}

impl SpringState {
    pub fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }

    /// Whether the spring is at rest relative to `target`.
    pub fn is_at_rest(&self, target: f64, params: &SpringParams) -> bool {
        (self.position - target).abs() <= params.rest_displacement
            && self.velocity.abs() <= params.rest_speed
    }

    /// Advance the spring toward `target` by `dt`.
    ///
    /// Returns `true` once settled; the state is then exactly on target.
    pub fn step(&mut self, target: f64, params: &SpringParams, dt: Duration) -> bool {
        if !self.position.is_finite() || !self.velocity.is_finite() || !params.is_valid() {
            self.settle(target);
            return true;
        }
        if self.is_at_rest(target, params) {
            self.settle(target);
            return true;
        }

        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let h = remaining.min(SUBSTEP);
            let displacement = self.position - target;
            let accel = (-params.stiffness * displacement - params.damping * self.velocity)
                / params.mass;
            self.velocity += accel * h;
            self.position += self.velocity * h;
            remaining -= h;

            if self.is_at_rest(target, params) {
                self.settle(target);
                return true;
            }
        }
        false
    }

    fn settle(&mut self, target: f64) {
        self.position = target;
        self.velocity = 0.0;
    }
}
