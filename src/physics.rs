//! The physics world: bodies, walls, and the pointer-driven attraction field.
//!
//! ## Step order (per body)
//!
//! 1. Attraction from [`RadialAttractionField`] (skipped while inactive).
//! 2. Explicit Euler: `v += a·dt`, clamp `|v|`, `p += v·dt`.
//! 3. Wall response from [`BoundaryField`].
//!
//! There is no body–body collision: bodies overlap freely, which the metaball
//! compositor relies on.

use crate::body::Body;
use crate::config::DemoConfig;
use crate::constants::{ATTRACTION_ACCEL_SCALE, MAX_SPEED, MAX_STEP_DT, WALL_RESTITUTION};
use crate::field::{BoundaryField, RadialAttractionField};
use bevy::prelude::*;

/// Owns every body plus the two fields acting on them.
#[derive(Resource, Debug, Clone)]
pub struct PhysicsWorld {
    pub bodies: Vec<Body>,
    pub boundary: BoundaryField,
    pub attraction: RadialAttractionField,
    /// Field strength → acceleration (u/s² per unit strength).
    pub accel_scale: f32,
    pub max_speed: f32,
    pub max_step_dt: f32,
}

impl PhysicsWorld {
    /// An empty world bounded by a `viewport`-sized box.
    pub fn new(viewport: Vec2) -> Self {
        Self {
            bodies: Vec::new(),
            boundary: BoundaryField::from_viewport(viewport, WALL_RESTITUTION),
            attraction: RadialAttractionField::default(),
            accel_scale: ATTRACTION_ACCEL_SCALE,
            max_speed: MAX_SPEED,
            max_step_dt: MAX_STEP_DT,
        }
    }

    pub fn from_config(viewport: Vec2, config: &DemoConfig) -> Self {
        Self {
            bodies: Vec::new(),
            boundary: BoundaryField::from_viewport(viewport, config.wall_restitution),
            attraction: RadialAttractionField::from_config(config),
            accel_scale: config.attraction_accel_scale,
            max_speed: config.max_speed,
            max_step_dt: config.max_step_dt,
        }
    }

    pub fn with_bodies(mut self, bodies: Vec<Body>) -> Self {
        self.bodies = bodies;
        self
    }

    /// Rebuild the walls for a new viewport size, keeping restitution, and
    /// pull every body back inside.
    pub fn resize(&mut self, viewport: Vec2) {
        self.boundary = BoundaryField::from_viewport(viewport, self.boundary.restitution);
        let boundary = self.boundary;
        for body in &mut self.bodies {
            boundary.resolve(&mut body.position, &mut body.velocity, body.radius);
        }
    }

    /// Advance every body by `dt` seconds.
    ///
    /// Non-finite or non-positive `dt` is a no-op; `dt` above `max_step_dt` is
    /// clamped.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.max_step_dt);
        let attraction = self.attraction;
        let boundary = self.boundary;

        for body in &mut self.bodies {
            let accel = attraction.acceleration_at(body.position) * self.accel_scale;
            body.velocity += accel * dt;
            body.velocity = sanitize_velocity(body.velocity, self.max_speed);
            body.position += body.velocity * dt;
            if !body.position.is_finite() {
                body.position = boundary.center();
                body.velocity = Vec2::ZERO;
            }
            boundary.resolve(&mut body.position, &mut body.velocity, body.radius);
        }
    }
}

/// Clamp `|v|` to `max_speed`; NaN/∞ components reset the velocity to zero.
fn sanitize_velocity(velocity: Vec2, max_speed: f32) -> Vec2 {
    if !velocity.is_finite() {
        return Vec2::ZERO;
    }
    velocity.clamp_length_max(max_speed)
}
