//! Velocity-driven directional blur parameters.
//!
//! Each body in MotionBlur mode gets a [`BlurDescriptor`] recomputed once per
//! tick from its velocity: the blur points along the direction of travel and
//! stretches with speed.  The presentation layer turns the descriptor into a
//! fan of ghost discs (see [`crate::rendering`]).

use crate::body::Body;
use crate::config::DemoConfig;
use crate::constants::{BLUR_STATIONARY_EPSILON, BLUR_VELOCITY_SCALE, MAX_BLUR_RADIUS};
use bevy::prelude::*;

/// Blur direction (radians, `atan2` convention) and length (u).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlurDescriptor {
    pub angle: f32,
    pub radius: f32,
}

impl BlurDescriptor {
    /// Unit vector along the blur direction.
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Zero-radius blur is a no-op for the renderer.
    pub fn is_noop(&self) -> bool {
        self.radius <= 0.0
    }
}

/// Converts velocity into [`BlurDescriptor`]s.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MotionBlurParameterizer {
    pub velocity_scale: f32,
    pub max_radius: f32,
}

impl Default for MotionBlurParameterizer {
    fn default() -> Self {
        Self {
            velocity_scale: BLUR_VELOCITY_SCALE,
            max_radius: MAX_BLUR_RADIUS,
        }
    }
}

impl MotionBlurParameterizer {
    pub fn from_config(config: &DemoConfig) -> Self {
        Self {
            velocity_scale: config.blur_velocity_scale,
            max_radius: config.max_blur_radius,
        }
    }

    /// Blur for `velocity`, given the previous descriptor.
    ///
    /// A (near-)stationary or non-finite velocity keeps `previous.angle` so the
    /// blur does not snap to angle 0, and collapses the radius to 0.
    pub fn parameterize(&self, velocity: Vec2, previous: BlurDescriptor) -> BlurDescriptor {
        let speed = velocity.length();
        if !speed.is_finite() || speed < BLUR_STATIONARY_EPSILON {
            return BlurDescriptor {
                angle: previous.angle,
                radius: 0.0,
            };
        }
        BlurDescriptor {
            angle: velocity.y.atan2(velocity.x),
            radius: (speed * self.velocity_scale).clamp(0.0, self.max_radius),
        }
    }

    /// Refresh the descriptor of every blur-capable, blur-enabled body.
    ///
    /// Each body only reads its own velocity and writes its own descriptor.
    pub fn update_bodies(&self, bodies: &mut [Body]) {
        for body in bodies
            .iter_mut()
            .filter(|b| b.effects.blur && b.blur_enabled)
        {
            body.blur = self.parameterize(body.velocity, body.blur);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_four_velocity() {
        let blur = MotionBlurParameterizer::default()
            .parameterize(Vec2::new(3.0, 4.0), BlurDescriptor::default());
        assert!((blur.angle - 0.927_295_2).abs() < 1e-5, "angle {}", blur.angle);
        assert!((blur.radius - 0.5).abs() < 1e-6, "radius {}", blur.radius);
    }

    #[test]
    fn stationary_holds_previous_angle() {
        let previous = BlurDescriptor {
            angle: 1.0,
            radius: 3.0,
        };
        let blur = MotionBlurParameterizer::default().parameterize(Vec2::ZERO, previous);
        assert_eq!(blur.angle, 1.0);
        assert_eq!(blur.radius, 0.0);
        assert!(blur.is_noop());
    }

    #[test]
    fn non_finite_velocity_is_treated_as_stationary() {
        let previous = BlurDescriptor {
            angle: -0.5,
            radius: 1.0,
        };
        let blur =
            MotionBlurParameterizer::default().parameterize(Vec2::new(f32::NAN, 1.0), previous);
        assert_eq!(blur.angle, -0.5);
        assert_eq!(blur.radius, 0.0);
    }

    #[test]
    fn radius_is_clamped_to_backend_maximum() {
        let blur = MotionBlurParameterizer::default()
            .parameterize(Vec2::new(1.0e6, 0.0), BlurDescriptor::default());
        assert_eq!(blur.radius, MAX_BLUR_RADIUS);
        assert_eq!(blur.angle, 0.0);
    }

    #[test]
    fn disabled_bodies_are_left_untouched() {
        let mut bodies = vec![
            Body::new(Vec2::ZERO, 30.0, Color::WHITE).with_velocity(Vec2::new(0.0, 10.0)),
            Body::new(Vec2::ZERO, 30.0, Color::WHITE).with_velocity(Vec2::new(0.0, 10.0)),
        ];
        bodies[1].blur_enabled = false;
        MotionBlurParameterizer::default().update_bodies(&mut bodies);
        assert!((bodies[0].blur.radius - 1.0).abs() < 1e-6);
        assert_eq!(bodies[1].blur, BlurDescriptor::default());
    }
}
