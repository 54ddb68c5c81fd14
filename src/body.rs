//! Bodies: the circular particles moved by the physics world.
//!
//! A [`Body`] is plain data owned by [`crate::physics::PhysicsWorld`].  Render
//! entities only carry a [`BodyIndex`](crate::rendering::BodyIndex) pointing
//! back into the world, so the simulation runs headless.

use crate::motion_blur::BlurDescriptor;
use bevy::prelude::*;
use rand::Rng;

/// Colour cycle used at scene init: body `i` gets `PALETTE[i % PALETTE.len()]`.
pub const PALETTE: [Color; 6] = [
    Color::srgb(1.0, 0.0, 0.0),
    Color::srgb(0.0, 1.0, 0.0),
    Color::srgb(0.5, 0.5, 1.0),
    Color::srgb(0.0, 1.0, 1.0),
    Color::srgb(1.0, 0.0, 1.0),
    Color::srgb(1.0, 1.0, 0.0),
];

/// Which post-processing effects a body can take part in.
///
/// Read by [`crate::scene::render_shapes`]; a body without `blur` never gets a
/// blur descriptor, a body without `metaball` is skipped by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectCaps {
    pub blur: bool,
    pub metaball: bool,
}

impl EffectCaps {
    pub const ALL: Self = Self {
        blur: true,
        metaball: true,
    };
    pub const NONE: Self = Self {
        blur: false,
        metaball: false,
    };
}

impl Default for EffectCaps {
    fn default() -> Self {
        Self::ALL
    }
}

/// A movable circular particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Centre in viewport coordinates (u, y up).
    pub position: Vec2,
    /// Velocity (u/s).
    pub velocity: Vec2,
    /// Radius (u); always > 0.
    pub radius: f32,
    /// Fill and stroke colour.
    pub color: Color,
    /// Carried for completeness; unused while there is no body–body collision.
    pub restitution: f32,
    pub effects: EffectCaps,
    /// Per-body blur switch, driven by [`crate::mode::RenderModeController`].
    pub blur_enabled: bool,
    /// Last computed blur parameters.  Kept while blur is disabled so the
    /// angle survives a round trip through Metaballs mode.
    pub blur: BlurDescriptor,
}

impl Body {
    /// Create a resting body.  Non-positive radii are bumped to a tiny positive
    /// value so the `radius > 0` invariant always holds.
    pub fn new(position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius: if radius > 0.0 { radius } else { f32::EPSILON },
            color,
            restitution: crate::constants::BODY_RESTITUTION,
            effects: EffectCaps::ALL,
            blur_enabled: true,
            blur: BlurDescriptor::default(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the capability tag; a body that cannot blur starts with blur off.
    pub fn with_effects(mut self, effects: EffectCaps) -> Self {
        self.effects = effects;
        self.blur_enabled = effects.blur;
        self
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Colour for the body at `index` in the spawn order.
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Spawn `count` resting bodies at random positions inside `viewport`.
///
/// Centres are drawn so every body starts fully inside the walls when the
/// viewport is large enough; on a viewport smaller than one body the centre
/// is used.
pub fn spawn_bodies<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    radius: f32,
    viewport: Vec2,
) -> Vec<Body> {
    (0..count)
        .map(|i| {
            let x = random_axis(rng, radius, viewport.x);
            let y = random_axis(rng, radius, viewport.y);
            Body::new(Vec2::new(x, y), radius, palette_color(i))
        })
        .collect()
}

fn random_axis<R: Rng + ?Sized>(rng: &mut R, radius: f32, extent: f32) -> f32 {
    let (lo, hi) = (radius, extent - radius);
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        extent * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn palette_cycles_every_six_bodies() {
        assert_eq!(palette_color(0), palette_color(6));
        assert_eq!(palette_color(2), Color::srgb(0.5, 0.5, 1.0));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn spawned_bodies_start_inside_viewport() {
        let mut rng = StdRng::seed_from_u64(7);
        let viewport = Vec2::new(800.0, 600.0);
        let bodies = spawn_bodies(&mut rng, 51, 30.0, viewport);
        assert_eq!(bodies.len(), 51);
        for b in &bodies {
            assert!(b.position.x >= 30.0 && b.position.x <= 770.0);
            assert!(b.position.y >= 30.0 && b.position.y <= 570.0);
            assert_eq!(b.velocity, Vec2::ZERO);
            assert!(b.blur_enabled);
        }
    }

    #[test]
    fn tiny_viewport_spawns_at_centre() {
        let mut rng = StdRng::seed_from_u64(1);
        let bodies = spawn_bodies(&mut rng, 3, 30.0, Vec2::new(40.0, 40.0));
        assert!(bodies.iter().all(|b| b.position == Vec2::new(20.0, 20.0)));
    }

    #[test]
    fn non_positive_radius_is_bumped() {
        let b = Body::new(Vec2::ZERO, 0.0, Color::WHITE);
        assert!(b.radius > 0.0);
    }
}
