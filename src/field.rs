//! Static and interactive fields acting on bodies.
//!
//! | Field                     | Lifetime                  | Mutated by              |
//! |---------------------------|---------------------------|-------------------------|
//! | [`BoundaryField`]         | rebuilt on viewport resize| `WindowResized`         |
//! | [`RadialAttractionField`] | whole session             | pointer down/drag/up    |

use crate::config::DemoConfig;
use crate::constants::*;
use bevy::prelude::*;

// ── Boundary ──────────────────────────────────────────────────────────────────

/// Which wall a body touched during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Floor,
    Ceiling,
}

impl Wall {
    /// Inward-facing unit normal.
    pub fn normal(self) -> Vec2 {
        match self {
            Wall::Left => Vec2::X,
            Wall::Right => Vec2::NEG_X,
            Wall::Floor => Vec2::Y,
            Wall::Ceiling => Vec2::NEG_Y,
        }
    }
}

/// Four immovable walls at the viewport edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryField {
    pub left: f32,
    pub right: f32,
    pub floor: f32,
    pub ceiling: f32,
    pub restitution: f32,
}

impl BoundaryField {
    /// Walls at `x = 0`, `x = width`, `y = 0`, `y = height`.
    pub fn from_viewport(size: Vec2, restitution: f32) -> Self {
        Self {
            left: 0.0,
            right: size.x.max(0.0),
            floor: 0.0,
            ceiling: size.y.max(0.0),
            restitution,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.ceiling - self.floor)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.floor + self.ceiling) * 0.5,
        )
    }

    /// Push a disc back inside the walls.
    ///
    /// For every wall the disc's edge crossed, the centre is clamped so the
    /// edge rests on the wall and the velocity component along the wall normal
    /// is reflected by `restitution` (0 stops it dead).  Returns the walls hit.
    ///
    /// A disc wider than the box is centred on that axis with zero velocity.
    pub fn resolve(&self, position: &mut Vec2, velocity: &mut Vec2, radius: f32) -> Vec<Wall> {
        let mut hits = Vec::new();
        let bounce = 1.0 + self.restitution;

        resolve_axis(
            &mut position.x,
            &mut velocity.x,
            radius,
            self.left,
            self.right,
            bounce,
            (Wall::Left, Wall::Right),
            &mut hits,
        );
        resolve_axis(
            &mut position.y,
            &mut velocity.y,
            radius,
            self.floor,
            self.ceiling,
            bounce,
            (Wall::Floor, Wall::Ceiling),
            &mut hits,
        );
        hits
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_axis(
    pos: &mut f32,
    vel: &mut f32,
    radius: f32,
    lo: f32,
    hi: f32,
    bounce: f32,
    walls: (Wall, Wall),
    hits: &mut Vec<Wall>,
) {
    if hi - lo <= 2.0 * radius {
        *pos = (lo + hi) * 0.5;
        *vel = 0.0;
        hits.push(walls.0);
        hits.push(walls.1);
        return;
    }
    if *pos - radius <= lo {
        *pos = lo + radius;
        if *vel < 0.0 {
            *vel -= bounce * *vel;
        }
        hits.push(walls.0);
    } else if *pos + radius >= hi {
        *pos = hi - radius;
        if *vel > 0.0 {
            *vel -= bounce * *vel;
        }
        hits.push(walls.1);
    }
}

// ── Radial attraction ─────────────────────────────────────────────────────────

/// Point-centred attraction driven by the pointer.
///
/// A single instance lives in the [`PhysicsWorld`](crate::physics::PhysicsWorld)
/// and acts on every body.  `strength == 0` means inactive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialAttractionField {
    pub position: Vec2,
    pub strength: f32,
    pub falloff: f32,
    pub radius: f32,
    /// Strength used when the pointer reports no pressure.
    pub fixed_strength: f32,
    /// Strength at full pressure.
    pub max_strength: f32,
}

impl Default for RadialAttractionField {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            strength: 0.0,
            falloff: ATTRACTION_FALLOFF,
            radius: ATTRACTION_RADIUS,
            fixed_strength: ATTRACTION_FIXED_STRENGTH,
            max_strength: ATTRACTION_MAX_STRENGTH,
        }
    }
}

impl RadialAttractionField {
    pub fn from_config(config: &DemoConfig) -> Self {
        Self {
            falloff: config.attraction_falloff,
            radius: config.attraction_radius,
            fixed_strength: config.attraction_fixed_strength,
            max_strength: config.attraction_max_strength,
            ..Default::default()
        }
    }

    /// Move the field to the pointer and switch it on.
    ///
    /// `pressure` is the normalised force in `0..=1` when the hardware reports
    /// it; out-of-range or NaN pressure is clamped (NaN counts as 0).
    pub fn set_from_pointer(&mut self, position: Vec2, pressure: Option<f32>) {
        self.position = position;
        self.strength = match pressure {
            Some(p) => {
                let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
                p * self.max_strength
            }
            None => self.fixed_strength,
        };
    }

    /// Switch the field off (pointer released).
    pub fn clear(&mut self) {
        self.strength = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.strength != 0.0
    }

    /// Acceleration (in field-strength units) felt by a point at `at`.
    ///
    /// Zero when inactive, outside `radius`, or exactly on the field centre
    /// where the direction is undefined.
    pub fn acceleration_at(&self, at: Vec2) -> Vec2 {
        if !self.is_active() {
            return Vec2::ZERO;
        }
        let delta = self.position - at;
        let distance = delta.length();
        if distance > self.radius {
            return Vec2::ZERO;
        }
        delta.normalize_or_zero() * self.strength * falloff_curve(distance, self.falloff)
    }
}

/// `1 / max(d / FALLOFF_REFERENCE_DISTANCE, 1)^falloff`.
///
/// Flat at 1.0 near the centre so the curve never divides by zero.
pub fn falloff_curve(distance: f32, falloff: f32) -> f32 {
    let d = (distance / FALLOFF_REFERENCE_DISTANCE).max(1.0);
    d.powf(-falloff)
}
