//! Centralised simulation and rendering constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place.  [`crate::config::DemoConfig`] mirrors the runtime
//! tuneable subset and uses these as its defaults.
//!
//! ## Coordinate system
//!
//! The core works in *viewport* coordinates: origin at the bottom-left corner,
//! `x` in `[0, width]`, `y` in `[0, height]`, `y` pointing up.  The Bevy
//! presentation layer offsets by half the viewport to place shapes around the
//! camera origin.

// ── Window ────────────────────────────────────────────────────────────────────

/// Initial window width (logical pixels).  Landscape, like the original demo.
pub const WINDOW_WIDTH: u32 = 1024;

/// Initial window height (logical pixels).
pub const WINDOW_HEIGHT: u32 = 768;

/// Background grey level (sRGB, 0–1).
pub const BACKGROUND_GREY: f32 = 0.5;

// ── Bodies ────────────────────────────────────────────────────────────────────

/// Number of bodies spawned at scene init (indices 0..=50).
pub const BODY_COUNT: usize = 51;

/// Largest `body_count` a config file may request.
pub const MAX_BODY_COUNT: usize = 4096;

/// Radius (u) of every spawned body.
pub const BODY_RADIUS: f32 = 30.0;

/// Restitution carried on each body.
///
/// There is no body–body collision, so this is never consumed by the
/// integrator; walls use [`WALL_RESTITUTION`].
pub const BODY_RESTITUTION: f32 = 0.5;

// ── Boundary ──────────────────────────────────────────────────────────────────

/// Restitution of the four viewport walls.  0.0 = bodies stop dead on contact.
pub const WALL_RESTITUTION: f32 = 0.0;

// ── Radial attraction field ───────────────────────────────────────────────────

/// Field strength when the pointer reports no pressure.
pub const ATTRACTION_FIXED_STRENGTH: f32 = 40.0;

/// Field strength at full pressure (`pressure_ratio * ATTRACTION_MAX_STRENGTH`).
pub const ATTRACTION_MAX_STRENGTH: f32 = 80.0;

/// Falloff exponent of the field.
pub const ATTRACTION_FALLOFF: f32 = 0.5;

/// Effective radius (u) of the field; bodies farther away feel nothing.
pub const ATTRACTION_RADIUS: f32 = 200.0;

/// Distance (u) inside which the falloff curve is flat at 1.0.
///
/// Keeps the `1 / d^falloff` curve finite near the field centre.
pub const FALLOFF_REFERENCE_DISTANCE: f32 = 1.0;

/// Converts field strength into acceleration (u/s² per unit strength).
///
/// At 40 strength and 0.5 falloff a body 100 u away accelerates at
/// 40 × 0.1 × 150 = 600 u/s², which crosses the field in well under a second.
pub const ATTRACTION_ACCEL_SCALE: f32 = 150.0;

// ── Integration ───────────────────────────────────────────────────────────────

/// Maximum body speed (u/s).  Anything faster is clamped after integration.
pub const MAX_SPEED: f32 = 3000.0;

/// Longest time step (s) integrated in one call.  Longer frames are clamped so
/// a stalled window does not teleport bodies across the viewport.
pub const MAX_STEP_DT: f32 = 1.0 / 20.0;

// ── Motion blur ───────────────────────────────────────────────────────────────

/// Blur radius per unit of speed (`radius = |v| * BLUR_VELOCITY_SCALE`).
pub const BLUR_VELOCITY_SCALE: f32 = 0.1;

/// Largest blur radius (u) handed to the presentation layer.
pub const MAX_BLUR_RADIUS: f32 = 100.0;

/// Speeds (u/s) below this are treated as stationary: angle held, radius 0.
pub const BLUR_STATIONARY_EPSILON: f32 = 1e-3;

/// Number of ghost discs drawn behind each body to fake the directional blur.
pub const BLUR_GHOST_COUNT: usize = 6;

/// Alpha of the nearest ghost; later ghosts fade linearly toward zero.
pub const BLUR_GHOST_ALPHA: f32 = 0.35;

// ── Metaballs ─────────────────────────────────────────────────────────────────

/// Influence radius as a multiple of body radius.
///
/// With the `(1 - (d/R)²)²` gradient and a 0.5 threshold, an isolated body's
/// silhouette lands at ≈ 0.54 R, i.e. roughly its own radius for R = 2 r.
pub const METABALL_INFLUENCE_SCALE: f32 = 2.0;

/// Gaussian sigma (u) of the blur pass applied to the gradient buffer.
pub const METABALL_BLUR_SIGMA: f32 = 4.0;

/// Field value at which a sample becomes "inside" a blob.
pub const METABALL_THRESHOLD: f32 = 0.5;

/// Half-width of the smoothstep band around the threshold.
/// Smaller = sharper blob edges.
pub const METABALL_EDGE_BAND: f32 = 0.04;

/// Distance (u) between field samples.  1 = per-pixel; 2 quarters the work.
pub const METABALL_SAMPLE_SPACING: f32 = 2.0;
