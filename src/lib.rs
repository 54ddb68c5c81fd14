//! Motion-blurred balls and metaballs.
//!
//! A few dozen circular bodies drift under a pointer-driven radial attraction
//! field inside four walls, and are drawn either with a per-body directional
//! motion blur or fused together by a CPU metaball compositor.
//!
//! The core (`body`, `field`, `physics`, `motion_blur`, `metaball`, `mode`,
//! `scene`) is plain data and runs headless; `simulation` wires it into Bevy,
//! and `rendering` / `graphics` present it.

pub mod body;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod graphics;
pub mod input;
pub mod metaball;
pub mod mode;
pub mod motion_blur;
pub mod physics;
pub mod rendering;
pub mod scene;
pub mod simulation;
