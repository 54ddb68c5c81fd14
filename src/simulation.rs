//! Simulation plugin: owns the core resources and orders the per-frame work.
//!
//! ## Frame order
//!
//! | Set                 | Systems                                         |
//! |---------------------|-------------------------------------------------|
//! | `DemoSet::Input`    | intent gathering (added by [`PointerInputPlugin`]) + [`apply_intent_system`] |
//! | `DemoSet::Physics`  | [`viewport_resize_system`], [`physics_step_system`] |
//! | `DemoSet::Effects`  | [`effects_dispatch_system`]                     |
//! | `DemoSet::Present`  | presentation systems in [`crate::rendering`]    |
//!
//! The sets are chained, so input always lands before the physics step and
//! effects are always computed from the stepped positions.
//!
//! [`SimulationPlugin`] needs only `MinimalPlugins`; keyboard, mouse and
//! touch gathering live in [`PointerInputPlugin`] because they require
//! Bevy's input plugin.

use crate::body::spawn_bodies;
use crate::config::{self, DemoConfig};
use crate::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::input::{
    apply_intent_system, intent_clear_system, keyboard_to_intent_system, mouse_to_intent_system,
    touch_to_intent_system, DemoIntent,
};
use crate::metaball::{MetaballCompositor, MetaballSettings};
use crate::mode::RenderModeController;
use crate::motion_blur::MotionBlurParameterizer;
use crate::physics::PhysicsWorld;
use crate::scene::dispatch_effects;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Ordered phases of one frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoSet {
    Input,
    Physics,
    Effects,
    Present,
}

/// Optional fixed seed for body placement.  `None` = fresh randomness.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SceneSeed(pub Option<u64>);

/// Counters shown in the HUD.
#[derive(Resource, Debug, Clone, Default)]
pub struct FrameStats {
    pub frames: u64,
    /// Disjoint metaball regions in the last composited frame.
    pub blob_count: usize,
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DemoConfig>()
            .init_resource::<SceneSeed>()
            .init_resource::<DemoIntent>()
            .init_resource::<RenderModeController>()
            .init_resource::<FrameStats>()
            .configure_sets(
                Update,
                (
                    DemoSet::Input,
                    DemoSet::Physics,
                    DemoSet::Effects,
                    DemoSet::Present,
                )
                    .chain(),
            )
            .add_systems(Startup, (config::load_demo_config, spawn_scene_system).chain())
            .add_systems(
                Update,
                (
                    apply_intent_system.in_set(DemoSet::Input),
                    (viewport_resize_system, physics_step_system)
                        .chain()
                        .in_set(DemoSet::Physics),
                    effects_dispatch_system.in_set(DemoSet::Effects),
                ),
            );
    }
}

/// Gathers mouse, touch and keyboard input into [`DemoIntent`].
pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                intent_clear_system,
                mouse_to_intent_system,
                touch_to_intent_system,
                keyboard_to_intent_system,
            )
                .chain()
                .in_set(DemoSet::Input)
                .before(apply_intent_system),
        );
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Size of the primary window, or the configured default when headless.
fn viewport_of(windows: &Query<&Window>) -> Vec2 {
    windows
        .single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .unwrap_or(Vec2::new(WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32))
}

/// Build the physics world, the effect engines, and the initial bodies.
pub fn spawn_scene_system(
    mut commands: Commands,
    config: Res<DemoConfig>,
    seed: Res<SceneSeed>,
    windows: Query<&Window>,
) {
    let viewport = viewport_of(&windows);
    let mut rng = match seed.0 {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let bodies = spawn_bodies(&mut rng, config.body_count, config.body_radius, viewport);
    let count = bodies.len();

    commands.insert_resource(PhysicsWorld::from_config(viewport, &config).with_bodies(bodies));
    commands.insert_resource(MotionBlurParameterizer::from_config(&config));
    commands.insert_resource(MetaballCompositor::new(MetaballSettings::from_config(
        &config,
    )));
    eprintln!(
        "[SETUP] Spawned {count} bodies in {}×{} viewport",
        viewport.x, viewport.y
    );
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Rebuild the walls whenever the window's logical size changes.
pub fn viewport_resize_system(
    windows: Query<&Window, Changed<Window>>,
    mut world: ResMut<PhysicsWorld>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if size.x <= 0.0 || size.y <= 0.0 || size == world.boundary.size() {
        return;
    }
    debug!("Viewport resized to {}×{}", size.x, size.y);
    world.resize(size);
}

/// Advance the physics world by this frame's delta.
pub fn physics_step_system(time: Res<Time>, mut world: ResMut<PhysicsWorld>) {
    world.step(time.delta_secs());
}

/// Recompute blur descriptors or the metaball layer for the current mode.
pub fn effects_dispatch_system(
    mut world: ResMut<PhysicsWorld>,
    controller: Res<RenderModeController>,
    parameterizer: Res<MotionBlurParameterizer>,
    mut compositor: ResMut<MetaballCompositor>,
    mut stats: ResMut<FrameStats>,
) {
    dispatch_effects(&mut world, &controller, &parameterizer, &mut compositor);
    stats.frames += 1;
    stats.blob_count = if controller.scene_compositing_enabled() {
        compositor.layer().count_regions()
    } else {
        0
    };
}
