//! Headless tests for the frame pipeline: intent → physics → effects.
//!
//! These tests use [`MinimalPlugins`] (no window, renderer or input
//! plugin), so they run fast and deterministically in CI.  Input is injected
//! by writing [`DemoIntent`] directly, the same seam the gathering systems use.
//!
//! Covered scenarios:
//! 1. Startup builds the default 51-body scene inside the headless viewport.
//! 2. A held pointer pulls nearby bodies in; releasing it switches the field off.
//! 3. Selecting "Metaballs" disables per-body blur and produces blobs.
//! 4. Selecting an unknown mode changes nothing.
//! 5. Bodies never leave the viewport while being dragged around.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use motionballs::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use motionballs::input::{DemoIntent, PointerSample};
use motionballs::mode::{Mode, RenderModeController};
use motionballs::physics::PhysicsWorld;
use motionballs::simulation::{FrameStats, SceneSeed, SimulationPlugin};
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a headless app with a fixed seed and a fixed 60 Hz clock, and run
/// the startup frame.
fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(SceneSeed(Some(1234)));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(
        16_667,
    )));
    app.add_plugins(SimulationPlugin);
    app.update();
    app
}

fn viewport() -> Vec2 {
    Vec2::new(WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32)
}

fn set_intent(app: &mut App, intent: DemoIntent) {
    *app.world_mut().resource_mut::<DemoIntent>() = intent;
}

fn press_at(app: &mut App, position: Vec2) {
    set_intent(
        app,
        DemoIntent {
            pointer: Some(PointerSample {
                position,
                pressure: None,
            }),
            ..Default::default()
        },
    );
}

fn request_mode(app: &mut App, name: &str) {
    set_intent(
        app,
        DemoIntent {
            mode_request: Some(name.to_string()),
            ..Default::default()
        },
    );
}

fn physics(app: &App) -> &PhysicsWorld {
    app.world().resource::<PhysicsWorld>()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn startup_spawns_default_scene() {
    let app = headless_app();
    let world = physics(&app);
    assert_eq!(world.bodies.len(), 51);
    assert_eq!(world.boundary.size(), viewport());
    assert!(!world.attraction.is_active());
    assert_eq!(
        app.world().resource::<RenderModeController>().mode(),
        Mode::MotionBlur
    );
}

#[test]
fn held_pointer_attracts_and_release_clears() {
    let mut app = headless_app();
    let p = viewport() * 0.5;

    // Park one body 120 u from P and one 400 u away, both at rest.
    {
        let mut world = app.world_mut().resource_mut::<PhysicsWorld>();
        for body in world.bodies.iter_mut() {
            body.position = Vec2::new(60.0, 60.0);
            body.velocity = Vec2::ZERO;
        }
        world.bodies[0].position = p + Vec2::new(120.0, 0.0);
        world.bodies[1].position = p + Vec2::new(-400.0, 0.0);
    }

    press_at(&mut app, p);
    for _ in 0..3 {
        app.update();
    }

    let world = physics(&app);
    assert_eq!(world.attraction.strength, 40.0);
    assert_eq!(world.attraction.position, p);
    assert!(world.bodies[0].position.distance(p) < 120.0);
    assert_eq!(world.bodies[1].position, p + Vec2::new(-400.0, 0.0));
    assert!(world.bodies[0].blur.radius > 0.0, "moving body has a blur");

    set_intent(
        &mut app,
        DemoIntent {
            released: true,
            ..Default::default()
        },
    );
    app.update();
    assert!(!physics(&app).attraction.is_active());
}

#[test]
fn metaballs_mode_composites_instead_of_blurring() {
    let mut app = headless_app();
    request_mode(&mut app, "Metaballs");
    app.update();

    let controller = app.world().resource::<RenderModeController>();
    assert_eq!(controller.mode(), Mode::Metaballs);
    assert!(controller.scene_compositing_enabled());
    assert!(!controller.body_blur_enabled());
    assert!(physics(&app).bodies.iter().all(|b| !b.blur_enabled));

    let blobs = app.world().resource::<FrameStats>().blob_count;
    assert!((1..=51).contains(&blobs), "blob count {blobs}");

    // Asking again (the intent is still set) is a no-op.
    let snapshot = app.world().resource::<RenderModeController>().clone();
    app.update();
    assert_eq!(*app.world().resource::<RenderModeController>(), snapshot);
}

#[test]
fn unknown_mode_name_is_ignored() {
    let mut app = headless_app();
    let before = app.world().resource::<RenderModeController>().clone();
    request_mode(&mut app, "bogus");
    app.update();
    assert_eq!(*app.world().resource::<RenderModeController>(), before);
    assert!(physics(&app).bodies.iter().all(|b| b.blur_enabled));
    assert_eq!(app.world().resource::<FrameStats>().blob_count, 0);
}

#[test]
fn bodies_stay_inside_while_dragged() {
    let mut app = headless_app();
    let size = viewport();
    for frame in 0..240 {
        let t = frame as f32 / 240.0;
        press_at(&mut app, Vec2::new(size.x * t, size.y * (1.0 - t)));
        app.update();
        for body in &physics(&app).bodies {
            assert!((0.0..=size.x).contains(&body.position.x));
            assert!((0.0..=size.y).contains(&body.position.y));
        }
    }
}
