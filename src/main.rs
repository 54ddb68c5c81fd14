use bevy::prelude::*;
use bevy::window::WindowResolution;
use motionballs::constants::{BACKGROUND_GREY, WINDOW_HEIGHT, WINDOW_WIDTH};
use motionballs::graphics::HudPlugin;
use motionballs::rendering::RenderingPlugin;
use motionballs::simulation::{PointerInputPlugin, SceneSeed, SimulationPlugin};
use motionballs::{config, simulation};
use std::env;

fn main() {
    // MOTIONBALLS_SEED=<u64> reproduces a body layout.
    let seed = env::var("MOTIONBALLS_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok());

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Motion Blur & Metaballs".into(),
                resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(
            BACKGROUND_GREY,
            BACKGROUND_GREY,
            BACKGROUND_GREY,
        )))
        .insert_resource(SceneSeed(seed))
        .add_plugins((SimulationPlugin, PointerInputPlugin, RenderingPlugin, HudPlugin))
        .add_systems(
            Startup,
            log_ready.after(simulation::spawn_scene_system),
        )
        .run();
}

fn log_ready(config: Res<config::DemoConfig>) {
    info!(
        "Ready: {} bodies, radius {}. Drag to attract; 1/2/Tab switch modes.",
        config.body_count, config.body_radius
    );
}
