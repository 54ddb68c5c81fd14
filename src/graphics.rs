//! Camera and the mode HUD.

use crate::mode::{Mode, RenderModeController};
use crate::simulation::{DemoSet, FrameStats};
use bevy::prelude::*;

/// HUD font size (logical pixels).
const HUD_FONT_SIZE: f32 = 18.0;

/// Marker for the mode HUD text node.
#[derive(Component)]
pub struct ModeHud;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_camera, setup_mode_hud))
            .add_systems(Update, mode_hud_system.in_set(DemoSet::Present));
    }
}

/// Setup camera for 2D rendering
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d maps one world unit to one logical pixel, centred.
    commands.spawn(Camera2d);
    eprintln!("[SETUP] Camera spawned");
}

/// Spawn the HUD line across the top of the window.
pub fn setup_mode_hud(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        Text::new(hud_text(Mode::default(), 0)),
        TextFont {
            font_size: HUD_FONT_SIZE,
            ..default()
        },
        TextColor(Color::WHITE),
        ModeHud,
    ));
}

/// HUD contents: active mode, blob count in Metaballs mode, key hints.
pub fn hud_text(mode: Mode, blob_count: usize) -> String {
    let detail = match mode {
        Mode::MotionBlur => String::new(),
        Mode::Metaballs => format!(" ({blob_count} blobs)"),
    };
    format!("{mode}{detail}   [1] Motion Blur  [2] Metaballs  [Tab] toggle  [drag] attract")
}

/// Refresh the HUD when the mode or blob count changes.
pub fn mode_hud_system(
    controller: Res<RenderModeController>,
    stats: Res<FrameStats>,
    mut query: Query<&mut Text, With<ModeHud>>,
) {
    let wanted = hud_text(controller.mode(), stats.blob_count);
    for mut text in query.iter_mut() {
        if text.0 != wanted {
            text.0 = wanted.clone();
        }
    }
}
