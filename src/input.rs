//! Pointer and mode-selection input.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`intent_clear_system`]: resets [`DemoIntent`].
//! 2. [`mouse_to_intent_system`] / [`touch_to_intent_system`]: pointer state.
//! 3. [`keyboard_to_intent_system`]: mode selection keys.
//! 4. [`apply_intent_system`]: the only writer of the attraction field and
//!    the mode controller.
//!
//! The **input abstraction layer** (`DemoIntent`) keeps the core testable:
//! tests populate the resource directly and run only `apply_intent_system`.

use crate::mode::{Mode, RenderModeController};
use crate::physics::PhysicsWorld;
use bevy::input::touch::{ForceTouch, Touches};
use bevy::prelude::*;

/// Pointer position (viewport coordinates, y up) and optional pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    /// Normalised `0..=1`; `None` when the device cannot report force.
    pub pressure: Option<f32>,
}

/// Everything the user asked for this frame.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct DemoIntent {
    /// Pointer is down or dragging.
    pub pointer: Option<PointerSample>,
    /// Pointer was lifted this frame.
    pub released: bool,
    /// Mode requested by name.  Unknown names are ignored downstream.
    pub mode_request: Option<String>,
}

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

pub fn intent_clear_system(mut intent: ResMut<DemoIntent>) {
    *intent = DemoIntent::default();
}

// ── Step 2: Pointer → Intent ──────────────────────────────────────────────────

/// Convert a window-space point (origin top-left, y down) to viewport space.
pub fn window_to_viewport(point: Vec2, window_height: f32) -> Vec2 {
    Vec2::new(point.x, window_height - point.y)
}

/// Normalise a platform force reading to `0..=1`.
///
/// Returns `None` for uncalibrated hardware that reports a zero maximum.
pub fn normalized_pressure(force: ForceTouch) -> Option<f32> {
    match force {
        ForceTouch::Calibrated {
            force,
            max_possible_force,
            ..
        } => (max_possible_force > 0.0).then(|| (force / max_possible_force) as f32),
        ForceTouch::Normalized(value) => Some(value as f32),
    }
}

/// Left mouse button acts as a pressure-less pointer.
pub fn mouse_to_intent_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut intent: ResMut<DemoIntent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    if buttons.just_released(MouseButton::Left) {
        intent.released = true;
    }
    if !buttons.pressed(MouseButton::Left) {
        return;
    }
    if let Some(cursor) = window.cursor_position() {
        intent.pointer = Some(PointerSample {
            position: window_to_viewport(cursor, window.height()),
            pressure: None,
        });
    }
}

/// First active touch drives the pointer, with force when available.
///
/// Runs after the mouse system, so a touch wins when both are present.
pub fn touch_to_intent_system(
    touches: Res<Touches>,
    windows: Query<&Window>,
    mut intent: ResMut<DemoIntent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    if let Some(touch) = touches.iter().next() {
        intent.pointer = Some(PointerSample {
            position: window_to_viewport(touch.position(), window.height()),
            pressure: touch.force().and_then(normalized_pressure),
        });
    } else if touches.any_just_released() || touches.any_just_canceled() {
        intent.released = true;
    }
}

// ── Step 3: Keyboard → Intent ─────────────────────────────────────────────────

/// - **1** → "Motion Blur"
/// - **2** → "Metaballs"
/// - **Tab** → the other mode
pub fn keyboard_to_intent_system(
    keys: Res<ButtonInput<KeyCode>>,
    controller: Res<RenderModeController>,
    mut intent: ResMut<DemoIntent>,
) {
    let requested = if keys.just_pressed(KeyCode::Digit1) {
        Some(Mode::MotionBlur)
    } else if keys.just_pressed(KeyCode::Digit2) {
        Some(Mode::Metaballs)
    } else if keys.just_pressed(KeyCode::Tab) {
        Some(controller.mode().other())
    } else {
        None
    };
    if let Some(mode) = requested {
        intent.mode_request = Some(mode.name().to_string());
    }
}

// ── Step 4: Apply ─────────────────────────────────────────────────────────────

/// Apply [`DemoIntent`] to the attraction field and the mode controller.
///
/// | Intent field          | Effect                                          |
/// |-----------------------|-------------------------------------------------|
/// | `pointer = Some(s)`   | `attraction.set_from_pointer(s.position, s.pressure)` |
/// | `released` (no pointer)| `attraction.clear()`                            |
/// | `mode_request = Some` | `controller.select_by_name(..)`; unknown ignored |
pub fn apply_intent_system(
    intent: Res<DemoIntent>,
    mut world: ResMut<PhysicsWorld>,
    mut controller: ResMut<RenderModeController>,
) {
    if let Some(sample) = intent.pointer {
        world
            .attraction
            .set_from_pointer(sample.position, sample.pressure);
    } else if intent.released {
        world.attraction.clear();
    }

    if let Some(name) = intent.mode_request.as_deref() {
        // Unknown names are already logged by the controller.
        let _ = controller.select_by_name(name, &mut world.bodies);
    }
}
