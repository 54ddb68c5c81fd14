//! Render-mode state machine.
//!
//! ```text
//!            select("Metaballs")
//!   ┌────────────┐ ─────────────▶ ┌───────────┐
//!   │ MotionBlur │                │ Metaballs │
//!   └────────────┘ ◀───────────── └───────────┘
//!            select("Motion Blur")
//! ```
//!
//! Unknown names and re-selecting the current mode leave everything as is.
//! [`RenderModeController::transition`] is the only writer of the mode and its
//! flags, so the two can never disagree.

use crate::body::Body;
use crate::error::{SimError, SimResult};
use bevy::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Active rendering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    MotionBlur,
    Metaballs,
}

impl Mode {
    /// User-facing name, also accepted by [`Mode::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Mode::MotionBlur => "Motion Blur",
            Mode::Metaballs => "Metaballs",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Mode::MotionBlur => Mode::Metaballs,
            Mode::Metaballs => Mode::MotionBlur,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = SimError;

    fn from_str(name: &str) -> SimResult<Self> {
        match name {
            "Motion Blur" => Ok(Mode::MotionBlur),
            "Metaballs" => Ok(Mode::Metaballs),
            _ => Err(SimError::UnknownMode { name: name.into() }),
        }
    }
}

/// Owns the current [`Mode`] and the scene-level flags derived from it.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct RenderModeController {
    mode: Mode,
    body_blur_enabled: bool,
    scene_compositing_enabled: bool,
}

impl Default for RenderModeController {
    fn default() -> Self {
        Self {
            mode: Mode::MotionBlur,
            body_blur_enabled: true,
            scene_compositing_enabled: false,
        }
    }
}

impl RenderModeController {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether per-body blur descriptors are computed and drawn.
    pub fn body_blur_enabled(&self) -> bool {
        self.body_blur_enabled
    }

    /// Whether the whole-scene metaball layer is composited and drawn.
    pub fn scene_compositing_enabled(&self) -> bool {
        self.scene_compositing_enabled
    }

    /// Switch to `mode`, updating the scene flags and every body's blur flag
    /// in one go.  Returns `false` (and touches nothing) if already in `mode`.
    pub fn transition(&mut self, mode: Mode, bodies: &mut [Body]) -> bool {
        if mode == self.mode {
            return false;
        }
        let blur = mode == Mode::MotionBlur;
        self.mode = mode;
        self.body_blur_enabled = blur;
        self.scene_compositing_enabled = !blur;
        for body in bodies.iter_mut() {
            body.blur_enabled = blur && body.effects.blur;
        }
        info!("Render mode → {mode}");
        true
    }

    /// Select a mode by its user-facing name.
    ///
    /// Unknown names are logged and ignored; the error is returned so callers
    /// can surface it if they want to.
    pub fn select_by_name(&mut self, name: &str, bodies: &mut [Body]) -> SimResult<bool> {
        match name.parse::<Mode>() {
            Ok(mode) => Ok(self.transition(mode, bodies)),
            Err(e) => {
                warn!("Ignoring mode selection: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::EffectCaps;

    fn bodies() -> Vec<Body> {
        vec![
            Body::new(Vec2::ZERO, 30.0, Color::WHITE),
            Body::new(Vec2::ONE, 30.0, Color::WHITE).with_effects(EffectCaps {
                blur: false,
                metaball: true,
            }),
        ]
    }

    #[test]
    fn default_is_motion_blur_with_body_blur_on() {
        let controller = RenderModeController::default();
        assert_eq!(controller.mode(), Mode::MotionBlur);
        assert!(controller.body_blur_enabled());
        assert!(!controller.scene_compositing_enabled());
    }

    #[test]
    fn names_round_trip() {
        for mode in [Mode::MotionBlur, Mode::Metaballs] {
            assert_eq!(mode.name().parse::<Mode>(), Ok(mode));
        }
        assert!("metaballs".parse::<Mode>().is_err(), "names are case-sensitive");
    }

    #[test]
    fn metaballs_disables_every_body_blur() {
        let mut controller = RenderModeController::default();
        let mut bodies = bodies();
        assert_eq!(controller.select_by_name("Metaballs", &mut bodies), Ok(true));
        assert_eq!(controller.mode(), Mode::Metaballs);
        assert!(!controller.body_blur_enabled());
        assert!(controller.scene_compositing_enabled());
        assert!(bodies.iter().all(|b| !b.blur_enabled));
    }

    #[test]
    fn selecting_current_mode_twice_is_idempotent() {
        let mut controller = RenderModeController::default();
        let mut bodies = bodies();
        controller.select_by_name("Metaballs", &mut bodies).unwrap();
        let (snapshot, body_snapshot) = (controller.clone(), bodies.clone());

        assert_eq!(controller.select_by_name("Metaballs", &mut bodies), Ok(false));
        assert_eq!(controller, snapshot);
        assert_eq!(bodies, body_snapshot);
    }

    #[test]
    fn bogus_name_changes_nothing() {
        let mut controller = RenderModeController::default();
        let mut bodies = bodies();
        let (snapshot, body_snapshot) = (controller.clone(), bodies.clone());

        let err = controller.select_by_name("bogus", &mut bodies).unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownMode {
                name: "bogus".into()
            }
        );
        assert_eq!(controller, snapshot);
        assert_eq!(bodies, body_snapshot);
    }

    #[test]
    fn back_to_motion_blur_respects_capabilities() {
        let mut controller = RenderModeController::default();
        let mut bodies = bodies();
        controller.transition(Mode::Metaballs, &mut bodies);
        controller.transition(Mode::MotionBlur, &mut bodies);
        assert!(controller.body_blur_enabled());
        assert!(!controller.scene_compositing_enabled());
        assert!(bodies[0].blur_enabled);
        assert!(!bodies[1].blur_enabled, "blur-incapable body stays off");
    }
}
