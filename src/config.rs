//! Runtime demo configuration loaded from `assets/demo.toml`.
//!
//! [`DemoConfig`] is a Bevy [`Resource`] that mirrors the tuneable constants in
//! [`crate::constants`].  At startup, [`load_demo_config`] reads
//! `assets/demo.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/demo.toml`.
//! 2. Restart the demo; no recompilation required.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `DemoConfig::default()`.

use crate::constants::*;
use crate::error::{
    validate_positive, validate_sample_spacing, validate_unit_interval, SimError, SimResult,
};
use bevy::prelude::*;
use serde::Deserialize;

/// Path of the optional override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/demo.toml";

/// Runtime-tunable simulation and rendering configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    // ── Bodies ────────────────────────────────────────────────────────────────
    pub body_count: usize,
    pub body_radius: f32,

    // ── Boundary ──────────────────────────────────────────────────────────────
    pub wall_restitution: f32,

    // ── Attraction field ──────────────────────────────────────────────────────
    pub attraction_fixed_strength: f32,
    pub attraction_max_strength: f32,
    pub attraction_falloff: f32,
    pub attraction_radius: f32,
    pub attraction_accel_scale: f32,

    // ── Integration ───────────────────────────────────────────────────────────
    pub max_speed: f32,
    pub max_step_dt: f32,

    // ── Motion blur ───────────────────────────────────────────────────────────
    pub blur_velocity_scale: f32,
    pub max_blur_radius: f32,

    // ── Metaballs ─────────────────────────────────────────────────────────────
    pub metaball_influence_scale: f32,
    pub metaball_blur_sigma: f32,
    pub metaball_threshold: f32,
    pub metaball_edge_band: f32,
    pub metaball_sample_spacing: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            // Bodies
            body_count: BODY_COUNT,
            body_radius: BODY_RADIUS,
            // Boundary
            wall_restitution: WALL_RESTITUTION,
            // Attraction field
            attraction_fixed_strength: ATTRACTION_FIXED_STRENGTH,
            attraction_max_strength: ATTRACTION_MAX_STRENGTH,
            attraction_falloff: ATTRACTION_FALLOFF,
            attraction_radius: ATTRACTION_RADIUS,
            attraction_accel_scale: ATTRACTION_ACCEL_SCALE,
            // Integration
            max_speed: MAX_SPEED,
            max_step_dt: MAX_STEP_DT,
            // Motion blur
            blur_velocity_scale: BLUR_VELOCITY_SCALE,
            max_blur_radius: MAX_BLUR_RADIUS,
            // Metaballs
            metaball_influence_scale: METABALL_INFLUENCE_SCALE,
            metaball_blur_sigma: METABALL_BLUR_SIGMA,
            metaball_threshold: METABALL_THRESHOLD,
            metaball_edge_band: METABALL_EDGE_BAND,
            metaball_sample_spacing: METABALL_SAMPLE_SPACING,
        }
    }
}

impl DemoConfig {
    /// Parse a TOML document and validate the result.
    ///
    /// Keys absent from `contents` keep their defaults.
    pub fn from_toml_str(contents: &str) -> SimResult<Self> {
        let config: DemoConfig = toml::from_str(contents).map_err(|e| SimError::ConfigParse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the integrator or compositor would divide by or
    /// iterate over.
    pub fn validate(&self) -> SimResult<()> {
        if self.body_count > MAX_BODY_COUNT {
            return Err(SimError::UnsafeConstant {
                name: "body_count",
                value: self.body_count as f32,
                safe_range: "[0, 4096]",
            });
        }
        validate_positive("body_radius", self.body_radius)?;
        validate_unit_interval("wall_restitution", self.wall_restitution)?;
        validate_positive("attraction_radius", self.attraction_radius)?;
        validate_positive("attraction_accel_scale", self.attraction_accel_scale)?;
        validate_positive("attraction_fixed_strength", self.attraction_fixed_strength)?;
        validate_positive("attraction_max_strength", self.attraction_max_strength)?;
        if !(self.attraction_falloff.is_finite() && self.attraction_falloff >= 0.0) {
            return Err(SimError::UnsafeConstant {
                name: "attraction_falloff",
                value: self.attraction_falloff,
                safe_range: "[0.0, ∞)",
            });
        }
        validate_positive("max_speed", self.max_speed)?;
        validate_positive("max_step_dt", self.max_step_dt)?;
        validate_positive("blur_velocity_scale", self.blur_velocity_scale)?;
        validate_positive("max_blur_radius", self.max_blur_radius)?;
        validate_positive("metaball_influence_scale", self.metaball_influence_scale)?;
        validate_positive("metaball_blur_sigma", self.metaball_blur_sigma)?;
        validate_positive("metaball_threshold", self.metaball_threshold)?;
        validate_positive("metaball_edge_band", self.metaball_edge_band)?;
        // The ramp must start above zero or empty samples get alpha.
        if self.metaball_edge_band >= self.metaball_threshold {
            return Err(SimError::UnsafeConstant {
                name: "metaball_edge_band",
                value: self.metaball_edge_band,
                safe_range: "(0.0, metaball_threshold)",
            });
        }
        validate_sample_spacing(self.metaball_sample_spacing)?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/demo.toml` and overwrite the
/// `DemoConfig` resource with any values present in the file.
///
/// Parse and validation errors are logged but do not abort the demo.  A
/// missing file is not an error; defaults are already in place.
pub fn load_demo_config(mut config: ResMut<DemoConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match DemoConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded demo config from {CONFIG_PATH}");
            }
            Err(e) => warn!("Rejected {CONFIG_PATH}: {e}; using defaults"),
        },
        Err(_) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DemoConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = DemoConfig::from_toml_str("").expect("empty TOML is valid");
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let config = DemoConfig::from_toml_str("body_count = 12\nmetaball_threshold = 0.6\n")
            .expect("valid overrides");
        assert_eq!(config.body_count, 12);
        assert!((config.metaball_threshold - 0.6).abs() < 1e-6);
        assert_eq!(config.body_radius, BODY_RADIUS);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = DemoConfig::from_toml_str("body_count = [").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse { .. }));
    }

    fn rejected_field(document: &str) -> &'static str {
        match DemoConfig::from_toml_str(document) {
            Err(SimError::UnsafeConstant { name, .. }) => name,
            other => panic!("expected UnsafeConstant for {document:?}, got {other:?}"),
        }
    }

    #[test]
    fn nan_blur_scale_is_rejected() {
        assert_eq!(rejected_field("blur_velocity_scale = nan"), "blur_velocity_scale");
    }

    #[test]
    fn bad_attraction_strengths_are_rejected() {
        assert_eq!(
            rejected_field("attraction_fixed_strength = inf"),
            "attraction_fixed_strength"
        );
        assert_eq!(
            rejected_field("attraction_max_strength = -80.0"),
            "attraction_max_strength"
        );
    }

    #[test]
    fn edge_band_must_stay_below_threshold() {
        assert_eq!(rejected_field("metaball_threshold = 0.02"), "metaball_edge_band");
        assert_eq!(
            rejected_field("metaball_threshold = 0.5\nmetaball_edge_band = 0.5"),
            "metaball_edge_band"
        );
        assert!(DemoConfig::from_toml_str("metaball_edge_band = 0.49").is_ok());
    }

    #[test]
    fn huge_body_count_is_rejected() {
        assert_eq!(rejected_field("body_count = 1000000000"), "body_count");
        assert!(DemoConfig::from_toml_str("body_count = 4096").is_ok());
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let err = DemoConfig::from_toml_str("wall_restitution = 1.5").unwrap_err();
        assert!(matches!(
            err,
            SimError::UnsafeConstant {
                name: "wall_restitution",
                ..
            }
        ));
    }
}
