//! Demo-specific error types.
//!
//! Nothing in the core is allowed to take the demo down: every error here is
//! logged by the caller and followed by recovery to a safe default.
//!
//! ## Usage
//!
//! ```rust
//! use motionballs::error::{SimError, SimResult};
//! use motionballs::mode::Mode;
//!
//! fn parse(name: &str) -> SimResult<Mode> {
//!     name.parse::<Mode>()
//! }
//!
//! assert!(matches!(parse("bogus"), Err(SimError::UnknownMode { .. })));
//! ```

use std::fmt;

/// Top-level error enum for the demo.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A mode was requested by a name that matches neither pipeline.
    UnknownMode {
        /// The rejected name, verbatim.
        name: String,
    },

    /// The runtime configuration file could not be parsed.
    ConfigParse {
        /// Path of the offending file (or `"<inline>"` for string input).
        path: String,
        /// Parser message.
        message: String,
    },

    /// A configuration value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnknownMode { name } => write!(f, "unknown render mode '{}'", name),
            SimError::ConfigParse { path, message } => {
                write!(f, "failed to parse config '{}': {}", path, message)
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `[0.0, 1.0]`.
pub fn validate_unit_interval(name: &'static str, value: f32) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

/// Returns an error if the metaball sample spacing would make the field grid
/// either degenerate or absurdly coarse.
///
/// Spacings above 16 u lose the blob silhouette entirely at the default body
/// radius.
pub fn validate_sample_spacing(value: f32) -> SimResult<()> {
    if value.is_finite() && value >= 1.0 && value <= 16.0 {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "metaball_sample_spacing",
            value,
            safe_range: "[1.0, 16.0]",
        })
    }
}
