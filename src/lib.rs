//! Astro Runner - simulation core for a scrolling space runner/shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawn directors, bosses, combat, scoring)
//! - `config`: Numeric configuration with safe defaults
//! - `game`: Host-facing facade and fixed-timestep frame driver
//! - `autopilot`: Scripted input for demos and replay tests

pub mod autopilot;
pub mod config;
pub mod game;
pub mod sim;

pub use config::{ConfigError, RunMode, SimConfig};
pub use game::{EventSink, Game};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_STEP_MS: f32 = 1000.0 / 60.0;
    /// Longest real frame the driver will account for
    pub const MAX_FRAME_MS: f32 = 100.0;
    /// Maximum whole steps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Default logical viewport
    pub const VIEWPORT_WIDTH: f32 = 960.0;
    pub const VIEWPORT_HEIGHT: f32 = 540.0;

    /// Entities further than this past an edge are swept
    pub const OFFSCREEN_MARGIN: f32 = 80.0;

    /// Maximum visual particles kept alive
    pub const MAX_PARTICLES: usize = 320;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Clamp that tolerates an inverted range by collapsing it to `min`
#[inline]
pub fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    if max < min { min } else { value.clamp(min, max) }
}

/// Quadratic ease-in-out over [0, 1]
#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = clamp01(t);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out over [0, 1]
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = clamp01(t);
    1.0 - (1.0 - t).powi(3)
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_in_out_quad_endpoints() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-6);
        assert!(ease_in_out_quad(0.25) < 0.25);
        assert!(ease_in_out_quad(0.75) > 0.75);
    }

    #[test]
    fn test_clamp_helpers() {
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(clamp01(2.0), 1.0);
        assert_eq!(clamp_range(5.0, 10.0, 3.0), 10.0);
    }

    #[test]
    fn test_approach() {
        assert_eq!(approach(0.0, 10.0, 3.0), 3.0);
        assert_eq!(approach(0.0, -10.0, 3.0), -3.0);
        assert_eq!(approach(9.0, 10.0, 3.0), 10.0);
    }
}
