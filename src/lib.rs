//! Ribbon Ceremony - choreography engine for a ribbon cutting animation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tool animation, ribbon physics, confetti, reveals)
//! - `settings`: Validated, serializable engine configuration
//! - `error`: Configuration error taxonomy
//!
//! The engine renders nothing. A host calls [`sim::Ceremony::tick`] once per
//! frame and hands [`sim::Snapshot`] to its renderer.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SettingsError;
pub use settings::{QualityPreset, Settings};
pub use sim::{Ceremony, CeremonyEvent, CeremonyState, Snapshot};

/// Choreography constants (hard-coded timeline, not data-driven)
pub mod consts {
    /// Global progress at which the approach ends and the blades start closing
    pub const APPROACH_END: f32 = 0.15;
    /// Global progress at which the blades have closed through the ribbon
    pub const CUT_END: f32 = 0.65;
    /// Global progress at which the post-snip bounce ends
    pub const SNIP_END: f32 = 0.8;
    /// Global progress at which the tool is back at its hover pose
    pub const RETREAT_END: f32 = 1.0;

    /// Progress rate (per second) below `SLOW_START_UNTIL`
    pub const SLOW_START_RATE: f32 = 0.6;
    pub const SLOW_START_UNTIL: f32 = 0.4;
    /// Progress rate between `SLOW_START_UNTIL` and `FAST_MIDDLE_UNTIL`
    pub const FAST_MIDDLE_RATE: f32 = 1.0;
    pub const FAST_MIDDLE_UNTIL: f32 = 0.7;
    /// Progress rate from `FAST_MIDDLE_UNTIL` to the end
    pub const SLOW_END_RATE: f32 = 0.8;

    /// Wall-clock delay from the cut request to the ribbon detaching (seconds)
    pub const DETACH_DELAY: f64 = 0.4;

    /// Hard cap on live confetti pieces
    pub const MAX_PARTICLES: usize = 4096;
}

/// Seconds of wall-clock time needed to take global progress from 0 to 1
pub fn timeline_duration() -> f64 {
    use consts::*;
    (SLOW_START_UNTIL / SLOW_START_RATE) as f64
        + ((FAST_MIDDLE_UNTIL - SLOW_START_UNTIL) / FAST_MIDDLE_RATE) as f64
        + ((RETREAT_END - FAST_MIDDLE_UNTIL) / SLOW_END_RATE) as f64
}

/// Sanitize a frame delta: negative, NaN and infinite deltas become zero
#[inline]
pub fn sanitize_delta(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}
