//! Deterministic simulation module
//!
//! All choreography lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - Stable iteration order (left half before right, confetti in spawn order)
//! - No rendering or platform dependencies

pub mod confetti;
pub mod easing;
pub mod reveal;
pub mod ribbon;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod tool;

pub use confetti::{BurstSpec, ConfettiSystem, Particle, Rgb};
pub use easing::{ease_in_out_cubic, ease_in_out_quad, ease_out_cubic, ease_out_quad};
pub use reveal::{RevealScheduler, RevealToggle};
pub use ribbon::{RibbonHalf, RibbonLayout, RibbonPhysics, RibbonSimulator, Side};
pub use snapshot::Snapshot;
pub use state::{Ceremony, CeremonyEvent, CeremonyState};
pub use tick::{advance_progress, tick};
pub use tool::ToolPose;
