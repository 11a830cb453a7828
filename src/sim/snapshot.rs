//! Read-only frame view handed to the renderer

use serde::Serialize;

use super::confetti::Particle;
use super::reveal::RevealToggle;
use super::ribbon::{RibbonHalf, Side};
use super::state::CeremonyState;
use super::tool::ToolPose;

/// Everything a renderer needs for one frame, borrowed from the engine
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub state: CeremonyState,
    pub progress: f32,
    /// Wall-clock seconds since the engine was built
    pub clock: f64,
    pub tool: ToolPose,
    /// Left half first, then right
    pub halves: &'a [RibbonHalf; 2],
    /// Live confetti in spawn order
    pub particles: &'a [Particle],
    pub reveals: &'a [RevealToggle],
}

impl Snapshot<'_> {
    pub fn half(&self, side: Side) -> &RibbonHalf {
        match side {
            Side::Left => &self.halves[0],
            Side::Right => &self.halves[1],
        }
    }

    /// Visibility of a named reveal, `None` for unknown names
    pub fn is_revealed(&self, name: &str) -> Option<bool> {
        self.reveals
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.visible)
    }

    /// (name, visible) pairs in configuration order
    pub fn reveal_visibility(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.reveals.iter().map(|t| (t.name.as_str(), t.visible))
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}
