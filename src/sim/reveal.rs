//! Delayed reveals for secondary effects

use serde::{Deserialize, Serialize};

use crate::settings::RevealSpec;

/// A visibility flag that turns on a fixed delay after being armed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealToggle {
    pub name: String,
    pub delay: f64,
    pub elapsed: f64,
    pub armed: bool,
    pub visible: bool,
}

impl RevealToggle {
    pub fn new(name: impl Into<String>, delay: f64) -> Self {
        Self {
            name: name.into(),
            delay,
            elapsed: 0.0,
            armed: false,
            visible: false,
        }
    }
}

/// All reveal toggles, in configuration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevealScheduler {
    toggles: Vec<RevealToggle>,
}

impl RevealScheduler {
    pub fn new(specs: &[RevealSpec]) -> Self {
        Self {
            toggles: specs
                .iter()
                .map(|spec| RevealToggle::new(spec.name.clone(), spec.delay))
                .collect(),
        }
    }

    pub fn toggles(&self) -> &[RevealToggle] {
        &self.toggles
    }

    /// Arm every toggle and restart its countdown
    pub fn trigger(&mut self) {
        for toggle in &mut self.toggles {
            toggle.elapsed = 0.0;
            toggle.armed = true;
        }
    }

    /// Advance armed toggles, calling `on_reveal` for each that turns visible
    pub fn tick(&mut self, dt: f64, mut on_reveal: impl FnMut(&str)) {
        for toggle in self.toggles.iter_mut().filter(|t| t.armed) {
            toggle.elapsed += dt;
            if !toggle.visible && toggle.elapsed >= toggle.delay {
                toggle.visible = true;
                on_reveal(&toggle.name);
            }
        }
    }

    /// Disarm and hide everything
    pub fn reset(&mut self) {
        for toggle in &mut self.toggles {
            toggle.elapsed = 0.0;
            toggle.armed = false;
            toggle.visible = false;
        }
    }

    /// Visibility by name, `None` for unknown names
    pub fn is_visible(&self, name: &str) -> Option<bool> {
        self.toggles
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.visible)
    }

    /// (name, visible) pairs
    pub fn visibility(&self) -> impl Iterator<Item = (&str, bool)> {
        self.toggles.iter().map(|t| (t.name.as_str(), t.visible))
    }
}
