//! Ceremony settings
//!
//! Every tunable the engine reads at construction. Loaded from JSON by the
//! host, validated once, never consulted again after the engine is built.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_PARTICLES;
use crate::error::SettingsError;
use crate::sim::confetti::Rgb;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Confetti pieces per burst for this preset
    pub fn confetti_count(&self) -> usize {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 100,
            QualityPreset::High => 250,
        }
    }
}

/// A delayed visibility flag for one secondary effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealSpec {
    pub name: String,
    /// Seconds after the cut request before the effect shows
    pub delay: f64,
}

impl RevealSpec {
    pub fn new(name: impl Into<String>, delay: f64) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Confetti density preset
    pub quality: QualityPreset,
    /// Seed for every stochastic choice the engine makes
    pub seed: u64,

    // === Ribbon layout ===
    /// Distance between the two stands
    pub ribbon_width: f32,
    /// Height of each stand pole
    pub stand_height: f32,
    /// Vertical extent of the ribbon band
    pub segment_height: f32,
    /// Height of the static floor plane
    pub floor_height: f32,

    // === Ribbon physics ===
    /// Downward acceleration on detached halves (units/s²)
    pub gravity: f32,
    /// Velocity added along the drop direction at detachment
    pub impulse_scale: f32,
    /// Angular velocity added along the roll direction at detachment
    pub torque_scale: f32,
    /// Linear and angular speed below which a half may fall asleep
    pub sleep_speed_limit: f32,
    /// Seconds a half must stay below the speed limit before sleeping
    pub sleep_time_limit: f32,
    /// Fraction of downward speed returned as a bounce on floor contact
    pub restitution: f32,
    /// Exponential damping rate (1/s) of sliding and spin while on the floor
    pub ground_friction: f32,

    // === Confetti ===
    /// Pieces per burst; `None` follows the quality preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confetti_count: Option<usize>,
    /// Where the burst spawns
    pub confetti_origin: Vec3,
    /// `#rrggbb` colors drawn uniformly per piece
    pub confetti_palette: Vec<String>,
    /// Horizontal launch speed bound (x and z drawn from ±spread)
    pub confetti_spread: f32,
    /// Upward launch speed range
    pub confetti_lift: [f32; 2],
    /// Spin speed bound (rad/s, each axis drawn from ±spin)
    pub confetti_spin: f32,
    /// Piece edge length range
    pub confetti_size: [f32; 2],
    /// Lifetime range (seconds)
    pub confetti_lifetime: [f32; 2],
    /// Downward acceleration on confetti (units/s²)
    pub confetti_gravity: f32,

    // === Secondary effects ===
    pub reveals: Vec<RevealSpec>,
    /// Seconds after the cut request before the cut is reported complete
    pub completion_delay: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            seed: 0x5eed,

            ribbon_width: 6.0,
            stand_height: 1.6,
            segment_height: 0.8,
            floor_height: -0.5,

            gravity: 9.8,
            impulse_scale: 1.5,
            torque_scale: 5.0,
            sleep_speed_limit: 0.1,
            sleep_time_limit: 1.0,
            restitution: 0.2,
            ground_friction: 3.0,

            confetti_count: None,
            confetti_origin: Vec3::new(0.0, 1.0, 0.0),
            confetti_palette: ["#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff"]
                .into_iter()
                .map(String::from)
                .collect(),
            confetti_spread: 6.0,
            confetti_lift: [6.0, 18.0],
            confetti_spin: 6.0,
            confetti_size: [0.05, 0.15],
            confetti_lifetime: [2.0, 5.0],
            confetti_gravity: 18.0,

            reveals: vec![
                RevealSpec::new("light_beams", 0.2),
                RevealSpec::new("sparkles", 0.4),
                RevealSpec::new("atmosphere", 0.5),
                RevealSpec::new("celebration", 2.5),
            ],
            completion_delay: 1.0,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (drops any explicit burst count)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.confetti_count = None;
    }

    /// Pieces per burst: the explicit count, else the preset's
    #[inline]
    pub fn burst_count(&self) -> usize {
        self.confetti_count.unwrap_or(self.quality.confetti_count())
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse the palette into colors
    pub fn palette(&self) -> Result<Vec<Rgb>, SettingsError> {
        if self.confetti_palette.is_empty() {
            return Err(SettingsError::EmptyPalette);
        }
        self.confetti_palette
            .iter()
            .enumerate()
            .map(|(index, value)| {
                Rgb::from_hex(value).ok_or_else(|| SettingsError::MalformedColor {
                    index,
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Reject anything the engine cannot run with. Nothing is clamped.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let count = self.burst_count();
        if count == 0 || count > MAX_PARTICLES {
            return Err(SettingsError::InvalidCount {
                count,
                max: MAX_PARTICLES,
            });
        }
        self.palette()?;

        for (name, value) in [
            ("ribbon_width", self.ribbon_width),
            ("stand_height", self.stand_height),
            ("segment_height", self.segment_height),
            ("gravity", self.gravity),
            ("impulse_scale", self.impulse_scale),
            ("torque_scale", self.torque_scale),
            ("sleep_speed_limit", self.sleep_speed_limit),
            ("sleep_time_limit", self.sleep_time_limit),
            ("restitution", self.restitution),
            ("ground_friction", self.ground_friction),
            ("confetti_spread", self.confetti_spread),
            ("confetti_spin", self.confetti_spin),
            ("confetti_gravity", self.confetti_gravity),
        ] {
            non_negative(name, value as f64)?;
        }
        non_negative("completion_delay", self.completion_delay)?;
        // A bounce must not gain energy
        if self.restitution > 1.0 {
            return Err(SettingsError::InvalidScalar {
                name: "restitution",
                value: self.restitution as f64,
            });
        }

        if !self.floor_height.is_finite() {
            return Err(SettingsError::NonFinite {
                name: "floor_height",
                value: self.floor_height as f64,
            });
        }
        if !self.confetti_origin.is_finite() {
            return Err(SettingsError::NonFinite {
                name: "confetti_origin",
                value: f64::NAN,
            });
        }

        ordered_range("confetti_lift", self.confetti_lift)?;
        ordered_range("confetti_size", self.confetti_size)?;
        // A lifetime range must have width and start above zero
        let [min, max] = self.confetti_lifetime;
        ordered_range("confetti_lifetime", self.confetti_lifetime)?;
        if min <= 0.0 || max <= min {
            return Err(SettingsError::EmptyRange {
                name: "confetti_lifetime",
                min,
                max,
            });
        }

        for (index, reveal) in self.reveals.iter().enumerate() {
            if reveal.name.trim().is_empty() {
                return Err(SettingsError::UnnamedReveal(index));
            }
            if self.reveals[..index].iter().any(|r| r.name == reveal.name) {
                return Err(SettingsError::DuplicateReveal(reveal.name.clone()));
            }
            non_negative("reveal delay", reveal.delay)?;
        }

        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::InvalidScalar { name, value })
    }
}

fn ordered_range(name: &'static str, [min, max]: [f32; 2]) -> Result<(), SettingsError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(SettingsError::EmptyRange { name, min, max })
    }
}
