//! Configuration errors
//!
//! The only fallible step is building an engine from settings. Everything
//! after construction is total.

use thiserror::Error;

/// Why a set of settings was rejected
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("confetti count must be between 1 and {max}, got {count}")]
    InvalidCount { count: usize, max: usize },

    #[error("confetti palette is empty")]
    EmptyPalette,

    #[error("palette entry {index} ({value:?}) is not a #rrggbb color")]
    MalformedColor { index: usize, value: String },

    #[error("{name} range is empty or inverted: [{min}, {max}]")]
    EmptyRange { name: &'static str, min: f32, max: f32 },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidScalar { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("reveal toggle at index {0} has an empty name")]
    UnnamedReveal(usize),

    #[error("duplicate reveal toggle name {0:?}")]
    DuplicateReveal(String),

    #[error("settings json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
}
