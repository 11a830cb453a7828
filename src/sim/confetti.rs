//! Confetti burst
//!
//! One generation of short-lived pieces at a time. A burst replaces whatever
//! is still in the air; ticking ages pieces and drops the expired ones.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::settings::Settings;

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// A single confetti piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler rotation (XYZ)
    pub rotation: Vec3,
    pub rotation_velocity: Vec3,
    /// Width and height of the piece
    pub size: Vec2,
    pub color: Rgb,
    pub age: f32,
    pub max_age: f32,
}

impl Particle {
    /// Fraction of lifetime used, 0 at spawn, 1 at expiry
    #[inline]
    pub fn normalized_age(&self) -> f32 {
        (self.age / self.max_age).clamp(0.0, 1.0)
    }

    /// Fade-out opacity for rendering
    #[inline]
    pub fn opacity(&self) -> f32 {
        1.0 - self.normalized_age()
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.max_age
    }
}

/// Everything needed to spawn one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstSpec {
    origin: Vec3,
    count: usize,
    palette: Vec<Rgb>,
    /// Horizontal speed bound; x and z are drawn from ±spread
    spread: f32,
    /// Upward speed range
    lift: [f32; 2],
    /// Spin bound per axis
    spin: f32,
    size: [f32; 2],
    lifetime: [f32; 2],
}

impl BurstSpec {
    /// Build from settings that already passed `Settings::validate`
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self {
            origin: settings.confetti_origin,
            count: settings.burst_count(),
            palette: settings.palette()?,
            spread: settings.confetti_spread,
            lift: settings.confetti_lift,
            spin: settings.confetti_spin,
            size: settings.confetti_size,
            lifetime: settings.confetti_lifetime,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn lifetime(&self) -> [f32; 2] {
        self.lifetime
    }
}

/// Uniform sample in [min, max); callers pass ordered ranges
#[inline]
fn sample(rng: &mut Pcg32, [min, max]: [f32; 2]) -> f32 {
    min + (max - min) * rng.random::<f32>()
}

/// The live confetti generation
#[derive(Debug, Clone)]
pub struct ConfettiSystem {
    particles: Vec<Particle>,
    gravity: f32,
    rng: Pcg32,
}

impl ConfettiSystem {
    pub fn new(gravity: f32, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            gravity,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Replace the live set with a fresh generation
    pub fn burst(&mut self, spec: &BurstSpec) {
        let rng = &mut self.rng;
        let mut fresh = Vec::with_capacity(spec.count);
        for _ in 0..spec.count {
            let velocity = Vec3::new(
                sample(rng, [-spec.spread, spec.spread]),
                sample(rng, spec.lift),
                sample(rng, [-spec.spread, spec.spread]),
            );
            let rotation = Vec3::new(
                sample(rng, [0.0, std::f32::consts::PI]),
                sample(rng, [0.0, std::f32::consts::PI]),
                sample(rng, [0.0, std::f32::consts::PI]),
            );
            let rotation_velocity = Vec3::new(
                sample(rng, [-spec.spin, spec.spin]),
                sample(rng, [-spec.spin, spec.spin]),
                sample(rng, [-spec.spin, spec.spin]),
            );
            let size = Vec2::new(sample(rng, spec.size), sample(rng, spec.size));
            let color = spec.palette[rng.random_range(0..spec.palette.len())];
            let max_age = sample(rng, spec.lifetime);

            fresh.push(Particle {
                position: spec.origin,
                velocity,
                rotation,
                rotation_velocity,
                size,
                color,
                age: 0.0,
                max_age,
            });
        }
        self.particles = fresh;
        log::debug!("Confetti burst: {} pieces", self.particles.len());
    }

    /// Move, spin and age every piece, then drop the expired ones
    pub fn tick(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.position += particle.velocity * dt;
            particle.velocity.y -= self.gravity * dt;
            particle.rotation += particle.rotation_velocity * dt;
            particle.age += dt;
        }
        self.particles.retain(|p| !p.is_expired());
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BurstSpec {
        let settings = Settings::default();
        settings.validate().expect("default settings are valid");
        BurstSpec::from_settings(&settings).expect("default palette parses")
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::from_hex("#ff8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::from_hex("#FFffFF"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::from_hex("ff8000"), None);
        assert_eq!(Rgb::from_hex("#ff80"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#ééé"), None);
        assert_eq!(Rgb::from_hex("#+f+f+f"), None);
        assert_eq!(Rgb::from_hex("#-f0000"), None);
    }

    #[test]
    fn test_burst_samples_within_bounds() {
        let spec = spec();
        let mut confetti = ConfettiSystem::new(18.0, 1);
        confetti.burst(&spec);
        assert_eq!(confetti.len(), 100);

        for p in confetti.particles() {
            assert_eq!(p.position, Vec3::new(0.0, 1.0, 0.0));
            assert!(p.velocity.x.abs() <= 6.0 && p.velocity.z.abs() <= 6.0);
            assert!(p.velocity.y >= 6.0 && p.velocity.y <= 18.0);
            assert!(p.rotation_velocity.abs().max_element() <= 6.0);
            assert!(p.max_age >= 2.0 && p.max_age <= 5.0);
            assert!(spec.palette().contains(&p.color));
            assert_eq!(p.age, 0.0);
            assert_eq!(p.opacity(), 1.0);
        }
    }

    #[test]
    fn test_burst_replaces_live_set() {
        let spec = spec();
        let mut confetti = ConfettiSystem::new(18.0, 2);
        confetti.burst(&spec);
        confetti.tick(0.5);
        confetti.burst(&spec);
        assert_eq!(confetti.len(), spec.count());
        assert!(confetti.particles().iter().all(|p| p.age == 0.0));
    }

    #[test]
    fn test_tick_integrates_and_expires() {
        let spec = spec();
        let mut confetti = ConfettiSystem::new(18.0, 3);
        confetti.burst(&spec);
        let first = confetti.particles()[0].clone();

        confetti.tick(0.1);
        let moved = &confetti.particles()[0];
        assert!((moved.position - (first.position + first.velocity * 0.1)).length() < 1e-5);
        assert!((moved.velocity.y - (first.velocity.y - 1.8)).abs() < 1e-5);
        assert!((moved.age - 0.1).abs() < 1e-6);

        let mut previous = confetti.len();
        for _ in 0..400 {
            confetti.tick(1.0 / 60.0);
            assert!(confetti.len() <= previous);
            previous = confetti.len();
        }
        assert!(confetti.is_empty());
    }

    #[test]
    fn test_tick_on_empty_set() {
        let mut confetti = ConfettiSystem::new(18.0, 4);
        confetti.tick(1.0);
        confetti.tick(0.0);
        assert!(confetti.is_empty());
    }

    #[test]
    fn test_same_seed_same_burst() {
        let spec = spec();
        let mut a = ConfettiSystem::new(18.0, 99);
        let mut b = ConfettiSystem::new(18.0, 99);
        a.burst(&spec);
        b.burst(&spec);
        assert_eq!(a.particles(), b.particles());
    }
}
