//! Ribbon halves and their one-shot detachment
//!
//! Each half starts kinematically fixed between the stands. Detaching hands
//! it to a tiny integrator: gravity, velocity, spin, a floor plane it comes
//! to rest on, and a sleep state once it stops moving.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Which half of the ribbon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// -1 for the left half, +1 for the right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Direction the half is knocked toward when cut (down and outward)
    pub fn drop_direction(self) -> Vec3 {
        Vec3::new(self.sign(), -1.0, 0.0)
    }

    /// Spin applied when cut: left rolls negative, right rolls positive
    pub fn roll_direction(self) -> Vec3 {
        Vec3::new(0.2 * self.sign(), 0.0, 0.5 * self.sign())
    }

    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Where things sit before anything moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RibbonLayout {
    pub width: f32,
    pub stand_height: f32,
    pub segment_height: f32,
    pub floor_height: f32,
}

impl RibbonLayout {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            width: settings.ribbon_width,
            stand_height: settings.stand_height,
            segment_height: settings.segment_height,
            floor_height: settings.floor_height,
        }
    }

    /// Resting centre of a ribbon half
    pub fn half_anchor(&self, side: Side) -> Vec3 {
        Vec3::new(
            side.sign() * self.width / 4.0,
            self.stand_height - self.segment_height / 2.0 - 0.5,
            0.0,
        )
    }

    /// Base of a stand pole
    pub fn stand_position(&self, side: Side) -> Vec3 {
        Vec3::new(side.sign() * self.width / 2.0, 0.0, 0.0)
    }

    /// Horizontal extent of one cut half
    pub fn half_width(&self) -> f32 {
        self.width / 2.0 - 0.1
    }

    /// Centre height of a half lying on the floor
    pub fn floor_contact_height(&self) -> f32 {
        self.floor_height + self.segment_height / 2.0
    }
}

/// Integration tunables shared by both halves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RibbonPhysics {
    pub gravity: f32,
    pub impulse_scale: f32,
    pub torque_scale: f32,
    pub sleep_time_limit: f32,
    pub restitution: f32,
    pub ground_friction: f32,
}

impl RibbonPhysics {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            gravity: settings.gravity,
            impulse_scale: settings.impulse_scale,
            torque_scale: settings.torque_scale,
            sleep_time_limit: settings.sleep_time_limit,
            restitution: settings.restitution,
            ground_friction: settings.ground_friction,
        }
    }
}

/// One half of the ribbon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibbonHalf {
    pub side: Side,
    /// Fixed to the stand; ignores physics entirely
    pub attached: bool,
    pub position: Vec3,
    /// Euler rotation (XYZ)
    pub rotation: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Speed below which the half counts as resting
    pub rest_threshold: f32,
    /// Seconds spent below `rest_threshold`
    pub rest_time: f32,
    pub asleep: bool,
}

impl RibbonHalf {
    pub fn new(side: Side, layout: &RibbonLayout, rest_threshold: f32) -> Self {
        Self {
            side,
            attached: true,
            position: layout.half_anchor(side),
            rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            rest_threshold,
            rest_time: 0.0,
            asleep: false,
        }
    }

    /// Put the half back on the stand
    pub fn reset(&mut self, layout: &RibbonLayout) {
        self.attached = true;
        self.position = layout.half_anchor(self.side);
        self.rotation = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.rest_time = 0.0;
        self.asleep = false;
    }

    /// True while the integrator still owns this half
    pub fn is_simulated(&self) -> bool {
        !self.attached && !self.asleep
    }

    fn integrate(&mut self, physics: &RibbonPhysics, layout: &RibbonLayout, dt: f32) {
        self.velocity.y -= physics.gravity * dt;
        self.position += self.velocity * dt;
        self.rotation += self.angular_velocity * dt;

        // Floor plane: clamp, bounce, and scrub off sliding and spin
        let contact = layout.floor_contact_height();
        if self.position.y <= contact {
            self.position.y = contact;
            if self.velocity.y < 0.0 {
                self.velocity.y = -self.velocity.y * physics.restitution;
                if self.velocity.y < self.rest_threshold {
                    self.velocity.y = 0.0;
                }
            }
            let damping = (-physics.ground_friction * dt).exp();
            self.velocity.x *= damping;
            self.velocity.z *= damping;
            self.angular_velocity *= damping;
        }

        if self.velocity.length() < self.rest_threshold
            && self.angular_velocity.length() < self.rest_threshold
        {
            self.rest_time += dt;
            if self.rest_time >= physics.sleep_time_limit {
                self.asleep = true;
                self.velocity = Vec3::ZERO;
                self.angular_velocity = Vec3::ZERO;
                log::debug!("{:?} ribbon half asleep at {}", self.side, self.position);
            }
        } else {
            self.rest_time = 0.0;
        }
    }
}

/// Owns both halves and moves them once they are cut loose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RibbonSimulator {
    layout: RibbonLayout,
    physics: RibbonPhysics,
    halves: [RibbonHalf; 2],
}

impl RibbonSimulator {
    pub fn new(settings: &Settings) -> Self {
        let layout = RibbonLayout::from_settings(settings);
        let rest = settings.sleep_speed_limit;
        Self {
            layout,
            physics: RibbonPhysics::from_settings(settings),
            halves: Side::ALL.map(|side| RibbonHalf::new(side, &layout, rest)),
        }
    }

    pub fn layout(&self) -> &RibbonLayout {
        &self.layout
    }

    pub fn halves(&self) -> &[RibbonHalf; 2] {
        &self.halves
    }

    pub fn half(&self, side: Side) -> &RibbonHalf {
        &self.halves[side.index()]
    }

    /// Cut a half loose and kick it. Returns false if it was already loose.
    pub fn detach(&mut self, side: Side, impulse_direction: Vec3, torque_direction: Vec3) -> bool {
        let physics = self.physics;
        let half = &mut self.halves[side.index()];
        if !half.attached {
            return false;
        }
        half.attached = false;
        half.asleep = false;
        half.rest_time = 0.0;
        half.velocity += impulse_direction * physics.impulse_scale;
        half.angular_velocity += torque_direction * physics.torque_scale;
        true
    }

    /// Cut both halves loose with their mirrored kicks
    pub fn detach_both(&mut self) {
        for side in Side::ALL {
            self.detach(side, side.drop_direction(), side.roll_direction());
        }
    }

    /// Advance every loose, awake half
    pub fn tick(&mut self, dt: f32) {
        for half in self.halves.iter_mut().filter(|h| h.is_simulated()) {
            half.integrate(&self.physics, &self.layout, dt);
        }
    }

    pub fn reset_half(&mut self, side: Side) {
        self.halves[side.index()].reset(&self.layout);
    }

    pub fn reset(&mut self) {
        for side in Side::ALL {
            self.reset_half(side);
        }
    }

    pub fn all_attached(&self) -> bool {
        self.halves.iter().all(|h| h.attached)
    }

    pub fn all_asleep(&self) -> bool {
        self.halves.iter().all(|h| h.asleep)
    }
}
