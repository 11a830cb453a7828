//! Scissors pose animation
//!
//! The pose is a pure function of ceremony state, phase-local progress and
//! wall-clock time. Convention: the left blade angle is the value computed
//! here and the right blade is always its mirror (`right == -left`).
//! Negative left angles open the scissors, positive ones cross the blades
//! through the ribbon. Shake and bounce act on the tool's y/z offset and
//! its x rotation.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::easing::{ease_in_out_cubic, ease_in_out_quad, ease_out_cubic, ease_out_quad};
use super::state::CeremonyState;

/// Resting orientation: tool behind the ribbon, tips pointing at it
pub const BASE_ROTATION: Vec3 = Vec3::new(0.1, FRAC_PI_2, FRAC_PI_2);

/// How far the tool travels toward the ribbon during approach
pub const APPROACH_DISTANCE: f32 = 1.6;
/// Extra yaw picked up during approach
pub const APPROACH_YAW: f32 = 0.1;
/// Left blade angle when fully open
pub const OPEN_ANGLE: f32 = -0.5;
/// Left blade angle after closing through the ribbon
pub const CLOSED_ANGLE: f32 = 0.3;
/// How far the blades relax back after the snip
pub const RELAX_ANGLE: f32 = 0.08;
/// Peak height of the post-snip bounce
pub const BOUNCE_HEIGHT: f32 = 0.05;
/// Retreat lift and pull-back distance
pub const RETREAT_LIFT: f32 = 0.1;
pub const RETREAT_DISTANCE: f32 = 1.8;
/// Pitch the tool settles at after retreating
pub const SETTLED_PITCH: f32 = 0.05;

/// Resistance shake window within the cutting phase
const SHAKE_START: f32 = 0.6;
const SHAKE_END: f32 = 0.9;
const SHAKE_AMPLITUDE: f32 = 0.0018;
const SHAKE_FREQUENCY: f64 = 45.0;
const BLADE_SHAKE_GAIN: f32 = 5.0;

/// Snap accent on the blades just before they cross
const ACCENT_START: f32 = 0.7;
const ACCENT_END: f32 = 0.9;
const ACCENT_ANGLE: f32 = 0.04;

/// Pose of the cutting tool for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolPose {
    /// Offset from the tool's anchor position
    pub offset: Vec3,
    /// Absolute Euler rotation (XYZ)
    pub rotation: Vec3,
    pub left_blade: f32,
    pub right_blade: f32,
}

impl Default for ToolPose {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            rotation: BASE_ROTATION,
            left_blade: 0.0,
            right_blade: 0.0,
        }
    }
}

impl ToolPose {
    fn with_blades(offset: Vec3, rotation: Vec3, left_blade: f32) -> Self {
        Self {
            offset,
            rotation,
            left_blade,
            right_blade: -left_blade,
        }
    }
}

/// Gentle floating motion, centred on `center`
fn hover(center: Vec3, time: f64) -> Vec3 {
    center
        + Vec3::new(
            0.0,
            (time * 0.8).sin() as f32 * 0.05,
            (time * 1.2).sin() as f32 * 0.15,
        )
}

/// Compute the tool pose for a state at the given phase-local progress
pub fn pose(state: CeremonyState, local: f32, time: f64) -> ToolPose {
    let local = local.clamp(0.0, 1.0);
    let approached_rotation = BASE_ROTATION + Vec3::new(0.0, APPROACH_YAW, 0.0);

    match state {
        CeremonyState::Idle => {
            // Anticipation: slight sway and slow blade breathing
            let rotation = BASE_ROTATION
                + Vec3::new(
                    0.0,
                    (time * 0.8).sin() as f32 * 0.03,
                    (time * 0.5).sin() as f32 * 0.01,
                );
            let breathing = ((time * 0.5).sin() as f32 + 1.0) * 0.5 * 0.15;
            ToolPose::with_blades(hover(Vec3::ZERO, time), rotation, -breathing)
        }

        CeremonyState::Approaching => {
            let approach = ease_out_quad(local);
            let opening = ease_in_out_quad(local);
            ToolPose::with_blades(
                Vec3::new(0.0, 0.0, approach * APPROACH_DISTANCE),
                BASE_ROTATION + Vec3::new(0.0, approach * APPROACH_YAW, 0.0),
                OPEN_ANGLE * opening,
            )
        }

        CeremonyState::Cutting => {
            let closing = ease_in_out_cubic(local);
            let accent = if local > ACCENT_START && local < ACCENT_END {
                ((local - ACCENT_START) * PI * 5.0).sin() * ACCENT_ANGLE
            } else {
                0.0
            };

            let mut offset = Vec3::new(0.0, 0.0, APPROACH_DISTANCE);
            let mut rotation = approached_rotation;
            let mut left = OPEN_ANGLE + (CLOSED_ANGLE - OPEN_ANGLE) * closing + accent;

            // Resistance as the blades bite, fading out over the window
            if local > SHAKE_START && local < SHAKE_END {
                let window = (local - SHAKE_START) / (SHAKE_END - SHAKE_START);
                let shake =
                    (time * SHAKE_FREQUENCY).sin() as f32 * SHAKE_AMPLITUDE * (1.0 - window);
                offset.y += shake;
                offset.z += shake * 2.0;
                rotation.x += shake * 2.0;
                left += shake * BLADE_SHAKE_GAIN;
            }

            ToolPose::with_blades(offset, rotation, left)
        }

        CeremonyState::SnipComplete => {
            let bounce = (local * PI).sin() * BOUNCE_HEIGHT;
            let relax = ease_out_quad(local) * RELAX_ANGLE;
            ToolPose::with_blades(
                Vec3::new(0.0, bounce, APPROACH_DISTANCE),
                approached_rotation + Vec3::new(bounce * 0.5, 0.0, 0.0),
                CLOSED_ANGLE - relax,
            )
        }

        CeremonyState::Retreating => {
            let retreat = ease_in_out_quad(local);
            let opening = ease_out_cubic(retreat);
            let mut rotation = approached_rotation;
            rotation.x = BASE_ROTATION.x * (1.0 - retreat) + SETTLED_PITCH * retreat;
            ToolPose::with_blades(
                Vec3::new(
                    0.0,
                    retreat * RETREAT_LIFT,
                    APPROACH_DISTANCE - retreat * RETREAT_DISTANCE,
                ),
                rotation,
                (CLOSED_ANGLE - RELAX_ANGLE) * (1.0 - opening),
            )
        }

        CeremonyState::Settled => {
            let mut rotation = approached_rotation;
            rotation.x = SETTLED_PITCH;
            let rest = Vec3::new(0.0, RETREAT_LIFT, APPROACH_DISTANCE - RETREAT_DISTANCE);
            ToolPose::with_blades(hover(rest, time), rotation, 0.0)
        }
    }
}
