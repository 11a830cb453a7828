//! Per-frame advancement
//!
//! Subsystems advance in dependency order: timeline and tool pose, ribbon
//! halves, confetti, reveals.

use super::state::{Ceremony, CeremonyEvent};
use super::tool;
use crate::consts::*;
use crate::sanitize_delta;

/// Progress this close to 1 counts as finished (absorbs f32 rounding)
const PROGRESS_EPSILON: f32 = 1e-5;

/// Advance global progress by `dt` seconds of wall-clock time.
///
/// The rate depends on where progress currently is (slow start, fast
/// middle, slow end). Large steps are integrated piecewise across the rate
/// bands so frame splitting does not change the result. Never exceeds 1.
pub fn advance_progress(mut progress: f32, dt: f64) -> f32 {
    let mut remaining = dt as f32;
    while remaining > 0.0 && progress < RETREAT_END {
        let (rate, band_end) = if progress < SLOW_START_UNTIL {
            (SLOW_START_RATE, SLOW_START_UNTIL)
        } else if progress < FAST_MIDDLE_UNTIL {
            (FAST_MIDDLE_RATE, FAST_MIDDLE_UNTIL)
        } else {
            (SLOW_END_RATE, RETREAT_END)
        };

        let needed = (band_end - progress) / rate;
        if remaining >= needed {
            progress = band_end;
            remaining -= needed;
        } else {
            progress += remaining * rate;
            remaining = 0.0;
        }
    }

    if progress >= RETREAT_END - PROGRESS_EPSILON {
        RETREAT_END
    } else {
        progress
    }
}

/// Advance the ceremony by one frame of `dt` seconds
pub fn tick(ceremony: &mut Ceremony, dt: f64) {
    let raw = dt;
    let dt = sanitize_delta(raw);
    if dt != raw && raw != 0.0 {
        log::warn!("Ignoring degenerate frame delta {raw}");
    }

    ceremony.ticks += 1;
    ceremony.clock += dt;

    let active = ceremony.state.is_active();
    if active {
        ceremony.cut_elapsed += dt;
        ceremony.progress = advance_progress(ceremony.progress, dt);

        // Walk through every boundary crossed this frame, in order
        while let Some(next) = ceremony.state.next() {
            let (_, end) = ceremony.state.span();
            if ceremony.progress < end {
                break;
            }
            ceremony.set_state(next);
        }
    }

    // Tool
    let local = ceremony.state.local_progress(ceremony.progress);
    ceremony.tool = tool::pose(ceremony.state, local, ceremony.clock);

    // The detachment runs on the wall clock, independent of tool progress
    let sever_now = active && !ceremony.severed && ceremony.cut_elapsed >= DETACH_DELAY;

    // Ribbon halves
    ceremony.ribbon.tick(dt as f32);
    if sever_now {
        ceremony.ribbon.detach_both();
        ceremony.severed = true;
        log::info!(
            "Ribbon severed at {:.3}s after cut ({:?})",
            ceremony.cut_elapsed,
            ceremony.state
        );
        ceremony.events.push(CeremonyEvent::RibbonSevered);
    }

    // Confetti
    ceremony.confetti.tick(dt as f32);
    if sever_now {
        ceremony.confetti.burst(&ceremony.burst);
        ceremony.events.push(CeremonyEvent::ConfettiBurst {
            count: ceremony.confetti.len(),
        });
    }

    // Reveals
    let events = &mut ceremony.events;
    ceremony.reveals.tick(dt, |name| {
        log::debug!("Revealed {name}");
        events.push(CeremonyEvent::Revealed {
            name: name.to_string(),
        });
    });

    if active && !ceremony.completed && ceremony.cut_elapsed >= ceremony.completion_delay {
        ceremony.completed = true;
        log::info!("Cut complete");
        ceremony.events.push(CeremonyEvent::CutCompleted);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use proptest::prelude::*;

    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::CeremonyState;
    use crate::sim::ribbon::Side;
    use crate::timeline_duration;

    const FRAME: f64 = 0.016;

    fn ceremony() -> Ceremony {
        Ceremony::new(Settings::default()).expect("valid settings")
    }

    fn run(ceremony: &mut Ceremony, seconds: f64) {
        let frames = (seconds / FRAME).round() as usize;
        for _ in 0..frames {
            tick(ceremony, FRAME);
        }
    }

    fn visited_states(events: &[CeremonyEvent]) -> Vec<CeremonyState> {
        events
            .iter()
            .filter_map(|e| match e {
                CeremonyEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    const FULL_ORDER: [CeremonyState; 5] = [
        CeremonyState::Approaching,
        CeremonyState::Cutting,
        CeremonyState::SnipComplete,
        CeremonyState::Retreating,
        CeremonyState::Settled,
    ];

    fn assert_at_rest(ceremony: &Ceremony) {
        let snapshot = ceremony.snapshot();
        assert_eq!(snapshot.state, CeremonyState::Idle);
        assert_eq!(snapshot.particle_count(), 0);
        for half in snapshot.halves {
            assert!(half.attached);
            assert_eq!(half.velocity, Vec3::ZERO);
            assert_eq!(half.angular_velocity, Vec3::ZERO);
        }
        assert!(snapshot.reveal_visibility().all(|(_, visible)| !visible));
    }

    #[test]
    fn test_advance_progress_rates() {
        // Slow start: 0.6 per second
        assert!((advance_progress(0.0, 0.5) - 0.3).abs() < 1e-6);
        // Fast middle: 1.0 per second
        assert!((advance_progress(0.4, 0.2) - 0.6).abs() < 1e-6);
        // Slow end: 0.8 per second
        assert!((advance_progress(0.7, 0.25) - 0.9).abs() < 1e-6);
        // Crossing a band boundary in one step
        let crossed = advance_progress(0.3, 0.3);
        let expected = 0.4 + (0.3 - 0.1 / 0.6) as f32;
        assert!((crossed - expected).abs() < 1e-5);
        // Clamped
        assert_eq!(advance_progress(0.9, 100.0), 1.0);
        assert_eq!(advance_progress(0.5, 0.0), 0.5);
    }

    #[test]
    fn test_timeline_duration() {
        let duration = timeline_duration();
        assert!((duration - (0.4 / 0.6 + 0.3 + 0.375)).abs() < 1e-5);
        assert_eq!(advance_progress(0.0, duration), 1.0);
    }

    #[test]
    fn test_idle_ticks_change_nothing_but_hover() {
        let mut c = ceremony();
        run(&mut c, 2.0);
        assert_eq!(c.state(), CeremonyState::Idle);
        assert_eq!(c.progress(), 0.0);
        assert!(c.drain_events().is_empty());
        assert_at_rest(&c);
    }

    #[test]
    fn test_full_ceremony_reaches_settled_in_order() {
        let mut c = ceremony();
        c.set_cut_requested(true);
        run(&mut c, timeline_duration() + 0.1);

        assert_eq!(c.state(), CeremonyState::Settled);
        assert_eq!(c.progress(), 1.0);
        assert_eq!(visited_states(&c.drain_events()), FULL_ORDER.to_vec());

        // Settled is terminal until reset
        run(&mut c, 5.0);
        assert_eq!(c.state(), CeremonyState::Settled);
    }

    #[test]
    fn test_single_huge_step_visits_every_state() {
        let mut c = ceremony();
        c.set_cut_requested(true);
        tick(&mut c, 10.0);
        assert_eq!(c.state(), CeremonyState::Settled);

        let events = c.drain_events();
        assert_eq!(visited_states(&events), FULL_ORDER.to_vec());
        assert!(events.contains(&CeremonyEvent::RibbonSevered));
        assert!(events.contains(&CeremonyEvent::CutCompleted));
        // Fresh burst is not aged by the frame that spawned it
        assert_eq!(c.confetti().len(), 100);
    }

    #[test]
    fn test_detach_fires_on_wall_clock() {
        let mut c = ceremony();
        c.set_cut_requested(true);

        // Just before the delay everything is still attached
        run(&mut c, 0.384);
        assert!(c.ribbon().all_attached());
        assert!(c.confetti().is_empty());

        // Tick until the sever happens
        let mut frames = 0;
        while !c.is_severed() {
            tick(&mut c, FRAME);
            frames += 1;
            assert!(frames < 5, "detachment late");
        }
        assert!(c.cut_elapsed() >= DETACH_DELAY);
        assert!(c.cut_elapsed() < DETACH_DELAY + 2.0 * FRAME);
        // 0.4s lands inside the cutting phase with the default rates
        assert_eq!(c.state(), CeremonyState::Cutting);

        let snapshot = c.snapshot();
        assert_eq!(snapshot.particle_count(), 100);
        assert!(!snapshot.half(Side::Left).attached);
        assert!(!snapshot.half(Side::Right).attached);
        assert!(snapshot.half(Side::Left).velocity.y < 0.0);

        // And they keep falling faster
        let vy = c.ribbon().half(Side::Left).velocity.y;
        tick(&mut c, FRAME);
        assert!(c.ribbon().half(Side::Left).velocity.y < vy);
    }

    #[test]
    fn test_example_scenario() {
        let mut c = ceremony();
        c.set_cut_requested(true);

        let mut peak = 0;
        let mut elapsed = 0.0;
        while elapsed < 3.0 {
            tick(&mut c, FRAME);
            elapsed += FRAME;
            peak = peak.max(c.confetti().len());
        }
        assert_eq!(peak, 100);
        assert!(c.ribbon().halves().iter().all(|h| !h.attached));
        assert!(c.confetti().len() <= 100);

        // Lifetimes top out at 5s after a burst at ~0.4s
        while elapsed < 5.5 {
            tick(&mut c, FRAME);
            elapsed += FRAME;
        }
        assert!(c.confetti().is_empty());
    }

    #[test]
    fn test_reset_during_cutting() {
        let mut c = ceremony();
        c.set_cut_requested(true);
        run(&mut c, 0.6);
        assert_eq!(c.state(), CeremonyState::Cutting);
        assert!(c.is_severed());
        assert!(!c.confetti().is_empty());

        c.set_cut_requested(false);
        assert_at_rest(&c);
        assert!(c.drain_events().contains(&CeremonyEvent::Reset));

        // No leftover motion on later ticks
        run(&mut c, 1.0);
        assert_at_rest(&c);
    }

    #[test]
    fn test_retrigger_requires_reset() {
        let mut c = ceremony();
        c.set_cut_requested(true);
        run(&mut c, 2.0);
        assert_eq!(c.state(), CeremonyState::Settled);
        c.drain_events();

        c.set_cut_requested(true);
        tick(&mut c, FRAME);
        assert_eq!(c.state(), CeremonyState::Settled);
        assert!(visited_states(&c.drain_events()).is_empty());

        c.set_cut_requested(false);
        c.set_cut_requested(true);
        assert_eq!(c.state(), CeremonyState::Approaching);
        run(&mut c, 0.5);
        assert!(c.is_severed());
        assert_eq!(c.confetti().len(), 100);
    }

    #[test]
    fn test_reveals_follow_delays() {
        let mut c = ceremony();
        c.set_cut_requested(true);
        run(&mut c, 0.3);
        let snapshot = c.snapshot();
        assert_eq!(snapshot.is_revealed("light_beams"), Some(true));
        assert_eq!(snapshot.is_revealed("atmosphere"), Some(false));

        run(&mut c, 2.5);
        let snapshot = c.snapshot();
        assert!(snapshot.reveal_visibility().all(|(_, visible)| visible));

        let revealed: Vec<_> = c
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                CeremonyEvent::Revealed { name } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(
            revealed,
            vec!["light_beams", "sparkles", "atmosphere", "celebration"]
        );
    }

    #[test]
    fn test_cut_completed_once() {
        let mut c = ceremony();
        c.set_cut_requested(true);
        run(&mut c, 4.0);
        let completions = c
            .drain_events()
            .iter()
            .filter(|e| **e == CeremonyEvent::CutCompleted)
            .count();
        assert_eq!(completions, 1);
        assert!(c.is_completed());
    }

    #[test]
    fn test_degenerate_deltas_are_ignored() {
        let mut c = ceremony();
        c.set_cut_requested(true);
        run(&mut c, 0.2);
        let progress = c.progress();
        let clock = c.clock();

        for dt in [f64::NAN, -1.0, f64::NEG_INFINITY, f64::INFINITY, 0.0] {
            tick(&mut c, dt);
        }
        assert_eq!(c.progress(), progress);
        assert_eq!(c.clock(), clock);
        assert!(c.tool_pose().offset.is_finite());
    }

    #[test]
    fn test_determinism() {
        let mut a = ceremony();
        let mut b = ceremony();
        a.set_cut_requested(true);
        b.set_cut_requested(true);
        for _ in 0..200 {
            tick(&mut a, FRAME);
            tick(&mut b, FRAME);
        }
        assert_eq!(a.confetti().particles(), b.confetti().particles());
        assert_eq!(a.ribbon().halves(), b.ribbon().halves());
        assert_eq!(a.tool_pose(), b.tool_pose());
    }

    proptest! {
        #[test]
        fn prop_any_split_ends_settled(steps in prop::collection::vec(0.001f64..0.1, 1..200)) {
            let mut c = ceremony();
            c.set_cut_requested(true);
            let mut total = 0.0;
            for dt in &steps {
                tick(&mut c, *dt);
                total += dt;
            }
            // Top up to just past the full timeline
            tick(&mut c, (timeline_duration() - total).max(0.0) + 1e-3);
            prop_assert_eq!(c.state(), CeremonyState::Settled);
            prop_assert_eq!(visited_states(&c.drain_events()), FULL_ORDER.to_vec());
        }

        #[test]
        fn prop_blades_mirrored(steps in prop::collection::vec(0.001f64..0.05, 1..150)) {
            let mut c = ceremony();
            c.set_cut_requested(true);
            for dt in steps {
                tick(&mut c, dt);
                let pose = c.tool_pose();
                prop_assert!((pose.left_blade + pose.right_blade).abs() < 1e-6);
            }
        }

        #[test]
        fn prop_particle_count_never_grows_after_burst(
            steps in prop::collection::vec(0.005f64..0.2, 1..120),
        ) {
            let mut c = ceremony();
            c.set_cut_requested(true);
            let mut previous: Option<usize> = None;
            for dt in steps {
                let was_severed = c.is_severed();
                tick(&mut c, dt);
                let count = c.confetti().len();
                if !was_severed && c.is_severed() {
                    prop_assert_eq!(count, 100);
                } else if let Some(previous) = previous {
                    prop_assert!(count <= previous);
                }
                if c.is_severed() {
                    previous = Some(count);
                }
            }
        }

        #[test]
        fn prop_reset_anywhere_restores_rest(
            steps in prop::collection::vec(0.001f64..0.1, 0..100),
        ) {
            let mut c = ceremony();
            c.set_cut_requested(true);
            for dt in steps {
                tick(&mut c, dt);
            }
            c.set_cut_requested(false);
            assert_at_rest(&c);
        }

        #[test]
        fn prop_double_trigger_matches_single(
            steps in prop::collection::vec(0.001f64..0.05, 1..100),
        ) {
            let mut once = ceremony();
            let mut twice = ceremony();
            once.set_cut_requested(true);
            twice.set_cut_requested(true);
            twice.set_cut_requested(true);
            for dt in steps {
                tick(&mut once, dt);
                tick(&mut twice, dt);
            }
            prop_assert_eq!(once.state(), twice.state());
            prop_assert_eq!(once.progress(), twice.progress());
            prop_assert_eq!(once.ribbon().halves(), twice.ribbon().halves());
            prop_assert_eq!(once.confetti().particles(), twice.confetti().particles());
        }
    }
}
