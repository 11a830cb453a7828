//! Ceremony state and the engine that owns it
//!
//! Everything the choreography needs lives in [`Ceremony`]. It is built once
//! from validated settings and mutated in place by [`super::tick::tick`].

use serde::{Deserialize, Serialize};

use super::confetti::{BurstSpec, ConfettiSystem};
use super::reveal::RevealScheduler;
use super::ribbon::RibbonSimulator;
use super::snapshot::Snapshot;
use super::tool::{self, ToolPose};
use crate::consts::*;
use crate::error::SettingsError;
use crate::settings::Settings;

/// Current phase of the ceremony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CeremonyState {
    /// Ribbon intact, tool hovering, waiting for the cut request
    Idle,
    /// Tool moving in and opening
    Approaching,
    /// Blades closing through the ribbon
    Cutting,
    /// Post-snip bounce
    SnipComplete,
    /// Tool pulling back
    Retreating,
    /// Everything done; tool hovers until reset
    Settled,
}

impl CeremonyState {
    /// The phase that follows this one on the timeline
    pub fn next(self) -> Option<Self> {
        match self {
            CeremonyState::Approaching => Some(CeremonyState::Cutting),
            CeremonyState::Cutting => Some(CeremonyState::SnipComplete),
            CeremonyState::SnipComplete => Some(CeremonyState::Retreating),
            CeremonyState::Retreating => Some(CeremonyState::Settled),
            CeremonyState::Idle | CeremonyState::Settled => None,
        }
    }

    /// Global progress span covered by this phase
    pub fn span(self) -> (f32, f32) {
        match self {
            CeremonyState::Idle => (0.0, 0.0),
            CeremonyState::Approaching => (0.0, APPROACH_END),
            CeremonyState::Cutting => (APPROACH_END, CUT_END),
            CeremonyState::SnipComplete => (CUT_END, SNIP_END),
            CeremonyState::Retreating => (SNIP_END, RETREAT_END),
            CeremonyState::Settled => (RETREAT_END, RETREAT_END),
        }
    }

    /// Map global progress to progress through this phase
    pub fn local_progress(self, progress: f32) -> f32 {
        let (start, end) = self.span();
        if end <= start {
            return if self == CeremonyState::Settled { 1.0 } else { 0.0 };
        }
        ((progress - start) / (end - start)).clamp(0.0, 1.0)
    }

    /// True between the cut request and a reset
    pub fn is_active(self) -> bool {
        self != CeremonyState::Idle
    }
}

/// Something the host may want to react to (sound, UI, analytics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CeremonyEvent {
    CutStarted,
    StateChanged {
        from: CeremonyState,
        to: CeremonyState,
    },
    /// Both halves are loose
    RibbonSevered,
    ConfettiBurst {
        count: usize,
    },
    Revealed {
        name: String,
    },
    /// The completion delay after the cut request has passed
    CutCompleted,
    Reset,
}

/// The choreography engine
#[derive(Debug, Clone)]
pub struct Ceremony {
    pub(crate) state: CeremonyState,
    pub(crate) cut_requested: bool,
    /// Global timeline progress in [0, 1]
    pub(crate) progress: f32,
    /// Wall-clock seconds since construction (drives ambient motion)
    pub(crate) clock: f64,
    /// Wall-clock seconds since the cut request
    pub(crate) cut_elapsed: f64,
    pub(crate) severed: bool,
    pub(crate) completed: bool,
    pub(crate) completion_delay: f64,
    pub(crate) tool: ToolPose,
    pub(crate) ribbon: RibbonSimulator,
    pub(crate) confetti: ConfettiSystem,
    pub(crate) burst: BurstSpec,
    pub(crate) reveals: RevealScheduler,
    pub(crate) events: Vec<CeremonyEvent>,
    pub(crate) ticks: u64,
}

impl Ceremony {
    /// Build an engine. Fails if the settings are invalid; there is no
    /// partially constructed engine.
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let burst = BurstSpec::from_settings(&settings)?;

        log::info!(
            "Ceremony ready: seed={}, confetti={} ({}), reveals={}",
            settings.seed,
            burst.count(),
            settings.quality.as_str(),
            settings.reveals.len()
        );

        Ok(Self {
            state: CeremonyState::Idle,
            cut_requested: false,
            progress: 0.0,
            clock: 0.0,
            cut_elapsed: 0.0,
            severed: false,
            completed: false,
            completion_delay: settings.completion_delay,
            tool: tool::pose(CeremonyState::Idle, 0.0, 0.0),
            ribbon: RibbonSimulator::new(&settings),
            confetti: ConfettiSystem::new(settings.confetti_gravity, settings.seed),
            burst,
            reveals: RevealScheduler::new(&settings.reveals),
            events: Vec::new(),
            ticks: 0,
        })
    }

    /// Request or cancel the cut.
    ///
    /// `true` starts the ceremony from `Idle` and is ignored in any other
    /// state. `false` resets everything immediately, mid-animation or not.
    pub fn set_cut_requested(&mut self, triggered: bool) {
        if triggered {
            self.cut_requested = true;
            if self.state != CeremonyState::Idle {
                log::debug!("Cut already requested (state {:?}), ignoring", self.state);
                return;
            }
            self.start_cut();
        } else {
            self.cut_requested = false;
            self.reset();
        }
    }

    fn start_cut(&mut self) {
        log::info!("Cut requested at t={:.3}s", self.clock);
        self.progress = 0.0;
        self.cut_elapsed = 0.0;
        self.severed = false;
        self.completed = false;
        self.reveals.trigger();
        self.events.push(CeremonyEvent::CutStarted);
        self.set_state(CeremonyState::Approaching);
        self.tool = tool::pose(self.state, 0.0, self.clock);
    }

    pub(crate) fn set_state(&mut self, to: CeremonyState) {
        let from = self.state;
        if from == to {
            return;
        }
        log::debug!("Ceremony {:?} -> {:?} (progress {:.3})", from, to, self.progress);
        self.state = to;
        self.events.push(CeremonyEvent::StateChanged { from, to });
    }

    /// Put every component back at rest, synchronously
    pub fn reset(&mut self) {
        let was_active = self.state.is_active();
        self.state = CeremonyState::Idle;
        self.progress = 0.0;
        self.cut_elapsed = 0.0;
        self.severed = false;
        self.completed = false;
        self.ribbon.reset();
        self.confetti.clear();
        self.reveals.reset();
        self.tool = tool::pose(CeremonyState::Idle, 0.0, self.clock);
        if was_active {
            log::info!("Ceremony reset at t={:.3}s", self.clock);
            self.events.push(CeremonyEvent::Reset);
        }
    }

    /// Advance one frame
    pub fn tick(&mut self, dt: f64) {
        super::tick::tick(self, dt);
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.state,
            progress: self.progress,
            clock: self.clock,
            tool: self.tool,
            halves: self.ribbon.halves(),
            particles: self.confetti.particles(),
            reveals: self.reveals.toggles(),
        }
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<CeremonyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> CeremonyState {
        self.state
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn cut_requested(&self) -> bool {
        self.cut_requested
    }

    /// Seconds since the cut was requested (0 while idle)
    pub fn cut_elapsed(&self) -> f64 {
        self.cut_elapsed
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_severed(&self) -> bool {
        self.severed
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn tool_pose(&self) -> &ToolPose {
        &self.tool
    }

    pub fn ribbon(&self) -> &RibbonSimulator {
        &self.ribbon
    }

    pub fn confetti(&self) -> &ConfettiSystem {
        &self.confetti
    }

    pub fn reveals(&self) -> &RevealScheduler {
        &self.reveals
    }
}
