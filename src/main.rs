//! Ribbon Ceremony entry point
//!
//! Headless driver: plays one scripted ceremony at a fixed frame rate, logs
//! every event, prints the final snapshot as JSON, then resets.
//!
//! Usage: `ribbon-ceremony [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
use ribbon_ceremony::{Ceremony, Settings};

/// Simulated frame time (60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_DT: f64 = 1.0 / 60.0;
/// When the scripted cut request arrives
#[cfg(not(target_arch = "wasm32"))]
const CUT_AT: f64 = 0.5;
/// Total simulated session length
#[cfg(not(target_arch = "wasm32"))]
const SESSION_LENGTH: f64 = 7.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ribbon Ceremony (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let mut ceremony = match Ceremony::new(settings) {
        Ok(ceremony) => ceremony,
        Err(e) => {
            log::error!("Invalid settings: {e}");
            std::process::exit(1);
        }
    };

    let frames = (SESSION_LENGTH / FRAME_DT).round() as u32;
    for frame in 0..frames {
        let time = frame as f64 * FRAME_DT;
        if time >= CUT_AT {
            // Held down like a key; repeats are no-ops
            ceremony.set_cut_requested(true);
        }
        ceremony.tick(FRAME_DT);

        for event in ceremony.drain_events() {
            log::info!("[{:.3}s] {:?}", ceremony.clock(), event);
        }
    }

    let snapshot = ceremony.snapshot();
    log::info!(
        "Final state {:?}: {} confetti live, halves asleep: {}",
        snapshot.state,
        snapshot.particle_count(),
        ceremony.ribbon().all_asleep()
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }

    ceremony.set_cut_requested(false);
    for event in ceremony.drain_events() {
        log::info!("[{:.3}s] {:?}", ceremony.clock(), event);
    }
    log::info!("Ribbon re-tied, state {:?}", ceremony.state());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm
}
