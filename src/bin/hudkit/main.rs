//! hudkit demo entrypoint: plays a HUD scenario in the terminal.
//!
//! # Architecture
//!
//! - Coordinator thread: owns the HUD state and the ratatui view
//! - Input thread: turns keys and mouse clicks into quit/touch/resize
//! - Main thread: walks the scenario steps and waits between them

mod cli;
mod input;
mod scenario;
mod terminal_view;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use hudkit::telemetry::init_tracing;
use hudkit::terminal_restore::TerminalGuard;
use hudkit::{spawn_hud, HudEvent};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cli::HudkitArgs;
use crate::input::spawn_input_thread;
use crate::scenario::{Outcome, Scenario};
use crate::terminal_view::TerminalView;

fn main() -> Result<()> {
    let args = HudkitArgs::parse();
    if let Some(path) = init_tracing(args.logs, args.no_logs) {
        tracing::info!(log = %path.display(), "hudkit started");
    }

    let scenario = match args.scenario.as_deref() {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin()?,
    };
    let mut config = scenario.config.clone();
    args.apply_to(&mut config);
    config.validate()?;

    let events = run_scenario(&scenario, config, args.events_json)?;
    for event in events {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

/// Everything that needs the terminal in fullscreen mode. The guard restores
/// it before any event lines are printed.
fn run_scenario(
    scenario: &Scenario,
    config: hudkit::HudConfig,
    record_events: bool,
) -> Result<Vec<HudEvent>> {
    let guard = TerminalGuard::new();
    let mut stdout = io::stdout();
    guard
        .enter_fullscreen(&mut stdout)
        .context("failed to set up terminal")?;

    let view = TerminalView::new().context("failed to open terminal view")?;
    let hud = spawn_hud(view, config)?;
    let subscription = record_events.then(|| hud.subscribe());

    let (quit_tx, quit_rx) = unbounded();
    let stop = Arc::new(AtomicBool::new(false));
    let input = spawn_input_thread(hud.clone(), quit_tx, Arc::clone(&stop));

    let outcome = scenario.run(&hud, &quit_rx);
    tracing::info!(?outcome, "scenario ended");
    if outcome == Outcome::Quit {
        hud.dismiss();
    }

    stop.store(true, Ordering::Relaxed);
    let _ = input.join();
    hud.shutdown()?;
    guard.restore();

    Ok(subscription.map(|sub| sub.drain()).unwrap_or_default())
}
