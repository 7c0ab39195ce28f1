//! YAML-scripted HUD sessions.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use hudkit::{HudConfig, HudHandle, HudStyle, MaskType};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

const WALKTHROUGH: &str = include_str!("walkthrough.yaml");
/// How long to wait for the last presentation to fade after the final step.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);
const SETTLE_POLL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) config: HudConfig,
    pub(crate) steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Step {
    /// Indeterminate spinner; `~` for no status.
    Show(Option<String>),
    Progress {
        value: f32,
        #[serde(default)]
        status: Option<String>,
    },
    Info(String),
    Success(String),
    Error(String),
    Status(String),
    Pop,
    Dismiss,
    DismissAfterMs(u64),
    WaitMs(u64),
    Mask(MaskType),
    Style(HudStyle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Finished,
    Quit,
}

impl Scenario {
    pub(crate) fn builtin() -> Result<Self> {
        Self::parse(WALKTHROUGH).context("built-in walkthrough is malformed")
    }

    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid scenario {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Play every step, then wait for the HUD to go away. Stops early on quit.
    pub(crate) fn run(&self, hud: &HudHandle, quit: &Receiver<()>) -> Outcome {
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, ?step, "scenario step");
            if let Some(wait) = apply_step(hud, step) {
                if quit.recv_timeout(wait).is_ok() {
                    return Outcome::Quit;
                }
            } else if quit.try_recv().is_ok() {
                return Outcome::Quit;
            }
        }
        settle(hud, quit)
    }
}

/// Send one step to the HUD. Returns how long to pause afterwards.
fn apply_step(hud: &HudHandle, step: &Step) -> Option<Duration> {
    match step {
        Step::Show(status) => hud.show_with_status(status.clone()),
        Step::Progress { value, status } => hud.show_progress(*value, status.clone()),
        Step::Info(status) => hud.show_info(status.as_str()),
        Step::Success(status) => hud.show_success(status.as_str()),
        Step::Error(status) => hud.show_error(status.as_str()),
        Step::Status(status) => hud.set_status(status.as_str()),
        Step::Pop => hud.pop_activity(),
        Step::Dismiss => hud.dismiss(),
        Step::DismissAfterMs(ms) => hud.dismiss_with_delay(Duration::from_millis(*ms), None),
        Step::WaitMs(ms) => return Some(Duration::from_millis(*ms)),
        Step::Mask(mask) => hud.set_default_mask_type(*mask),
        Step::Style(style) => hud.set_default_style(*style),
    }
    None
}

fn settle(hud: &HudHandle, quit: &Receiver<()>) -> Outcome {
    let started = Instant::now();
    // Give the coordinator a moment to pick up the last request.
    if quit.recv_timeout(Duration::from_millis(SETTLE_POLL_MS)).is_ok() {
        return Outcome::Quit;
    }
    while hud.is_on_screen() && started.elapsed() < SETTLE_TIMEOUT {
        if quit
            .recv_timeout(Duration::from_millis(SETTLE_POLL_MS))
            .is_ok()
        {
            return Outcome::Quit;
        }
    }
    Outcome::Finished
}
