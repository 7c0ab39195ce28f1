use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use hudkit::{HudConfig, HudStyle, MaskType};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "hudkit",
    about = "hudkit: terminal progress HUD with a scriptable lifecycle demo",
    author,
    version
)]
pub(crate) struct HudkitArgs {
    /// YAML scenario to play (defaults to the built-in walkthrough)
    #[arg(long, env = "HUDKIT_SCENARIO")]
    pub(crate) scenario: Option<PathBuf>,

    /// Card style: light, dark, custom
    #[arg(long, value_parser = parse_style)]
    pub(crate) style: Option<HudStyle>,

    /// Default mask: none, clear, black, gradient, custom
    #[arg(long, value_parser = parse_mask)]
    pub(crate) mask: Option<MaskType>,

    /// Delay before a show becomes visible (ms)
    #[arg(long = "grace-ms")]
    pub(crate) grace_ms: Option<u64>,

    /// Fade-in duration (ms)
    #[arg(long = "fade-in-ms")]
    pub(crate) fade_in_ms: Option<u64>,

    /// Fade-out duration (ms)
    #[arg(long = "fade-out-ms")]
    pub(crate) fade_out_ms: Option<u64>,

    /// Shortest time a success/info/error HUD stays up (ms)
    #[arg(long = "min-dismiss-ms")]
    pub(crate) min_dismiss_ms: Option<u64>,

    /// Print every lifecycle notification as a JSON line after exit
    #[arg(long = "events-json", default_value_t = false)]
    pub(crate) events_json: bool,

    /// Write JSON trace logs (see HUDKIT_TRACE_LOG)
    #[arg(long, env = "HUDKIT_LOGS", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub(crate) logs: bool,

    /// Disable trace logs even if --logs is set
    #[arg(long = "no-logs", env = "HUDKIT_NO_LOGS", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub(crate) no_logs: bool,
}

impl HudkitArgs {
    /// Command-line flags win over whatever the scenario configured.
    pub(crate) fn apply_to(&self, config: &mut HudConfig) {
        if let Some(style) = self.style {
            config.default_style = style;
        }
        if let Some(mask) = self.mask {
            config.default_mask_type = mask;
        }
        if let Some(ms) = self.grace_ms {
            config.grace_time_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.fade_in_ms {
            config.fade_in_duration = Duration::from_millis(ms);
        }
        if let Some(ms) = self.fade_out_ms {
            config.fade_out_duration = Duration::from_millis(ms);
        }
        if let Some(ms) = self.min_dismiss_ms {
            config.minimum_dismiss_time_interval = Duration::from_millis(ms);
        }
    }
}

fn parse_style(raw: &str) -> Result<HudStyle, String> {
    HudStyle::from_name(raw).ok_or_else(|| format!("unknown style '{raw}' (light, dark, custom)"))
}

fn parse_mask(raw: &str) -> Result<MaskType, String> {
    MaskType::from_name(raw)
        .ok_or_else(|| format!("unknown mask '{raw}' (none, clear, black, gradient, custom)"))
}
