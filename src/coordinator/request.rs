use std::fmt;
use std::time::Duration;

use crate::config::ConfigUpdate;
use crate::style::MaskType;
use crate::view::{FeedbackKind, HudImage};

/// Runs once, after the HUD has fully disappeared.
pub type DismissCompletion = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Info,
    Success,
    Error,
    Custom(HudImage),
}

impl ImageSource {
    pub(crate) fn feedback(&self) -> Option<FeedbackKind> {
        match self {
            Self::Info => Some(FeedbackKind::Warning),
            Self::Success => Some(FeedbackKind::Success),
            Self::Error => Some(FeedbackKind::Error),
            Self::Custom(_) => None,
        }
    }
}

/// Things the host environment reports that move the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvironmentSignal {
    /// Orientation or surface size changed.
    Resized,
    KeyboardShown { height: f32 },
    KeyboardHidden,
    Foreground,
}

pub enum HudRequest {
    /// `progress: None` (or negative) is indeterminate.
    Show {
        progress: Option<f32>,
        status: Option<String>,
        mask: Option<MaskType>,
    },
    ShowImage {
        image: ImageSource,
        status: Option<String>,
        mask: Option<MaskType>,
    },
    SetStatus(String),
    PopActivity,
    Dismiss {
        delay: Duration,
        completion: Option<DismissCompletion>,
    },
    Configure(ConfigUpdate),
    Environment(EnvironmentSignal),
    Touch {
        x: f32,
        y: f32,
    },
}

impl fmt::Debug for HudRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show {
                progress,
                status,
                mask,
            } => f
                .debug_struct("Show")
                .field("progress", progress)
                .field("status", status)
                .field("mask", mask)
                .finish(),
            Self::ShowImage {
                image,
                status,
                mask,
            } => f
                .debug_struct("ShowImage")
                .field("image", image)
                .field("status", status)
                .field("mask", mask)
                .finish(),
            Self::SetStatus(text) => f.debug_tuple("SetStatus").field(text).finish(),
            Self::PopActivity => f.write_str("PopActivity"),
            Self::Dismiss { delay, completion } => f
                .debug_struct("Dismiss")
                .field("delay", delay)
                .field("has_completion", &completion.is_some())
                .finish(),
            Self::Configure(update) => f.debug_tuple("Configure").field(update).finish(),
            Self::Environment(signal) => f.debug_tuple("Environment").field(signal).finish(),
            Self::Touch { x, y } => f.debug_struct("Touch").field("x", x).field("y", y).finish(),
        }
    }
}
