//! Seam between the lifecycle coordinator and whatever draws the HUD.
//!
//! The coordinator decides *what* is on screen and how opaque it is; a
//! `HudView` decides how that looks. Ring drawing, gradients, layout math and
//! image loading all live behind this trait.

use serde::{Deserialize, Serialize};

use crate::config::{Offset, Size};
use crate::style::{AnimationType, Color, MaskBehavior, Palette};

/// An icon the view knows how to draw. Terminals draw the glyph as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HudImage {
    glyph: String,
}

impl HudImage {
    pub fn new(glyph: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
        }
    }

    pub fn glyph(&self) -> &str {
        &self.glyph
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Indicator {
    /// Unbounded spinner.
    Spinner { animation: AnimationType },
    /// Determinate ring, `progress` in `0.0..=1.0`.
    Ring { progress: f32 },
    /// Static icon. `tint` is `None` when images keep their own colors.
    Icon { image: HudImage, tint: Option<Color> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingMetrics {
    pub radius: f32,
    pub thickness: f32,
}

/// Everything inside the card for the current presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub indicator: Indicator,
    pub status: Option<String>,
    pub palette: Palette,
    pub ring: RingMetrics,
    pub minimum_size: Size,
    pub image_size: Size,
    pub corner_radius: f32,
    pub border: Option<(Color, f32)>,
}

/// Fade state of the whole overlay at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub opacity: f32,
    pub scale: f32,
    pub mask: MaskBehavior,
    /// Modal overlays swallow input and announce themselves to assistive tech.
    pub modal: bool,
    pub accessibility_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachTarget {
    Container(String),
    /// Front-most visible key window whose level is at most `max_level`.
    FrontWindow { max_level: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub offset: Offset,
    pub keyboard_height: f32,
    pub motion_effects: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticEvent {
    Prepare,
    Notify(FeedbackKind),
}

/// Visual content provider. Every call happens on the coordinator thread.
pub trait HudView: Send {
    /// Attach the overlay to `target`, or bring it to front if already attached.
    fn attach(&mut self, target: &AttachTarget);

    /// Remove every overlay layer from its parent.
    fn detach(&mut self);

    fn present(&mut self, content: &Content);

    fn apply(&mut self, appearance: &Appearance);

    fn reposition(&mut self, placement: &Placement);

    /// Stop spinner and ring animations.
    fn cancel_animations(&mut self);

    /// Whether a touch at `(x, y)` lands on the content card.
    fn card_contains(&self, x: f32, y: f32) -> bool;

    fn haptic(&mut self, _event: HapticEvent) {}

    /// Runtime wake-up while attached; lets views step spinner frames.
    fn tick(&mut self) {}
}

/// A view that draws nothing. Useful headless and before a real surface exists.
#[derive(Debug, Default)]
pub struct NullView;

impl HudView for NullView {
    fn attach(&mut self, _target: &AttachTarget) {}

    fn detach(&mut self) {}

    fn present(&mut self, _content: &Content) {}

    fn apply(&mut self, _appearance: &Appearance) {}

    fn reposition(&mut self, _placement: &Placement) {}

    fn cancel_animations(&mut self) {}

    fn card_contains(&self, _x: f32, _y: f32) -> bool {
        false
    }
}
