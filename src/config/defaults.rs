use std::time::Duration;

pub const DEFAULT_FADE_IN_MS: u64 = 150;
pub const DEFAULT_FADE_OUT_MS: u64 = 150;
pub const DEFAULT_MIN_DISMISS_MS: u64 = 5_000;
/// Stand-in for "no upper bound" that still fits an `Instant` addition.
pub const DEFAULT_MAX_DISMISS: Duration = Duration::from_secs(60 * 60 * 24 * 365);

pub const DEFAULT_RING_THICKNESS: f32 = 2.0;
pub const DEFAULT_RING_RADIUS: f32 = 18.0;
pub const DEFAULT_RING_NO_TEXT_RADIUS: f32 = 24.0;
pub const DEFAULT_CORNER_RADIUS: f32 = 14.0;
pub const DEFAULT_IMAGE_SIZE: f32 = 28.0;

pub const DEFAULT_INFO_GLYPH: &str = "ℹ";
pub const DEFAULT_SUCCESS_GLYPH: &str = "✔";
pub const DEFAULT_ERROR_GLYPH: &str = "✖";

pub(super) const MAX_FADE_MS: u64 = 10_000;
pub(super) const MAX_GRACE_MS: u64 = 60_000;
pub(super) const MAX_DISMISS_MS: u64 = 60 * 60 * 24 * 365 * 1_000;
pub(super) const MAX_RING_RADIUS: f32 = 200.0;
