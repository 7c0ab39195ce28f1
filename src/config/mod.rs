//! HUD configuration: the tunables every show reads, plus the setters that change them.

mod defaults;
mod validation;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::style::{AnimationType, Color, HudStyle, MaskType};
use crate::view::HudImage;
use defaults::{MAX_DISMISS_MS, MAX_FADE_MS, MAX_GRACE_MS};
use validation::clamp_duration;

pub use defaults::{
    DEFAULT_CORNER_RADIUS, DEFAULT_ERROR_GLYPH, DEFAULT_FADE_IN_MS, DEFAULT_FADE_OUT_MS,
    DEFAULT_IMAGE_SIZE, DEFAULT_INFO_GLYPH, DEFAULT_MAX_DISMISS, DEFAULT_MIN_DISMISS_MS,
    DEFAULT_RING_NO_TEXT_RADIUS, DEFAULT_RING_RADIUS, DEFAULT_RING_THICKNESS,
    DEFAULT_SUCCESS_GLYPH,
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub horizontal: f32,
    pub vertical: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Every knob the coordinator reads when a presentation starts.
///
/// Deserializes with defaults for missing fields; durations are written in
/// milliseconds (`grace_time_ms`, `fade_in_ms`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub default_mask_type: MaskType,
    pub default_style: HudStyle,
    pub default_animation_type: AnimationType,
    /// Host container id; `None` attaches to the front-most eligible window.
    pub container: Option<String>,
    pub minimum_size: Size,
    pub ring_thickness: f32,
    pub ring_radius: f32,
    pub ring_no_text_radius: f32,
    pub corner_radius: f32,
    pub foreground_color: Color,
    pub foreground_image_color: Option<Color>,
    pub background_color: Color,
    pub background_layer_color: Color,
    pub border_color: Option<Color>,
    pub border_width: f32,
    pub image_view_size: Size,
    pub should_tint_images: bool,
    pub info_image: HudImage,
    pub success_image: HudImage,
    pub error_image: HudImage,
    #[serde(rename = "grace_time_ms", with = "millis")]
    pub grace_time_interval: Duration,
    #[serde(rename = "minimum_dismiss_ms", with = "millis")]
    pub minimum_dismiss_time_interval: Duration,
    #[serde(rename = "maximum_dismiss_ms", with = "millis")]
    pub maximum_dismiss_time_interval: Duration,
    #[serde(rename = "fade_in_ms", with = "millis")]
    pub fade_in_duration: Duration,
    #[serde(rename = "fade_out_ms", with = "millis")]
    pub fade_out_duration: Duration,
    pub offset_from_center: Offset,
    pub max_supported_window_level: i32,
    pub haptics_enabled: bool,
    pub motion_effect_enabled: bool,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            default_mask_type: MaskType::None,
            default_style: HudStyle::Light,
            default_animation_type: AnimationType::Flat,
            container: None,
            minimum_size: Size::default(),
            ring_thickness: DEFAULT_RING_THICKNESS,
            ring_radius: DEFAULT_RING_RADIUS,
            ring_no_text_radius: DEFAULT_RING_NO_TEXT_RADIUS,
            corner_radius: DEFAULT_CORNER_RADIUS,
            foreground_color: Color::WHITE,
            foreground_image_color: None,
            background_color: Color::CLEAR,
            background_layer_color: Color::white(0.0, 0.4),
            border_color: None,
            border_width: 0.0,
            image_view_size: Size::new(DEFAULT_IMAGE_SIZE, DEFAULT_IMAGE_SIZE),
            should_tint_images: true,
            info_image: HudImage::new(DEFAULT_INFO_GLYPH),
            success_image: HudImage::new(DEFAULT_SUCCESS_GLYPH),
            error_image: HudImage::new(DEFAULT_ERROR_GLYPH),
            grace_time_interval: Duration::ZERO,
            minimum_dismiss_time_interval: Duration::from_millis(DEFAULT_MIN_DISMISS_MS),
            maximum_dismiss_time_interval: DEFAULT_MAX_DISMISS,
            fade_in_duration: Duration::from_millis(DEFAULT_FADE_IN_MS),
            fade_out_duration: Duration::from_millis(DEFAULT_FADE_OUT_MS),
            offset_from_center: Offset::default(),
            max_supported_window_level: 0,
            haptics_enabled: false,
            motion_effect_enabled: true,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// One setter call. Applied on the coordinator thread in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    DefaultMaskType(MaskType),
    DefaultStyle(HudStyle),
    DefaultAnimationType(AnimationType),
    Container(Option<String>),
    MinimumSize(Size),
    RingThickness(f32),
    RingRadius(f32),
    RingNoTextRadius(f32),
    CornerRadius(f32),
    ForegroundColor(Color),
    ForegroundImageColor(Color),
    BackgroundColor(Color),
    BackgroundLayerColor(Color),
    BorderColor(Color),
    BorderWidth(f32),
    ImageViewSize(Size),
    ShouldTintImages(bool),
    InfoImage(HudImage),
    SuccessImage(HudImage),
    ErrorImage(HudImage),
    GraceTimeInterval(Duration),
    MinimumDismissTimeInterval(Duration),
    MaximumDismissTimeInterval(Duration),
    FadeInDuration(Duration),
    FadeOutDuration(Duration),
    OffsetFromCenter(Offset),
    MaxSupportedWindowLevel(i32),
    HapticsEnabled(bool),
    MotionEffectEnabled(bool),
}

impl HudConfig {
    pub fn apply(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::DefaultMaskType(mask) => self.default_mask_type = mask,
            ConfigUpdate::DefaultStyle(style) => self.default_style = style,
            ConfigUpdate::DefaultAnimationType(kind) => self.default_animation_type = kind,
            ConfigUpdate::Container(container) => self.container = container,
            ConfigUpdate::MinimumSize(size) => self.minimum_size = size,
            ConfigUpdate::RingThickness(value) => self.ring_thickness = value,
            ConfigUpdate::RingRadius(value) => self.ring_radius = value,
            ConfigUpdate::RingNoTextRadius(value) => self.ring_no_text_radius = value,
            ConfigUpdate::CornerRadius(value) => self.corner_radius = value,
            // Explicit colors only make sense with the custom style.
            ConfigUpdate::ForegroundColor(color) => {
                self.foreground_color = color;
                self.default_style = HudStyle::Custom;
            }
            ConfigUpdate::ForegroundImageColor(color) => {
                self.foreground_image_color = Some(color);
                self.default_style = HudStyle::Custom;
            }
            ConfigUpdate::BackgroundColor(color) => {
                self.background_color = color;
                self.default_style = HudStyle::Custom;
            }
            ConfigUpdate::BackgroundLayerColor(color) => self.background_layer_color = color,
            ConfigUpdate::BorderColor(color) => self.border_color = Some(color),
            ConfigUpdate::BorderWidth(width) => self.border_width = width,
            ConfigUpdate::ImageViewSize(size) => self.image_view_size = size,
            ConfigUpdate::ShouldTintImages(tint) => self.should_tint_images = tint,
            ConfigUpdate::InfoImage(image) => self.info_image = image,
            ConfigUpdate::SuccessImage(image) => self.success_image = image,
            ConfigUpdate::ErrorImage(image) => self.error_image = image,
            ConfigUpdate::GraceTimeInterval(interval) => {
                self.grace_time_interval =
                    clamp_duration(interval, MAX_GRACE_MS, "grace_time_interval")
            }
            ConfigUpdate::MinimumDismissTimeInterval(interval) => {
                self.minimum_dismiss_time_interval =
                    clamp_duration(interval, MAX_DISMISS_MS, "minimum_dismiss_time_interval")
            }
            ConfigUpdate::MaximumDismissTimeInterval(interval) if interval.is_zero() => {
                tracing::warn!("maximum_dismiss_time_interval of zero ignored");
            }
            ConfigUpdate::MaximumDismissTimeInterval(interval) => {
                self.maximum_dismiss_time_interval =
                    clamp_duration(interval, MAX_DISMISS_MS, "maximum_dismiss_time_interval")
            }
            ConfigUpdate::FadeInDuration(duration) => {
                self.fade_in_duration = clamp_duration(duration, MAX_FADE_MS, "fade_in_duration")
            }
            ConfigUpdate::FadeOutDuration(duration) => {
                self.fade_out_duration = clamp_duration(duration, MAX_FADE_MS, "fade_out_duration")
            }
            ConfigUpdate::OffsetFromCenter(offset) => self.offset_from_center = offset,
            ConfigUpdate::MaxSupportedWindowLevel(level) => {
                self.max_supported_window_level = level
            }
            ConfigUpdate::HapticsEnabled(enabled) => self.haptics_enabled = enabled,
            ConfigUpdate::MotionEffectEnabled(enabled) => self.motion_effect_enabled = enabled,
        }
    }
}
