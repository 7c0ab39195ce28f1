//! Style and mask resolution so every presentation derives its colors from one place.
//!
//! Both resolvers are pure: they read a config snapshot and return concrete
//! values, they never touch coordinator state.

use serde::{Deserialize, Serialize};

use crate::config::HudConfig;

/// Background dimming and interaction behavior behind the HUD card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskType {
    /// Allow interaction with the content behind the HUD.
    #[default]
    None,
    /// Block interaction, no dimming.
    Clear,
    /// Block interaction and dim with translucent black.
    Black,
    /// Block interaction and dim with a radial gradient.
    Gradient,
    /// Block interaction and dim with `background_layer_color`.
    Custom,
}

impl MaskType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "clear" => Some(Self::Clear),
            "black" => Some(Self::Black),
            "gradient" => Some(Self::Gradient),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Card color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HudStyle {
    /// Black text on a white card.
    #[default]
    Light,
    /// White text on a black card.
    Dark,
    /// Uses the configured foreground and background colors.
    Custom,
}

impl HudStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Which spinner the indeterminate mode uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationType {
    /// Custom flat ring.
    #[default]
    Flat,
    /// Platform activity indicator.
    Native,
}

impl AnimationType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "flat" => Some(Self::Flat),
            "native" => Some(Self::Native),
            _ => None,
        }
    }
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white(white: f32, alpha: f32) -> Self {
        Self::rgba(white, white, white, alpha)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |idx: usize| -> Option<f32> {
            u8::from_str_radix(&hex[idx..idx + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        let a = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// 8-bit RGB, alpha dropped.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (quantize(self.r), quantize(self.g), quantize(self.b))
    }
}

/// Concrete colors for one presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub foreground: Color,
    pub image_tint: Color,
    pub card_background: Color,
    pub ring_background: Color,
    /// Non-custom styles get the platform blur; terminals ignore it.
    pub blurred: bool,
}

/// Concrete background-layer behavior for one presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskBehavior {
    PassThrough,
    Transparent,
    Solid(Color),
    RadialGradient { inner: Color, outer: Color },
}

impl MaskBehavior {
    /// Every mask except pass-through swallows touches and makes the HUD modal.
    pub fn blocks_interaction(&self) -> bool {
        !matches!(self, Self::PassThrough)
    }
}

const CARD_BLUR_ALPHA: f32 = 0.6;
const RING_BACKGROUND_ALPHA: f32 = 0.1;
const BLACK_MASK_ALPHA: f32 = 0.4;
const GRADIENT_OUTER_ALPHA: f32 = 0.75;

pub fn resolve_palette(style: HudStyle, config: &HudConfig) -> Palette {
    let (foreground, background) = match style {
        HudStyle::Light => (Color::BLACK, Color::WHITE),
        HudStyle::Dark => (Color::WHITE, Color::BLACK),
        HudStyle::Custom => (config.foreground_color, config.background_color),
    };
    let image_tint = config.foreground_image_color.unwrap_or(foreground);
    let blurred = style != HudStyle::Custom;
    let card_background = if blurred {
        background.with_alpha(CARD_BLUR_ALPHA)
    } else {
        background
    };
    Palette {
        foreground,
        image_tint,
        card_background,
        ring_background: image_tint.with_alpha(RING_BACKGROUND_ALPHA),
        blurred,
    }
}

pub fn resolve_mask(mask: MaskType, config: &HudConfig) -> MaskBehavior {
    match mask {
        MaskType::None => MaskBehavior::PassThrough,
        MaskType::Clear => MaskBehavior::Transparent,
        MaskType::Black => MaskBehavior::Solid(Color::white(0.0, BLACK_MASK_ALPHA)),
        MaskType::Gradient => MaskBehavior::RadialGradient {
            inner: Color::CLEAR,
            outer: Color::white(0.0, GRADIENT_OUTER_ALPHA),
        },
        MaskType::Custom => MaskBehavior::Solid(config.background_layer_color),
    }
}
