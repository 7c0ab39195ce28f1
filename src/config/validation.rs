use super::defaults::{MAX_DISMISS_MS, MAX_FADE_MS, MAX_GRACE_MS, MAX_RING_RADIUS};
use super::{HudConfig, Size};
use crate::style::Color;
use anyhow::{bail, Result};
use std::time::Duration;

impl HudConfig {
    /// Reject values no renderer can honor. Callers validate once after
    /// building the config from CLI flags or a scenario file.
    pub fn validate(&self) -> Result<()> {
        check_duration(self.fade_in_duration, MAX_FADE_MS, "fade_in_duration")?;
        check_duration(self.fade_out_duration, MAX_FADE_MS, "fade_out_duration")?;
        check_duration(
            self.grace_time_interval,
            MAX_GRACE_MS,
            "grace_time_interval",
        )?;

        check_duration(
            self.minimum_dismiss_time_interval,
            MAX_DISMISS_MS,
            "minimum_dismiss_time_interval",
        )?;
        check_duration(
            self.maximum_dismiss_time_interval,
            MAX_DISMISS_MS,
            "maximum_dismiss_time_interval",
        )?;
        if self.maximum_dismiss_time_interval.is_zero() {
            bail!("maximum_dismiss_time_interval must be greater than zero");
        }

        for (value, field) in [
            (self.ring_radius, "ring_radius"),
            (self.ring_no_text_radius, "ring_no_text_radius"),
        ] {
            if !(value > 0.0 && value <= MAX_RING_RADIUS) {
                bail!("{field} must be between 0 (exclusive) and {MAX_RING_RADIUS}, got {value}");
            }
        }
        if !(self.ring_thickness > 0.0 && self.ring_thickness <= self.ring_no_text_radius) {
            bail!(
                "ring_thickness must be positive and at most ring_no_text_radius ({}), got {}",
                self.ring_no_text_radius,
                self.ring_thickness
            );
        }
        if !(self.corner_radius >= 0.0 && self.border_width >= 0.0) {
            bail!("corner_radius and border_width must not be negative");
        }

        check_size(self.minimum_size, "minimum_size")?;
        check_size(self.image_view_size, "image_view_size")?;

        let colors = [
            (Some(self.foreground_color), "foreground_color"),
            (self.foreground_image_color, "foreground_image_color"),
            (Some(self.background_color), "background_color"),
            (Some(self.background_layer_color), "background_layer_color"),
            (self.border_color, "border_color"),
        ];
        for (color, field) in colors {
            if let Some(color) = color {
                check_color(color, field)?;
            }
        }

        if let Some(container) = self.container.as_deref() {
            if container.trim().is_empty() {
                bail!("container id must not be blank");
            }
        }
        Ok(())
    }
}

/// Setter-time counterpart of `check_duration`: out-of-range values are
/// clamped instead of rejected, since setters have no error path.
pub(super) fn clamp_duration(value: Duration, max_ms: u64, field: &str) -> Duration {
    let max = Duration::from_millis(max_ms);
    if value > max {
        tracing::warn!(
            field,
            requested_ms = %value.as_millis(),
            max_ms,
            "duration out of range; clamped"
        );
        return max;
    }
    value
}

fn check_duration(value: Duration, max_ms: u64, field: &str) -> Result<()> {
    if value > Duration::from_millis(max_ms) {
        bail!(
            "{field} must be at most {max_ms} ms, got {} ms",
            value.as_millis()
        );
    }
    Ok(())
}

fn check_size(size: Size, field: &str) -> Result<()> {
    if !(size.width >= 0.0 && size.height >= 0.0) {
        bail!(
            "{field} must not be negative, got {}x{}",
            size.width,
            size.height
        );
    }
    Ok(())
}

fn check_color(color: Color, field: &str) -> Result<()> {
    let in_range = |v: f32| (0.0..=1.0).contains(&v);
    if !(in_range(color.r) && in_range(color.g) && in_range(color.b) && in_range(color.a)) {
        bail!("{field} components must be within 0.0..=1.0, got {color:?}");
    }
    Ok(())
}
