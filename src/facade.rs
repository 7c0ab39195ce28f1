//! Process-wide HUD for callers that don't want to pass a handle around.
//!
//! Free functions forward to the installed runtime. Before `init` (or after
//! `teardown`) they log and do nothing.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::config::{HudConfig, Offset, Size};
use crate::coordinator::{DismissCompletion, ImageSource};
use crate::events::{Subscription, SubscriptionId};
use crate::lock_or_recover;
use crate::runtime::{spawn_hud, HudHandle};
use crate::style::{AnimationType, Color, HudStyle, MaskType};
use crate::view::{HudImage, HudView};

static SHARED: Mutex<Option<HudHandle>> = Mutex::new(None);

/// Install the shared HUD. Fails if one is already running.
pub fn init<V>(view: V, config: HudConfig) -> Result<()>
where
    V: HudView + 'static,
{
    let mut shared = lock_or_recover(&SHARED, "facade init");
    if shared.is_some() {
        bail!("shared HUD is already initialized");
    }
    *shared = Some(spawn_hud(view, config)?);
    Ok(())
}

/// Stop and remove the shared HUD, if any.
pub fn teardown() -> Result<()> {
    let handle = lock_or_recover(&SHARED, "facade teardown").take();
    match handle {
        Some(handle) => handle.shutdown(),
        None => Ok(()),
    }
}

/// Public API: lets hosts call `init` lazily without tripping its
/// already-initialized error.
pub fn is_initialized() -> bool {
    lock_or_recover(&SHARED, "facade is_initialized").is_some()
}

/// Clone of the shared handle, for the setters and anything not wrapped here.
pub fn handle() -> Option<HudHandle> {
    lock_or_recover(&SHARED, "facade handle").clone()
}

fn with_handle<R>(op: &str, f: impl FnOnce(&HudHandle) -> R) -> Option<R> {
    let handle = handle();
    if handle.is_none() {
        tracing::warn!(op, "shared HUD not initialized; call ignored");
    }
    handle.as_ref().map(f)
}

pub fn show() {
    with_handle("show", HudHandle::show);
}

pub fn show_with_status(status: Option<&str>) {
    with_handle("show_with_status", |hud| hud.show_with_status(status));
}

pub fn show_with_mask(status: Option<&str>, mask: MaskType) {
    with_handle("show_with_mask", |hud| hud.show_with_mask(status, mask));
}

pub fn show_progress(progress: f32, status: Option<&str>) {
    with_handle("show_progress", |hud| hud.show_progress(progress, status));
}

pub fn show_info(status: &str) {
    with_handle("show_info", |hud| hud.show_info(status));
}

pub fn show_success(status: &str) {
    with_handle("show_success", |hud| hud.show_success(status));
}

pub fn show_error(status: &str) {
    with_handle("show_error", |hud| hud.show_error(status));
}

pub fn show_image(image: ImageSource, status: Option<String>, mask: Option<MaskType>) {
    with_handle("show_image", |hud| hud.show_image(image, status, mask));
}

pub fn set_status(status: &str) {
    with_handle("set_status", |hud| hud.set_status(status));
}

pub fn pop_activity() {
    with_handle("pop_activity", HudHandle::pop_activity);
}

pub fn dismiss() {
    with_handle("dismiss", HudHandle::dismiss);
}

pub fn dismiss_with_completion(completion: impl FnOnce() + Send + 'static) {
    dismiss_with_delay(Duration::ZERO, Some(Box::new(completion)));
}

/// Without a shared HUD the completion runs immediately, since nothing is showing.
pub fn dismiss_with_delay(delay: Duration, completion: Option<DismissCompletion>) {
    match handle() {
        Some(hud) => hud.dismiss_with_delay(delay, completion),
        None => {
            tracing::warn!(op = "dismiss_with_delay", "shared HUD not initialized");
            if let Some(completion) = completion {
                completion();
            }
        }
    }
}

macro_rules! forward_setters {
    ($($name:ident($ty:ty);)*) => {
        $(
            pub fn $name(value: $ty) {
                with_handle(stringify!($name), |hud| hud.$name(value));
            }
        )*
    };
}

forward_setters! {
    set_default_mask_type(MaskType);
    set_default_style(HudStyle);
    set_default_animation_type(AnimationType);
    set_container(Option<String>);
    set_minimum_size(Size);
    set_ring_thickness(f32);
    set_ring_radius(f32);
    set_ring_no_text_radius(f32);
    set_corner_radius(f32);
    set_foreground_color(Color);
    set_foreground_image_color(Color);
    set_background_color(Color);
    set_background_layer_color(Color);
    set_border_color(Color);
    set_border_width(f32);
    set_image_view_size(Size);
    set_should_tint_images(bool);
    set_info_image(HudImage);
    set_success_image(HudImage);
    set_error_image(HudImage);
    set_grace_time_interval(Duration);
    set_minimum_dismiss_time_interval(Duration);
    set_maximum_dismiss_time_interval(Duration);
    set_fade_in_duration(Duration);
    set_fade_out_duration(Duration);
    set_offset_from_center(Offset);
    set_max_supported_window_level(i32);
    set_haptics_enabled(bool);
    set_motion_effect_enabled(bool);
}

pub fn reset_offset_from_center() {
    with_handle("reset_offset_from_center", HudHandle::reset_offset_from_center);
}

pub fn is_visible() -> bool {
    with_handle("is_visible", HudHandle::is_visible).unwrap_or(false)
}

pub fn subscribe() -> Option<Subscription> {
    with_handle("subscribe", HudHandle::subscribe)
}

pub fn unsubscribe(id: SubscriptionId) -> bool {
    with_handle("unsubscribe", |hud| hud.unsubscribe(id)).unwrap_or(false)
}
