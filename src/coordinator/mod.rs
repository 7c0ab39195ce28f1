//! HUD lifecycle state machine.
//!
//! `HudCoordinator` owns every piece of mutable HUD state: the activity
//! counter, both timer slots, the fade transition and the view. It never reads
//! the clock itself; callers pass `now` into every request and tick, which
//! keeps the whole lifecycle deterministic under test.
//!
//! Every deferred continuation (grace reveal, auto-dismiss, fade completion)
//! carries the generation it was started with and re-checks it before acting,
//! so a completion that outlived the request that scheduled it is a no-op.

mod fade;
mod request;
#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{HudConfig, Offset};
use crate::duration::display_duration;
use crate::events::{EventBus, HudEvent, HudEventKind};
use crate::style::{resolve_mask, resolve_palette, AnimationType, MaskBehavior, MaskType, Palette};
use crate::timer::TimerSlot;
use crate::view::{
    Appearance, AttachTarget, Content, HapticEvent, HudImage, HudView, Indicator, Placement,
    RingMetrics,
};

use fade::{FadeState, Transition, OVERSHOOT_SCALE};
pub use request::{DismissCompletion, EnvironmentSignal, HudRequest, ImageSource};

const DEFAULT_ACCESSIBILITY_LABEL: &str = "Loading";
/// Upper bound on deferred actions processed by a single `advance` call.
const MAX_STEPS_PER_ADVANCE: usize = 32;
/// Deadline used when `now + delay` does not fit in an `Instant`.
const FAR_DEADLINE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

#[derive(Debug, Clone, Copy)]
struct GraceReveal {
    show_serial: u64,
    dismiss_after: Option<Duration>,
}

/// Config values frozen when a show starts.
#[derive(Debug, Clone)]
struct PresentationStyle {
    mask: MaskBehavior,
    palette: Palette,
    animation: AnimationType,
    offset: Offset,
    fade_in: Duration,
    fade_out: Duration,
}

impl PresentationStyle {
    fn snapshot(config: &HudConfig, mask_override: Option<MaskType>) -> Self {
        let mask_type = mask_override.unwrap_or(config.default_mask_type);
        Self {
            mask: resolve_mask(mask_type, config),
            palette: resolve_palette(config.default_style, config),
            animation: config.default_animation_type,
            offset: config.offset_from_center,
            fade_in: config.fade_in_duration,
            fade_out: config.fade_out_duration,
        }
    }
}

pub struct HudCoordinator<V: HudView> {
    view: V,
    bus: EventBus,
    config: HudConfig,
    style: PresentationStyle,
    visible: Arc<AtomicBool>,
    on_screen: Arc<AtomicBool>,
    activity_count: u32,
    progress: Option<f32>,
    status: Option<String>,
    indicator: Option<Indicator>,
    attached: bool,
    observing: bool,
    keyboard_height: f32,
    fade: FadeState,
    generation: u64,
    show_serial: u64,
    grace_timer: TimerSlot<GraceReveal>,
    fade_out_timer: TimerSlot<()>,
    /// Auto-dismiss to arm once the running fade-in completes.
    dismiss_after_appear: Option<Duration>,
    completions: Vec<DismissCompletion>,
}

impl<V: HudView> HudCoordinator<V> {
    pub fn new(view: V, config: HudConfig, bus: EventBus) -> Self {
        let style = PresentationStyle::snapshot(&config, None);
        Self {
            view,
            bus,
            config,
            style,
            visible: Arc::new(AtomicBool::new(false)),
            on_screen: Arc::new(AtomicBool::new(false)),
            activity_count: 0,
            progress: None,
            status: None,
            indicator: None,
            attached: false,
            observing: false,
            keyboard_height: 0.0,
            fade: FadeState::Hidden,
            generation: 0,
            show_serial: 0,
            grace_timer: TimerSlot::new("grace"),
            fade_out_timer: TimerSlot::new("fade_out"),
            dismiss_after_appear: None,
            completions: Vec::new(),
        }
    }

    /// Shared flag mirroring `is_visible`, readable from other threads.
    pub fn visibility_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.visible)
    }

    /// Shared flag that stays set while anything is attached, pending or
    /// fading, so waiters can tell when the last `didDisappear` has gone out.
    pub fn on_screen_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.on_screen)
    }

    pub fn handle(&mut self, request: HudRequest, now: Instant) {
        tracing::debug!(?request, "hud request");
        match request {
            HudRequest::Show {
                progress,
                status,
                mask,
            } => self.show_progress(progress, status, mask, now),
            HudRequest::ShowImage {
                image,
                status,
                mask,
            } => self.show_image(image, status, mask, now),
            HudRequest::SetStatus(text) => self.set_status(text, now),
            HudRequest::PopActivity => self.pop_activity(now),
            HudRequest::Dismiss { delay, completion } => self.dismiss(delay, completion, now),
            HudRequest::Configure(update) => self.config.apply(update),
            HudRequest::Environment(signal) => self.on_environment(signal),
            HudRequest::Touch { x, y } => self.on_touch(x, y),
        }
        self.sync_visibility(now);
    }

    /// Run every deferred action due at or before `now`, oldest first, then
    /// push the current fade frame to the view.
    pub fn advance(&mut self, now: Instant) {
        for _ in 0..MAX_STEPS_PER_ADVANCE {
            if !self.step_due(now) {
                break;
            }
        }
        if let Some(transition) = self.fade.transition() {
            if now >= transition.starts_at {
                self.push_appearance(now);
            }
        }
        if self.attached {
            self.view.tick();
        }
        self.sync_visibility(now);
    }

    /// Earliest instant at which `advance` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.grace_timer.deadline(),
            self.fade_out_timer.deadline(),
            self.fade.transition().map(|t| t.ends_at),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// A fade is running (or about to start) and wants frames.
    pub fn is_animating(&self) -> bool {
        self.fade.transition().is_some()
    }

    /// When the current fade starts moving. Later than now during a delayed dismiss.
    pub fn fade_starts_at(&self) -> Option<Instant> {
        self.fade.transition().map(|t| t.starts_at)
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    pub fn is_on_screen(&self) -> bool {
        self.on_screen.load(Ordering::Relaxed)
    }

    pub fn activity_count(&self) -> u32 {
        self.activity_count
    }

    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn grace_pending(&self) -> bool {
        self.grace_timer.is_pending()
    }

    pub fn fade_out_pending(&self) -> bool {
        self.fade_out_timer.is_pending()
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        self.fade.opacity(now)
    }

    pub fn config(&self) -> &HudConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Drop everything in flight and detach. Pending dismiss completions are discarded.
    pub fn teardown(&mut self) {
        self.grace_timer.cancel();
        self.fade_out_timer.cancel();
        self.completions.clear();
        if self.attached {
            self.view.cancel_animations();
            self.view.detach();
            self.attached = false;
        }
        self.fade = FadeState::Hidden;
        self.observing = false;
        self.visible.store(false, Ordering::Relaxed);
        self.on_screen.store(false, Ordering::Relaxed);
    }

    fn show_progress(
        &mut self,
        progress: Option<f32>,
        status: Option<String>,
        mask: Option<MaskType>,
        now: Instant,
    ) {
        // A pending auto-dismiss means the previous sequence is over.
        if self.fade_out_timer.is_pending() {
            self.activity_count = 0;
        }
        self.fade_out_timer.cancel();
        self.grace_timer.cancel();
        self.begin_presentation(mask);
        self.status = normalize_status(status);

        match progress.filter(|value| *value >= 0.0) {
            Some(value) => {
                let value = value.min(1.0);
                self.progress = Some(value);
                self.set_indicator(Indicator::Ring { progress: value });
                if value == 0.0 {
                    self.activity_count += 1;
                }
            }
            None => {
                self.progress = None;
                self.set_indicator(Indicator::Spinner {
                    animation: self.style.animation,
                });
                self.activity_count += 1;
            }
        }
        self.present_content();
        self.reveal_or_defer(None, now);

        if self.config.haptics_enabled {
            self.view.haptic(HapticEvent::Prepare);
        }
    }

    fn show_image(
        &mut self,
        image: ImageSource,
        status: Option<String>,
        mask: Option<MaskType>,
        now: Instant,
    ) {
        let duration = display_duration(
            status.as_deref(),
            self.config.minimum_dismiss_time_interval,
            self.config.maximum_dismiss_time_interval,
        );
        self.fade_out_timer.cancel();
        self.grace_timer.cancel();
        self.begin_presentation(mask);

        self.progress = None;
        self.view.cancel_animations();
        let glyph = self.resolve_image(&image);
        let tint = self
            .config
            .should_tint_images
            .then_some(self.style.palette.image_tint);
        self.indicator = Some(Indicator::Icon { image: glyph, tint });
        self.status = normalize_status(status);
        self.present_content();
        self.reveal_or_defer(Some(duration), now);

        if self.config.haptics_enabled {
            if let Some(kind) = image.feedback() {
                self.view.haptic(HapticEvent::Notify(kind));
            }
        }
    }

    fn set_status(&mut self, text: String, now: Instant) {
        self.status = normalize_status(Some(text));
        if self.attached {
            self.present_content();
            self.push_appearance(now);
        }
    }

    fn pop_activity(&mut self, now: Instant) {
        self.activity_count = self.activity_count.saturating_sub(1);
        if self.activity_count == 0 {
            self.dismiss(Duration::ZERO, None, now);
        }
    }

    fn dismiss(&mut self, delay: Duration, completion: Option<DismissCompletion>, now: Instant) {
        self.grace_timer.cancel();
        self.activity_count = 0;
        self.dismiss_after_appear = None;

        match self.fade {
            FadeState::Hidden => {
                // Never revealed: a grace reveal was pending or nothing was up.
                if self.attached {
                    tracing::debug!("dismiss before reveal; detaching");
                    self.clear_indicator();
                    self.view.detach();
                    self.attached = false;
                }
                if let Some(completion) = completion {
                    completion();
                }
            }
            FadeState::FadingOut(_) => {
                tracing::debug!("dismiss joined in-flight dismissal");
                self.completions.extend(completion);
            }
            FadeState::Shown | FadeState::FadingIn(_) => {
                self.fade_out_timer.cancel();
                self.publish(HudEventKind::WillDisappear);
                self.completions.extend(completion);

                self.generation += 1;
                let starts_at = deadline_after(now, delay);
                let transition = Transition {
                    generation: self.generation,
                    from_opacity: self.fade.opacity(now),
                    to_opacity: 0.0,
                    from_scale: self.fade.scale(now),
                    to_scale: self.fade.scale(now) / OVERSHOOT_SCALE,
                    starts_at,
                    ends_at: deadline_after(starts_at, self.style.fade_out),
                };
                self.fade = FadeState::FadingOut(transition);
                if delay.is_zero() && self.style.fade_out.is_zero() {
                    self.complete_fade_out(transition.generation, now);
                }
            }
        }
    }

    fn reveal_or_defer(&mut self, dismiss_after: Option<Duration>, now: Instant) {
        let grace = self.config.grace_time_interval;
        if !grace.is_zero() && !self.fade.is_appearing() {
            self.grace_timer.arm(
                deadline_after(now, grace),
                GraceReveal {
                    show_serial: self.show_serial,
                    dismiss_after,
                },
            );
        } else {
            self.reveal(dismiss_after, now);
        }
    }

    fn reveal(&mut self, dismiss_after: Option<Duration>, now: Instant) {
        self.ensure_attached();
        self.present_content();
        self.reposition();

        match self.fade {
            FadeState::Shown => {
                if let Some(after) = dismiss_after {
                    self.fade_out_timer.arm(deadline_after(now, after), ());
                }
                self.push_appearance(now);
            }
            FadeState::FadingIn(_) => {
                // The newest show decides whether the appear ends in an auto-dismiss.
                self.dismiss_after_appear = dismiss_after;
                self.push_appearance(now);
            }
            FadeState::Hidden | FadeState::FadingOut(_) => {
                if !self.completions.is_empty() {
                    tracing::debug!(
                        dropped = self.completions.len(),
                        "show superseded dismissal"
                    );
                    self.completions.clear();
                }
                self.publish(HudEventKind::WillAppear);
                self.dismiss_after_appear = dismiss_after;

                self.generation += 1;
                let transition = Transition {
                    generation: self.generation,
                    from_opacity: self.fade.opacity(now),
                    to_opacity: 1.0,
                    from_scale: OVERSHOOT_SCALE,
                    to_scale: 1.0,
                    starts_at: now,
                    ends_at: deadline_after(now, self.style.fade_in),
                };
                self.fade = FadeState::FadingIn(transition);
                self.push_appearance(now);
                if self.style.fade_in.is_zero() {
                    self.complete_fade_in(transition.generation, now);
                }
            }
        }
    }

    fn complete_fade_in(&mut self, generation: u64, at: Instant) {
        let current = match self.fade {
            FadeState::FadingIn(t) if t.generation == generation => t,
            _ => {
                tracing::debug!(generation, "stale fade-in completion ignored");
                return;
            }
        };
        if current.to_opacity < 1.0 {
            return;
        }
        self.fade = FadeState::Shown;
        self.visible.store(true, Ordering::Relaxed);
        self.push_appearance(at);
        self.observing = true;
        self.publish(HudEventKind::DidAppear);
        if let Some(after) = self.dismiss_after_appear.take() {
            self.fade_out_timer.arm(deadline_after(at, after), ());
        }
    }

    fn complete_fade_out(&mut self, generation: u64, at: Instant) {
        let current = match self.fade {
            FadeState::FadingOut(t) if t.generation == generation => t,
            _ => {
                tracing::debug!(generation, "stale fade-out completion ignored");
                return;
            }
        };
        if current.to_opacity > 0.0 {
            return;
        }
        self.fade = FadeState::Hidden;
        self.visible.store(false, Ordering::Relaxed);
        self.push_appearance(at);

        // A grace reveal queued during the fade-out owns the view and content now.
        if !self.grace_timer.is_pending() {
            self.view.detach();
            self.attached = false;
            self.progress = None;
            self.clear_indicator();
        }
        self.observing = false;
        self.publish(HudEventKind::DidDisappear);
        for completion in self.completions.drain(..) {
            completion();
        }
    }

    fn on_grace(&mut self, reveal: GraceReveal, at: Instant) {
        if reveal.show_serial != self.show_serial {
            tracing::debug!("stale grace reveal ignored");
            return;
        }
        self.reveal(reveal.dismiss_after, at);
    }

    /// Handle the single earliest due action. Returns `false` when nothing is due.
    fn step_due(&mut self, now: Instant) -> bool {
        enum Due {
            Transition(u64, bool),
            Grace,
            FadeOut,
        }

        let mut candidates: Vec<(Instant, Due)> = Vec::with_capacity(3);
        match self.fade {
            FadeState::FadingIn(t) => candidates.push((t.ends_at, Due::Transition(t.generation, true))),
            FadeState::FadingOut(t) => {
                candidates.push((t.ends_at, Due::Transition(t.generation, false)))
            }
            FadeState::Hidden | FadeState::Shown => {}
        }
        if let Some(deadline) = self.grace_timer.deadline() {
            candidates.push((deadline, Due::Grace));
        }
        if let Some(deadline) = self.fade_out_timer.deadline() {
            candidates.push((deadline, Due::FadeOut));
        }

        let Some((at, due)) = candidates
            .into_iter()
            .filter(|(at, _)| *at <= now)
            .min_by_key(|(at, _)| *at)
        else {
            return false;
        };

        match due {
            Due::Transition(generation, true) => self.complete_fade_in(generation, at),
            Due::Transition(generation, false) => self.complete_fade_out(generation, at),
            Due::Grace => {
                if let Some(reveal) = self.grace_timer.take_due(at) {
                    self.on_grace(reveal, at);
                }
            }
            Due::FadeOut => {
                if self.fade_out_timer.take_due(at).is_some() {
                    self.dismiss(Duration::ZERO, None, at);
                }
            }
        }
        true
    }

    fn on_environment(&mut self, signal: EnvironmentSignal) {
        match signal {
            EnvironmentSignal::KeyboardShown { height } => self.keyboard_height = height.max(0.0),
            EnvironmentSignal::KeyboardHidden => self.keyboard_height = 0.0,
            EnvironmentSignal::Resized | EnvironmentSignal::Foreground => {}
        }
        if self.observing {
            self.reposition();
        }
    }

    fn on_touch(&mut self, x: f32, y: f32) {
        if !self.attached || !self.style.mask.blocks_interaction() {
            return;
        }
        self.publish(HudEventKind::DidReceiveTouchEvent);
        if self.view.card_contains(x, y) {
            self.publish(HudEventKind::DidTouchDownInside);
        }
    }

    fn begin_presentation(&mut self, mask: Option<MaskType>) {
        self.show_serial += 1;
        self.style = PresentationStyle::snapshot(&self.config, mask);
        self.ensure_attached();
    }

    fn ensure_attached(&mut self) {
        let target = match self.config.container.as_ref() {
            Some(container) => AttachTarget::Container(container.clone()),
            None => AttachTarget::FrontWindow {
                max_level: self.config.max_supported_window_level,
            },
        };
        self.view.attach(&target);
        self.attached = true;
    }

    /// Switching indicator kinds stops whatever the old one was animating.
    fn set_indicator(&mut self, next: Indicator) {
        let same_kind = matches!(
            (&self.indicator, &next),
            (Some(Indicator::Spinner { .. }), Indicator::Spinner { .. })
                | (Some(Indicator::Ring { .. }), Indicator::Ring { .. })
        );
        if !same_kind && self.indicator.is_some() {
            self.view.cancel_animations();
        }
        self.indicator = Some(next);
    }

    fn clear_indicator(&mut self) {
        self.view.cancel_animations();
        self.indicator = None;
    }

    fn resolve_image(&self, image: &ImageSource) -> HudImage {
        match image {
            ImageSource::Info => self.config.info_image.clone(),
            ImageSource::Success => self.config.success_image.clone(),
            ImageSource::Error => self.config.error_image.clone(),
            ImageSource::Custom(image) => image.clone(),
        }
    }

    fn present_content(&mut self) {
        let Some(indicator) = self.indicator.clone() else {
            return;
        };
        let radius = if self.status.is_some() {
            self.config.ring_radius
        } else {
            self.config.ring_no_text_radius
        };
        let content = Content {
            indicator,
            status: self.status.clone(),
            palette: self.style.palette,
            ring: RingMetrics {
                radius,
                thickness: self.config.ring_thickness,
            },
            minimum_size: self.config.minimum_size,
            image_size: self.config.image_view_size,
            corner_radius: self.config.corner_radius,
            border: self
                .config
                .border_color
                .map(|color| (color, self.config.border_width)),
        };
        self.view.present(&content);
    }

    fn reposition(&mut self) {
        let placement = Placement {
            offset: self.style.offset,
            keyboard_height: self.keyboard_height,
            motion_effects: self.config.motion_effect_enabled,
        };
        self.view.reposition(&placement);
    }

    fn push_appearance(&mut self, now: Instant) {
        let appearance = Appearance {
            opacity: self.fade.opacity(now),
            scale: self.fade.scale(now),
            mask: self.style.mask,
            modal: self.style.mask.blocks_interaction(),
            accessibility_label: accessibility_label(self.status.as_deref()),
        };
        self.view.apply(&appearance);
    }

    fn publish(&self, kind: HudEventKind) {
        self.bus.publish(HudEvent::new(kind, self.status.as_deref()));
    }

    fn sync_visibility(&self, now: Instant) {
        self.visible
            .store(self.fade.is_fully_visible(now), Ordering::Relaxed);
        let on_screen = self.attached || self.grace_timer.is_pending() || self.is_animating();
        self.on_screen.store(on_screen, Ordering::Relaxed);
    }
}

/// `now + after`, pushed out to a far deadline instead of overflowing.
fn deadline_after(now: Instant, after: Duration) -> Instant {
    now.checked_add(after)
        .or_else(|| now.checked_add(FAR_DEADLINE))
        .unwrap_or(now)
}

fn normalize_status(status: Option<String>) -> Option<String> {
    status.filter(|text| !text.is_empty())
}

/// Screen readers announce newlines twice, so fold them into spaces.
fn accessibility_label(status: Option<&str>) -> String {
    match status {
        Some(text) => text.lines().collect::<Vec<_>>().join(" "),
        None => DEFAULT_ACCESSIBILITY_LABEL.to_string(),
    }
}
