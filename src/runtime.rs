//! Coordinator thread plus the cloneable handle callers use to drive it.
//!
//! Every request goes through one channel to one thread, so the coordinator's
//! state is only ever touched from a single place. The thread sleeps until the
//! next timer deadline (or the next frame while a fade is running).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};

use crate::config::{ConfigUpdate, HudConfig, Offset, Size};
use crate::coordinator::{
    DismissCompletion, EnvironmentSignal, HudCoordinator, HudRequest, ImageSource,
};
use crate::events::{EventBus, Subscription, SubscriptionId};
use crate::lock_or_recover;
use crate::style::{AnimationType, Color, HudStyle, MaskType};
use crate::view::{HudImage, HudView};

pub const COORDINATOR_THREAD_NAME: &str = "hudkit-coordinator";
/// Frame pacing while a fade is animating.
const FRAME_INTERVAL_MS: u64 = 16;
/// Idle wake-up when nothing is scheduled.
const IDLE_RECV_TIMEOUT_MS: u64 = 100;

enum Command {
    Request(HudRequest),
    Shutdown,
}

#[derive(Clone)]
pub struct HudHandle {
    tx: Sender<Command>,
    bus: EventBus,
    visible: Arc<AtomicBool>,
    on_screen: Arc<AtomicBool>,
    join: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
}

/// Start the coordinator thread. `config` is validated first.
pub fn spawn_hud<V>(view: V, config: HudConfig) -> Result<HudHandle>
where
    V: HudView + 'static,
{
    config.validate()?;
    let bus = EventBus::new();
    let coordinator = HudCoordinator::new(view, config, bus.clone());
    let visible = coordinator.visibility_flag();
    let on_screen = coordinator.on_screen_flag();
    let (tx, rx) = unbounded::<Command>();

    let join = thread::Builder::new()
        .name(COORDINATOR_THREAD_NAME.to_string())
        .spawn(move || run_coordinator(coordinator, rx))
        .context("failed to spawn HUD coordinator thread")?;
    tracing::info!(thread = COORDINATOR_THREAD_NAME, "hud runtime started");

    Ok(HudHandle {
        tx,
        bus,
        visible,
        on_screen,
        join: Arc::new(Mutex::new(Some(join))),
    })
}

fn run_coordinator<V: HudView>(
    mut coordinator: HudCoordinator<V>,
    rx: crossbeam_channel::Receiver<Command>,
) {
    loop {
        let now = Instant::now();
        let timeout = wait_budget(&coordinator, now);
        match rx.recv_timeout(timeout) {
            Ok(Command::Request(request)) => {
                let now = Instant::now();
                coordinator.advance(now);
                coordinator.handle(request, now);
            }
            Ok(Command::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => {
                tracing::trace!("coordinator tick");
                coordinator.advance(Instant::now());
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    coordinator.teardown();
    tracing::info!("hud runtime stopped");
}

fn wait_budget<V: HudView>(coordinator: &HudCoordinator<V>, now: Instant) -> Duration {
    let mut budget = Duration::from_millis(IDLE_RECV_TIMEOUT_MS);
    match coordinator.fade_starts_at() {
        Some(start) if start > now => budget = budget.min(start.duration_since(now)),
        Some(_) => budget = budget.min(Duration::from_millis(FRAME_INTERVAL_MS)),
        None => {}
    }
    if let Some(deadline) = coordinator.next_deadline() {
        budget = budget.min(deadline.saturating_duration_since(now));
    }
    budget
}

impl HudHandle {
    fn send(&self, request: HudRequest) {
        if self.tx.send(Command::Request(request)).is_err() {
            tracing::debug!("hud runtime is gone; request dropped");
        }
    }

    fn configure(&self, update: ConfigUpdate) {
        self.send(HudRequest::Configure(update));
    }

    /// Indeterminate spinner, no status.
    pub fn show(&self) {
        self.show_with_status(None::<String>);
    }

    pub fn show_with_status(&self, status: Option<impl Into<String>>) {
        self.send(HudRequest::Show {
            progress: None,
            status: status.map(Into::into),
            mask: None,
        });
    }

    pub fn show_with_mask(&self, status: Option<impl Into<String>>, mask: MaskType) {
        self.send(HudRequest::Show {
            progress: None,
            status: status.map(Into::into),
            mask: Some(mask),
        });
    }

    /// Negative progress falls back to the spinner.
    pub fn show_progress(&self, progress: f32, status: Option<impl Into<String>>) {
        self.send(HudRequest::Show {
            progress: Some(progress),
            status: status.map(Into::into),
            mask: None,
        });
    }

    pub fn show_progress_with_mask(
        &self,
        progress: f32,
        status: Option<impl Into<String>>,
        mask: MaskType,
    ) {
        self.send(HudRequest::Show {
            progress: Some(progress),
            status: status.map(Into::into),
            mask: Some(mask),
        });
    }

    pub fn show_info(&self, status: impl Into<String>) {
        self.show_image(ImageSource::Info, Some(status.into()), None);
    }

    pub fn show_success(&self, status: impl Into<String>) {
        self.show_image(ImageSource::Success, Some(status.into()), None);
    }

    pub fn show_error(&self, status: impl Into<String>) {
        self.show_image(ImageSource::Error, Some(status.into()), None);
    }

    pub fn show_image(&self, image: ImageSource, status: Option<String>, mask: Option<MaskType>) {
        self.send(HudRequest::ShowImage {
            image,
            status,
            mask,
        });
    }

    pub fn set_status(&self, status: impl Into<String>) {
        self.send(HudRequest::SetStatus(status.into()));
    }

    pub fn pop_activity(&self) {
        self.send(HudRequest::PopActivity);
    }

    pub fn dismiss(&self) {
        self.dismiss_with_delay(Duration::ZERO, None);
    }

    pub fn dismiss_with_completion(&self, completion: impl FnOnce() + Send + 'static) {
        self.dismiss_with_delay(Duration::ZERO, Some(Box::new(completion)));
    }

    pub fn dismiss_with_delay(&self, delay: Duration, completion: Option<DismissCompletion>) {
        self.send(HudRequest::Dismiss { delay, completion });
    }

    /// True only while the HUD is fully shown; readable from any thread.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    /// True from the first show until the last fade-out has finished and the
    /// view is detached. Unlike `is_visible`, it covers grace delays and fades.
    pub fn is_on_screen(&self) -> bool {
        self.on_screen.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn environment(&self, signal: EnvironmentSignal) {
        self.send(HudRequest::Environment(signal));
    }

    /// Pointer press at surface coordinates.
    pub fn touch(&self, x: f32, y: f32) {
        self.send(HudRequest::Touch { x, y });
    }

    pub fn set_default_mask_type(&self, mask: MaskType) {
        self.configure(ConfigUpdate::DefaultMaskType(mask));
    }

    pub fn set_default_style(&self, style: HudStyle) {
        self.configure(ConfigUpdate::DefaultStyle(style));
    }

    pub fn set_default_animation_type(&self, animation: AnimationType) {
        self.configure(ConfigUpdate::DefaultAnimationType(animation));
    }

    pub fn set_container(&self, container: Option<String>) {
        self.configure(ConfigUpdate::Container(container));
    }

    pub fn set_minimum_size(&self, size: Size) {
        self.configure(ConfigUpdate::MinimumSize(size));
    }

    pub fn set_ring_thickness(&self, value: f32) {
        self.configure(ConfigUpdate::RingThickness(value));
    }

    pub fn set_ring_radius(&self, value: f32) {
        self.configure(ConfigUpdate::RingRadius(value));
    }

    pub fn set_ring_no_text_radius(&self, value: f32) {
        self.configure(ConfigUpdate::RingNoTextRadius(value));
    }

    pub fn set_corner_radius(&self, value: f32) {
        self.configure(ConfigUpdate::CornerRadius(value));
    }

    pub fn set_foreground_color(&self, color: Color) {
        self.configure(ConfigUpdate::ForegroundColor(color));
    }

    pub fn set_foreground_image_color(&self, color: Color) {
        self.configure(ConfigUpdate::ForegroundImageColor(color));
    }

    pub fn set_background_color(&self, color: Color) {
        self.configure(ConfigUpdate::BackgroundColor(color));
    }

    pub fn set_background_layer_color(&self, color: Color) {
        self.configure(ConfigUpdate::BackgroundLayerColor(color));
    }

    pub fn set_border_color(&self, color: Color) {
        self.configure(ConfigUpdate::BorderColor(color));
    }

    pub fn set_border_width(&self, width: f32) {
        self.configure(ConfigUpdate::BorderWidth(width));
    }

    pub fn set_image_view_size(&self, size: Size) {
        self.configure(ConfigUpdate::ImageViewSize(size));
    }

    pub fn set_should_tint_images(&self, tint: bool) {
        self.configure(ConfigUpdate::ShouldTintImages(tint));
    }

    pub fn set_info_image(&self, image: HudImage) {
        self.configure(ConfigUpdate::InfoImage(image));
    }

    pub fn set_success_image(&self, image: HudImage) {
        self.configure(ConfigUpdate::SuccessImage(image));
    }

    pub fn set_error_image(&self, image: HudImage) {
        self.configure(ConfigUpdate::ErrorImage(image));
    }

    pub fn set_grace_time_interval(&self, interval: Duration) {
        self.configure(ConfigUpdate::GraceTimeInterval(interval));
    }

    pub fn set_minimum_dismiss_time_interval(&self, interval: Duration) {
        self.configure(ConfigUpdate::MinimumDismissTimeInterval(interval));
    }

    pub fn set_maximum_dismiss_time_interval(&self, interval: Duration) {
        self.configure(ConfigUpdate::MaximumDismissTimeInterval(interval));
    }

    pub fn set_fade_in_duration(&self, duration: Duration) {
        self.configure(ConfigUpdate::FadeInDuration(duration));
    }

    pub fn set_fade_out_duration(&self, duration: Duration) {
        self.configure(ConfigUpdate::FadeOutDuration(duration));
    }

    pub fn set_offset_from_center(&self, offset: Offset) {
        self.configure(ConfigUpdate::OffsetFromCenter(offset));
    }

    pub fn reset_offset_from_center(&self) {
        self.set_offset_from_center(Offset::default());
    }

    pub fn set_max_supported_window_level(&self, level: i32) {
        self.configure(ConfigUpdate::MaxSupportedWindowLevel(level));
    }

    pub fn set_haptics_enabled(&self, enabled: bool) {
        self.configure(ConfigUpdate::HapticsEnabled(enabled));
    }

    pub fn set_motion_effect_enabled(&self, enabled: bool) {
        self.configure(ConfigUpdate::MotionEffectEnabled(enabled));
    }

    /// Stop the coordinator thread and wait for it. Later calls are no-ops.
    pub fn shutdown(&self) -> Result<()> {
        let join = lock_or_recover(&self.join, "hud handle shutdown").take();
        let Some(join) = join else {
            return Ok(());
        };
        let _ = self.tx.send(Command::Shutdown);
        join.join()
            .map_err(|_| anyhow!("HUD coordinator thread panicked"))
    }
}
