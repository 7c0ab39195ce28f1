use super::*;
use crate::config::ConfigUpdate;
use crate::events::Subscription;
use crate::view::FeedbackKind;
use std::sync::atomic::AtomicUsize;

#[derive(Debug, Clone, PartialEq)]
enum ViewCall {
    Attach(AttachTarget),
    Detach,
    Present(Content),
    Apply(Appearance),
    Reposition(Placement),
    CancelAnimations,
    Haptic(HapticEvent),
}

#[derive(Debug, Default)]
struct RecordingView {
    calls: Vec<ViewCall>,
    attached: bool,
}

impl RecordingView {
    fn count(&self, pred: impl Fn(&ViewCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    fn last_content(&self) -> Option<&Content> {
        self.calls.iter().rev().find_map(|call| match call {
            ViewCall::Present(content) => Some(content),
            _ => None,
        })
    }

    fn last_appearance(&self) -> Option<&Appearance> {
        self.calls.iter().rev().find_map(|call| match call {
            ViewCall::Apply(appearance) => Some(appearance),
            _ => None,
        })
    }
}

impl HudView for RecordingView {
    fn attach(&mut self, target: &AttachTarget) {
        self.attached = true;
        self.calls.push(ViewCall::Attach(target.clone()));
    }

    fn detach(&mut self) {
        self.attached = false;
        self.calls.push(ViewCall::Detach);
    }

    fn present(&mut self, content: &Content) {
        self.calls.push(ViewCall::Present(content.clone()));
    }

    fn apply(&mut self, appearance: &Appearance) {
        self.calls.push(ViewCall::Apply(appearance.clone()));
    }

    fn reposition(&mut self, placement: &Placement) {
        self.calls.push(ViewCall::Reposition(*placement));
    }

    fn cancel_animations(&mut self) {
        self.calls.push(ViewCall::CancelAnimations);
    }

    fn card_contains(&self, x: f32, y: f32) -> bool {
        (10.0..=20.0).contains(&x) && (10.0..=20.0).contains(&y)
    }

    fn haptic(&mut self, event: HapticEvent) {
        self.calls.push(ViewCall::Haptic(event));
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn coordinator(config: HudConfig) -> (HudCoordinator<RecordingView>, Subscription) {
    let bus = EventBus::new();
    let sub = bus.subscribe();
    (HudCoordinator::new(RecordingView::default(), config, bus), sub)
}

fn instant_config() -> HudConfig {
    HudConfig {
        fade_in_duration: Duration::ZERO,
        fade_out_duration: Duration::ZERO,
        ..HudConfig::default()
    }
}

fn kinds(sub: &Subscription) -> Vec<HudEventKind> {
    sub.drain().into_iter().map(|event| event.kind).collect()
}

fn show(status: Option<&str>) -> HudRequest {
    HudRequest::Show {
        progress: None,
        status: status.map(str::to_string),
        mask: None,
    }
}

fn progress(value: f32, status: &str) -> HudRequest {
    HudRequest::Show {
        progress: Some(value),
        status: Some(status.to_string()),
        mask: None,
    }
}

fn success(status: &str) -> HudRequest {
    HudRequest::ShowImage {
        image: ImageSource::Success,
        status: Some(status.to_string()),
        mask: None,
    }
}

fn dismiss() -> HudRequest {
    HudRequest::Dismiss {
        delay: Duration::ZERO,
        completion: None,
    }
}

fn counting_completion(counter: &Arc<AtomicUsize>) -> Option<DismissCompletion> {
    let counter = Arc::clone(counter);
    Some(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }))
}

#[test]
fn reveal_completes_after_fade_in() {
    let (mut hud, sub) = coordinator(HudConfig::default());
    let t0 = Instant::now();
    hud.handle(show(Some("Working")), t0);
    assert!(hud.is_attached());
    assert!(!hud.is_visible());
    assert_eq!(kinds(&sub), vec![HudEventKind::WillAppear]);

    hud.advance(t0 + ms(75));
    assert!(!hud.is_visible());
    assert!((hud.opacity(t0 + ms(75)) - 0.5).abs() < 0.01);

    hud.advance(t0 + ms(150));
    assert!(hud.is_visible());
    assert_eq!(kinds(&sub), vec![HudEventKind::DidAppear]);
    assert_eq!(hud.view().last_appearance().map(|a| a.opacity), Some(1.0));
}

#[test]
fn nested_activity_dismisses_only_when_count_returns_to_zero() {
    let (mut hud, sub) = coordinator(instant_config());
    let t0 = Instant::now();
    for _ in 0..3 {
        hud.handle(show(None), t0);
        assert!(hud.is_visible());
    }
    assert_eq!(hud.activity_count(), 3);

    hud.handle(HudRequest::PopActivity, t0);
    hud.handle(HudRequest::PopActivity, t0);
    assert!(hud.is_visible());
    assert_eq!(hud.activity_count(), 1);

    hud.handle(HudRequest::PopActivity, t0);
    assert!(!hud.is_visible());
    assert_eq!(hud.activity_count(), 0);
    assert!(!hud.is_attached());
    assert_eq!(
        kinds(&sub),
        vec![
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
            HudEventKind::WillDisappear,
            HudEventKind::DidDisappear,
        ]
    );

    // Extra pops stay at zero and do nothing visible.
    hud.handle(HudRequest::PopActivity, t0);
    assert_eq!(hud.activity_count(), 0);
    assert!(kinds(&sub).is_empty());
}

#[test]
fn determinate_sequence_counts_once_and_emits_one_pair_each_way() {
    let (mut hud, sub) = coordinator(HudConfig::default());
    let t0 = Instant::now();
    hud.handle(progress(0.0, "Loading"), t0);
    assert_eq!(hud.activity_count(), 1);

    let mut now = t0;
    for step in 1..=5 {
        now += ms(100);
        hud.advance(now);
        hud.handle(progress(step as f32 * 0.2, "Loading"), now);
        assert_eq!(hud.activity_count(), 1);
    }
    assert_eq!(hud.progress(), Some(1.0));
    assert!(hud.is_visible());

    hud.handle(dismiss(), now);
    assert_eq!(hud.activity_count(), 0);
    hud.advance(now + ms(150));

    let events = sub.drain();
    let kinds: Vec<_> = events.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
            HudEventKind::WillDisappear,
            HudEventKind::DidDisappear,
        ]
    );
    assert!(events
        .iter()
        .all(|event| event.status.as_deref() == Some("Loading")));
    assert_eq!(hud.progress(), None);
    assert!(!hud.is_attached());
}

#[test]
fn success_auto_dismisses_after_display_duration() {
    let config = HudConfig {
        minimum_dismiss_time_interval: Duration::from_secs(1),
        ..HudConfig::default()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(success("Done"), t0);
    assert!(!hud.fade_out_pending());

    hud.advance(t0 + ms(150));
    assert!(hud.is_visible());
    assert!(hud.fade_out_pending());
    assert_eq!(
        kinds(&sub),
        vec![HudEventKind::WillAppear, HudEventKind::DidAppear]
    );

    hud.advance(t0 + ms(1149));
    assert!(hud.is_visible());
    assert!(kinds(&sub).is_empty());

    hud.advance(t0 + ms(1150));
    assert_eq!(kinds(&sub), vec![HudEventKind::WillDisappear]);
    hud.advance(t0 + ms(1300));
    assert_eq!(kinds(&sub), vec![HudEventKind::DidDisappear]);
    assert!(!hud.is_attached());
}

#[test]
fn late_tick_processes_every_due_action_in_order() {
    let config = HudConfig {
        minimum_dismiss_time_interval: Duration::from_secs(1),
        ..HudConfig::default()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(success("Done"), t0);
    hud.advance(t0 + Duration::from_secs(5));
    assert_eq!(
        kinds(&sub),
        vec![
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
            HudEventKind::WillDisappear,
            HudEventKind::DidDisappear,
        ]
    );
}

#[test]
fn success_shows_tinted_icon_and_resets_progress() {
    let (mut hud, _sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(progress(0.5, "Uploading"), t0);
    hud.handle(success("Done"), t0);
    assert_eq!(hud.progress(), None);
    let content = hud.view().last_content().expect("content presented");
    match &content.indicator {
        Indicator::Icon { image, tint } => {
            assert_eq!(image.glyph(), crate::config::DEFAULT_SUCCESS_GLYPH);
            assert_eq!(*tint, Some(content.palette.image_tint));
        }
        other => panic!("unexpected indicator: {other:?}"),
    }
    // Icon presentations do not touch the activity counter.
    assert_eq!(hud.activity_count(), 0);
}

#[test]
fn repeated_transient_shows_leave_one_fade_out_timer() {
    let config = HudConfig {
        minimum_dismiss_time_interval: Duration::from_secs(1),
        ..HudConfig::default()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(success("one"), t0);
    hud.advance(t0 + ms(150));
    assert!(hud.fade_out_pending());

    for i in 1..=5 {
        hud.handle(success("again"), t0 + ms(150 + i * 100));
        assert!(hud.fade_out_pending());
    }
    // Latest show at +650ms; the countdown restarts from there.
    hud.advance(t0 + ms(1600));
    assert!(hud.is_visible());
    hud.advance(t0 + ms(1650));
    let events = kinds(&sub);
    assert_eq!(
        events
            .iter()
            .filter(|kind| **kind == HudEventKind::WillDisappear)
            .count(),
        1
    );
    assert_eq!(
        events
            .iter()
            .filter(|kind| **kind == HudEventKind::WillAppear)
            .count(),
        1
    );
}

#[test]
fn transient_during_fade_in_arms_timer_at_completion() {
    let config = HudConfig {
        minimum_dismiss_time_interval: Duration::from_secs(1),
        ..HudConfig::default()
    };
    let (mut hud, _sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(success("first"), t0);
    hud.handle(success("second"), t0 + ms(50));
    assert!(!hud.fade_out_pending());
    hud.advance(t0 + ms(150));
    assert!(hud.fade_out_pending());
    assert_eq!(hud.next_deadline(), Some(t0 + ms(1150)));
}

#[test]
fn progress_show_cancels_pending_auto_dismiss() {
    let config = HudConfig {
        minimum_dismiss_time_interval: Duration::from_secs(1),
        ..instant_config()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(success("Saved"), t0);
    assert!(hud.fade_out_pending());
    hud.handle(show(Some("Syncing")), t0 + ms(10));
    assert!(!hud.fade_out_pending());
    hud.advance(t0 + Duration::from_secs(5));
    assert!(hud.is_visible());
    assert!(!kinds(&sub).contains(&HudEventKind::WillDisappear));
}

#[test]
fn pending_auto_dismiss_starts_new_activity_sequence() {
    let config = HudConfig {
        minimum_dismiss_time_interval: Duration::from_secs(1),
        ..instant_config()
    };
    let (mut hud, _sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.handle(show(None), t0);
    assert_eq!(hud.activity_count(), 2);
    hud.handle(success("Done"), t0);
    assert!(hud.fade_out_pending());

    hud.handle(progress(0.0, "Next"), t0);
    assert_eq!(hud.activity_count(), 1);
}

#[test]
fn dismiss_before_grace_elapses_never_reveals() {
    let config = HudConfig {
        grace_time_interval: ms(500),
        ..HudConfig::default()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(show(Some("Quick")), t0);
    assert!(hud.grace_pending());
    assert!(hud.is_attached());

    hud.handle(dismiss(), t0 + ms(10));
    assert!(!hud.grace_pending());
    assert!(!hud.is_attached());

    hud.advance(t0 + Duration::from_secs(2));
    assert!(!hud.is_visible());
    assert!(kinds(&sub).is_empty());
    assert_eq!(hud.opacity(t0 + Duration::from_secs(2)), 0.0);
}

#[test]
fn grace_reveal_fires_after_interval() {
    let config = HudConfig {
        grace_time_interval: ms(500),
        ..instant_config()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(show(Some("Slow")), t0);
    hud.advance(t0 + ms(499));
    assert!(!hud.is_visible());
    assert!(kinds(&sub).is_empty());

    hud.advance(t0 + ms(500));
    assert!(hud.is_visible());
    assert_eq!(
        kinds(&sub),
        vec![HudEventKind::WillAppear, HudEventKind::DidAppear]
    );
}

#[test]
fn repeated_shows_during_grace_keep_one_grace_timer() {
    let config = HudConfig {
        grace_time_interval: ms(500),
        ..instant_config()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.handle(show(None), t0 + ms(300));
    assert_eq!(hud.next_deadline(), Some(t0 + ms(800)));
    hud.advance(t0 + ms(600));
    assert!(!hud.is_visible());
    hud.advance(t0 + ms(800));
    assert!(hud.is_visible());
    assert_eq!(
        kinds(&sub),
        vec![HudEventKind::WillAppear, HudEventKind::DidAppear]
    );
}

#[test]
fn grace_carries_transient_duration() {
    let config = HudConfig {
        grace_time_interval: ms(200),
        minimum_dismiss_time_interval: Duration::from_secs(1),
        ..instant_config()
    };
    let (mut hud, _sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(success("ok"), t0);
    hud.advance(t0 + ms(200));
    assert!(hud.is_visible());
    assert!(hud.fade_out_pending());
    hud.advance(t0 + ms(1200));
    assert!(!hud.is_visible());
}

#[test]
fn double_dismiss_emits_one_did_disappear_and_runs_each_completion_once() {
    let (mut hud, sub) = coordinator(HudConfig::default());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.advance(t0 + ms(150));
    let _ = kinds(&sub);

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    hud.handle(
        HudRequest::Dismiss {
            delay: Duration::ZERO,
            completion: counting_completion(&first),
        },
        t0 + ms(200),
    );
    hud.handle(
        HudRequest::Dismiss {
            delay: Duration::ZERO,
            completion: counting_completion(&second),
        },
        t0 + ms(210),
    );
    hud.advance(t0 + ms(400));
    hud.advance(t0 + ms(800));

    assert_eq!(
        kinds(&sub),
        vec![HudEventKind::WillDisappear, HudEventKind::DidDisappear]
    );
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn dismiss_with_nothing_shown_is_silent() {
    let (mut hud, sub) = coordinator(HudConfig::default());
    let done = Arc::new(AtomicUsize::new(0));
    hud.handle(
        HudRequest::Dismiss {
            delay: Duration::ZERO,
            completion: counting_completion(&done),
        },
        Instant::now(),
    );
    assert!(kinds(&sub).is_empty());
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert!(hud.view().calls.is_empty());
}

#[test]
fn show_during_fade_out_supersedes_the_dismissal() {
    let (mut hud, sub) = coordinator(HudConfig::default());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.advance(t0 + ms(150));
    let done = Arc::new(AtomicUsize::new(0));
    hud.handle(
        HudRequest::Dismiss {
            delay: Duration::ZERO,
            completion: counting_completion(&done),
        },
        t0 + ms(200),
    );
    hud.handle(show(None), t0 + ms(250));
    hud.advance(t0 + ms(1000));

    assert!(hud.is_visible());
    assert!(hud.is_attached());
    assert_eq!(done.load(Ordering::SeqCst), 0);
    assert_eq!(
        kinds(&sub),
        vec![
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
            HudEventKind::WillDisappear,
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
        ]
    );
}

#[test]
fn dismiss_during_fade_in_never_reports_appeared() {
    let (mut hud, sub) = coordinator(HudConfig::default());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.handle(dismiss(), t0 + ms(50));
    hud.advance(t0 + ms(1000));
    assert!(!hud.is_visible());
    assert_eq!(
        kinds(&sub),
        vec![
            HudEventKind::WillAppear,
            HudEventKind::WillDisappear,
            HudEventKind::DidDisappear,
        ]
    );
}

#[test]
fn delayed_dismiss_keeps_hud_visible_until_delay_passes() {
    let (mut hud, sub) = coordinator(HudConfig::default());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.advance(t0 + ms(150));
    let _ = kinds(&sub);

    hud.handle(
        HudRequest::Dismiss {
            delay: ms(500),
            completion: None,
        },
        t0 + ms(200),
    );
    assert_eq!(kinds(&sub), vec![HudEventKind::WillDisappear]);
    hud.advance(t0 + ms(600));
    assert!(hud.is_visible());
    hud.advance(t0 + ms(750));
    assert!(!hud.is_visible());
    hud.advance(t0 + ms(850));
    assert_eq!(kinds(&sub), vec![HudEventKind::DidDisappear]);
}

#[test]
fn config_changes_do_not_touch_in_flight_presentation() {
    let (mut hud, sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.handle(
        HudRequest::Configure(ConfigUpdate::DefaultMaskType(MaskType::Black)),
        t0,
    );
    let _ = kinds(&sub);
    hud.handle(HudRequest::Touch { x: 15.0, y: 15.0 }, t0);
    assert!(kinds(&sub).is_empty());
    assert_eq!(
        hud.view().last_appearance().map(|a| a.mask),
        Some(MaskBehavior::PassThrough)
    );

    hud.handle(show(None), t0);
    assert_eq!(
        hud.view().last_appearance().map(|a| a.mask),
        Some(resolve_mask(MaskType::Black, hud.config()))
    );
}

#[test]
fn touches_on_blocking_mask_are_reported() {
    let (mut hud, sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(
        HudRequest::Show {
            progress: None,
            status: Some("Hold".to_string()),
            mask: Some(MaskType::Clear),
        },
        t0,
    );
    let _ = kinds(&sub);

    hud.handle(HudRequest::Touch { x: 1.0, y: 1.0 }, t0);
    assert_eq!(kinds(&sub), vec![HudEventKind::DidReceiveTouchEvent]);

    hud.handle(HudRequest::Touch { x: 15.0, y: 12.0 }, t0);
    let events = sub.drain();
    assert_eq!(
        events.iter().map(|e| e.kind).collect::<Vec<_>>(),
        vec![
            HudEventKind::DidReceiveTouchEvent,
            HudEventKind::DidTouchDownInside
        ]
    );
    assert_eq!(events[1].status.as_deref(), Some("Hold"));
    assert_eq!(hud.view().last_appearance().map(|a| a.modal), Some(true));
}

#[test]
fn mask_override_applies_to_one_show_only() {
    let (mut hud, _sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(
        HudRequest::Show {
            progress: None,
            status: None,
            mask: Some(MaskType::Gradient),
        },
        t0,
    );
    assert!(matches!(
        hud.view().last_appearance().map(|a| a.mask),
        Some(MaskBehavior::RadialGradient { .. })
    ));
    assert_eq!(hud.config().default_mask_type, MaskType::None);
    hud.handle(show(None), t0);
    assert_eq!(
        hud.view().last_appearance().map(|a| a.mask),
        Some(MaskBehavior::PassThrough)
    );
}

#[test]
fn environment_signals_reposition_only_while_shown() {
    let (mut hud, _sub) = coordinator(HudConfig::default());
    let t0 = Instant::now();
    let repositions = |hud: &HudCoordinator<RecordingView>| {
        hud.view()
            .count(|call| matches!(call, ViewCall::Reposition(_)))
    };

    hud.handle(HudRequest::Environment(EnvironmentSignal::Resized), t0);
    assert_eq!(repositions(&hud), 0);

    hud.handle(show(None), t0);
    let after_show = repositions(&hud);
    hud.handle(
        HudRequest::Environment(EnvironmentSignal::KeyboardShown { height: 120.0 }),
        t0 + ms(10),
    );
    assert_eq!(repositions(&hud), after_show);

    hud.advance(t0 + ms(150));
    hud.handle(
        HudRequest::Environment(EnvironmentSignal::KeyboardShown { height: 120.0 }),
        t0 + ms(200),
    );
    assert_eq!(repositions(&hud), after_show + 1);
    match hud.view().calls.last() {
        Some(ViewCall::Reposition(placement)) => assert_eq!(placement.keyboard_height, 120.0),
        other => panic!("expected reposition, got {other:?}"),
    }
}

#[test]
fn haptics_follow_config() {
    let (mut hud, _sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    assert_eq!(
        hud.view()
            .count(|call| matches!(call, ViewCall::Haptic(_))),
        0
    );

    hud.handle(
        HudRequest::Configure(ConfigUpdate::HapticsEnabled(true)),
        t0,
    );
    hud.handle(show(None), t0);
    hud.handle(
        HudRequest::ShowImage {
            image: ImageSource::Error,
            status: None,
            mask: None,
        },
        t0,
    );
    let haptics: Vec<_> = hud
        .view()
        .calls
        .iter()
        .filter_map(|call| match call {
            ViewCall::Haptic(event) => Some(*event),
            _ => None,
        })
        .collect();
    assert_eq!(
        haptics,
        vec![
            HapticEvent::Prepare,
            HapticEvent::Notify(FeedbackKind::Error)
        ]
    );
}

#[test]
fn set_status_updates_label_and_ring_radius() {
    let (mut hud, _sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    let content = hud.view().last_content().expect("content");
    assert_eq!(content.ring.radius, crate::config::DEFAULT_RING_NO_TEXT_RADIUS);
    assert_eq!(
        hud.view()
            .last_appearance()
            .map(|a| a.accessibility_label.as_str()),
        Some("Loading")
    );

    hud.handle(HudRequest::SetStatus("Two\nlines".to_string()), t0);
    let content = hud.view().last_content().expect("content");
    assert_eq!(content.ring.radius, crate::config::DEFAULT_RING_RADIUS);
    assert_eq!(content.status.as_deref(), Some("Two\nlines"));
    assert_eq!(
        hud.view()
            .last_appearance()
            .map(|a| a.accessibility_label.as_str()),
        Some("Two lines")
    );
}

#[test]
fn negative_progress_is_indeterminate() {
    let (mut hud, _sub) = coordinator(instant_config());
    hud.handle(progress(-1.0, "x"), Instant::now());
    assert_eq!(hud.progress(), None);
    assert_eq!(hud.activity_count(), 1);
    assert!(matches!(
        hud.view().last_content().map(|c| &c.indicator),
        Some(Indicator::Spinner { .. })
    ));
}

#[test]
fn switching_indicator_kind_cancels_animations() {
    let (mut hud, _sub) = coordinator(instant_config());
    let t0 = Instant::now();
    let cancels = |hud: &HudCoordinator<RecordingView>| {
        hud.view()
            .count(|call| matches!(call, ViewCall::CancelAnimations))
    };
    hud.handle(show(None), t0);
    hud.handle(show(None), t0);
    assert_eq!(cancels(&hud), 0);
    hud.handle(progress(0.0, "ring"), t0);
    assert_eq!(cancels(&hud), 1);
}

#[test]
fn container_config_selects_attach_target() {
    let (mut hud, _sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    assert!(matches!(
        hud.view().calls.first(),
        Some(ViewCall::Attach(AttachTarget::FrontWindow { max_level: 0 }))
    ));

    hud.handle(
        HudRequest::Configure(ConfigUpdate::Container(Some("sidebar".to_string()))),
        t0,
    );
    hud.handle(show(None), t0);
    assert!(hud.view().calls.iter().any(
        |call| matches!(call, ViewCall::Attach(AttachTarget::Container(id)) if id == "sidebar")
    ));
}

#[test]
fn teardown_detaches_and_clears_timers() {
    let config = HudConfig {
        grace_time_interval: ms(100),
        ..HudConfig::default()
    };
    let (mut hud, _sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.teardown();
    assert!(!hud.grace_pending());
    assert!(!hud.is_attached());
    assert!(!hud.view().attached);
    assert_eq!(hud.next_deadline(), None);
}

#[test]
fn show_during_fade_out_with_grace_keeps_its_content() {
    let config = HudConfig {
        grace_time_interval: ms(100),
        fade_in_duration: Duration::ZERO,
        fade_out_duration: ms(150),
        ..HudConfig::default()
    };
    let (mut hud, sub) = coordinator(config);
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.advance(t0 + ms(100));
    assert!(hud.is_visible());
    hud.handle(dismiss(), t0 + ms(200));
    hud.handle(progress(0.0, "Upload"), t0 + ms(250));
    assert!(hud.grace_pending());

    hud.advance(t0 + ms(400));
    assert!(hud.is_visible());
    assert!(hud.is_attached());
    assert_eq!(hud.progress(), Some(0.0));
    assert_eq!(
        hud.view().last_content().map(|c| c.indicator.clone()),
        Some(Indicator::Ring { progress: 0.0 })
    );

    let presents = hud.view().count(|call| matches!(call, ViewCall::Present(_)));
    hud.handle(HudRequest::SetStatus("Still uploading".to_string()), t0 + ms(450));
    assert_eq!(
        hud.view().count(|call| matches!(call, ViewCall::Present(_))),
        presents + 1
    );
    assert_eq!(
        kinds(&sub),
        vec![
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
            HudEventKind::WillDisappear,
            HudEventKind::DidDisappear,
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
        ]
    );
}

#[test]
fn huge_dismiss_delay_saturates_instead_of_overflowing() {
    let (mut hud, sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(show(None), t0);
    hud.handle(
        HudRequest::Dismiss {
            delay: Duration::MAX,
            completion: None,
        },
        t0,
    );
    let deadline = hud.next_deadline().expect("fade deadline");
    assert!(deadline > t0 + Duration::from_secs(60 * 60 * 24 * 365));
    hud.advance(t0 + ms(10));
    assert!(hud.is_visible());

    // A later show supersedes the far-off dismissal.
    hud.handle(show(None), t0 + ms(20));
    assert!(hud.is_visible());
    assert_eq!(
        kinds(&sub),
        vec![
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
            HudEventKind::WillDisappear,
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
        ]
    );
}

#[test]
fn huge_fade_setting_is_clamped_before_the_next_show() {
    let (mut hud, _sub) = coordinator(instant_config());
    let t0 = Instant::now();
    hud.handle(
        HudRequest::Configure(ConfigUpdate::FadeInDuration(Duration::MAX)),
        t0,
    );
    hud.handle(
        HudRequest::Configure(ConfigUpdate::GraceTimeInterval(Duration::MAX)),
        t0,
    );
    hud.handle(show(None), t0);
    assert!(hud.grace_pending());
    hud.advance(t0 + Duration::from_secs(60));
    assert!(!hud.is_visible());
    hud.advance(t0 + Duration::from_secs(70));
    assert!(hud.is_visible());
}

#[test]
fn on_screen_covers_grace_and_fade_out() {
    let config = HudConfig {
        grace_time_interval: ms(100),
        fade_in_duration: Duration::ZERO,
        fade_out_duration: ms(150),
        ..HudConfig::default()
    };
    let (mut hud, _sub) = coordinator(config);
    let t0 = Instant::now();
    assert!(!hud.is_on_screen());
    hud.handle(show(None), t0);
    assert!(hud.is_on_screen());
    assert!(!hud.is_visible());

    hud.advance(t0 + ms(100));
    hud.handle(dismiss(), t0 + ms(100));
    assert!(!hud.is_visible());
    assert!(hud.is_on_screen());

    hud.advance(t0 + ms(250));
    assert!(!hud.is_on_screen());
    assert!(!hud.view().attached);
}

#[test]
fn deadline_after_saturates() {
    let now = Instant::now();
    assert_eq!(deadline_after(now, ms(5)), now + ms(5));
    assert!(deadline_after(now, Duration::MAX) > now);
}
