use hudkit::{
    spawn_hud, Appearance, AttachTarget, Content, HudConfig, HudEvent, HudEventKind, HudView,
    Indicator, MaskType, NullView, Placement, Subscription,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const EVENT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
struct Seen {
    attached: bool,
    detaches: usize,
    last_content: Option<Content>,
    last_appearance: Option<Appearance>,
}

#[derive(Clone, Default)]
struct SharedView(Arc<Mutex<Seen>>);

impl SharedView {
    fn seen<R>(&self, f: impl FnOnce(&Seen) -> R) -> R {
        f(&self.0.lock().expect("view state"))
    }
}

impl HudView for SharedView {
    fn attach(&mut self, _target: &AttachTarget) {
        self.0.lock().expect("view state").attached = true;
    }

    fn detach(&mut self) {
        let mut seen = self.0.lock().expect("view state");
        seen.attached = false;
        seen.detaches += 1;
    }

    fn present(&mut self, content: &Content) {
        self.0.lock().expect("view state").last_content = Some(content.clone());
    }

    fn apply(&mut self, appearance: &Appearance) {
        self.0.lock().expect("view state").last_appearance = Some(appearance.clone());
    }

    fn reposition(&mut self, _placement: &Placement) {}

    fn cancel_animations(&mut self) {}

    fn card_contains(&self, _x: f32, _y: f32) -> bool {
        true
    }
}

fn instant_config() -> HudConfig {
    HudConfig {
        fade_in_duration: Duration::ZERO,
        fade_out_duration: Duration::ZERO,
        ..HudConfig::default()
    }
}

fn next(sub: &Subscription) -> HudEvent {
    sub.receiver()
        .recv_timeout(EVENT_TIMEOUT)
        .expect("expected a hud event")
}

fn expect_kinds(sub: &Subscription, kinds: &[HudEventKind]) {
    for kind in kinds {
        assert_eq!(next(sub).kind, *kind);
    }
}

#[test]
fn progress_sequence_end_to_end() {
    let view = SharedView::default();
    let hud = spawn_hud(view.clone(), instant_config()).expect("spawn");
    let sub = hud.subscribe();

    hud.show_progress(0.0, Some("Loading"));
    for step in 1..=10 {
        hud.show_progress(step as f32 / 10.0, Some("Loading"));
    }
    hud.dismiss();
    expect_kinds(
        &sub,
        &[
            HudEventKind::WillAppear,
            HudEventKind::DidAppear,
            HudEventKind::WillDisappear,
            HudEventKind::DidDisappear,
        ],
    );
    hud.shutdown().expect("shutdown");
    assert!(sub.drain().is_empty());
    assert!(!view.seen(|seen| seen.attached));
    assert_eq!(view.seen(|seen| seen.detaches), 1);
}

#[test]
fn success_auto_dismisses_on_the_runtime_clock() {
    let config = HudConfig {
        minimum_dismiss_time_interval: Duration::from_millis(200),
        ..instant_config()
    };
    let view = SharedView::default();
    let hud = spawn_hud(view.clone(), config).expect("spawn");
    let sub = hud.subscribe();

    hud.show_success("Done");
    expect_kinds(&sub, &[HudEventKind::WillAppear, HudEventKind::DidAppear]);
    assert!(matches!(
        view.seen(|seen| seen.last_content.clone()).map(|content| content.indicator),
        Some(Indicator::Icon { .. })
    ));
    let disappear = next(&sub);
    assert_eq!(disappear.kind, HudEventKind::WillDisappear);
    assert_eq!(disappear.status.as_deref(), Some("Done"));
    expect_kinds(&sub, &[HudEventKind::DidDisappear]);
    assert!(!hud.is_visible());
    hud.shutdown().expect("shutdown");
}

#[test]
fn nested_activity_over_handles_from_threads() {
    let hud = spawn_hud(NullView, instant_config()).expect("spawn");
    let sub = hud.subscribe();
    hud.show();
    expect_kinds(&sub, &[HudEventKind::WillAppear, HudEventKind::DidAppear]);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let hud = hud.clone();
            std::thread::spawn(move || hud.show())
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }
    for _ in 0..4 {
        hud.pop_activity();
    }
    std::thread::sleep(Duration::from_millis(100));
    assert!(hud.is_visible());
    assert!(sub.drain().is_empty());

    hud.pop_activity();
    expect_kinds(
        &sub,
        &[HudEventKind::WillDisappear, HudEventKind::DidDisappear],
    );
    hud.shutdown().expect("shutdown");
}

#[test]
fn dismiss_completion_runs_once_after_disappear() {
    let hud = spawn_hud(NullView, HudConfig::default()).expect("spawn");
    let sub = hud.subscribe();
    hud.show_with_status(Some("Working"));
    expect_kinds(&sub, &[HudEventKind::WillAppear, HudEventKind::DidAppear]);

    let runs = Arc::new(AtomicUsize::new(0));
    let (done_tx, done_rx) = crossbeam_channel::unbounded();
    let counter = Arc::clone(&runs);
    hud.dismiss_with_completion(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = done_tx.send(());
    });
    hud.dismiss();
    done_rx.recv_timeout(EVENT_TIMEOUT).expect("completion ran");
    expect_kinds(
        &sub,
        &[HudEventKind::WillDisappear, HudEventKind::DidDisappear],
    );
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(sub.drain().is_empty());
    hud.shutdown().expect("shutdown");
}

#[test]
fn grace_hides_quick_work() {
    let config = HudConfig {
        grace_time_interval: Duration::from_millis(300),
        ..instant_config()
    };
    let hud = spawn_hud(NullView, config).expect("spawn");
    let sub = hud.subscribe();
    hud.show_with_status(Some("Quick"));
    hud.dismiss();
    std::thread::sleep(Duration::from_millis(500));
    assert!(sub.drain().is_empty());
    assert!(!hud.is_visible());
    hud.shutdown().expect("shutdown");
}

#[test]
fn touches_reported_only_with_blocking_mask() {
    let hud = spawn_hud(NullView, instant_config()).expect("spawn");
    let sub = hud.subscribe();
    hud.show();
    expect_kinds(&sub, &[HudEventKind::WillAppear, HudEventKind::DidAppear]);
    hud.touch(1.0, 1.0);

    hud.show_with_mask(Some("Blocking"), MaskType::Black);
    hud.touch(1.0, 1.0);
    let touch = next(&sub);
    assert_eq!(touch.kind, HudEventKind::DidReceiveTouchEvent);
    assert_eq!(touch.status.as_deref(), Some("Blocking"));
    hud.shutdown().expect("shutdown");
}

#[test]
fn requests_after_shutdown_are_ignored() {
    let hud = spawn_hud(NullView, instant_config()).expect("spawn");
    hud.shutdown().expect("shutdown");
    hud.show();
    hud.dismiss();
    assert!(!hud.is_visible());
}
