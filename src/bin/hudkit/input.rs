use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind};
use hudkit::{EnvironmentSignal, HudHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const INPUT_POLL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum InputAction {
    Quit,
    Touch { x: f32, y: f32 },
    Resized,
    Ignore,
}

pub(crate) fn classify(event: &Event) -> InputAction {
    match event {
        Event::Key(key) if is_quit_key(key) => InputAction::Quit,
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            InputAction::Touch {
                x: f32::from(mouse.column),
                y: f32::from(mouse.row),
            }
        }
        Event::Resize(_, _) => InputAction::Resized,
        _ => InputAction::Ignore,
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Forward terminal input to the HUD until `stop` is set or quit is pressed.
pub(crate) fn spawn_input_thread(
    hud: HudHandle,
    quit_tx: Sender<()>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(Duration::from_millis(INPUT_POLL_MS)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    tracing::warn!(%err, "terminal input poll failed");
                    break;
                }
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(%err, "terminal input read failed");
                    break;
                }
            };
            match classify(&event) {
                InputAction::Quit => {
                    let _ = quit_tx.send(());
                    break;
                }
                InputAction::Touch { x, y } => hud.touch(x, y),
                InputAction::Resized => hud.environment(EnvironmentSignal::Resized),
                InputAction::Ignore => {}
            }
        }
    })
}
