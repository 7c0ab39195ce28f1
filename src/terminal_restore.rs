//! Terminal mode bookkeeping for terminal-backed HUD views.
//!
//! Whatever the guard switched on is switched back off on drop, and on panic
//! through a hook installed once per process.

use crossterm::{
    cursor::{Hide, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

static RAW_MODE: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN: AtomicBool = AtomicBool::new(false);
static MOUSE_CAPTURE: AtomicBool = AtomicBool::new(false);
static CURSOR_HIDDEN: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: OnceLock<()> = OnceLock::new();

pub struct TerminalGuard;

impl TerminalGuard {
    pub fn new() -> Self {
        install_panic_hook();
        TerminalGuard
    }

    /// Raw mode, alternate screen, hidden cursor and mouse capture in one go.
    pub fn enter_fullscreen(&self, stdout: &mut impl Write) -> io::Result<()> {
        enable_raw_mode()?;
        RAW_MODE.store(true, Ordering::SeqCst);
        execute!(stdout, EnterAlternateScreen)?;
        ALT_SCREEN.store(true, Ordering::SeqCst);
        execute!(stdout, Hide)?;
        CURSOR_HIDDEN.store(true, Ordering::SeqCst);
        execute!(stdout, EnableMouseCapture)?;
        MOUSE_CAPTURE.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn restore(&self) {
        restore_terminal();
    }
}

impl Default for TerminalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Undo only what was enabled. Safe to call more than once.
pub fn restore_terminal() {
    if RAW_MODE.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
    let mut stdout = io::stdout();
    if MOUSE_CAPTURE.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, DisableMouseCapture);
    }
    if ALT_SCREEN.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
    if CURSOR_HIDDEN.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, Show);
    }
    let _ = stdout.flush();
}

pub fn install_panic_hook() {
    PANIC_HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(%location, "panic: {info}");
            previous(info);
        }));
    });
}
