//! `HudView` that draws the HUD card into the terminal with ratatui.
//!
//! Terminal cells stand in for points: sizes and offsets from the config are
//! divided by a fixed cell size, and alpha is blended against a dark backdrop.

use std::io::{self, Stdout, Write};
use std::time::Instant;

use hudkit::{
    AnimationType, Appearance, AttachTarget, Color as HudColor, Content, HapticEvent, HudView,
    Indicator, MaskBehavior, Placement,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

const FLAT_SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const NATIVE_SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
const SPINNER_FRAME_MS: u128 = 100;
const RING_BAR_WIDTH: usize = 16;
const CARD_MIN_WIDTH: u16 = 14;
const CARD_PADDING: u16 = 2;
const POINTS_PER_COLUMN: f32 = 8.0;
const POINTS_PER_ROW: f32 = 16.0;
/// Assumed terminal background for alpha blending.
const BACKDROP: HudColor = HudColor::rgba(0.12, 0.12, 0.12, 1.0);

pub(crate) struct TerminalView {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    attached: bool,
    content: Option<Content>,
    appearance: Option<Appearance>,
    placement: Option<Placement>,
    card: Rect,
    spinner_epoch: Instant,
}

impl TerminalView {
    pub(crate) fn new() -> io::Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self {
            terminal,
            attached: false,
            content: None,
            appearance: None,
            placement: None,
            card: Rect::default(),
            spinner_epoch: Instant::now(),
        })
    }

    fn redraw(&mut self) {
        let Self {
            terminal,
            attached,
            content,
            appearance,
            placement,
            card,
            spinner_epoch,
        } = self;
        let frame_index = (spinner_epoch.elapsed().as_millis() / SPINNER_FRAME_MS) as usize;
        let result = terminal.draw(|frame| {
            *card = match (*attached, content.as_ref(), appearance.as_ref()) {
                (true, Some(content), Some(appearance)) if appearance.opacity > 0.0 => {
                    draw_hud(frame, content, appearance, placement.as_ref(), frame_index)
                }
                _ => Rect::default(),
            };
        });
        if let Err(err) = result {
            tracing::warn!(%err, "terminal draw failed");
        }
    }
}

impl HudView for TerminalView {
    fn attach(&mut self, target: &AttachTarget) {
        if !self.attached {
            tracing::debug!(?target, "terminal view attached");
        }
        self.attached = true;
        self.redraw();
    }

    fn detach(&mut self) {
        self.attached = false;
        self.content = None;
        self.appearance = None;
        self.redraw();
    }

    fn present(&mut self, content: &Content) {
        self.content = Some(content.clone());
        self.redraw();
    }

    fn apply(&mut self, appearance: &Appearance) {
        self.appearance = Some(appearance.clone());
        self.redraw();
    }

    fn reposition(&mut self, placement: &Placement) {
        self.placement = Some(*placement);
        self.redraw();
    }

    fn cancel_animations(&mut self) {
        self.spinner_epoch = Instant::now();
    }

    fn card_contains(&self, x: f32, y: f32) -> bool {
        if self.card.area() == 0 || x < 0.0 || y < 0.0 {
            return false;
        }
        let (col, row) = (x as u16, y as u16);
        col >= self.card.left()
            && col < self.card.right()
            && row >= self.card.top()
            && row < self.card.bottom()
    }

    fn haptic(&mut self, event: HapticEvent) {
        // The closest a terminal gets to a haptic tap.
        if let HapticEvent::Notify(_) = event {
            let backend = self.terminal.backend_mut();
            let _ = backend.write_all(b"\x07");
            let _ = backend.flush();
        }
    }

    fn tick(&mut self) {
        if matches!(
            self.content.as_ref().map(|content| &content.indicator),
            Some(Indicator::Spinner { .. })
        ) {
            self.redraw();
        }
    }
}

fn draw_hud(
    frame: &mut Frame<'_>,
    content: &Content,
    appearance: &Appearance,
    placement: Option<&Placement>,
    frame_index: usize,
) -> Rect {
    let area = frame.size();
    let opacity = appearance.opacity.clamp(0.0, 1.0);
    draw_mask(frame, area, appearance.mask, opacity);

    let lines = card_lines(content, frame_index);
    let rect = card_rect(area, &lines, content, placement, appearance.scale);
    let palette = content.palette;
    let fg = blend(palette.foreground, opacity);
    let bg = blend(palette.card_background, opacity);
    let accent = match &content.indicator {
        Indicator::Icon { tint: None, .. } => fg,
        Indicator::Icon {
            tint: Some(tint), ..
        } => blend(*tint, opacity),
        Indicator::Spinner { .. } | Indicator::Ring { .. } => blend(palette.image_tint, opacity),
    };
    let border = content
        .border
        .map(|(color, _)| blend(color, opacity))
        .unwrap_or(fg);

    let text: Vec<Line> = lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                Line::from(Span::styled(line, Style::default().fg(accent)))
            } else {
                Line::from(line)
            }
        })
        .collect();
    let card = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(fg).bg(bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(Clear, rect);
    frame.render_widget(card, rect);
    rect
}

fn draw_mask(frame: &mut Frame<'_>, area: Rect, mask: MaskBehavior, opacity: f32) {
    let buffer = frame.buffer_mut();
    match mask {
        MaskBehavior::PassThrough | MaskBehavior::Transparent => {}
        MaskBehavior::Solid(color) => {
            let fill = blend(color, opacity);
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    buffer.get_mut(x, y).set_bg(fill);
                }
            }
        }
        MaskBehavior::RadialGradient { inner, outer } => {
            let cx = f32::from(area.width) / 2.0;
            let cy = f32::from(area.height) / 2.0;
            let radius = cx.max(cy * 2.0).max(1.0);
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    let dx = f32::from(x - area.left()) - cx;
                    // Cells are about twice as tall as they are wide.
                    let dy = (f32::from(y - area.top()) - cy) * 2.0;
                    let t = ((dx * dx + dy * dy).sqrt() / radius).clamp(0.0, 1.0);
                    buffer.get_mut(x, y).set_bg(blend(lerp(inner, outer, t), opacity));
                }
            }
        }
    }
}

/// Indicator line first, then a spacer and the status lines.
fn card_lines(content: &Content, frame_index: usize) -> Vec<String> {
    let indicator = match &content.indicator {
        Indicator::Spinner { animation } => {
            let frames = match animation {
                AnimationType::Flat => FLAT_SPINNER_FRAMES,
                AnimationType::Native => NATIVE_SPINNER_FRAMES,
            };
            frames[frame_index % frames.len()].to_string()
        }
        Indicator::Ring { progress } => ring_bar(*progress),
        Indicator::Icon { image, .. } => image.glyph().to_string(),
    };
    let mut lines = vec![indicator];
    if let Some(status) = content.status.as_deref() {
        lines.push(String::new());
        lines.extend(status.lines().map(str::to_string));
    }
    lines
}

fn ring_bar(progress: f32) -> String {
    let progress = progress.clamp(0.0, 1.0);
    let filled = (progress * RING_BAR_WIDTH as f32).round() as usize;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(RING_BAR_WIDTH - filled),
        (progress * 100.0).round() as u32
    )
}

fn card_rect(
    area: Rect,
    lines: &[String],
    content: &Content,
    placement: Option<&Placement>,
    scale: f32,
) -> Rect {
    let text_width = lines
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .max()
        .unwrap_or(0) as u16;
    let min_cols = (content.minimum_size.width / POINTS_PER_COLUMN).ceil() as u16;
    let min_rows = (content.minimum_size.height / POINTS_PER_ROW).ceil() as u16;
    let base_width = (text_width + 2 * CARD_PADDING + 2)
        .max(CARD_MIN_WIDTH)
        .max(min_cols);
    let width = ((f32::from(base_width) * scale.max(0.0)).round() as u16)
        .max(text_width + 2)
        .min(area.width);
    let height = (lines.len() as u16 + 2).max(min_rows).min(area.height);

    let (offset_cols, offset_rows, keyboard_rows) = match placement {
        Some(placement) => (
            (placement.offset.horizontal / POINTS_PER_COLUMN).round() as i32,
            (placement.offset.vertical / POINTS_PER_ROW).round() as i32,
            (placement.keyboard_height / POINTS_PER_ROW).round() as i32,
        ),
        None => (0, 0, 0),
    };
    let usable_height = (i32::from(area.height) - keyboard_rows).max(i32::from(height));
    let x = i32::from(area.x) + (i32::from(area.width) - i32::from(width)) / 2 + offset_cols;
    let y = i32::from(area.y) + (usable_height - i32::from(height)) / 2 + offset_rows;
    let max_x = i32::from(area.right()) - i32::from(width);
    let max_y = i32::from(area.bottom()) - i32::from(height);
    Rect::new(
        x.clamp(i32::from(area.x), max_x.max(i32::from(area.x))) as u16,
        y.clamp(i32::from(area.y), max_y.max(i32::from(area.y))) as u16,
        width,
        height,
    )
}

/// Composite `color` at `opacity` over the backdrop.
fn blend(color: HudColor, opacity: f32) -> Color {
    let alpha = (color.a * opacity).clamp(0.0, 1.0);
    let mix = |top: f32, bottom: f32| bottom * (1.0 - alpha) + top * alpha;
    let (r, g, b) = HudColor::rgba(
        mix(color.r, BACKDROP.r),
        mix(color.g, BACKDROP.g),
        mix(color.b, BACKDROP.b),
        1.0,
    )
    .to_rgb8();
    Color::Rgb(r, g, b)
}

fn lerp(from: HudColor, to: HudColor, t: f32) -> HudColor {
    let mix = |a: f32, b: f32| a + (b - a) * t;
    HudColor::rgba(
        mix(from.r, to.r),
        mix(from.g, to.g),
        mix(from.b, to.b),
        mix(from.a, to.a),
    )
}
