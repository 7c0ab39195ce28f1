//! Opacity/scale transitions, sampled by time instead of driven by a render loop.

use std::time::Instant;

/// Pop-in starts this much larger; pop-out shrinks by the same factor.
pub(crate) const OVERSHOOT_SCALE: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Transition {
    pub(crate) generation: u64,
    pub(crate) from_opacity: f32,
    pub(crate) to_opacity: f32,
    pub(crate) from_scale: f32,
    pub(crate) to_scale: f32,
    pub(crate) starts_at: Instant,
    pub(crate) ends_at: Instant,
}

impl Transition {
    fn fraction(&self, now: Instant) -> f32 {
        if now <= self.starts_at {
            return 0.0;
        }
        if now >= self.ends_at {
            return 1.0;
        }
        let total = self.ends_at.duration_since(self.starts_at).as_secs_f32();
        let elapsed = now.duration_since(self.starts_at).as_secs_f32();
        (elapsed / total).clamp(0.0, 1.0)
    }

    pub(crate) fn opacity(&self, now: Instant) -> f32 {
        let t = self.fraction(now);
        self.from_opacity + (self.to_opacity - self.from_opacity) * t
    }

    pub(crate) fn scale(&self, now: Instant) -> f32 {
        let t = self.fraction(now);
        self.from_scale + (self.to_scale - self.from_scale) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FadeState {
    Hidden,
    FadingIn(Transition),
    Shown,
    FadingOut(Transition),
}

impl FadeState {
    pub(crate) fn opacity(&self, now: Instant) -> f32 {
        match self {
            Self::Hidden => 0.0,
            Self::Shown => 1.0,
            Self::FadingIn(t) | Self::FadingOut(t) => t.opacity(now),
        }
    }

    pub(crate) fn scale(&self, now: Instant) -> f32 {
        match self {
            Self::Hidden | Self::Shown => 1.0,
            Self::FadingIn(t) | Self::FadingOut(t) => t.scale(now),
        }
    }

    /// Shown or on its way there.
    pub(crate) fn is_appearing(&self) -> bool {
        matches!(self, Self::Shown | Self::FadingIn(_))
    }

    pub(crate) fn transition(&self) -> Option<&Transition> {
        match self {
            Self::FadingIn(t) | Self::FadingOut(t) => Some(t),
            Self::Hidden | Self::Shown => None,
        }
    }

    /// Fully opaque right now. A delayed dismissal has not started fading yet.
    pub(crate) fn is_fully_visible(&self, now: Instant) -> bool {
        match self {
            Self::Shown => true,
            Self::FadingOut(t) => now < t.starts_at && t.from_opacity >= 1.0,
            Self::Hidden | Self::FadingIn(_) => false,
        }
    }
}
