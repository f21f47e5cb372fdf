// src/engine/blinking.rs

//! The blink rendition cycle (SGR 5).

use log::trace;

use crate::glyph::TextAttribute;

/// Tracks whether blink-attributed text is currently in its faint phase.
///
/// The cycle has four phases advanced by [`toggle_blinking_rendition`]:
/// phases 0 and 1 draw normally, phases 2 and 3 draw faint. The state only
/// changes on even phases, and a redraw is only requested there if some
/// blinking text was seen on screen since the last even phase.
///
/// [`toggle_blinking_rendition`]: BlinkingState::toggle_blinking_rendition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlinkingState {
    allowed: bool,
    cycle: u8,
    in_use: bool,
    should_be_faint: bool,
}

impl Default for BlinkingState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BlinkingState {
    pub fn new(allowed: bool) -> Self {
        Self {
            allowed,
            cycle: 0,
            in_use: false,
            should_be_faint: false,
        }
    }

    /// Turns blinking on or off. Turning it off drops out of the faint phase
    /// immediately.
    pub fn set_blinking_allowed(&mut self, allowed: bool) {
        self.allowed = allowed;
        if !allowed {
            self.should_be_faint = false;
        }
    }

    pub fn is_blinking_allowed(&self) -> bool {
        self.allowed
    }

    /// Notes that `attr` was drawn. Usage accumulates until the next even phase.
    pub fn record_blinking_usage(&mut self, attr: &TextAttribute) {
        self.in_use |= attr.is_blinking();
    }

    pub fn is_blinking_faint(&self) -> bool {
        self.should_be_faint
    }

    /// Advances the cycle by one phase. Returns true if the screen needs a
    /// full redraw.
    pub fn toggle_blinking_rendition(&mut self) -> bool {
        if !self.allowed {
            return false;
        }
        self.cycle = (self.cycle + 1) % 4;
        if self.cycle % 2 != 0 {
            return false;
        }
        self.should_be_faint = self.cycle >= 2;
        // Usage is sampled per half cycle: it resets here whether or not a redraw follows.
        let redraw = std::mem::take(&mut self.in_use);
        trace!(
            "BlinkingState: cycle {} faint={} redraw={}",
            self.cycle,
            self.should_be_faint,
            redraw
        );
        redraw
    }
}
