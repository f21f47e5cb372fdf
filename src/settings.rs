// src/settings.rs

//! Rendering settings shared by the renderer and its engines: default
//! colors, global render modes and the resolution of a `TextAttribute`
//! into concrete foreground/background colors.

use bitflags::bitflags;

use crate::color::{Color, NamedColor};
use crate::config::ColorConfig;
use crate::glyph::{AttrFlags, TextAttribute};

bitflags! {
    /// Global render modes toggled by the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderMode: u8 {
        /// Blink-attributed text may render faint on the off phase.
        const BLINK_ALLOWED     = 1 << 0;
        /// Bold text in one of the eight normal colors uses the bright variant.
        const INTENSE_IS_BRIGHT = 1 << 1;
        /// DECSCNM: the whole screen is drawn in reverse video.
        const SCREEN_REVERSED   = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub default_fg: Color,
    pub default_bg: Color,
    pub cursor_color: Color,
    pub selection_background: Color,
    pub mode: RenderMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&ColorConfig::default(), true)
    }
}

impl RenderSettings {
    pub fn from_config(colors: &ColorConfig, blinking_allowed: bool) -> Self {
        let mut mode = RenderMode::INTENSE_IS_BRIGHT;
        mode.set(RenderMode::BLINK_ALLOWED, blinking_allowed);
        Self {
            default_fg: colors.foreground,
            default_bg: colors.background,
            cursor_color: colors.cursor,
            selection_background: colors.selection_background,
            mode,
        }
    }

    pub fn get_render_mode(&self, mode: RenderMode) -> bool {
        self.mode.contains(mode)
    }

    pub fn set_render_mode(&mut self, mode: RenderMode, enabled: bool) {
        self.mode.set(mode, enabled);
    }

    /// Whether the screen is globally inverted (DECSCNM).
    pub fn global_invert(&self) -> bool {
        self.get_render_mode(RenderMode::SCREEN_REVERSED)
    }

    /// Resolves `attr` into `(foreground, background)` RGB colors.
    ///
    /// `blink_faint` is the blink cycle's current "off" state; it only dims
    /// attributes that actually blink.
    pub fn attribute_colors(&self, attr: &TextAttribute, blink_faint: bool) -> (Color, Color) {
        let mut fg_source = attr.fg;
        if attr.flags.contains(AttrFlags::BOLD) && self.get_render_mode(RenderMode::INTENSE_IS_BRIGHT) {
            fg_source = brighten_if_normal(fg_source);
        }

        let mut fg = fg_source.to_rgb(self.default_fg);
        let mut bg = attr.bg.to_rgb(self.default_bg);

        if attr.is_reverse_video() != self.global_invert() {
            std::mem::swap(&mut fg, &mut bg);
        }

        if attr.is_invisible() {
            fg = bg;
        } else if attr.flags.contains(AttrFlags::FAINT) || (attr.is_blinking() && blink_faint) {
            fg = fg.dimmed();
        }

        (fg, bg)
    }

    /// The color underlines are drawn in: the attribute's explicit underline
    /// color, or its effective foreground.
    pub fn attribute_underline_color(&self, attr: &TextAttribute, blink_faint: bool) -> Color {
        if attr.underline_color.is_default() {
            self.attribute_colors(attr, blink_faint).0
        } else {
            attr.underline_color.to_rgb(self.default_fg)
        }
    }
}

fn brighten_if_normal(color: Color) -> Color {
    match color {
        Color::Named(named) => Color::Named(named.brightened()),
        Color::Indexed(idx) if idx < 8 => NamedColor::from_index(idx)
            .map(|named| Color::Named(named.brightened()))
            .unwrap_or(color),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RenderSettings {
        RenderSettings {
            default_fg: Color::Rgb(200, 200, 200),
            default_bg: Color::Rgb(0, 0, 0),
            cursor_color: Color::Rgb(255, 255, 255),
            selection_background: Color::Rgb(60, 60, 60),
            mode: RenderMode::INTENSE_IS_BRIGHT | RenderMode::BLINK_ALLOWED,
        }
    }

    #[test]
    fn defaults_resolve_to_settings_colors() {
        let (fg, bg) = settings().attribute_colors(&TextAttribute::default(), false);
        assert_eq!(fg, Color::Rgb(200, 200, 200));
        assert_eq!(bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn reverse_and_global_invert_cancel_out() {
        let mut s = settings();
        let attr = TextAttribute::default().with_flags(AttrFlags::REVERSE);
        assert_eq!(s.attribute_colors(&attr, false).0, Color::Rgb(0, 0, 0));
        s.set_render_mode(RenderMode::SCREEN_REVERSED, true);
        assert_eq!(s.attribute_colors(&attr, false).0, Color::Rgb(200, 200, 200));
    }

    #[test]
    fn bold_normal_color_is_brightened() {
        let attr = TextAttribute::new(Color::Named(NamedColor::Red), Color::Default).with_flags(AttrFlags::BOLD);
        assert_eq!(settings().attribute_colors(&attr, false).0, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn blink_faint_only_dims_blinking_text() {
        let s = settings();
        let plain = TextAttribute::default();
        let blinking = plain.with_flags(AttrFlags::BLINK);
        assert_eq!(s.attribute_colors(&plain, true).0, Color::Rgb(200, 200, 200));
        assert_eq!(s.attribute_colors(&blinking, true).0, Color::Rgb(100, 100, 100));
        assert_eq!(s.attribute_colors(&blinking, false).0, Color::Rgb(200, 200, 200));
    }

    #[test]
    fn invisible_text_takes_background_color() {
        let attr = TextAttribute::default().with_flags(AttrFlags::INVISIBLE);
        let (fg, bg) = settings().attribute_colors(&attr, false);
        assert_eq!(fg, bg);
    }
}
