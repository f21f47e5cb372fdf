// src/config.rs

//! Defines the configuration structures for the renderer.
//!
//! The tree can be deserialized from a JSON file. Every section carries
//! `#[serde(default)]`, so a file only needs to name the settings it
//! changes. Components receive the parts they need through their
//! constructors; only the binary reads the process-wide [`CONFIG`].

use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::color::{Color, NamedColor};

/// Environment variable naming the JSON file [`CONFIG`] is loaded from.
pub const CONFIG_PATH_ENV: &str = "CORE_RENDER_CONFIG";

/// The process-wide configuration.
///
/// Loaded once from the file named by `CORE_RENDER_CONFIG`; falls back to
/// defaults when the variable is unset or the file cannot be read.
pub static CONFIG: Lazy<Config> = Lazy::new(|| match std::env::var(CONFIG_PATH_ENV) {
    Ok(path) => match Config::load(&path) {
        Ok(config) => {
            info!("Config: Loaded {}", path);
            config
        }
        Err(e) => {
            warn!("Config: {:#}; using defaults", e);
            Config::default()
        }
    },
    Err(_) => Config::default(),
});

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Render loop timing and retry policy.
    pub render: RenderConfig,
    /// Default colors.
    pub colors: ColorConfig,
    /// Blinking, grid lines and soft fonts.
    pub behavior: BehaviorConfig,
}

impl Config {
    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid configuration JSON")
    }
}

// --- Render Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Minimum time between two frames of an engine, in milliseconds.
    /// 8ms caps painting at roughly 120 frames per second.
    pub throttle_ms: u64,
    /// How many times a failing frame is attempted before the renderer
    /// enters its error state.
    pub paint_retries: u32,
    /// Back-off between attempts; attempt `n` waits `n * retry_backoff_ms`.
    pub retry_backoff_ms: u64,
    /// Name given to the render thread.
    pub thread_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            throttle_ms: 8,
            paint_retries: 3,
            retry_backoff_ms: 150,
            thread_name: "render".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

// --- Color Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub foreground: Color,
    pub background: Color,
    pub cursor: Color,
    pub selection_background: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            foreground: Color::Named(NamedColor::White),
            background: Color::Named(NamedColor::Black),
            cursor: Color::Named(NamedColor::White),
            selection_background: Color::Rgb(0x40, 0x40, 0x60),
        }
    }
}

// --- Behavior Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BehaviorConfig {
    /// If false, blink-attributed text is always drawn normally
    /// (the "reduce motion" setting).
    pub blinking_allowed: bool,
    /// Cursor blink period in milliseconds. 0 disables cursor blinking.
    pub cursor_blink_interval_ms: u64,
    /// Whether box-drawing grid line attributes are honored.
    pub grid_lines_allowed: bool,
    /// First code point of the soft-font (DRCS) range.
    pub soft_font_first_char: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            blinking_allowed: true,
            cursor_blink_interval_ms: 530,
            grid_lines_allowed: true,
            soft_font_first_char: 0xEF20,
        }
    }
}

impl BehaviorConfig {
    pub fn cursor_blink_interval(&self) -> Option<Duration> {
        (self.cursor_blink_interval_ms > 0).then(|| Duration::from_millis(self.cursor_blink_interval_ms))
    }
}
