use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::time::TimeDisplay;

/// Font measurements the layout is computed from, in device pixels.
///
/// The engine never measures text itself. Hosts fill this in from whatever
/// font their surface uses; the terminal host uses one cell per glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    /// Line height of the main font.
    pub height: i32,
    pub ascent: i32,
    /// Advance of one glyph of the main font.
    pub char_width: i32,
    /// Point size handed to renderers for labels and letters.
    pub font_size: f64,
    /// Subletters use a font this much smaller.
    pub small_scale: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            height: 14,
            ascent: 11,
            char_width: 8,
            font_size: 12.0,
            small_scale: 0.7,
        }
    }
}

impl TextMetrics {
    pub fn descent(&self) -> i32 {
        self.height - self.ascent
    }

    pub fn small_char_width(&self) -> i32 {
        (f64::from(self.char_width) * self.small_scale).round() as i32
    }

    pub fn small_font_size(&self) -> f64 {
        self.font_size * self.small_scale
    }

    pub fn text_width(&self, text: &str) -> i32 {
        self.char_width * text.chars().count() as i32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub text: TextMetrics,
    pub right_margin: i32,
    pub time_display: TimeDisplay,
    /// Delay before the first partial repaint of a long render.
    pub first_tick_ms: u64,
    /// Delay between later partial repaints.
    pub next_tick_ms: u64,
    /// Half-width of the strip searched for events around the pointer.
    pub event_near_radius: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            text: TextMetrics::default(),
            right_margin: 5,
            time_display: TimeDisplay::default(),
            first_tick_ms: 1000,
            next_tick_ms: 500,
            event_near_radius: 20,
        }
    }
}

impl RenderConfig {
    pub fn first_tick(&self) -> Duration {
        Duration::from_millis(self.first_tick_ms)
    }

    pub fn next_tick(&self) -> Duration {
        Duration::from_millis(self.next_tick_ms)
    }
}
