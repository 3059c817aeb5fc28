use super::config::{RenderConfig, TextMetrics};

/// Visible characters of a component label.
const COMPONENT_NAME_LENGTH: i32 = 11;
/// How far the event tick reaches past the lifeline label height.
pub(crate) const EVENT_LINE_EXTRA_HEIGHT: i32 = 5;
/// Gap between the event tick and its letter.
pub(crate) const EVENT_LINE_AND_LETTER_SPACING: i32 = 2;
/// Top of the timeline labels, relative to the timeline.
pub(crate) const TIMELINE_TEXT_TOP: i32 = 13;

/// Pixel layout derived from the font metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub text_height: i32,
    /// Height of label boxes, even.
    pub text_elements_height: i32,
    /// Vertical distance between lifelines.
    pub lifeline_stepping: i32,
    /// Y of the first lifeline.
    pub y_unparented: i32,
    /// Left margin of the first horizontal page, wide enough for labels.
    pub left_margin1: i32,
    /// Left margin of the following pages.
    pub left_margin2: i32,
    pub right_margin: i32,
    pub timeline_height: i32,
}

impl Metrics {
    pub fn new(config: &RenderConfig) -> Self {
        Self::from_text(&config.text, config.right_margin)
    }

    pub fn from_text(text: &TextMetrics, right_margin: i32) -> Self {
        let teh = (text.height + 2) / 2 * 2;
        let event_extra = EVENT_LINE_EXTRA_HEIGHT + EVENT_LINE_AND_LETTER_SPACING;
        Self {
            text_height: text.height,
            text_elements_height: teh,
            lifeline_stepping: teh * 3 + teh / 2 + event_extra * 2,
            // lifeline half, letters above it, time tooltip, tick overhang
            y_unparented: teh / 2 + teh + teh + event_extra,
            left_margin1: (COMPONENT_NAME_LENGTH + 1) * text.char_width + 30,
            left_margin2: text.height + 10,
            right_margin,
            timeline_height: TIMELINE_TEXT_TOP + text.height,
        }
    }

    /// Lifelines that fit on a printed page of `height` pixels, at least one.
    pub fn components_per_page(&self, height: i32) -> usize {
        let usable = height
            - self.timeline_height
            - (self.y_unparented - self.lifeline_stepping / 2);
        usize::try_from(usable / self.lifeline_stepping)
            .unwrap_or(0)
            .max(1)
    }

    /// Device height needed to show `components` lifelines on screen.
    pub fn required_height(&self, components: usize) -> i32 {
        let rows = i32::try_from(components).unwrap_or(i32::MAX - 1);
        self.lifeline_stepping.saturating_mul(rows + 1)
    }
}
