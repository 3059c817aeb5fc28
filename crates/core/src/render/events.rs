//! Stage 3: event ticks and letter glyphs with overlap resolution.

use lifeline_protocol::{Point, RenderCommand, SharedStr, TextAlign, ThemeToken};

use super::geometry::PixelRect;
use super::metrics::{EVENT_LINE_AND_LETTER_SPACING, EVENT_LINE_EXTRA_HEIGHT};
use super::pass::{Canceled, Pass};

/// Ticks closer than this to the previous one on a lifeline are skipped.
const TICK_SPACING: i32 = 3;

/// A letter waiting to be drawn once every event of the page is placed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Glyph {
    pub(crate) letter: char,
    pub(crate) subletter: Option<char>,
    /// Baseline origin of the letter; the subletter follows it.
    pub(crate) origin: (i32, i32),
    pub(crate) subletter_x: i32,
    pub(crate) bound: PixelRect,
    pub(crate) priority: i32,
}

/// Insert `glyph` into one lifeline's retained glyphs, kept sorted by right
/// edge. Overlapping glyphs of lower priority are dropped; if any
/// overlapping glyph has equal or higher priority, `glyph` itself is
/// dropped and nothing else changes. Returns whether it was kept.
pub(crate) fn place_glyph(retained: &mut Vec<Glyph>, glyph: Glyph) -> bool {
    let mut overlapping = Vec::new();
    for (i, existing) in retained.iter().enumerate().rev() {
        if existing.bound.right() <= glyph.bound.x {
            break;
        }
        if existing.bound.intersects(&glyph.bound) {
            if existing.priority >= glyph.priority {
                return false;
            }
            overlapping.push(i);
        }
    }

    // indices are descending, so removal keeps the rest valid
    for i in overlapping {
        retained.remove(i);
    }
    let at = retained.partition_point(|d| d.bound.right() <= glyph.bound.right());
    retained.insert(at, glyph);
    true
}

impl Pass<'_> {
    pub(crate) fn draw_events(&mut self) -> Result<(), Canceled> {
        let lifelines = self.view.visible_components().len();
        let mut letters: Vec<Vec<Glyph>> = vec![Vec::new(); lifelines];
        let mut last_tick = vec![-10; lifelines];

        let text = self.config.text;
        let teh = self.metrics.text_elements_height;
        let letter_width = text.char_width;
        let reach = teh / 2 + EVENT_LINE_EXTRA_HEIGHT;

        let view = self.view.clone();
        let mut cursor = view.rewind();
        while let Some(e) = cursor.next_event() {
            let Some(lifeline) = view.lifeline(e.component) else {
                continue;
            };
            if !self.on_page(lifeline) {
                continue;
            }
            let pos = self.mapping.pixel_position_for_time(e.time);
            if pos < 0 || pos >= self.width {
                continue;
            }
            let y = self.geometry.lifeline_position[lifeline];

            if pos >= last_tick[lifeline] + TICK_SPACING {
                self.push(RenderCommand::DrawLine {
                    from: Point::new(f64::from(pos), f64::from(y - reach)),
                    to: Point::new(f64::from(pos), f64::from(y + reach)),
                    color: ThemeToken::EventTick,
                    width: 2.0,
                });
                last_tick[lifeline] = pos;
            }
            if let Ok(column) = usize::try_from(pos) {
                self.geometry.events_near[lifeline][column] = true;
            }

            let subletter_width = if e.subletter.is_some() {
                text.small_char_width()
            } else {
                0
            };
            let mut x = pos;
            let mut baseline = y - reach - EVENT_LINE_AND_LETTER_SPACING;
            if e.corner.is_left() {
                x = pos - letter_width - subletter_width - 1;
            }
            if e.corner.is_bottom() {
                baseline = y + reach + EVENT_LINE_AND_LETTER_SPACING + text.ascent;
            }

            place_glyph(
                &mut letters[lifeline],
                Glyph {
                    letter: e.letter,
                    subletter: e.subletter,
                    origin: (x, baseline),
                    subletter_x: x + letter_width,
                    bound: PixelRect::new(
                        x,
                        baseline - text.ascent,
                        letter_width + subletter_width + 1,
                        text.height,
                    ),
                    priority: e.priority,
                },
            );

            self.checkpoint()?;
        }

        let kept: usize = letters.iter().map(Vec::len).sum();
        tracing::trace!(kept, "event glyphs resolved");
        for glyph in letters.into_iter().flatten() {
            self.draw_glyph(&glyph);
        }
        Ok(())
    }

    fn draw_glyph(&mut self, glyph: &Glyph) {
        let text = self.config.text;
        let (x, y) = glyph.origin;
        self.push(RenderCommand::DrawText {
            position: Point::new(f64::from(x), f64::from(y)),
            text: SharedStr::from(glyph.letter.to_string()),
            color: ThemeToken::EventLetter,
            font_size: text.font_size,
            align: TextAlign::Left,
        });
        if let Some(sub) = glyph.subletter {
            self.push(RenderCommand::DrawText {
                position: Point::new(f64::from(glyph.subletter_x), f64::from(y)),
                text: SharedStr::from(sub.to_string()),
                color: ThemeToken::EventLetter,
                font_size: text.small_font_size(),
                align: TextAlign::Left,
            });
        }
    }
}
