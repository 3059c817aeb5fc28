//! Print decorations: the time ruler and page markers.

use lifeline_protocol::{Paint, Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken};

use super::metrics::TIMELINE_TEXT_TOP;
use super::pass::{PagePosition, Pass};

const RULER_STEP_PX: i32 = 5;
const MINOR_TICK_PX: i32 = 10;
const MAJOR_TICK_PX: i32 = 100;
const MARKER_FONT_SIZE: f64 = 10.0;

impl Pass<'_> {
    /// Ruler along the bottom of a printed page: a minor tick every 10 px,
    /// a marker and time label every 100 px.
    pub(crate) fn draw_timeline(&mut self, top: i32) {
        let left = self.left_margin();
        let max = self.width - self.metrics.right_margin;
        let text = self.config.text;
        let y = |dy: i32| f64::from(top + dy);

        self.push(RenderCommand::DrawRect {
            rect: Rect::new(
                0.0,
                f64::from(top),
                f64::from(self.width),
                f64::from(self.metrics.timeline_height),
            ),
            fill: Paint::Token(ThemeToken::TimelineBackground),
            border_color: None,
            label: None,
        });
        self.push(RenderCommand::DrawLine {
            from: Point::new(f64::from(left), y(0)),
            to: Point::new(f64::from(self.width - 1), y(0)),
            color: ThemeToken::TimelineTick,
            width: 1.0,
        });

        let mut pos = left;
        while pos < max {
            let offset = pos - left;
            let x = f64::from(pos);
            if offset % MAJOR_TICK_PX == 0 {
                self.push(RenderCommand::FillPolygon {
                    points: vec![
                        Point::new(x, y(4)),
                        Point::new(x + 3.0, y(11)),
                        Point::new(x - 3.0, y(11)),
                    ],
                    color: ThemeToken::TimelineTick,
                });

                let label = self
                    .config
                    .time_display
                    .format(self.mapping.time_for_pixel(pos));
                let label_width = text.text_width(&label);
                // keep the first and last labels on the page
                let label_x = if pos == left {
                    pos - 3
                } else if pos + RULER_STEP_PX >= max {
                    max - label_width
                } else {
                    pos - label_width / 2
                };
                self.push(RenderCommand::DrawText {
                    position: Point::new(f64::from(label_x), y(TIMELINE_TEXT_TOP + text.ascent)),
                    text: SharedStr::from(label),
                    color: ThemeToken::TimelineText,
                    font_size: text.font_size,
                    align: TextAlign::Left,
                });
            } else if offset % MINOR_TICK_PX == 0 {
                self.push(RenderCommand::DrawLine {
                    from: Point::new(x, y(5)),
                    to: Point::new(x, y(8)),
                    color: ThemeToken::TimelineTick,
                    width: 1.0,
                });
            }
            pos += RULER_STEP_PX;
        }
    }

    /// `" i/n "` in the top right corner for the time slice and in the
    /// bottom left corner for the component band.
    pub(crate) fn draw_page_markers(&mut self, page: PagePosition) {
        let th = self.config.text.height;

        let across = format!(" {}/{} ", page.index.0 + 1, page.count.0);
        let tw = self.config.text.text_width(&across);
        self.draw_horizontal_marker(&across, self.width - (tw + th), th / 2);

        let down = format!(" {}/{} ", page.index.1 + 1, page.count.1);
        self.draw_vertical_marker(&down, 0, self.height - self.metrics.timeline_height - 2 * th);
    }

    /// Label between a left and a right pointing triangle, centered on `y`.
    fn draw_horizontal_marker(&mut self, label: &str, x: i32, y: i32) {
        let th = self.config.text.height;
        let tw = self.config.text.text_width(label);
        let p = |px: i32, py: i32| Point::new(f64::from(px), f64::from(py));

        self.marker_box(label, x + th / 2, y - th / 2);
        self.push(RenderCommand::FillPolygon {
            points: vec![p(x, y), p(x + th / 2, y - th / 2), p(x + th / 2, y + th / 2)],
            color: ThemeToken::PageMarkerText,
        });
        self.push(RenderCommand::FillPolygon {
            points: vec![
                p(x + tw + th, y),
                p(x + tw + th / 2, y - th / 2),
                p(x + tw + th / 2, y + th / 2),
            ],
            color: ThemeToken::PageMarkerText,
        });
    }

    /// Label between an up and a down pointing triangle; `top` is the top
    /// of the label.
    fn draw_vertical_marker(&mut self, label: &str, x: i32, top: i32) {
        let th = self.config.text.height;
        let tw = self.config.text.text_width(label);
        let mid = x + tw / 2;
        let p = |px: i32, py: i32| Point::new(f64::from(px), f64::from(py));

        self.marker_box(label, x, top);
        self.push(RenderCommand::FillPolygon {
            points: vec![p(mid, top - th / 2), p(mid - th / 2, top), p(mid + th / 2, top)],
            color: ThemeToken::PageMarkerText,
        });
        let bottom = top + th;
        self.push(RenderCommand::FillPolygon {
            points: vec![
                p(mid, bottom + th / 2),
                p(mid - th / 2, bottom),
                p(mid + th / 2, bottom),
            ],
            color: ThemeToken::PageMarkerText,
        });
    }

    fn marker_box(&mut self, label: &str, x: i32, top: i32) {
        let th = self.config.text.height;
        let tw = self.config.text.text_width(label);
        self.push(RenderCommand::DrawRect {
            rect: Rect::new(f64::from(x), f64::from(top), f64::from(tw), f64::from(th)),
            fill: Paint::Token(ThemeToken::PageMarkerBackground),
            border_color: None,
            label: None,
        });
        self.push(RenderCommand::DrawText {
            position: Point::new(f64::from(x), f64::from(top + self.config.text.ascent)),
            text: SharedStr::from(label),
            color: ThemeToken::PageMarkerText,
            font_size: MARKER_FONT_SIZE,
            align: TextAlign::Left,
        });
    }
}
