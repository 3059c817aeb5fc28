//! Rasterises render commands into terminal cells.

use lifeline_core::render::{Surface, TextMetrics};
use lifeline_protocol::{Paint, Point, RenderCommand, ThemeToken};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

/// Device pixels covered by one terminal cell.
#[derive(Debug, Clone, Copy)]
pub struct CellSize {
    pub width: i32,
    pub height: i32,
}

impl CellSize {
    /// One glyph wide, one label box high.
    pub fn for_text(text: &TextMetrics) -> Self {
        Self {
            width: text.char_width,
            height: text.height + 2,
        }
    }
}

/// Samples taken along each arrow curve.
const CUBIC_STEPS: usize = 24;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background => Color::Black,
        ThemeToken::LabelPanel => Color::Rgb(24, 24, 24),
        ThemeToken::LabelBorder => Color::DarkGray,
        ThemeToken::LabelText => Color::White,
        ThemeToken::CompositeLabel => Color::Rgb(40, 70, 110),
        ThemeToken::LeafLabel => Color::Rgb(45, 45, 45),
        ThemeToken::Lifeline => Color::Gray,
        ThemeToken::EventTick => Color::Yellow,
        ThemeToken::EventLetter => Color::LightYellow,
        ThemeToken::StateBorder => Color::DarkGray,
        ThemeToken::StateText => Color::Black,
        ThemeToken::GroupArrow => Color::LightRed,
        ThemeToken::TimelineBackground => Color::Rgb(24, 24, 24),
        ThemeToken::TimelineTick => Color::Gray,
        ThemeToken::TimelineText => Color::White,
        ThemeToken::PageMarkerBackground => Color::Blue,
        ThemeToken::PageMarkerText => Color::White,
    }
}

fn paint_to_color(paint: Paint) -> Color {
    match paint {
        Paint::Token(token) => theme_to_color(token),
        Paint::Rgba(c) => {
            let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            Color::Rgb(byte(c.r), byte(c.g), byte(c.b))
        }
    }
}

/// Cell-space painter over one area of a buffer.
struct Canvas<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    cell: CellSize,
    /// Active clip in cells, relative to `area`.
    clip: Option<(i32, i32, i32, i32)>,
}

impl Canvas<'_> {
    fn to_cell(&self, p: Point) -> (i32, i32) {
        (
            (p.x as i32).div_euclid(self.cell.width),
            (p.y as i32).div_euclid(self.cell.height),
        )
    }

    fn visible(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col >= i32::from(self.area.width) || row >= i32::from(self.area.height) {
            return false;
        }
        self.clip
            .is_none_or(|(left, top, right, bottom)| col >= left && col < right && row >= top && row < bottom)
    }

    fn cell(&mut self, col: i32, row: i32) -> Option<&mut ratatui::buffer::Cell> {
        if !self.visible(col, row) {
            return None;
        }
        let x = self.area.x + u16::try_from(col).ok()?;
        let y = self.area.y + u16::try_from(row).ok()?;
        self.buf.cell_mut((x, y))
    }

    fn put(&mut self, col: i32, row: i32, ch: char, fg: Color) {
        if let Some(cell) = self.cell(col, row) {
            cell.set_char(ch).set_fg(fg);
        }
    }

    fn fill(&mut self, col: i32, row: i32, bg: Color) {
        if let Some(cell) = self.cell(col, row) {
            cell.set_char(' ').set_bg(bg);
        }
    }

    fn text(&mut self, col: i32, row: i32, text: &str, fg: Color, limit: Option<i32>) {
        for (i, ch) in text.chars().enumerate() {
            let i = i32::try_from(i).unwrap_or(i32::MAX);
            if limit.is_some_and(|l| i >= l) {
                break;
            }
            self.put(col + i, row, ch, fg);
        }
    }

    fn command(&mut self, cmd: &RenderCommand) {
        match cmd {
            RenderCommand::Clear { color } => {
                let bg = theme_to_color(*color);
                for row in 0..i32::from(self.area.height) {
                    for col in 0..i32::from(self.area.width) {
                        self.fill(col, row, bg);
                    }
                }
            }
            RenderCommand::DrawRect {
                rect, fill, label, ..
            } => {
                let (left, top) = self.to_cell(Point::new(rect.x, rect.y));
                let (right, bottom) = self.to_cell(Point::new(rect.x + rect.w, rect.y + rect.h));
                let right = right.max(left + 1);
                let bg = paint_to_color(*fill);
                // a box thinner than a cell still gets one row
                let rows = top..bottom.max(top + 1);
                for row in rows.clone() {
                    for col in left..right {
                        self.fill(col, row, bg);
                    }
                }
                if let Some(label) = label {
                    let mid = (rows.start + rows.end - 1) / 2;
                    let fg = match fill {
                        Paint::Rgba(_) => Color::Black,
                        Paint::Token(_) => theme_to_color(ThemeToken::LabelText),
                    };
                    self.text(left, mid, label, fg, Some(right - left));
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => {
                // baseline sits on the bottom of the glyph's cell
                let (col, row) = self.to_cell(Point::new(position.x, position.y - 1.0));
                self.text(col, row, text, theme_to_color(*color), None);
            }
            RenderCommand::DrawLine {
                from, to, color, ..
            } => {
                let fg = theme_to_color(*color);
                let (c1, r1) = self.to_cell(*from);
                let (c2, r2) = self.to_cell(*to);
                if r1 == r2 {
                    for col in c1.min(c2)..=c1.max(c2) {
                        self.put(col, r1, '─', fg);
                    }
                } else if c1 == c2 {
                    for row in r1.min(r2)..=r1.max(r2) {
                        self.put(c1, row, '│', fg);
                    }
                } else {
                    self.put(c1, r1, '·', fg);
                    self.put(c2, r2, '·', fg);
                }
            }
            RenderCommand::DrawCubic {
                from,
                ctrl1,
                ctrl2,
                to,
                color,
                ..
            } => {
                let fg = theme_to_color(*color);
                for step in 0..=CUBIC_STEPS {
                    let t = step as f64 / CUBIC_STEPS as f64;
                    let u = 1.0 - t;
                    let at = |a: f64, b: f64, c: f64, d: f64| {
                        u * u * u * a + 3.0 * u * u * t * b + 3.0 * u * t * t * c + t * t * t * d
                    };
                    let p = Point::new(
                        at(from.x, ctrl1.x, ctrl2.x, to.x),
                        at(from.y, ctrl1.y, ctrl2.y, to.y),
                    );
                    let (col, row) = self.to_cell(p);
                    self.put(col, row, '·', fg);
                }
            }
            RenderCommand::FillPolygon { points, color } => {
                if let Some(tip) = points.first() {
                    let (col, row) = self.to_cell(*tip);
                    self.put(col, row, '▪', theme_to_color(*color));
                }
            }
            RenderCommand::SetClip { rect } => {
                let (left, top) = self.to_cell(Point::new(rect.x, rect.y));
                let (right, bottom) = self.to_cell(Point::new(rect.x + rect.w, rect.y + rect.h));
                self.clip = Some((left, top, right, bottom));
            }
            RenderCommand::ClearClip => self.clip = None,
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

/// Paint `surface` into `area`, one cell per `cell` device pixels.
pub fn draw_surface(buf: &mut Buffer, area: Rect, surface: &Surface, cell: CellSize) {
    let mut canvas = Canvas {
        buf,
        area,
        cell,
        clip: None,
    };
    for cmd in &surface.commands {
        canvas.command(cmd);
    }
}
