use crate::time::Time;

/// Affine map between a time window and device columns.
///
/// `span` is the time covered by the usable width. On screen it equals the
/// view's window; on printed pages it is the page capacity, so the last page
/// of a trace may end before the right margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapping {
    pub min: Time,
    pub span: Time,
    pub left_margin: i32,
    pub right_margin: i32,
    pub width: i32,
}

impl TimeMapping {
    pub fn usable_width(&self) -> i32 {
        self.width - self.left_margin - self.right_margin
    }

    /// `left_margin + floor((t - min) / span * usable_width)`.
    pub fn pixel_position_for_time(&self, t: Time) -> i32 {
        let usable = self.usable_width();
        if self.span.raw() <= 0 || usable <= 0 {
            return self.left_margin;
        }
        let ratio = (t - self.min) / self.span;
        let offset = (ratio * f64::from(usable)).floor();
        self.left_margin + offset.clamp(f64::from(i32::MIN / 2), f64::from(i32::MAX / 2)) as i32
    }

    /// Inverse of [`TimeMapping::pixel_position_for_time`]; columns left of
    /// the margin map to `min`.
    pub fn time_for_pixel(&self, x: i32) -> Time {
        let usable = self.usable_width();
        if x < self.left_margin || usable <= 0 {
            return self.min;
        }
        let pos = f64::from(x - self.left_margin) / f64::from(usable);
        Time::scale(self.min, self.min + self.span, pos)
    }

    /// Time covered by one pixel column.
    pub fn resolution(&self) -> f64 {
        let usable = self.usable_width().max(1);
        self.span.raw() as f64 / f64::from(usable)
    }
}
