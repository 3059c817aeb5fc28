//! Stage 5: group arrows.

use std::collections::HashSet;

use lifeline_protocol::{Point, RenderCommand, ThemeToken};

use crate::model::GroupKind;

use super::pass::{Canceled, Pass};

/// Arrows whose endpoints fall into the same buckets of this many pixel
/// columns are drawn once.
const DEDUP_BUCKET: i32 = 9;
/// Distance from the arrow tip back to where the curve ends.
const ARROWHEAD_LENGTH: f64 = 16.0;
/// No bend up to this angle away from horizontal.
const BEND_THRESHOLD_DEG: f64 = 10.0;
/// Bend reached for vertical arrows.
const MAX_BEND_DEG: f64 = 30.0;

/// A bent arrow from `from` to `tip`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ArrowShape {
    pub(crate) from: Point,
    pub(crate) ctrl1: Point,
    pub(crate) ctrl2: Point,
    /// Where the curve meets the arrowhead.
    pub(crate) end: Point,
    pub(crate) head: Vec<Point>,
    pub(crate) bend: f64,
}

/// Bend in degrees for an arrow tilted `tilt` degrees from horizontal.
pub(crate) fn bend_angle(tilt: f64) -> f64 {
    if tilt <= BEND_THRESHOLD_DEG {
        0.0
    } else {
        MAX_BEND_DEG * (tilt - BEND_THRESHOLD_DEG) / (90.0 - BEND_THRESHOLD_DEG)
    }
}

/// Cubic arrow from `(x1, y1)` to `(x2, y2)` in y-down device coordinates.
/// Both ends leave the straight line by the same bend, on opposite sides.
pub(crate) fn unified_arrow(x1: f64, y1: f64, x2: f64, y2: f64) -> ArrowShape {
    let (dx, dy) = (x2 - x1, y2 - y1);
    let length = dx.hypot(dy);

    // angle above the horizontal, counter-clockwise positive on screen
    let mut straight = (dx / length).clamp(-1.0, 1.0).acos().to_degrees();
    if y1 < y2 {
        straight = -straight;
    }
    let tilt = if straight.abs() < 90.0 {
        straight.abs()
    } else {
        180.0 - straight.abs()
    };
    let bend = bend_angle(tilt);

    let start_angle = if straight > 0.0 {
        straight - bend
    } else {
        straight + bend
    };
    let end_angle = if straight > 0.0 {
        straight + 180.0 + bend
    } else {
        straight + 180.0 - bend
    };

    let toward = |x: f64, y: f64, angle: f64, distance: f64| {
        let a = (-angle).to_radians();
        Point::new(x + distance * a.cos(), y + distance * a.sin())
    };

    // arrowhead outline pointing down the +y axis, rotated onto the end tangent
    let rotation = (90.0 - end_angle).to_radians();
    let (sin, cos) = rotation.sin_cos();
    let ah = ARROWHEAD_LENGTH;
    let head = [
        (0.0, 0.0),
        (ah / 3.0, -ah * 5.0 / 4.0),
        (0.0, -ah),
        (-ah / 3.0, -ah * 5.0 / 4.0),
    ]
    .into_iter()
    .map(|(px, py)| Point::new(x2 + px * cos - py * sin, y2 + px * sin + py * cos))
    .collect();

    ArrowShape {
        from: Point::new(x1, y1),
        ctrl1: toward(x1, y1, start_angle, length / 2.0),
        ctrl2: toward(x2, y2, end_angle, length / 2.0),
        end: toward(x2, y2, end_angle, ah),
        head,
        bend,
    }
}

impl Pass<'_> {
    pub(crate) fn draw_groups(&mut self) -> Result<(), Canceled> {
        let delta = self.metrics.text_elements_height / 2 + 7;
        let mut drawn: HashSet<((usize, i32), (usize, i32))> = HashSet::new();

        let view = self.view.clone();
        let mut cursor = view.rewind();
        while let Some(group) = cursor.next_group() {
            match group.kind {
                GroupKind::Arrow => {
                    let Some((first, rest)) = group.points.split_first() else {
                        continue;
                    };
                    let Some(from_ll) = view.lifeline(first.component) else {
                        continue;
                    };
                    let from_px = self.mapping.pixel_position_for_time(first.time);
                    let from_key = (from_ll, from_px / DEDUP_BUCKET);

                    for point in rest {
                        let Some(to_ll) = view.lifeline(point.component) else {
                            continue;
                        };
                        // both ends collapsed onto one composite row
                        if to_ll == from_ll {
                            continue;
                        }
                        if !self.on_page(from_ll) && !self.on_page(to_ll) {
                            continue;
                        }
                        let to_px = self.mapping.pixel_position_for_time(point.time);
                        if !drawn.insert((from_key, (to_ll, to_px / DEDUP_BUCKET))) {
                            continue;
                        }

                        let mut y1 = self.geometry.lifeline_position[from_ll];
                        let mut y2 = self.geometry.lifeline_position[to_ll];
                        if y1 < y2 {
                            y1 += delta;
                            y2 -= delta;
                        } else {
                            y1 -= delta;
                            y2 += delta;
                        }
                        let shape = unified_arrow(
                            f64::from(from_px),
                            f64::from(y1),
                            f64::from(to_px),
                            f64::from(y2),
                        );
                        self.draw_arrow(shape);
                    }
                }
            }

            self.checkpoint()?;
        }
        Ok(())
    }

    fn draw_arrow(&mut self, shape: ArrowShape) {
        self.push(RenderCommand::DrawCubic {
            from: shape.from,
            ctrl1: shape.ctrl1,
            ctrl2: shape.ctrl2,
            to: shape.end,
            color: ThemeToken::GroupArrow,
            width: 1.0,
        });
        self.push(RenderCommand::FillPolygon {
            points: shape.head,
            color: ThemeToken::GroupArrow,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lifeline_protocol::DeviceSize;

    use super::*;
    use crate::model::TraceBuilder;
    use crate::render::{NullHost, RenderConfig, TracePainter};
    use crate::time::{Time, TimeUnit};
    use crate::view::TraceView;

    /// 800 usable columns for 1000 us: one column per 1.25 us.
    const DEVICE: DeviceSize = DeviceSize {
        width: 931,
        height: 400,
    };

    fn cubics(arrows: &[((usize, i64), (usize, i64))]) -> usize {
        let mut b = TraceBuilder::new(TimeUnit::Microseconds);
        let p = b.component("p", None);
        let q = b.component("q", None);
        let r = b.component("r", Some(q));
        let ids = [p, q, r];
        for &((from, t1), (to, t2)) in arrows {
            b.arrow((ids[from], Time::micros(t1)), (ids[to], Time::micros(t2)));
        }
        b.time_range(Time::micros(0), Time::micros(1000));
        let view = TraceView::new(Arc::new(b.build()));

        let mut painter = TracePainter::new(RenderConfig::default());
        let outcome = painter.render(&view, DEVICE, false, &mut NullHost);
        outcome
            .surface()
            .commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawCubic { .. }))
            .count()
    }

    #[test]
    fn arrows_in_the_same_columns_are_drawn_once() {
        // 300 and 301 both land on column 366, 310 and 311 on 374
        assert_eq!(cubics(&[((0, 300), (1, 310)), ((0, 301), (1, 311))]), 1);
        assert_eq!(cubics(&[((0, 300), (1, 310)), ((0, 700), (1, 710))]), 2);
    }

    #[test]
    fn arrows_within_one_lifeline_are_skipped() {
        // r is drawn on its parent's lifeline
        assert_eq!(cubics(&[((1, 400), (2, 410))]), 0);
        assert_eq!(cubics(&[((1, 400), (2, 410)), ((2, 500), (0, 520))]), 1);
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn bend_ramps_from_threshold_to_vertical() {
        assert!(close(bend_angle(0.0), 0.0));
        assert!(close(bend_angle(10.0), 0.0));
        assert!(close(bend_angle(50.0), 15.0));
        assert!(close(bend_angle(90.0), 30.0));
    }

    #[test]
    fn shallow_arrow_is_straight() {
        // 5 degrees below horizontal, left to right
        let s = unified_arrow(0.0, 0.0, 100.0, 100.0 * 5f64.to_radians().tan());
        assert!(close(s.bend, 0.0));
        // control points lie on the straight line
        let slope = |p: &Point| p.y / p.x;
        assert!(close(slope(&s.ctrl1), slope(&s.ctrl2)));
    }

    #[test]
    fn vertical_arrow_bends_fully() {
        let s = unified_arrow(50.0, 0.0, 50.0, 200.0);
        assert!(close(s.bend, 30.0));
        // downward arrow: straight angle -90, start -60, end 60
        let expected_ctrl1 = (50.0 + 100.0 * 60f64.to_radians().cos(), 100.0 * 60f64.to_radians().sin());
        assert!(close(s.ctrl1.x, expected_ctrl1.0));
        assert!(close(s.ctrl1.y, expected_ctrl1.1));
        // the curve ends above the tip
        assert!(s.end.y < 200.0);
    }

    #[test]
    fn arrowhead_tip_sits_on_the_endpoint() {
        let s = unified_arrow(0.0, 0.0, 300.0, 120.0);
        assert!(close(s.head[0].x, 300.0));
        assert!(close(s.head[0].y, 120.0));
        assert_eq!(s.head.len(), 4);
        // the notch lies one arrowhead length back along the end tangent
        let notch = &s.head[2];
        let back = ((notch.x - s.end.x).powi(2) + (notch.y - s.end.y).powi(2)).sqrt();
        assert!(back < 1e-6, "notch {notch:?} end {:?}", s.end);
    }
}
