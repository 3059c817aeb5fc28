//! Stage 4: state intervals.

use lifeline_protocol::{Paint, ThemeToken};

use super::pass::{Canceled, Pass};

impl Pass<'_> {
    /// Draw every state clipped to the page's usable width. States that
    /// collapse to nothing after clipping are skipped.
    pub(crate) fn draw_states(&mut self) -> Result<(), Canceled> {
        let teh = self.metrics.text_elements_height;
        let left = self.left_margin();
        let right = self.width - self.metrics.right_margin;

        let view = self.view.clone();
        let mut cursor = view.rewind();
        while let Some(s) = cursor.next_state() {
            let Some(lifeline) = view.lifeline(s.component) else {
                continue;
            };
            if !self.on_page(lifeline) {
                continue;
            }

            let begin = self.mapping.pixel_position_for_time(s.begin).max(left);
            let end = self.mapping.pixel_position_for_time(s.end).min(right);
            if end > begin {
                let y = self.geometry.lifeline_position[lifeline];
                let name = view.state_name(s).unwrap_or_default();
                let r = self.text_box(
                    name,
                    begin,
                    y,
                    end - begin,
                    teh,
                    Paint::Rgba(s.color),
                    ThemeToken::StateBorder,
                );
                self.geometry.states.push((r, s.clone()));
            }

            self.checkpoint()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lifeline_protocol::{Color, DeviceSize};

    use crate::model::TraceBuilder;
    use crate::render::{NullHost, RenderConfig, TracePainter};
    use crate::time::{Time, TimeUnit};
    use crate::view::TraceView;

    /// 800 usable columns between the 126 px label margin and the 5 px
    /// right margin.
    const DEVICE: DeviceSize = DeviceSize {
        width: 931,
        height: 300,
    };

    fn busy(spans: &[(i64, i64)]) -> TraceView {
        let mut b = TraceBuilder::new(TimeUnit::Microseconds);
        let p = b.component("p", None);
        let kind = b.state_kind("busy");
        for &(begin, end) in spans {
            b.state(p, kind, Time::micros(begin), Time::micros(end), Color::rgba(0.2, 0.6, 0.2, 1.0));
        }
        b.time_range(Time::micros(0), Time::micros(1000));
        TraceView::new(Arc::new(b.build()))
    }

    fn rects(view: &TraceView) -> Vec<(i32, i32)> {
        let mut painter = TracePainter::new(RenderConfig::default());
        assert!(painter.render(view, DEVICE, false, &mut NullHost).is_completed());
        // boxes are recorded one pixel larger on each side
        painter
            .geometry()
            .state_rects()
            .iter()
            .map(|(r, _)| (r.x + 1, r.right() - 1))
            .collect()
    }

    #[test]
    fn state_started_before_the_window_begins_at_the_margin() {
        let view = busy(&[(0, 500)]).set_range(Time::micros(200), Time::micros(1000));
        assert_eq!(rects(&view), vec![(126, 426)]);
    }

    #[test]
    fn state_running_past_the_window_stops_at_the_right_margin() {
        let view = busy(&[(400, 1000)]).set_range(Time::micros(0), Time::micros(500));
        assert_eq!(rects(&view), vec![(766, 926)]);
    }

    #[test]
    fn zero_width_states_are_pruned() {
        let view = busy(&[(600, 600), (100, 300)]);
        assert_eq!(rects(&view), vec![(206, 366)]);
    }
}
