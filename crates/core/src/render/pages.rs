use std::ops::Range;

use crate::time::Time;

use super::metrics::Metrics;

/// How a view is split into printed pages.
///
/// The first horizontal page keeps the wide label margin; later pages use
/// the narrow one and therefore hold more time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub min: Time,
    pub max: Time,
    pub time_per_first_page: Time,
    pub time_per_full_page: Time,
    pub horizontal: usize,
    pub vertical: usize,
    pub components_per_page: usize,
    pub components: usize,
}

impl PageLayout {
    /// `time_per_page` must be positive.
    pub fn compute(
        metrics: &Metrics,
        (min, max): (Time, Time),
        components: usize,
        time_per_page: Time,
        (width, height): (i32, i32),
    ) -> Self {
        assert!(
            time_per_page.raw() > 0,
            "time per page must be positive, got {time_per_page}"
        );
        let first_usable = (width - metrics.left_margin1 - metrics.right_margin).max(1);
        let full_usable = (width - metrics.left_margin2 - metrics.right_margin).max(1);
        let time_per_first_page = time_per_page;
        let time_per_full_page =
            time_per_page * (f64::from(full_usable) / f64::from(first_usable));

        let total = max - min;
        let horizontal = if total > time_per_first_page && time_per_full_page.raw() > 0 {
            1 + ((total - time_per_first_page) / time_per_full_page).ceil() as usize
        } else {
            1
        };

        let components_per_page = metrics.components_per_page(height);
        let vertical = components.div_ceil(components_per_page);

        Self {
            min,
            max,
            time_per_first_page,
            time_per_full_page,
            horizontal,
            vertical,
            components_per_page,
            components,
        }
    }

    pub fn page_count(&self) -> usize {
        self.horizontal * self.vertical
    }

    /// `(horizontal, vertical)` position of a page. Pages run row-major:
    /// every component band of a time slice before the next slice.
    pub fn position(&self, index: usize) -> (usize, usize) {
        let vertical = self.vertical.max(1);
        (index / vertical, index % vertical)
    }

    pub fn time_per_page(&self, i: usize) -> Time {
        if i == 0 {
            self.time_per_first_page
        } else {
            self.time_per_full_page
        }
    }

    /// Window of horizontal page `i`, clipped to the view's end.
    pub fn time_window(&self, i: usize) -> (Time, Time) {
        let start = if i == 0 {
            self.min
        } else {
            self.min + self.time_per_first_page + self.time_per_full_page * (i - 1) as f64
        };
        let end = (start + self.time_per_page(i)).min(self.max);
        (start, end.max(start))
    }

    /// Visible-component indices on vertical page `j`.
    pub fn component_range(&self, j: usize) -> Range<usize> {
        let from = (j * self.components_per_page).min(self.components);
        let to = (from + self.components_per_page).min(self.components);
        from..to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::config::RenderConfig;

    fn metrics() -> Metrics {
        Metrics::new(&RenderConfig::default())
    }

    fn layout(total: i64, tpp: i64, components: usize) -> PageLayout {
        // usable widths: 1131 - 126 - 5 = 1000 first, 1131 - 24 - 5 = 1102 full
        PageLayout::compute(
            &metrics(),
            (Time::micros(0), Time::micros(total)),
            components,
            Time::micros(tpp),
            (1131, 1000),
        )
    }

    #[test]
    fn full_pages_hold_more_time() {
        let l = layout(10_000, 1000, 1);
        assert_eq!(l.time_per_first_page, Time::micros(1000));
        assert_eq!(l.time_per_full_page, Time::micros(1102));
    }

    #[test]
    fn single_page_when_trace_fits() {
        assert_eq!(layout(1000, 1000, 1).horizontal, 1);
        assert_eq!(layout(10, 1000, 1).horizontal, 1);
    }

    #[test]
    fn horizontal_count_uses_full_page_capacity() {
        // 1 + ceil((5000 - 1000) / 1102) = 1 + 4
        assert_eq!(layout(5000, 1000, 1).horizontal, 5);
        // 1 + ceil(1102 / 1102)
        assert_eq!(layout(2102, 1000, 1).horizontal, 2);
        assert_eq!(layout(2103, 1000, 1).horizontal, 3);
    }

    #[test]
    fn vertical_count_and_ranges() {
        let l = layout(1000, 1000, 30);
        assert_eq!(l.components_per_page, 13);
        assert_eq!(l.vertical, 3);
        assert_eq!(l.component_range(0), 0..13);
        assert_eq!(l.component_range(2), 26..30);
        assert_eq!(layout(1000, 1000, 0).page_count(), 0);
    }

    #[test]
    fn pages_are_row_major() {
        let l = layout(3000, 1000, 30);
        assert_eq!(l.page_count(), l.horizontal * 3);
        assert_eq!(l.position(0), (0, 0));
        assert_eq!(l.position(2), (0, 2));
        assert_eq!(l.position(3), (1, 0));
        assert_eq!(l.position(5), (1, 2));
    }

    #[test]
    fn windows_tile_the_range() {
        let l = layout(3000, 1000, 1);
        assert_eq!(l.time_window(0), (Time::micros(0), Time::micros(1000)));
        assert_eq!(l.time_window(1), (Time::micros(1000), Time::micros(2102)));
        assert_eq!(l.time_window(2), (Time::micros(2102), Time::micros(3000)));
    }
}
