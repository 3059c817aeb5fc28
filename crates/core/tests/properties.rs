//! Properties that hold for every input, checked with proptest.

use std::sync::Arc;

use lifeline_core::model::{Event, TraceBuilder};
use lifeline_core::render::{Metrics, NullHost, PageLayout, RenderConfig, TimeMapping, TracePainter};
use lifeline_core::selection::Selection;
use lifeline_core::time::{Time, TimeUnit};
use lifeline_core::view::{DeltaMask, TraceView, delta};
use lifeline_protocol::{DeviceSize, RenderCommand, ThemeToken};
use proptest::prelude::*;

/// Parent links for a random forest: item `k` hangs under an earlier item
/// or at the top.
fn forest() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec((any::<bool>(), any::<prop::sample::Index>()), 1..24).prop_map(|links| {
        links
            .into_iter()
            .enumerate()
            .map(|(k, (top, parent))| (k > 0 && !top).then(|| parent.index(k)))
            .collect()
    })
}

fn selection(parents: &[Option<usize>]) -> Selection {
    let mut s = Selection::new();
    for (k, parent) in parents.iter().enumerate() {
        s.add_item(format!("item{k}"), *parent);
    }
    s
}

fn view() -> TraceView {
    let mut b = TraceBuilder::new(TimeUnit::Microseconds);
    let a = b.component("a", None);
    let c = b.component("c", None);
    b.event(Event::new(Time::micros(10), a, 'a'));
    b.event(Event::new(Time::micros(90_000), c, 'c'));
    b.time_range(Time::micros(0), Time::micros(100_000));
    TraceView::new(Arc::new(b.build()))
}

proptest! {
    #[test]
    fn pixel_round_trip_stays_within_one_column(
        min in -1_000_000i64..1_000_000,
        span in 1i64..10_000_000,
        width in 200i32..4000,
        pos in 0.0f64..=1.0,
    ) {
        let mapping = TimeMapping {
            min: Time::micros(min),
            span: Time::micros(span),
            left_margin: 126,
            right_margin: 5,
            width,
        };
        let t = Time::scale(Time::micros(min), Time::micros(min + span), pos);
        let back = mapping.time_for_pixel(mapping.pixel_position_for_time(t));
        let error = (t.raw() - back.raw()).abs() as f64;
        prop_assert!(error <= mapping.resolution() + 1.0, "t {t} back {back}");
    }

    #[test]
    fn disable_then_enable_restores_item_and_parent(
        parents in forest(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut s = selection(&parents);
        let id = pick.index(parents.len());
        let parent = s.item_parent(id);

        s.set_enabled(id, false);
        if let Some(p) = parent
            && s.items(Some(p)) == [id]
        {
            prop_assert!(!s.is_enabled(p), "only child takes its parent along");
        }
        s.set_enabled(id, true);

        prop_assert!(s.is_enabled(id));
        if let Some(p) = parent {
            prop_assert!(s.is_enabled(p));
        }
        // nothing else moved
        prop_assert!(s == selection(&parents));
    }

    #[test]
    fn moving_the_window_only_flags_the_time_range(
        lo in 0i64..100_000,
        len in 0i64..100_000,
    ) {
        let base = view();
        let hi = (lo + len).min(100_000);
        prop_assume!((lo, hi) != (0, 100_000));
        let moved = base.set_range(Time::micros(lo), Time::micros(hi));
        prop_assert_eq!(delta(&base, &moved), DeltaMask::TIME_RANGE);
        prop_assert!(delta(&moved, &moved.clone()).is_empty());
    }

    #[test]
    fn the_higher_priority_glyph_wins_in_either_order(
        p1 in -50i32..50,
        p2 in -50i32..50,
        low_first in any::<bool>(),
    ) {
        prop_assume!(p1 != p2);
        let (low, high) = (p1.min(p2), p1.max(p2));
        let mut b = TraceBuilder::new(TimeUnit::Microseconds);
        let c = b.component("c", None);
        let order = if low_first { [(low, 'l'), (high, 'h')] } else { [(high, 'h'), (low, 'l')] };
        for (priority, letter) in order {
            b.event(Event::new(Time::micros(50), c, letter).with_priority(priority));
        }
        b.time_range(Time::micros(0), Time::micros(100));
        let view = TraceView::new(Arc::new(b.build()));

        let mut painter = TracePainter::new(RenderConfig::default());
        let outcome = painter.render(&view, DeviceSize::new(800, 300), false, &mut NullHost);
        let letters: Vec<String> = outcome
            .surface()
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                RenderCommand::DrawText { text, color: ThemeToken::EventLetter, .. } => Some(text.to_string()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(letters, vec!["h".to_string()]);
    }

    #[test]
    fn horizontal_pages_cover_the_window_exactly(
        total in 0i64..5_000_000,
        tpp in 1i64..1_000_000,
        width in 300i32..3000,
        components in 0usize..60,
        height in 100i32..3000,
    ) {
        let metrics = Metrics::new(&RenderConfig::default());
        let (min, max) = (Time::micros(0), Time::micros(total));
        let layout = PageLayout::compute(&metrics, (min, max), components, Time::micros(tpp), (width, height));

        let first = layout.time_per_first_page.raw();
        let full = layout.time_per_full_page.raw();
        let expected = if total > first {
            1 + usize::try_from((total - first + full - 1) / full).unwrap_or(0)
        } else {
            1
        };
        prop_assert_eq!(layout.horizontal, expected);

        let h = layout.horizontal;
        prop_assert_eq!(layout.time_window(h - 1).1, max);
        if h > 1 {
            prop_assert!(layout.time_window(h - 2).1 < max);
        }

        prop_assert_eq!(layout.vertical, components.div_ceil(layout.components_per_page));
        let rows: Vec<usize> = (0..layout.vertical).flat_map(|j| layout.component_range(j)).collect();
        prop_assert_eq!(rows, (0..components).collect::<Vec<_>>());
    }
}
