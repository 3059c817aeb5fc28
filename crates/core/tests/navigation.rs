//! Copy-on-navigate views: history, change detection and saved positions.

use std::sync::Arc;

use lifeline_core::TraceView;
use lifeline_core::parsers::load_trace;
use lifeline_core::render::{RedrawPlan, plan_redraw};
use lifeline_core::time::Time;
use lifeline_core::view::{DeltaMask, delta};

fn cluster() -> TraceView {
    let trace = load_trace(include_bytes!("fixtures/cluster.json")).expect("fixture loads");
    TraceView::new(Arc::new(trace))
}

#[test]
fn history_stack_restores_earlier_views() {
    let mut history = Vec::new();
    let mut view = cluster();

    for next in [
        view.set_range(Time::micros(100), Time::micros(500)),
        view.set_parent_component(Some(0)),
    ] {
        history.push(std::mem::replace(&mut view, next));
    }
    // the second step was taken from the first view, not the zoomed one
    assert_eq!(view.max_time(), Time::micros(1000));
    assert_eq!(view.parent_component(), Some(0));

    let previous = history.pop().expect("one step back");
    assert_eq!(previous.max_time(), Time::micros(500));
    assert_eq!(previous.parent_component(), None);
}

#[test]
fn delta_names_what_changed() {
    let base = cluster();

    let mut events = base.events().clone();
    events.set_enabled(0, false);
    let filtered = base.filter_events(&events);
    assert_eq!(delta(&base, &filtered), DeltaMask::EVENT_TYPES);

    let mut states = base.states().clone();
    states.set_enabled(1, false);
    assert_eq!(
        delta(&base, &base.filter_states(&states)),
        DeltaMask::STATE_TYPES
    );

    let entered = base.set_parent_component(Some(0));
    let d = delta(&base, &entered);
    assert!(d.contains(DeltaMask::COMPONENT_POSITION));
    assert!(!d.contains(DeltaMask::TIME_RANGE));
    assert_eq!(plan_redraw(Some(&base), &entered), RedrawPlan::Background);

    let zoomed = entered.set_range(Time::micros(0), Time::micros(10));
    assert_eq!(plan_redraw(Some(&entered), &zoomed), RedrawPlan::Foreground);
}

#[test]
fn root_returns_to_the_full_trace() {
    let view = cluster()
        .set_parent_component(Some(0))
        .set_range(Time::micros(200), Time::micros(300));
    let root = view.root();
    assert_eq!(root.parent_component(), None);
    assert_eq!(root.min_time(), Time::micros(0));
    assert_eq!(root.max_time(), Time::micros(1000));
    assert_eq!(root.visible_components(), &[0, 3]);
}

#[test]
fn saved_position_round_trips() {
    let base = cluster();
    let view = base
        .set_parent_component(Some(0))
        .set_range(Time::micros(100), Time::micros(500));
    let saved = view.save();
    assert_eq!(saved, "/cluster/:100:500");

    let restored = base.restore(&saved);
    assert!(delta(&view, &restored).is_empty());
    assert_eq!(restored.visible_components(), &[1, 2]);
}

#[test]
fn restore_ignores_what_does_not_fit() {
    let view = cluster();
    for saved in [
        "garbage",
        "/cluster/:10",
        "/cluster/:10:20:30",
        "/nowhere/:10:20",
        "/:20:10",
        "/:ten:20",
    ] {
        let restored = view.restore(saved);
        assert!(delta(&view, &restored).is_empty(), "{saved}");
    }
}
