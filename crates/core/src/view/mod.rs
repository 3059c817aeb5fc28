//! Immutable, filtered, time-windowed projections of a trace.
//!
//! Every navigation call returns a new [`TraceView`]. Views share the backing
//! [`TraceSource`] and their filter selections through `Arc`, so keeping a
//! history of views for "back" navigation is cheap.

mod cursor;
mod delta;
mod persist;

use std::sync::Arc;

pub use cursor::TraceCursor;
pub use delta::{DeltaMask, delta};

use crate::model::{COMPONENT_PROPERTY, ComponentId, State, TraceSource};
use crate::selection::{ItemId, Selection};
use crate::time::Time;

/// Whether a component can be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Composite,
    Leaf,
}

#[derive(Debug, Clone)]
pub struct TraceView {
    source: Arc<dyn TraceSource>,
    scope: Option<ComponentId>,
    components: Arc<Selection>,
    events: Arc<Selection>,
    states: Arc<Selection>,
    available_states: Arc<Selection>,
    min: Time,
    max: Time,
    groups_enabled: bool,
    visible: Arc<Vec<ComponentId>>,
    /// Indexed by component id.
    lifelines: Arc<Vec<Option<usize>>>,
}

impl TraceView {
    /// Root view over the whole trace with every filter open.
    pub fn new(source: Arc<dyn TraceSource>) -> Self {
        let components = Arc::new(source.components().clone());
        let events = Arc::new(source.event_kinds().clone());
        let states = Arc::new(source.states().clone());
        let (min, max) = (source.min_time(), source.max_time());
        let mut view = Self {
            available_states: states.clone(),
            source,
            scope: Selection::ROOT,
            components,
            events,
            states,
            min,
            max,
            groups_enabled: true,
            visible: Arc::default(),
            lifelines: Arc::default(),
        };
        view.adjust_components();
        view
    }

    pub fn source(&self) -> &Arc<dyn TraceSource> {
        &self.source
    }

    /// Back to the top of the hierarchy with the full time range and all
    /// event kinds. The component and state filters are kept.
    pub fn root(&self) -> Self {
        let mut n = self.clone();
        n.scope = Selection::ROOT;
        n.min = self.source.min_time();
        n.max = self.source.max_time();
        n.events = Arc::new(self.source.event_kinds().clone());
        n.adjust_components();
        n
    }

    /// The entered composite, `None` at the top.
    pub fn parent_component(&self) -> Option<ComponentId> {
        self.scope
    }

    pub fn set_parent_component(&self, component: Option<ComponentId>) -> Self {
        if component == self.scope {
            return self.clone();
        }
        if let Some(c) = component {
            assert!(
                c < self.components.total_items_count(),
                "component {c} is not part of this trace"
            );
        }
        let mut n = self.clone();
        n.scope = component;
        n.adjust_components();
        n
    }

    pub fn min_time(&self) -> Time {
        self.min
    }

    pub fn max_time(&self) -> Time {
        self.max
    }

    /// Smallest interval a diagram can resolve.
    pub fn min_resolution(&self) -> Time {
        Time::new(1, self.source.time_unit())
    }

    pub fn set_range(&self, min: Time, max: Time) -> Self {
        assert!(min <= max, "time window {min}..{max} is reversed");
        assert!(
            min.unit() == self.source.time_unit(),
            "time window unit differs from the trace"
        );
        let mut n = self.clone();
        n.min = min;
        n.max = max;
        n
    }

    pub fn components(&self) -> &Selection {
        &self.components
    }

    pub fn filter_components(&self, filter: &Selection) -> Self {
        assert!(
            filter.same_universe(&self.components),
            "component filter comes from a different trace"
        );
        let mut n = self.clone();
        n.components = Arc::new(filter.clone());
        n.adjust_components();
        n
    }

    pub fn events(&self) -> &Selection {
        &self.events
    }

    pub fn filter_events(&self, filter: &Selection) -> Self {
        assert!(
            filter.same_universe(&self.events),
            "event filter comes from a different trace"
        );
        let mut n = self.clone();
        n.events = Arc::new(filter.clone());
        n
    }

    pub fn states(&self) -> &Selection {
        &self.states
    }

    pub fn filter_states(&self, filter: &Selection) -> Self {
        assert!(
            filter.same_universe(&self.states),
            "state filter comes from a different trace"
        );
        let mut n = self.clone();
        n.states = Arc::new(filter.clone());
        n
    }

    /// State groups enabled exactly for components that have a lifeline.
    pub fn available_states(&self) -> &Selection {
        &self.available_states
    }

    pub fn groups_enabled(&self) -> bool {
        self.groups_enabled
    }

    pub fn set_groups_enabled(&self, enabled: bool) -> Self {
        let mut n = self.clone();
        n.groups_enabled = enabled;
        n
    }

    /// Enabled children of the scope, one lifeline each, in order.
    pub fn visible_components(&self) -> &[ComponentId] {
        &self.visible
    }

    /// Row a component is drawn on. Enabled descendants of a visible
    /// component share its row.
    pub fn lifeline(&self, component: ComponentId) -> Option<usize> {
        self.lifelines.get(component).copied().flatten()
    }

    /// Component name, or with `full` the path below the scope joined
    /// with `::`.
    pub fn component_name(&self, component: ComponentId, full: bool) -> String {
        if !full {
            return self.components.item(component).to_string();
        }
        let mut parts = vec![self.components.item(component).as_str()];
        let mut cur = self.components.item_parent(component);
        while let Some(p) = cur {
            if Some(p) == self.scope {
                break;
            }
            parts.push(self.components.item(p).as_str());
            cur = self.components.item_parent(p);
        }
        parts.reverse();
        parts.join("::")
    }

    /// Whether the component has enabled children to enter.
    pub fn has_children(&self, component: ComponentId) -> bool {
        self.components.enabled_count(Some(component)) > 0
    }

    pub fn component_kind(&self, component: ComponentId) -> ComponentKind {
        if self.has_children(component) {
            ComponentKind::Composite
        } else {
            ComponentKind::Leaf
        }
    }

    /// State-kind name of a state, as listed in the state filter.
    pub fn state_name(&self, state: &State) -> Option<&str> {
        let item = self.source.state_item(state.component, state.kind)?;
        Some(self.states.item(item).as_str())
    }

    /// Start a fresh pass over the entities of this view.
    pub fn rewind(&self) -> TraceCursor<'_> {
        TraceCursor::new(self)
    }

    pub(crate) fn state_item(&self, state: &State) -> Option<ItemId> {
        self.source.state_item(state.component, state.kind)
    }

    fn adjust_components(&mut self) {
        let visible = self.components.enabled_items(self.scope);
        let mut lifelines = vec![None; self.components.total_items_count()];
        for (ll, &top) in visible.iter().enumerate() {
            let mut queue = vec![top];
            while let Some(comp) = queue.pop() {
                lifelines[comp] = Some(ll);
                queue.extend(self.components.enabled_items(Some(comp)));
            }
        }

        let mut available = self.source.states().clone();
        for &group in self.source.states().items(Selection::ROOT) {
            let component = available
                .item_property(group, COMPONENT_PROPERTY)
                .and_then(serde_json::Value::as_u64)
                .and_then(|c| usize::try_from(c).ok());
            let reachable =
                component.is_some_and(|c| lifelines.get(c).copied().flatten().is_some());
            if !reachable {
                available.set_enabled(group, false);
            }
        }

        self.visible = Arc::new(visible);
        self.lifelines = Arc::new(lifelines);
        self.available_states = Arc::new(available);
    }
}

#[cfg(test)]
mod tests {
    use lifeline_protocol::Color;

    use super::*;
    use crate::model::{Event, TraceBuilder};
    use crate::time::TimeUnit;

    /// cluster
    /// ├── node-a (busy states)
    /// │   ├── cpu
    /// │   └── net
    /// └── node-b
    /// client
    fn view() -> TraceView {
        let mut b = TraceBuilder::new(TimeUnit::Microseconds);
        let cluster = b.component("cluster", None);
        let a = b.component("node-a", Some(cluster));
        let cpu = b.component("cpu", Some(a));
        b.component("net", Some(a));
        b.component("node-b", Some(cluster));
        let client = b.component("client", None);
        let busy = b.state_kind("busy");
        b.event(Event::new(Time::micros(1), cpu, 'c'));
        b.event(Event::new(Time::micros(2), client, 'q'));
        b.state(a, busy, Time::micros(0), Time::micros(5), Color::rgba(0.0, 0.0, 1.0, 1.0));
        b.time_range(Time::micros(0), Time::micros(100));
        TraceView::new(Arc::new(b.build()))
    }

    #[test]
    fn root_view_has_top_level_lifelines() {
        let v = view();
        assert_eq!(v.parent_component(), None);
        assert_eq!(v.visible_components(), &[0, 5]);
        // everything under cluster collapses onto row 0
        for c in 0..5 {
            assert_eq!(v.lifeline(c), Some(0));
        }
        assert_eq!(v.lifeline(5), Some(1));
    }

    #[test]
    fn entering_a_composite_rescopes_lifelines() {
        let v = view().set_parent_component(Some(0));
        assert_eq!(v.visible_components(), &[1, 4]);
        assert_eq!(v.lifeline(2), Some(0));
        assert_eq!(v.lifeline(3), Some(0));
        assert_eq!(v.lifeline(4), Some(1));
        assert_eq!(v.lifeline(5), None);
        assert_eq!(v.lifeline(0), None);
    }

    #[test]
    fn navigation_leaves_the_starting_view_untouched() {
        let v = view();
        let narrowed = v.set_range(Time::micros(10), Time::micros(20));
        let scoped = v.set_parent_component(Some(0));
        assert_eq!(v.min_time(), Time::micros(0));
        assert_eq!(v.max_time(), Time::micros(100));
        assert_eq!(v.parent_component(), None);
        assert_eq!(narrowed.min_time(), Time::micros(10));
        assert_eq!(scoped.parent_component(), Some(0));
    }

    #[test]
    fn disabled_child_falls_out_of_lifeline_map() {
        let v = view();
        let mut filter = v.components().clone();
        filter.set_enabled(3, false);
        let v = v.filter_components(&filter);
        assert_eq!(v.lifeline(3), None);
        assert_eq!(v.lifeline(2), Some(0));
    }

    #[test]
    fn full_names_stop_at_the_scope() {
        let v = view();
        assert_eq!(v.component_name(2, false), "cpu");
        assert_eq!(v.component_name(2, true), "cluster::node-a::cpu");
        let scoped = v.set_parent_component(Some(0));
        assert_eq!(scoped.component_name(2, true), "node-a::cpu");
    }

    #[test]
    fn composite_and_leaf_kinds() {
        let v = view();
        assert_eq!(v.component_kind(0), ComponentKind::Composite);
        assert_eq!(v.component_kind(5), ComponentKind::Leaf);
        let mut filter = v.components().clone();
        filter.disable_all(Some(1), false);
        let v = v.filter_components(&filter);
        assert_eq!(v.component_kind(1), ComponentKind::Leaf);
    }

    #[test]
    fn available_states_follow_visibility() {
        let v = view();
        let group = v.source().state_group(1).unwrap_or(usize::MAX);
        assert!(v.available_states().is_enabled(group));

        let mut filter = v.components().clone();
        filter.set_enabled(0, false);
        let hidden = v.filter_components(&filter);
        assert!(!hidden.available_states().is_enabled(group));
    }

    #[test]
    fn root_resets_scope_range_and_event_filter() {
        let narrowed = view()
            .set_parent_component(Some(0))
            .set_range(Time::micros(3), Time::micros(4));
        let back = narrowed.root();
        assert_eq!(back.parent_component(), None);
        assert_eq!(back.min_time(), Time::micros(0));
        assert_eq!(back.max_time(), Time::micros(100));
    }

    #[test]
    #[should_panic(expected = "reversed")]
    fn reversed_range_is_a_contract_violation() {
        let _ = view().set_range(Time::micros(5), Time::micros(4));
    }

    #[test]
    #[should_panic(expected = "different trace")]
    fn foreign_filter_is_a_contract_violation() {
        let v = view();
        let mut foreign = Selection::new();
        foreign.add_item("x", Selection::ROOT);
        let _ = v.filter_components(&foreign);
    }
}
