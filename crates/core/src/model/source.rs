use std::fmt;

use lifeline_protocol::{Color, SharedStr};

use super::entities::{ComponentId, Event, EventKindId, Group, GroupPoint, State, StateKindId};
use crate::selection::{ItemId, Selection};
use crate::time::{Time, TimeUnit};

/// Property on a state-group item naming the component it belongs to.
pub const COMPONENT_PROPERTY: &str = "component";

/// Read-only backing data of a trace.
///
/// Views hold a source behind an `Arc` and never mutate it. Entity slices may
/// be in any order; views sort what they need.
pub trait TraceSource: fmt::Debug + Send + Sync {
    /// Component hierarchy, everything enabled.
    fn components(&self) -> &Selection;

    /// Event kinds, everything enabled.
    fn event_kinds(&self) -> &Selection;

    /// One top-level group per component with states (carrying
    /// [`COMPONENT_PROPERTY`]), children are the state kinds.
    fn states(&self) -> &Selection;

    /// Group item of `component` in [`TraceSource::states`].
    fn state_group(&self, component: ComponentId) -> Option<ItemId>;

    fn time_unit(&self) -> TimeUnit;

    fn min_time(&self) -> Time;

    fn max_time(&self) -> Time;

    fn events(&self) -> &[Event];

    fn state_intervals(&self) -> &[State];

    fn groups(&self) -> &[Group];

    /// Item of `kind` under the state group of `component`.
    fn state_item(&self, component: ComponentId, kind: StateKindId) -> Option<ItemId> {
        let group = self.state_group(component)?;
        self.states().items(Some(group)).get(kind).copied()
    }
}

/// In-memory trace, built with [`TraceBuilder`].
#[derive(Debug, Clone)]
pub struct MemoryTrace {
    unit: TimeUnit,
    min: Time,
    max: Time,
    components: Selection,
    event_kinds: Selection,
    states: Selection,
    state_groups: Vec<Option<ItemId>>,
    events: Vec<Event>,
    intervals: Vec<State>,
    groups: Vec<Group>,
}

impl TraceSource for MemoryTrace {
    fn components(&self) -> &Selection {
        &self.components
    }

    fn event_kinds(&self) -> &Selection {
        &self.event_kinds
    }

    fn states(&self) -> &Selection {
        &self.states
    }

    fn state_group(&self, component: ComponentId) -> Option<ItemId> {
        self.state_groups.get(component).copied().flatten()
    }

    fn time_unit(&self) -> TimeUnit {
        self.unit
    }

    fn min_time(&self) -> Time {
        self.min
    }

    fn max_time(&self) -> Time {
        self.max
    }

    fn events(&self) -> &[Event] {
        &self.events
    }

    fn state_intervals(&self) -> &[State] {
        &self.intervals
    }

    fn groups(&self) -> &[Group] {
        &self.groups
    }
}

/// Incrementally assembles a [`MemoryTrace`].
///
/// Every time handed to the builder must use its unit.
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    unit: TimeUnit,
    range: Option<(Time, Time)>,
    components: Selection,
    event_kinds: Selection,
    state_kinds: Vec<SharedStr>,
    events: Vec<Event>,
    intervals: Vec<State>,
    groups: Vec<Group>,
}

impl TraceBuilder {
    pub fn new(unit: TimeUnit) -> Self {
        Self {
            unit,
            range: None,
            components: Selection::new(),
            event_kinds: Selection::new(),
            state_kinds: Vec::new(),
            events: Vec::new(),
            intervals: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn component(&mut self, name: &str, parent: Option<ComponentId>) -> ComponentId {
        self.components.add_item(name, parent)
    }

    pub fn component_count(&self) -> usize {
        self.components.total_items_count()
    }

    pub fn event_kind(&mut self, name: &str) -> EventKindId {
        self.event_kinds.add_item(name, Selection::ROOT)
    }

    pub fn event_kind_count(&self) -> usize {
        self.event_kinds.total_items_count()
    }

    pub fn state_kind(&mut self, name: &str) -> StateKindId {
        self.state_kinds.push(SharedStr::from(name));
        self.state_kinds.len() - 1
    }

    pub fn state_kind_count(&self) -> usize {
        self.state_kinds.len()
    }

    pub fn event(&mut self, event: Event) -> &mut Self {
        self.check_time(event.time);
        self.check_component(event.component);
        if let Some(kind) = event.kind {
            assert!(
                kind < self.event_kinds.total_items_count(),
                "unknown event kind {kind}"
            );
        }
        self.events.push(event);
        self
    }

    pub fn state(
        &mut self,
        component: ComponentId,
        kind: StateKindId,
        begin: Time,
        end: Time,
        color: Color,
    ) -> &mut Self {
        self.check_time(begin);
        self.check_time(end);
        self.check_component(component);
        assert!(kind < self.state_kinds.len(), "unknown state kind {kind}");
        assert!(begin <= end, "state ends before it begins");
        self.intervals.push(State {
            begin,
            end,
            component,
            kind,
            color,
        });
        self
    }

    pub fn arrow(&mut self, from: (ComponentId, Time), to: (ComponentId, Time)) -> &mut Self {
        for (component, time) in [from, to] {
            self.check_component(component);
            self.check_time(time);
        }
        self.groups.push(Group::arrow(
            GroupPoint {
                component: from.0,
                time: from.1,
            },
            GroupPoint {
                component: to.0,
                time: to.1,
            },
        ));
        self
    }

    /// Override the full time range. Without it the range spans every
    /// entity, or is empty at zero for an empty trace.
    pub fn time_range(&mut self, min: Time, max: Time) -> &mut Self {
        self.check_time(min);
        self.check_time(max);
        assert!(min <= max, "time range is reversed");
        self.range = Some((min, max));
        self
    }

    pub fn build(self) -> MemoryTrace {
        let (min, max) = self.range.unwrap_or_else(|| self.entity_span());

        let mut states = Selection::new();
        let mut state_groups = vec![None; self.components.total_items_count()];
        let mut with_states: Vec<ComponentId> =
            self.intervals.iter().map(|s| s.component).collect();
        with_states.sort_unstable();
        with_states.dedup();
        for component in with_states {
            let group = states.add_item(full_name(&self.components, component), Selection::ROOT);
            states.set_item_property(group, COMPONENT_PROPERTY, component);
            for kind in &self.state_kinds {
                states.add_item(kind.clone(), Some(group));
            }
            state_groups[component] = Some(group);
        }

        tracing::debug!(
            components = self.components.total_items_count(),
            events = self.events.len(),
            states = self.intervals.len(),
            groups = self.groups.len(),
            "built in-memory trace"
        );

        MemoryTrace {
            unit: self.unit,
            min,
            max,
            components: self.components,
            event_kinds: self.event_kinds,
            states,
            state_groups,
            events: self.events,
            intervals: self.intervals,
            groups: self.groups,
        }
    }

    fn entity_span(&self) -> (Time, Time) {
        let times = self
            .events
            .iter()
            .map(|e| e.time)
            .chain(self.intervals.iter().flat_map(|s| [s.begin, s.end]))
            .chain(self.groups.iter().flat_map(|g| g.points.iter().map(|p| p.time)));
        times
            .fold(None, |acc: Option<(Time, Time)>, t| match acc {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
            .unwrap_or((Time::zero(self.unit), Time::zero(self.unit)))
    }

    fn check_time(&self, t: Time) {
        assert!(
            t.unit() == self.unit,
            "time in {:?} added to a {:?} trace",
            t.unit(),
            self.unit
        );
    }

    fn check_component(&self, component: ComponentId) {
        assert!(
            component < self.components.total_items_count(),
            "unknown component {component}"
        );
    }
}

/// Names from the root down to `component`, joined with `::`.
pub(crate) fn full_name(components: &Selection, component: ComponentId) -> String {
    let mut parts = vec![components.item(component).as_str()];
    let mut cur = components.item_parent(component);
    while let Some(p) = cur {
        parts.push(components.item(p).as_str());
        cur = components.item_parent(p);
    }
    parts.reverse();
    parts.join("::")
}
