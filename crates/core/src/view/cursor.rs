use crate::model::{Event, Group, State};

use super::TraceView;

/// One pass over the entities of a view.
///
/// Events come out in time order (ties keep source order) even when the
/// source stores them unordered. States and groups keep source order.
pub struct TraceCursor<'a> {
    view: &'a TraceView,
    events: std::vec::IntoIter<&'a Event>,
    states: std::slice::Iter<'a, State>,
    groups: std::slice::Iter<'a, Group>,
}

impl<'a> TraceCursor<'a> {
    pub(super) fn new(view: &'a TraceView) -> Self {
        let source = view.source.as_ref();
        let mut events: Vec<&'a Event> = source
            .events()
            .iter()
            .filter(|e| view.event_passes(e))
            .collect();
        events.sort_by(|a, b| a.time.cmp(&b.time));
        Self {
            view,
            events: events.into_iter(),
            states: source.state_intervals().iter(),
            groups: source.groups().iter(),
        }
    }

    pub fn next_event(&mut self) -> Option<&'a Event> {
        self.events.next()
    }

    pub fn next_state(&mut self) -> Option<&'a State> {
        let view = self.view;
        self.states.find(|s| view.state_passes(s))
    }

    pub fn next_group(&mut self) -> Option<&'a Group> {
        let view = self.view;
        self.groups.find(|g| view.group_passes(g))
    }
}

impl TraceView {
    fn event_passes(&self, e: &Event) -> bool {
        self.lifeline(e.component).is_some()
            && e.kind.is_none_or(|k| self.events.is_enabled(k))
            && e.time >= self.min
            && e.time <= self.max
    }

    fn state_passes(&self, s: &State) -> bool {
        if self.lifeline(s.component).is_none() || !s.intersects(self.min, self.max) {
            return false;
        }
        self.state_item(s).is_some_and(|item| self.states.is_visible(item))
    }

    fn group_passes(&self, g: &Group) -> bool {
        if !self.groups_enabled {
            return false;
        }
        if g.points.iter().any(|p| self.lifeline(p.component).is_none()) {
            return false;
        }
        g.span()
            .is_some_and(|(lo, hi)| lo <= self.max && hi >= self.min)
    }
}
