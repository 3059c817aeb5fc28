//! Hit-testing index produced by each render pass.

use lifeline_protocol::Rect;

use crate::model::{ComponentId, State};
use crate::view::TraceView;

/// Integer device rectangle; `x + w` and `y + h` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Grow by `d` on every side.
    pub fn inflated(&self, d: i32) -> Self {
        Self::new(self.x - d, self.y - d, self.w + 2 * d, self.h + 2 * d)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.w),
            f64::from(self.h),
        )
    }
}

/// Where a click on a component label box navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeTarget {
    /// New scope, `None` for the top of the hierarchy.
    pub scope: Option<ComponentId>,
}

/// What lies under a pointer position.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Nothing,
    /// A label box that changes the scope.
    ScopeLink(ScopeTarget),
    State {
        state: State,
        component: Option<ComponentId>,
        events_near: bool,
    },
    Lifelines {
        component: Option<ComponentId>,
        events_near: bool,
    },
}

/// Rectangles of one render pass mapped back to trace entities.
///
/// Replaced wholesale by every completed pass, never updated in place.
#[derive(Debug, Clone, Default)]
pub struct TraceGeometry {
    pub(crate) clickable_components: Vec<(PixelRect, ScopeTarget)>,
    pub(crate) component_labels: Vec<(PixelRect, ComponentId)>,
    pub(crate) lifeline_rects: Vec<(PixelRect, ComponentId)>,
    pub(crate) states: Vec<(PixelRect, State)>,
    /// `events_near[lifeline][column]`.
    pub(crate) events_near: Vec<Vec<bool>>,
    /// Y of every visible lifeline, including rows off the page.
    pub(crate) lifeline_position: Vec<i32>,
    pub(crate) left_margin: i32,
}

impl TraceGeometry {
    pub(crate) fn new(lifelines: usize, width: i32, left_margin: i32) -> Self {
        let columns = usize::try_from(width).unwrap_or(0);
        Self {
            events_near: vec![vec![false; columns]; lifelines],
            left_margin,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clickable_components.is_empty()
            && self.component_labels.is_empty()
            && self.lifeline_rects.is_empty()
            && self.states.is_empty()
            && self.lifeline_position.is_empty()
    }

    pub fn left_margin(&self) -> i32 {
        self.left_margin
    }

    pub fn lifeline_positions(&self) -> &[i32] {
        &self.lifeline_position
    }

    pub fn state_rects(&self) -> &[(PixelRect, State)] {
        &self.states
    }

    pub fn component_label_rects(&self) -> &[(PixelRect, ComponentId)] {
        &self.component_labels
    }

    pub fn clickable_component(&self, x: i32, y: i32) -> Option<ScopeTarget> {
        find(&self.clickable_components, x, y).copied()
    }

    pub fn clickable_state(&self, x: i32, y: i32) -> Option<&State> {
        find(&self.states, x, y)
    }

    /// Component whose lifeline band covers the point.
    pub fn component_at_position(&self, x: i32, y: i32) -> Option<ComponentId> {
        find(&self.lifeline_rects, x, y).copied()
    }

    pub fn component_label_at(&self, x: i32, y: i32) -> Option<ComponentId> {
        find(&self.component_labels, x, y).copied()
    }

    /// Whether an event was laid out in columns `[x - radius, x + radius)`
    /// of `lifeline`.
    pub fn events_near(&self, lifeline: usize, x: i32, radius: i32) -> bool {
        let Some(columns) = self.events_near.get(lifeline) else {
            return false;
        };
        let left = usize::try_from(x.saturating_sub(radius)).unwrap_or(0);
        let right = usize::try_from(x.saturating_add(radius))
            .unwrap_or(0)
            .min(columns.len());
        left < right && columns[left..right].iter().any(|&near| near)
    }

    /// Lifeline whose y is closest to `y`. Ties go to the upper one.
    pub fn nearest_lifeline(&self, y: i32) -> Option<usize> {
        self.lifeline_position
            .iter()
            .enumerate()
            .min_by_key(|&(i, &pos)| ((pos - y).abs(), i))
            .map(|(i, _)| i)
    }

    /// Classify the point under the pointer. Left of the margin only label
    /// boxes react; to the right, states take precedence over bare
    /// lifelines.
    pub fn target_under_cursor(&self, x: i32, y: i32, view: &TraceView, radius: i32) -> HitTarget {
        if x < self.left_margin {
            return match self.clickable_component(x, y) {
                Some(target) => HitTarget::ScopeLink(target),
                None => HitTarget::Nothing,
            };
        }

        let component = self.component_at_position(x, y);
        let events_near = component
            .and_then(|c| view.lifeline(c))
            .is_some_and(|ll| self.events_near(ll, x, radius));

        match self.clickable_state(x, y) {
            Some(state) => HitTarget::State {
                state: state.clone(),
                component,
                events_near,
            },
            None => HitTarget::Lifelines {
                component,
                events_near,
            },
        }
    }
}

fn find<T>(entries: &[(PixelRect, T)], x: i32, y: i32) -> Option<&T> {
    entries
        .iter()
        .find(|(rect, _)| rect.contains(x, y))
        .map(|(_, value)| value)
}
