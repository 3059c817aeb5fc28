use lifeline_protocol::Color;
use serde::{Deserialize, Serialize};

use crate::selection::ItemId;
use crate::time::Time;

/// Item id in a trace's component selection.
pub type ComponentId = ItemId;
/// Item id in a trace's event-kind selection.
pub type EventKindId = ItemId;
/// Position of a state kind in the trace's state-kind list.
pub type StateKindId = usize;

/// Corner of the event tick a glyph is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterCorner {
    LeftTop,
    #[default]
    RightTop,
    RightBottom,
    LeftBottom,
}

impl LetterCorner {
    pub fn is_left(self) -> bool {
        matches!(self, LetterCorner::LeftTop | LetterCorner::LeftBottom)
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, LetterCorner::LeftBottom | LetterCorner::RightBottom)
    }
}

/// A point occurrence on a component's lifeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: Time,
    pub component: ComponentId,
    /// `None` for events that pass every event-kind filter.
    pub kind: Option<EventKindId>,
    pub letter: char,
    pub subletter: Option<char>,
    pub corner: LetterCorner,
    /// Higher wins when glyphs overlap.
    pub priority: i32,
}

impl Event {
    pub fn new(time: Time, component: ComponentId, letter: char) -> Self {
        Self {
            time,
            component,
            kind: None,
            letter,
            subletter: None,
            corner: LetterCorner::default(),
            priority: 0,
        }
    }

    pub fn with_kind(mut self, kind: EventKindId) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_subletter(mut self, subletter: char) -> Self {
        self.subletter = Some(subletter);
        self
    }

    pub fn with_corner(mut self, corner: LetterCorner) -> Self {
        self.corner = corner;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A colored interval on a component's lifeline.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub begin: Time,
    pub end: Time,
    pub component: ComponentId,
    pub kind: StateKindId,
    pub color: Color,
}

impl State {
    /// Whether `[begin, end]` touches the closed window `[min, max]`.
    pub fn intersects(&self, min: Time, max: Time) -> bool {
        self.begin <= max && self.end >= min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Directed two-point link, first point to second.
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupPoint {
    pub component: ComponentId,
    pub time: Time,
}

/// Correlated points across lifelines.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub kind: GroupKind,
    pub points: Vec<GroupPoint>,
}

impl Group {
    pub fn arrow(from: GroupPoint, to: GroupPoint) -> Self {
        Self {
            kind: GroupKind::Arrow,
            points: vec![from, to],
        }
    }

    /// Earliest and latest point times, `None` for an empty group.
    pub fn span(&self) -> Option<(Time, Time)> {
        let first = self.points.first()?.time;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.time), hi.max(p.time))
        }))
    }
}
