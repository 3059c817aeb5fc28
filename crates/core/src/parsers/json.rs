//! Loader for the lifeline JSON trace document.
//!
//! ```json
//! {
//!   "unit": "microseconds",
//!   "range": [0, 1000],
//!   "components": [{ "name": "cluster" }, { "name": "node", "parent": "cluster" }],
//!   "event_kinds": ["send"],
//!   "state_kinds": ["busy"],
//!   "events": [{ "time": 10, "component": "cluster::node", "letter": "s", "kind": "send" }],
//!   "states": [{ "component": "cluster::node", "kind": "busy", "begin": 0, "end": 50, "color": "#3366cc" }],
//!   "arrows": [{ "from": { "component": "cluster", "time": 10 }, "to": { "component": "cluster::node", "time": 20 } }]
//! }
//! ```
//!
//! Components are referenced by their full `::` path; a parent must be
//! declared before its children.

use std::collections::HashMap;

use lifeline_protocol::Color;
use serde::Deserialize;

use super::TraceLoadError;
use crate::model::{ComponentId, Event, EventKindId, LetterCorner, MemoryTrace, StateKindId, TraceBuilder};
use crate::time::{Time, TimeUnit};

#[derive(Debug, Deserialize)]
struct TraceDocument {
    #[serde(default)]
    unit: TimeUnit,
    #[serde(default)]
    range: Option<(i64, i64)>,
    components: Vec<ComponentDecl>,
    #[serde(default)]
    event_kinds: Vec<String>,
    #[serde(default)]
    state_kinds: Vec<String>,
    #[serde(default)]
    events: Vec<EventDecl>,
    #[serde(default)]
    states: Vec<StateDecl>,
    #[serde(default)]
    arrows: Vec<ArrowDecl>,
}

#[derive(Debug, Deserialize)]
struct ComponentDecl {
    name: String,
    #[serde(default)]
    parent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventDecl {
    time: i64,
    component: String,
    letter: char,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    subletter: Option<char>,
    #[serde(default)]
    corner: LetterCorner,
    #[serde(default)]
    priority: i32,
}

#[derive(Debug, Deserialize)]
struct StateDecl {
    component: String,
    kind: String,
    begin: i64,
    end: i64,
    color: String,
}

#[derive(Debug, Deserialize)]
struct PointDecl {
    component: String,
    time: i64,
}

#[derive(Debug, Deserialize)]
struct ArrowDecl {
    from: PointDecl,
    to: PointDecl,
}

/// Name lookups for one document.
struct Names {
    components: HashMap<String, ComponentId>,
    event_kinds: HashMap<String, EventKindId>,
    state_kinds: HashMap<String, StateKindId>,
}

impl Names {
    fn component(&self, path: &str) -> Result<ComponentId, TraceLoadError> {
        self.components
            .get(path)
            .copied()
            .ok_or_else(|| TraceLoadError::UnknownComponent(path.to_string()))
    }

    fn event_kind(&self, name: &str) -> Result<EventKindId, TraceLoadError> {
        self.event_kinds
            .get(name)
            .copied()
            .ok_or_else(|| TraceLoadError::UnknownEventKind(name.to_string()))
    }

    fn state_kind(&self, name: &str) -> Result<StateKindId, TraceLoadError> {
        self.state_kinds
            .get(name)
            .copied()
            .ok_or_else(|| TraceLoadError::UnknownStateKind(name.to_string()))
    }
}

/// Parse a JSON trace document into an in-memory trace.
pub fn load_trace(data: &[u8]) -> Result<MemoryTrace, TraceLoadError> {
    let doc: TraceDocument = serde_json::from_slice(data)?;
    let unit = doc.unit;
    let mut builder = TraceBuilder::new(unit);
    let mut names = Names {
        components: HashMap::new(),
        event_kinds: HashMap::new(),
        state_kinds: HashMap::new(),
    };

    for decl in &doc.components {
        let (parent, path) = match &decl.parent {
            Some(parent) => (Some(names.component(parent)?), format!("{parent}::{}", decl.name)),
            None => (None, decl.name.clone()),
        };
        if names.components.contains_key(&path) {
            return Err(TraceLoadError::DuplicateComponent(path));
        }
        let id = builder.component(&decl.name, parent);
        names.components.insert(path, id);
    }
    for kind in &doc.event_kinds {
        let id = builder.event_kind(kind);
        names.event_kinds.insert(kind.clone(), id);
    }
    for kind in &doc.state_kinds {
        let id = builder.state_kind(kind);
        names.state_kinds.insert(kind.clone(), id);
    }

    for decl in &doc.events {
        let mut event = Event::new(Time::new(decl.time, unit), names.component(&decl.component)?, decl.letter)
            .with_corner(decl.corner)
            .with_priority(decl.priority);
        if let Some(kind) = &decl.kind {
            event = event.with_kind(names.event_kind(kind)?);
        }
        if let Some(sub) = decl.subletter {
            event = event.with_subletter(sub);
        }
        builder.event(event);
    }

    for decl in &doc.states {
        let component = names.component(&decl.component)?;
        let kind = names.state_kind(&decl.kind)?;
        let color =
            Color::from_hex(&decl.color).ok_or_else(|| TraceLoadError::InvalidColor(decl.color.clone()))?;
        if decl.end < decl.begin {
            return Err(TraceLoadError::ReversedState {
                component: decl.component.clone(),
                kind: decl.kind.clone(),
                begin: decl.begin,
                end: decl.end,
            });
        }
        builder.state(
            component,
            kind,
            Time::new(decl.begin, unit),
            Time::new(decl.end, unit),
            color,
        );
    }

    for arrow in &doc.arrows {
        builder.arrow(
            (names.component(&arrow.from.component)?, Time::new(arrow.from.time, unit)),
            (names.component(&arrow.to.component)?, Time::new(arrow.to.time, unit)),
        );
    }

    if let Some((min, max)) = doc.range {
        if max < min {
            return Err(TraceLoadError::ReversedRange { min, max });
        }
        builder.time_range(Time::new(min, unit), Time::new(max, unit));
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TraceSource;

    const SAMPLE: &str = r##"{
        "unit": "milliseconds",
        "components": [
            { "name": "cluster" },
            { "name": "node", "parent": "cluster" },
            { "name": "client" }
        ],
        "event_kinds": ["send", "recv"],
        "state_kinds": ["busy"],
        "events": [
            { "time": 30, "component": "client", "letter": "r", "kind": "recv", "corner": "left_bottom" },
            { "time": 10, "component": "cluster::node", "letter": "s", "kind": "send", "subletter": "1", "priority": 4 }
        ],
        "states": [
            { "component": "cluster::node", "kind": "busy", "begin": 0, "end": 20, "color": "#3366cc" }
        ],
        "arrows": [
            { "from": { "component": "cluster::node", "time": 10 }, "to": { "component": "client", "time": 30 } }
        ]
    }"##;

    #[test]
    fn loads_a_complete_document() {
        let trace = load_trace(SAMPLE.as_bytes()).expect("sample loads");
        assert_eq!(trace.time_unit(), TimeUnit::Milliseconds);
        assert_eq!(trace.components().total_items_count(), 3);
        assert_eq!(trace.components().item_parent(1), Some(0));
        assert_eq!(trace.event_kinds().total_items_count(), 2);
        assert_eq!(trace.events().len(), 2);
        let send = &trace.events()[1];
        assert_eq!(send.subletter, Some('1'));
        assert_eq!(send.priority, 4);
        assert_eq!(trace.events()[0].corner, LetterCorner::LeftBottom);
        assert_eq!(trace.state_intervals().len(), 1);
        assert_eq!(trace.groups().len(), 1);
        // range spans the entities when not given
        assert_eq!(trace.min_time(), Time::new(0, TimeUnit::Milliseconds));
        assert_eq!(trace.max_time(), Time::new(30, TimeUnit::Milliseconds));
    }

    #[test]
    fn explicit_range_wins() {
        let doc = r#"{ "components": [{ "name": "a" }], "range": [5, 500] }"#;
        let trace = load_trace(doc.as_bytes()).expect("loads");
        assert_eq!(trace.time_unit(), TimeUnit::Microseconds);
        assert_eq!(trace.min_time(), Time::micros(5));
        assert_eq!(trace.max_time(), Time::micros(500));
    }

    #[test]
    fn rejects_dangling_references() {
        let doc = r#"{ "components": [{ "name": "a" }],
            "events": [{ "time": 1, "component": "b", "letter": "x" }] }"#;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::UnknownComponent(name)) if name == "b"
        ));

        let doc = r#"{ "components": [{ "name": "n", "parent": "missing" }] }"#;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::UnknownComponent(_))
        ));

        let doc = r#"{ "components": [{ "name": "a" }],
            "events": [{ "time": 1, "component": "a", "letter": "x", "kind": "nope" }] }"#;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::UnknownEventKind(_))
        ));

        let doc = r##"{ "components": [{ "name": "a" }],
            "states": [{ "component": "a", "kind": "idle", "begin": 0, "end": 1, "color": "#000000" }] }"##;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::UnknownStateKind(_))
        ));
    }

    #[test]
    fn rejects_bad_values() {
        let doc = r#"{ "components": [{ "name": "a" }], "state_kinds": ["busy"],
            "states": [{ "component": "a", "kind": "busy", "begin": 0, "end": 1, "color": "blue" }] }"#;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::InvalidColor(_))
        ));

        let doc = r##"{ "components": [{ "name": "a" }], "state_kinds": ["busy"],
            "states": [{ "component": "a", "kind": "busy", "begin": 9, "end": 1, "color": "#ffffff" }] }"##;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::ReversedState { begin: 9, end: 1, .. })
        ));

        let doc = r#"{ "components": [{ "name": "a" }, { "name": "a" }] }"#;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::DuplicateComponent(_))
        ));

        let doc = r#"{ "components": [], "range": [10, 0] }"#;
        assert!(matches!(
            load_trace(doc.as_bytes()),
            Err(TraceLoadError::ReversedRange { .. })
        ));

        assert!(matches!(
            load_trace(b"{ not json"),
            Err(TraceLoadError::Json(_))
        ));
    }
}
