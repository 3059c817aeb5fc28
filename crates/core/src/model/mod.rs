pub mod entities;
pub mod source;

pub use entities::{
    ComponentId, Event, EventKindId, Group, GroupKind, GroupPoint, LetterCorner, State,
    StateKindId,
};
pub use source::{COMPONENT_PROPERTY, MemoryTrace, TraceBuilder, TraceSource};
