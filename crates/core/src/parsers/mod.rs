pub mod json;

use thiserror::Error;

pub use json::load_trace;

#[derive(Debug, Error)]
pub enum TraceLoadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("component {0:?} is declared twice")]
    DuplicateComponent(String),
    #[error("unknown component {0:?}")]
    UnknownComponent(String),
    #[error("unknown event kind {0:?}")]
    UnknownEventKind(String),
    #[error("unknown state kind {0:?}")]
    UnknownStateKind(String),
    #[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),
    #[error("state {kind:?} on {component:?} ends at {end} before it begins at {begin}")]
    ReversedState {
        component: String,
        kind: String,
        begin: i64,
        end: i64,
    },
    #[error("time range ends at {max} before it begins at {min}")]
    ReversedRange { min: i64, max: i64 },
}
