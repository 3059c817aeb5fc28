//! Core of the lifeline trace viewer: hierarchical selections, the trace
//! model and its navigable views, and the rendering engine that turns a
//! view into draw commands.

pub mod model;
pub mod parsers;
pub mod render;
pub mod selection;
pub mod svg;
pub mod time;
pub mod view;

pub use model::{MemoryTrace, TraceBuilder, TraceSource};
pub use render::{RenderConfig, TracePainter};
pub use selection::Selection;
pub use time::{Time, TimeUnit};
pub use view::TraceView;
