//! Layout and drawing of trace views.
//!
//! A render pass walks a [`TraceView`](crate::view::TraceView) in five
//! stages (labels, events, states, groups, print decorations) and emits
//! [`RenderCommand`](lifeline_protocol::RenderCommand)s into a
//! [`Surface`]. Passes check for cancellation between entities and can
//! publish partial output on a periodic tick.

pub mod config;
pub mod control;
pub mod geometry;
pub mod mapping;
pub mod metrics;
pub mod pages;
pub mod painter;
pub mod surface;

mod components;
mod events;
mod groups;
mod pass;
mod states;
mod timeline;

pub use config::{RenderConfig, TextMetrics};
pub use control::{DrawControl, DrawState, NullHost, RenderHost};
pub use geometry::{HitTarget, PixelRect, ScopeTarget, TraceGeometry};
pub use mapping::TimeMapping;
pub use metrics::Metrics;
pub use pages::PageLayout;
pub use painter::{RedrawPlan, TracePainter, plan_redraw};
pub use surface::{RenderOutcome, Surface};
