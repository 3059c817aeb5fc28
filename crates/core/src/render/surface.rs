use std::sync::Arc;

use lifeline_protocol::{DeviceSize, RenderCommand};
use serde::Serialize;

use super::geometry::TraceGeometry;

/// Render commands for one device-sized output.
#[derive(Debug, Clone, Serialize)]
pub struct Surface {
    pub size: DeviceSize,
    pub commands: Vec<RenderCommand>,
}

impl Surface {
    pub fn new(size: DeviceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Result of one render pass.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Completed {
        surface: Surface,
        geometry: Arc<TraceGeometry>,
    },
    /// Preempted at a checkpoint. The painter keeps the previous geometry.
    Canceled { partial: Surface },
}

impl RenderOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RenderOutcome::Completed { .. })
    }

    pub fn surface(&self) -> &Surface {
        match self {
            RenderOutcome::Completed { surface, .. } => surface,
            RenderOutcome::Canceled { partial } => partial,
        }
    }

    pub fn into_surface(self) -> Surface {
        match self {
            RenderOutcome::Completed { surface, .. } => surface,
            RenderOutcome::Canceled { partial } => partial,
        }
    }
}
