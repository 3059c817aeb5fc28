use bitflags::bitflags;

use super::TraceView;

bitflags! {
    /// What differs between two views. An unset bit means that aspect is
    /// definitely unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeltaMask: u8 {
        /// The scope moved.
        const COMPONENT_POSITION = 1;
        const COMPONENTS = 1 << 1;
        /// Event-kind filter or group arrows toggled.
        const EVENT_TYPES = 1 << 2;
        /// State filter or the set of available states.
        const STATE_TYPES = 1 << 3;
        const TIME_RANGE = 1 << 4;
    }
}

/// Classify the change from `a` to `b`. Both views must come from the same
/// trace.
pub fn delta(a: &TraceView, b: &TraceView) -> DeltaMask {
    let mut result = DeltaMask::empty();

    if a.parent_component() != b.parent_component() {
        result |= DeltaMask::COMPONENT_POSITION;
    }
    if a.components() != b.components() {
        result |= DeltaMask::COMPONENTS;
    }
    if a.events() != b.events() || a.groups_enabled() != b.groups_enabled() {
        result |= DeltaMask::EVENT_TYPES;
    }
    if a.states() != b.states() || a.available_states() != b.available_states() {
        result |= DeltaMask::STATE_TYPES;
    }
    // Equality on `Time` never panics, so a unit switch lands here too.
    if a.min_time() != b.min_time() || a.max_time() != b.max_time() {
        result |= DeltaMask::TIME_RANGE;
    }

    result
}
