use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    /// Left-hand panel holding the component labels.
    LabelPanel,
    LabelBorder,
    LabelText,

    /// Label fill for a composite (enterable) component.
    CompositeLabel,
    /// Label fill for a leaf component.
    LeafLabel,

    Lifeline,
    EventTick,
    EventLetter,

    StateBorder,
    StateText,

    GroupArrow,

    TimelineBackground,
    TimelineTick,
    TimelineText,

    PageMarkerBackground,
    PageMarkerText,
}
