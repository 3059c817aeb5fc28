use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// Fill or stroke source for a command.
///
/// Most of the diagram is painted with semantic tokens resolved by the
/// renderer's theme. State intervals carry their own color from the trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Token(ThemeToken),
    Rgba(Color),
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Token(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Rgba(color)
    }
}

/// A single, stateless render instruction.
///
/// The painter emits a `Vec<RenderCommand>` per surface. Renderers consume
/// the list sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the whole surface.
    Clear { color: ThemeToken },

    /// Draw a filled rectangle, optionally framed and labelled. The label is
    /// left-aligned and vertically centered.
    DrawRect {
        rect: Rect,
        fill: Paint,
        border_color: Option<ThemeToken>,
        label: Option<SharedStr>,
    },

    /// Draw a text string. `position` is the baseline origin.
    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Stroke a single cubic Bézier segment.
    DrawCubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Fill a closed polygon.
    FillPolygon { points: Vec<Point>, color: ThemeToken },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Begin a logical group (one layout stage of a page). Renderers may use
    /// this for batching or layer separation.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_from_token_and_color() {
        assert_eq!(
            Paint::from(ThemeToken::Lifeline),
            Paint::Token(ThemeToken::Lifeline)
        );
        let c = Color::rgba(1.0, 1.0, 0.0, 1.0);
        assert_eq!(Paint::from(c), Paint::Rgba(c));
    }

    #[test]
    fn commands_serialize_as_tagged_json() {
        let cmd = RenderCommand::DrawLine {
            from: Point::new(0.0, 1.0),
            to: Point::new(2.0, 3.0),
            color: ThemeToken::EventTick,
            width: 2.0,
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert!(json.starts_with("{\"DrawLine\""), "{json}");
        assert!(json.contains("EventTick"));
    }
}
