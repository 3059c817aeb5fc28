//! SVG renderer: converts a [`Surface`] into a standalone SVG document.

use lifeline_protocol::{Paint, Point, RenderCommand, TextAlign, ThemeToken};

use crate::render::Surface;

/// Approximate advance of one label character, for truncation.
const LABEL_CHAR_WIDTH: f64 = 7.0;

/// Render a screen or page surface as an SVG document string.
///
/// `dark` selects the color palette. Groups and clips left open by a
/// canceled pass are closed at the end.
pub fn render_svg(surface: &Surface, dark: bool) -> String {
    let (width, height) = (surface.size.width, surface.size.height);
    let mut svg = String::with_capacity(surface.len() * 120);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:monospace;font-size:12px">"#,
    ));

    let mut open = 0usize;
    let mut clips = 0usize;
    for cmd in &surface.commands {
        match cmd {
            RenderCommand::Clear { color } => {
                svg.push_str(&format!(
                    r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
                    resolve_color(*color, dark),
                ));
            }
            RenderCommand::DrawRect {
                rect,
                fill,
                border_color,
                label,
            } => {
                let stroke = border_color
                    .map(|b| format!(r#" stroke="{}" stroke-width="1""#, resolve_color(b, dark)))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" {}{stroke}/>"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    paint_attr(*fill, dark),
                ));

                if let Some(label) = label {
                    let max_chars = (rect.w / LABEL_CHAR_WIDTH) as usize;
                    if max_chars > 0 {
                        let text = if label.chars().count() > max_chars {
                            let truncated: String =
                                label.chars().take(max_chars.saturating_sub(1)).collect();
                            format!("{truncated}…")
                        } else {
                            label.to_string()
                        };
                        let text_color = match border_color {
                            Some(ThemeToken::StateBorder) => ThemeToken::StateText,
                            _ => ThemeToken::LabelText,
                        };
                        svg.push_str(&format!(
                            r#"<text x="{}" y="{}" fill="{}" dominant-baseline="central">{}</text>"#,
                            rect.x + 2.0,
                            rect.y + rect.h / 2.0,
                            resolve_color(text_color, dark),
                            escape_xml(&text),
                        ));
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, dark),
                    escape_xml(text),
                ));
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    resolve_color(*color, dark),
                ));
            }
            RenderCommand::DrawCubic {
                from,
                ctrl1,
                ctrl2,
                to,
                color,
                width: line_width,
            } => {
                svg.push_str(&format!(
                    r#"<path d="M{} {} C{} {} {} {} {} {}" fill="none" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    ctrl1.x,
                    ctrl1.y,
                    ctrl2.x,
                    ctrl2.y,
                    to.x,
                    to.y,
                    resolve_color(*color, dark),
                ));
            }
            RenderCommand::FillPolygon { points, color } => {
                svg.push_str(&format!(
                    r#"<polygon points="{}" fill="{}"/>"#,
                    polygon_points(points),
                    resolve_color(*color, dark),
                ));
            }
            RenderCommand::SetClip { rect } => {
                clips += 1;
                open += 1;
                svg.push_str(&format!(
                    r#"<clipPath id="clip{clips}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{clips})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
            }
            RenderCommand::BeginGroup { id, .. } => {
                open += 1;
                svg.push_str(&format!(r#"<g class="{}">"#, escape_xml(id)));
            }
            RenderCommand::ClearClip | RenderCommand::EndGroup => {
                if open > 0 {
                    open -= 1;
                    svg.push_str("</g>");
                }
            }
        }
    }

    for _ in 0..open {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn paint_attr(paint: Paint, dark: bool) -> String {
    match paint {
        Paint::Token(token) => format!(r#"fill="{}""#, resolve_color(token, dark)),
        Paint::Rgba(color) if color.a < 1.0 => {
            format!(r#"fill="{}" fill-opacity="{}""#, color.to_hex(), color.a)
        }
        Paint::Rgba(color) => format!(r#"fill="{}""#, color.to_hex()),
    }
}

fn polygon_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#181818",
            ThemeToken::LabelPanel | ThemeToken::TimelineBackground => "#242424",
            ThemeToken::LabelBorder | ThemeToken::StateBorder => "#5a5a5a",
            ThemeToken::LabelText | ThemeToken::StateText | ThemeToken::TimelineText => "#ececec",
            ThemeToken::CompositeLabel => "#3d5a80",
            ThemeToken::LeafLabel => "#2e2e2e",
            ThemeToken::Lifeline | ThemeToken::TimelineTick => "#9e9e9e",
            ThemeToken::EventTick | ThemeToken::EventLetter => "#ffd600",
            ThemeToken::GroupArrow => "#ff7043",
            ThemeToken::PageMarkerBackground => "#448aff",
            ThemeToken::PageMarkerText => "#ffffff",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::LabelPanel | ThemeToken::TimelineBackground => "#f1f3f5",
            ThemeToken::LabelBorder | ThemeToken::StateBorder => "#495057",
            ThemeToken::LabelText | ThemeToken::StateText | ThemeToken::TimelineText => "#1a1a2e",
            ThemeToken::CompositeLabel => "#a8dadc",
            ThemeToken::LeafLabel => "#f8f9fa",
            ThemeToken::Lifeline | ThemeToken::TimelineTick => "#666677",
            ThemeToken::EventTick | ThemeToken::EventLetter => "#1d3557",
            ThemeToken::GroupArrow => "#e63946",
            ThemeToken::PageMarkerBackground => "#457b9d",
            ThemeToken::PageMarkerText => "#ffffff",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use lifeline_protocol::{Color, DeviceSize, Rect};

    use super::*;

    fn surface(commands: Vec<RenderCommand>) -> Surface {
        let mut s = Surface::new(DeviceSize::new(800, 400));
        for c in commands {
            s.push(c);
        }
        s
    }

    #[test]
    fn state_boxes_use_their_own_color() {
        let s = surface(vec![
            RenderCommand::Clear {
                color: ThemeToken::Background,
            },
            RenderCommand::DrawRect {
                rect: Rect::new(10.0, 20.0, 100.0, 16.0),
                fill: Paint::Rgba(Color::rgba(1.0, 0.0, 0.0, 1.0)),
                border_color: Some(ThemeToken::StateBorder),
                label: Some("busy".into()),
            },
        ]);
        let svg = render_svg(&s, false);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(">busy</text>"));
        assert!(svg.contains(r#"viewBox="0 0 800 400""#));
    }

    #[test]
    fn escapes_xml_entities() {
        let s = surface(vec![RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 200.0, 18.0),
            fill: Paint::Token(ThemeToken::LeafLabel),
            border_color: None,
            label: Some("rx<T>&tx".into()),
        }]);
        let svg = render_svg(&s, true);
        assert!(svg.contains("rx&lt;T&gt;&amp;tx"));
    }

    #[test]
    fn long_labels_are_truncated_to_the_box() {
        let s = surface(vec![RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 35.0, 16.0),
            fill: Paint::Token(ThemeToken::LeafLabel),
            border_color: None,
            label: Some("scheduler".into()),
        }]);
        assert!(render_svg(&s, false).contains(">sche…</text>"));
    }

    #[test]
    fn unbalanced_groups_are_closed() {
        let s = surface(vec![
            RenderCommand::SetClip {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            },
            RenderCommand::BeginGroup {
                id: "events".into(),
                label: None,
            },
            RenderCommand::FillPolygon {
                points: vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(2.0, 3.0)],
                color: ThemeToken::GroupArrow,
            },
        ]);
        let svg = render_svg(&s, false);
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
        assert!(svg.contains(r#"points="0,0 4,0 2,3""#));
        assert!(svg.contains(r#"clip-path="url(#clip1)""#));
    }
}
