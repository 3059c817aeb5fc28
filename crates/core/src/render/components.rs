//! Stage 1: component labels and lifelines.

use lifeline_protocol::{Paint, Point, Rect, RenderCommand, ThemeToken};

use crate::model::ComponentId;
use crate::view::ComponentKind;

use super::geometry::{PixelRect, ScopeTarget};
use super::pass::Pass;

/// Left edge of the scope label.
const COMPONENT_START: i32 = 5;
/// Component labels are indented this much under the scope label.
const COMPONENT_INDENT: i32 = 15;
/// Offset of the shadow box behind composite labels.
const COMPOSITE_OFFSET: i32 = 4;

fn label_fill(kind: ComponentKind) -> Paint {
    match kind {
        ComponentKind::Composite => Paint::Token(ThemeToken::CompositeLabel),
        ComponentKind::Leaf => Paint::Token(ThemeToken::LeafLabel),
    }
}

impl Pass<'_> {
    pub(crate) fn draw_label_panel(&mut self) {
        self.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, f64::from(self.left_margin()), f64::from(self.height)),
            fill: Paint::Token(ThemeToken::LabelPanel),
            border_color: None,
            label: None,
        });
    }

    /// Lay out one row per visible component and record every row's y,
    /// including rows above and below this page.
    pub(crate) fn draw_components_list(&mut self) {
        if !self.is_printing() {
            self.draw_label_panel();
        }

        let teh = self.metrics.text_elements_height;
        let stepping = self.metrics.lifeline_stepping;
        let component_width = self.left_margin() - 30;
        let mut y = self.metrics.y_unparented;

        if let Some(parent) = self.view.parent_component()
            && self.rows.start == 0
            && self.draw_labels
        {
            self.draw_scope_label(parent, teh, component_width);
        }

        let from = i32::try_from(self.rows.start).unwrap_or(i32::MAX / stepping);
        y -= from * stepping;
        let start = COMPONENT_START + COMPONENT_INDENT;
        let right_edge = self.width - self.metrics.right_margin;

        let visible: Vec<ComponentId> = self.view.visible_components().to_vec();
        self.geometry.lifeline_position.clear();
        for (i, component) in visible.into_iter().enumerate() {
            if self.on_page(i) {
                let name = self.view.component_name(component, false);
                let kind = self.view.component_kind(component);
                let fill = label_fill(kind);

                if self.draw_labels {
                    if kind == ComponentKind::Composite {
                        let shadow = self.text_box(
                            &name,
                            start + COMPOSITE_OFFSET,
                            y + COMPOSITE_OFFSET,
                            component_width,
                            teh,
                            fill,
                            ThemeToken::LabelBorder,
                        );
                        self.geometry.clickable_components.push((
                            shadow.translated(-COMPOSITE_OFFSET, -COMPOSITE_OFFSET),
                            ScopeTarget {
                                scope: Some(component),
                            },
                        ));
                    }
                    let r = self.text_box(
                        &name,
                        start,
                        y,
                        component_width,
                        teh,
                        fill,
                        ThemeToken::LabelBorder,
                    );
                    self.geometry.component_labels.push((r, component));
                }

                self.geometry.lifeline_rects.push((
                    PixelRect::new(0, y - teh / 2 + 1, right_edge, teh + 2),
                    component,
                ));
                self.push(RenderCommand::DrawLine {
                    from: Point::new(f64::from(self.left_margin()), f64::from(y)),
                    to: Point::new(f64::from(self.width), f64::from(y)),
                    color: ThemeToken::Lifeline,
                    width: 1.0,
                });
            }

            self.geometry.lifeline_position.push(y);
            y += stepping;
        }
    }

    /// The entered composite, above the first lifeline. Its box leads one
    /// level up, its label names the scope.
    fn draw_scope_label(&mut self, parent: ComponentId, y: i32, component_width: i32) {
        let name = self.view.component_name(parent, false);
        let fill = label_fill(self.view.component_kind(parent));
        let r = self.text_box(
            &name,
            COMPONENT_START,
            y,
            component_width + COMPONENT_INDENT,
            self.metrics.text_elements_height,
            fill,
            ThemeToken::LabelBorder,
        );
        let up = self.view.components().item_parent(parent);
        self.geometry
            .clickable_components
            .push((r, ScopeTarget { scope: up }));
        self.geometry.component_labels.push((r, parent));
    }
}
