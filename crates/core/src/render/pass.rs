//! One page of one render pass.

use lifeline_protocol::{Paint, RenderCommand, SharedStr, ThemeToken};

use crate::view::TraceView;

use super::config::RenderConfig;
use super::control::{DrawControl, DrawState, RenderHost};
use super::geometry::{PixelRect, TraceGeometry};
use super::mapping::TimeMapping;
use super::metrics::Metrics;
use super::surface::Surface;

/// Marker returned through `?` when a checkpoint observes cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Canceled;

/// Which page of the print layout a pass draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PagePosition {
    pub(crate) index: (usize, usize),
    pub(crate) count: (usize, usize),
}

pub(crate) struct Pass<'a> {
    /// The view narrowed to this page's time window.
    pub(crate) view: TraceView,
    pub(crate) config: &'a RenderConfig,
    pub(crate) metrics: Metrics,
    pub(crate) mapping: TimeMapping,
    pub(crate) width: i32,
    pub(crate) height: i32,
    /// First and one-past-last visible component on this page.
    pub(crate) rows: std::ops::Range<usize>,
    /// Component labels are drawn on the first horizontal page only.
    pub(crate) draw_labels: bool,
    /// `Some` when drawing a printed page.
    pub(crate) page: Option<PagePosition>,
    pub(crate) surface: Surface,
    pub(crate) geometry: TraceGeometry,
    control: &'a DrawControl,
    host: &'a mut dyn RenderHost,
}

impl<'a> Pass<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        view: TraceView,
        config: &'a RenderConfig,
        mapping: TimeMapping,
        rows: std::ops::Range<usize>,
        page: Option<PagePosition>,
        surface: Surface,
        control: &'a DrawControl,
        host: &'a mut dyn RenderHost,
    ) -> Self {
        let metrics = Metrics::new(config);
        let (width, height) = (surface.size.width, surface.size.height);
        let geometry =
            TraceGeometry::new(view.visible_components().len(), width, mapping.left_margin);
        Self {
            draw_labels: page.is_none_or(|p| p.index.0 == 0),
            view,
            config,
            metrics,
            mapping,
            width,
            height,
            rows,
            page,
            surface,
            geometry,
            control,
            host,
        }
    }

    pub(crate) fn left_margin(&self) -> i32 {
        self.mapping.left_margin
    }

    pub(crate) fn is_printing(&self) -> bool {
        self.page.is_some()
    }

    pub(crate) fn on_page(&self, lifeline: usize) -> bool {
        self.rows.contains(&lifeline)
    }

    pub(crate) fn push(&mut self, command: RenderCommand) {
        self.surface.push(command);
    }

    pub(crate) fn begin_group(&mut self, id: &str) {
        self.push(RenderCommand::BeginGroup {
            id: SharedStr::from(id),
            label: None,
        });
    }

    pub(crate) fn end_group(&mut self) {
        self.push(RenderCommand::EndGroup);
    }

    /// Stages 1 to 5, then the print decorations.
    pub(crate) fn draw_page(&mut self) -> Result<(), Canceled> {
        self.begin_group("components");
        self.draw_components_list();
        self.end_group();
        self.checkpoint()?;

        let stepping = self.metrics.lifeline_stepping;
        let clip_rows = i32::try_from(self.clip_rows()).unwrap_or(i32::MAX / stepping);
        let clip = PixelRect::new(
            self.left_margin(),
            self.metrics.y_unparented - stepping / 2,
            self.width - self.metrics.right_margin - self.left_margin(),
            clip_rows.saturating_mul(stepping),
        );
        self.push(RenderCommand::SetClip {
            rect: clip.to_rect(),
        });

        self.begin_group("events");
        let events = self.draw_events();
        self.end_group();
        events?;

        self.begin_group("states");
        let states = self.draw_states();
        self.end_group();
        states?;

        self.begin_group("groups");
        let groups = self.draw_groups();
        self.end_group();
        groups?;

        self.push(RenderCommand::ClearClip);

        if let Some(page) = self.page {
            self.begin_group("timeline");
            self.draw_timeline(self.height - self.metrics.timeline_height);
            self.draw_page_markers(page);
            self.end_group();
        }
        Ok(())
    }

    fn clip_rows(&self) -> usize {
        if self.is_printing() {
            self.metrics.components_per_page(self.height)
        } else {
            self.metrics
                .components_per_page(self.height)
                .max(self.rows.len())
        }
    }

    /// Poll the host, then honour cancellation and pending ticks.
    pub(crate) fn checkpoint(&mut self) -> Result<(), Canceled> {
        if self.host.poll_cancellation() {
            self.control.cancel();
        }
        if self.control.state() == DrawState::Canceled {
            tracing::trace!(commands = self.surface.len(), "render pass aborted at checkpoint");
            return Err(Canceled);
        }
        if self.control.take_tick() {
            self.control.promote();
            self.host.request_periodic_tick(self.config.next_tick());
            if self.control.state() == DrawState::Background {
                self.host.on_partial_result_available(&self.surface);
            }
        }
        Ok(())
    }

    /// Box vertically centered on `y`. Returns the painted area including
    /// the one pixel border.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn text_box(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        fill: Paint,
        border: ThemeToken,
    ) -> PixelRect {
        let r = PixelRect::new(x, y - height / 2, width, height);
        self.push(RenderCommand::DrawRect {
            rect: r.to_rect(),
            fill,
            border_color: Some(border),
            label: (!text.is_empty()).then(|| SharedStr::from(text)),
        });
        r.inflated(1)
    }
}
