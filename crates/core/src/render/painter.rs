use std::sync::Arc;

use lifeline_protocol::{DeviceSize, Paint, Rect, RenderCommand, ThemeToken};

use crate::time::Time;
use crate::view::{DeltaMask, TraceView, delta};

use super::config::RenderConfig;
use super::control::{DrawControl, DrawState, RenderHost};
use super::geometry::TraceGeometry;
use super::mapping::TimeMapping;
use super::metrics::Metrics;
use super::pages::PageLayout;
use super::pass::{Canceled, PagePosition, Pass};
use super::surface::{RenderOutcome, Surface};

/// What a host should do after navigating from one view to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawPlan {
    /// Nothing visible changed.
    Skip,
    /// Draw and show only the finished surface.
    Foreground,
    /// Draw showing partial progress.
    Background,
}

/// Decide how to redraw after a navigation step. A moved time window needs
/// a full foreground pass; filter and scope changes can stream in.
pub fn plan_redraw(previous: Option<&TraceView>, next: &TraceView) -> RedrawPlan {
    let Some(previous) = previous else {
        return RedrawPlan::Foreground;
    };
    let d = delta(previous, next);
    if d.is_empty() {
        RedrawPlan::Skip
    } else if d.contains(DeltaMask::TIME_RANGE) {
        RedrawPlan::Foreground
    } else {
        RedrawPlan::Background
    }
}

/// Lays trace views out onto surfaces.
///
/// Keeps the geometry of the last completed screen pass for hit-testing
/// until the next pass completes.
#[derive(Debug)]
pub struct TracePainter {
    config: RenderConfig,
    metrics: Metrics,
    control: DrawControl,
    geometry: Arc<TraceGeometry>,
    mapping: Option<TimeMapping>,
}

impl TracePainter {
    pub fn new(config: RenderConfig) -> Self {
        let metrics = Metrics::new(&config);
        Self {
            config,
            metrics,
            control: DrawControl::new(),
            geometry: Arc::default(),
            mapping: None,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Handle for cancelling passes and delivering ticks.
    pub fn control(&self) -> DrawControl {
        self.control.clone()
    }

    pub fn state(&self) -> DrawState {
        self.control.state()
    }

    pub fn acknowledge_cancellation(&self) -> bool {
        self.control.acknowledge_cancellation()
    }

    /// Geometry of the last completed screen pass.
    pub fn geometry(&self) -> Arc<TraceGeometry> {
        Arc::clone(&self.geometry)
    }

    /// Device height that fits every visible lifeline of `view`.
    pub fn required_height(&self, view: &TraceView) -> i32 {
        self.metrics.required_height(view.visible_components().len())
    }

    /// Screen mapping for `view` on `device`.
    pub fn time_mapping(&self, view: &TraceView, device: DeviceSize) -> TimeMapping {
        TimeMapping {
            min: view.min_time(),
            span: view.max_time() - view.min_time(),
            left_margin: self.metrics.left_margin1,
            right_margin: self.metrics.right_margin,
            width: device.width,
        }
    }

    /// Column of `time` in the last completed screen pass.
    pub fn pixel_position_for_time(&self, time: Time) -> Option<i32> {
        self.mapping.map(|m| m.pixel_position_for_time(time))
    }

    /// Time under column `x` in the last completed screen pass.
    pub fn time_for_pixel(&self, x: i32) -> Option<Time> {
        self.mapping.map(|m| m.time_for_pixel(x))
    }

    /// Time window covered by the hit radius around `time`.
    pub fn nearby_range(&self, time: Time) -> Option<(Time, Time)> {
        let m = self.mapping?;
        let x = m.pixel_position_for_time(time);
        let r = self.config.event_near_radius;
        Some((m.time_for_pixel(x - r), m.time_for_pixel(x + r)))
    }

    /// Device point of `time` on `lifeline` in the last completed pass.
    pub fn lifeline_point(&self, lifeline: usize, time: Time) -> Option<(i32, i32)> {
        let y = *self.geometry.lifeline_position.get(lifeline)?;
        Some((self.pixel_position_for_time(time)?, y))
    }

    pub fn page_layout(&self, view: &TraceView, device: DeviceSize, time_per_page: Time) -> PageLayout {
        PageLayout::compute(
            &self.metrics,
            (view.min_time(), view.max_time()),
            view.visible_components().len(),
            time_per_page,
            (device.width, device.height),
        )
    }

    /// Draw `view` to fill `device`. On completion the painter's geometry
    /// is replaced; on cancellation it is left as it was.
    pub fn render(
        &mut self,
        view: &TraceView,
        device: DeviceSize,
        start_in_background: bool,
        host: &mut dyn RenderHost,
    ) -> RenderOutcome {
        self.control.acknowledge_cancellation();
        let mapping = self.time_mapping(view, device);

        if view.visible_components().is_empty() {
            let (surface, geometry) = self.empty(device);
            self.geometry = Arc::clone(&geometry);
            self.mapping = Some(mapping);
            return RenderOutcome::Completed { surface, geometry };
        }

        tracing::debug!(
            components = view.visible_components().len(),
            width = device.width,
            height = device.height,
            background = start_in_background,
            "screen render"
        );

        self.begin(start_in_background, host);
        let control = self.control.clone();
        let rows = 0..view.visible_components().len();
        let mut pass = Pass::new(
            view.clone(),
            &self.config,
            mapping,
            rows,
            None,
            Surface::new(device),
            &control,
            host,
        );
        pass.push(RenderCommand::Clear {
            color: ThemeToken::Background,
        });
        let result = pass.draw_page();
        let (surface, geometry) = (pass.surface, pass.geometry);

        host.cancel_periodic_tick();
        match result {
            Ok(()) => {
                self.control.set(DrawState::Ready);
                let geometry = Arc::new(geometry);
                self.geometry = Arc::clone(&geometry);
                self.mapping = Some(mapping);
                RenderOutcome::Completed { surface, geometry }
            }
            Err(Canceled) => {
                tracing::debug!(commands = surface.len(), "screen render canceled");
                RenderOutcome::Canceled { partial: surface }
            }
        }
    }

    /// Draw page `page_index` of the print layout of `view`, row-major.
    /// The painter's screen geometry is not touched.
    pub fn render_page(
        &mut self,
        view: &TraceView,
        device: DeviceSize,
        time_per_page: Time,
        page_index: usize,
        host: &mut dyn RenderHost,
    ) -> RenderOutcome {
        self.control.acknowledge_cancellation();

        if view.visible_components().is_empty() {
            let (surface, geometry) = self.empty(device);
            return RenderOutcome::Completed { surface, geometry };
        }

        let layout = self.page_layout(view, device, time_per_page);
        assert!(
            page_index < layout.page_count(),
            "page {page_index} out of {}",
            layout.page_count()
        );
        let (i, j) = layout.position(page_index);
        let (min, max) = layout.time_window(i);
        let page_view = view.set_range(min, max);
        let mapping = TimeMapping {
            min,
            span: layout.time_per_page(i),
            left_margin: if i == 0 {
                self.metrics.left_margin1
            } else {
                self.metrics.left_margin2
            },
            right_margin: self.metrics.right_margin,
            width: device.width,
        };

        tracing::debug!(
            page = page_index,
            horizontal = i,
            vertical = j,
            pages = layout.page_count(),
            "print page render"
        );

        self.begin(false, host);
        let control = self.control.clone();
        let mut pass = Pass::new(
            page_view,
            &self.config,
            mapping,
            layout.component_range(j),
            Some(PagePosition {
                index: (i, j),
                count: (layout.horizontal, layout.vertical),
            }),
            Surface::new(device),
            &control,
            host,
        );
        pass.push(RenderCommand::Clear {
            color: ThemeToken::Background,
        });
        let result = pass.draw_page();
        let (surface, geometry) = (pass.surface, pass.geometry);

        host.cancel_periodic_tick();
        match result {
            Ok(()) => {
                self.control.set(DrawState::Ready);
                RenderOutcome::Completed {
                    surface,
                    geometry: Arc::new(geometry),
                }
            }
            Err(Canceled) => {
                tracing::debug!(page = page_index, "print page render canceled");
                RenderOutcome::Canceled { partial: surface }
            }
        }
    }

    fn begin(&self, background: bool, host: &mut dyn RenderHost) {
        self.control.set(if background {
            DrawState::Background
        } else {
            DrawState::Active
        });
        // a tick left over from an earlier pass must not fire immediately
        self.control.take_tick();
        host.request_periodic_tick(self.config.first_tick());
    }

    /// Background and label panel only.
    fn empty(&self, device: DeviceSize) -> (Surface, Arc<TraceGeometry>) {
        tracing::debug!("no visible components, drawing empty trace");
        let mut surface = Surface::new(device);
        surface.push(RenderCommand::Clear {
            color: ThemeToken::Background,
        });
        surface.push(RenderCommand::DrawRect {
            rect: Rect::new(
                0.0,
                0.0,
                f64::from(self.metrics.left_margin1),
                f64::from(device.height),
            ),
            fill: Paint::Token(ThemeToken::LabelPanel),
            border_color: None,
            label: None,
        });
        let geometry = TraceGeometry {
            left_margin: self.metrics.left_margin1,
            ..TraceGeometry::default()
        };
        self.control.set(DrawState::Ready);
        (surface, Arc::new(geometry))
    }
}
