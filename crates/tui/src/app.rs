use std::mem;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use lifeline_core::render::{
    HitTarget, RedrawPlan, RenderConfig, RenderHost, RenderOutcome, ScopeTarget, Surface, TracePainter,
    plan_redraw,
};
use lifeline_core::view::{ComponentKind, TraceView, delta};
use lifeline_protocol::DeviceSize;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Block;

use crate::host::{Term, TerminalHost};
use crate::renderer::{CellSize, draw_surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// Nothing on screen needs to change.
    Ignored,
    Quit,
}

/// Interactive viewer state. Every navigation step produces a new view;
/// the old one goes onto the history stack.
pub struct App {
    view: TraceView,
    history: Vec<TraceView>,
    painter: TracePainter,
    cell: CellSize,
    selected: usize,
    /// View and device of the surface on screen.
    drawn: Option<(TraceView, DeviceSize)>,
    surface: Option<Surface>,
}

impl App {
    pub fn new(view: TraceView, config: RenderConfig) -> Self {
        Self {
            view,
            history: Vec::new(),
            cell: CellSize::for_text(&config.text),
            painter: TracePainter::new(config),
            selected: 0,
            drawn: None,
            surface: None,
        }
    }

    pub fn view(&self) -> &TraceView {
        &self.view
    }

    fn navigate(&mut self, next: TraceView) {
        if delta(&self.view, &next).is_empty() {
            return;
        }
        self.history.push(mem::replace(&mut self.view, next));
        self.clamp_selection();
    }

    fn back(&mut self) {
        if let Some(previous) = self.history.pop() {
            self.view = previous;
            self.clamp_selection();
        }
    }

    fn clamp_selection(&mut self) {
        let rows = self.view.visible_components().len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    fn zoom(&mut self, zoom_in: bool) {
        let (min, max) = (self.view.min_time(), self.view.max_time());
        let span = max - min;
        let (lo, hi) = if zoom_in {
            if span.raw() < 4 {
                return;
            }
            let quarter = span / 4.0;
            (min + quarter, max - quarter)
        } else {
            let source = self.view.source();
            let half = span / 2.0;
            (
                (min - half).max(source.min_time()),
                (max + half).min(source.max_time()),
            )
        };
        self.navigate(self.view.set_range(lo, hi));
    }

    fn pan(&mut self, forward: bool) {
        let (min, max) = (self.view.min_time(), self.view.max_time());
        let source = self.view.source();
        let step = (max - min) / 10.0;
        let next = if forward {
            let step = step.min(source.max_time() - max);
            self.view.set_range(min + step, max + step)
        } else {
            let step = step.min(min - source.min_time());
            self.view.set_range(min - step, max - step)
        };
        self.navigate(next);
    }

    fn enter_selected(&mut self) {
        let Some(&component) = self.view.visible_components().get(self.selected) else {
            return;
        };
        if self.view.component_kind(component) == ComponentKind::Composite {
            self.selected = 0;
            self.navigate(self.view.set_parent_component(Some(component)));
        }
    }

    fn leave_scope(&mut self) {
        if let Some(scope) = self.view.parent_component() {
            let up = self.view.components().item_parent(scope);
            self.navigate(self.view.set_parent_component(up));
        }
    }

    /// Point at a cell of the diagram. Row 0 is the status line.
    fn click(&mut self, column: u16, row: u16) {
        let Some(row) = row.checked_sub(1) else {
            return;
        };
        let Some((drawn, _)) = &self.drawn else {
            return;
        };
        let x = i32::from(column) * self.cell.width + self.cell.width / 2;
        let y = i32::from(row) * self.cell.height + self.cell.height / 2;
        let radius = self.painter.config().event_near_radius;

        match self.painter.geometry().target_under_cursor(x, y, drawn, radius) {
            HitTarget::ScopeLink(ScopeTarget { scope }) => {
                self.selected = 0;
                self.navigate(self.view.set_parent_component(scope));
            }
            HitTarget::State {
                component: Some(component),
                ..
            }
            | HitTarget::Lifelines {
                component: Some(component),
                ..
            } => {
                if let Some(row) = self.view.visible_components().iter().position(|&c| c == component) {
                    self.selected = row;
                }
            }
            _ => {}
        }
    }

    pub fn handle_event(&mut self, event: Event) -> Action {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key.code),
            // every press cancels a pass in progress, so each one redraws
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(button),
                column,
                row,
                ..
            }) => {
                if button == MouseButton::Left {
                    self.click(column, row);
                }
                Action::Continue
            }
            Event::Resize(..) => Action::Continue,
            _ => Action::Ignored,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Left => self.pan(false),
            KeyCode::Right => self.pan(true),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(true),
            KeyCode::Char('-') => self.zoom(false),
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected += 1;
                self.clamp_selection();
            }
            KeyCode::Char('k') | KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Enter => self.enter_selected(),
            KeyCode::Backspace => self.leave_scope(),
            KeyCode::Char('g') => {
                let groups = !self.view.groups_enabled();
                self.navigate(self.view.set_groups_enabled(groups));
            }
            KeyCode::Char('r') => self.navigate(self.view.root()),
            KeyCode::Char('b') => self.back(),
            _ => {}
        }
        Action::Continue
    }

    pub fn status(&self) -> String {
        let display = self.painter.config().time_display;
        let scope = self
            .view
            .parent_component()
            .map_or_else(|| "/".to_string(), |c| self.view.component_name(c, true));
        let selected = self
            .view
            .visible_components()
            .get(self.selected)
            .map(|&c| self.view.component_name(c, false))
            .unwrap_or_default();
        format!(
            " lifeline | {scope} | {} – {} | [{selected}] | ←→ pan  +/- zoom  j/k select  ⏎ enter  ⌫ leave  g arrows  b back  q quit ",
            display.format(self.view.min_time()),
            display.format(self.view.max_time()),
        )
    }

    /// Device size the terminal content area stands for.
    fn device(&self, terminal: &Term) -> Result<DeviceSize> {
        let size = terminal.size()?;
        Ok(DeviceSize::new(
            i32::from(size.width) * self.cell.width,
            i32::from(size.height.saturating_sub(1)) * self.cell.height,
        ))
    }

    fn plan(&self, device: DeviceSize) -> RedrawPlan {
        match &self.drawn {
            Some((view, size)) if *size == device => plan_redraw(Some(view), &self.view),
            _ => RedrawPlan::Foreground,
        }
    }

    /// Run one pass over the current view. Returns whether it completed;
    /// a preempted pass leaves the previous surface in place.
    fn render_with(&mut self, device: DeviceSize, background: bool, host: &mut dyn RenderHost) -> bool {
        match self.painter.render(&self.view, device, background, host) {
            RenderOutcome::Completed { surface, .. } => {
                self.surface = Some(surface);
                self.drawn = Some((self.view.clone(), device));
                true
            }
            RenderOutcome::Canceled { partial } => {
                tracing::debug!(commands = partial.len(), "redraw preempted by input");
                self.painter.acknowledge_cancellation();
                false
            }
        }
    }

    /// Render the current view unless the surface on screen already shows
    /// it. Returns the input that arrived while drawing.
    pub fn redraw(&mut self, terminal: &mut Term) -> Result<Vec<Event>> {
        let device = self.device(terminal)?;
        let status = self.status();
        let plan = self.plan(device);
        let mut deferred = Vec::new();

        if plan != RedrawPlan::Skip || self.surface.is_none() {
            let mut host = TerminalHost::new(terminal, self.painter.control(), self.cell, status.clone());
            let completed = self.render_with(device, plan == RedrawPlan::Background, &mut host);
            deferred = host.into_deferred();
            if !completed {
                return Ok(deferred);
            }
        }

        if let Some(surface) = &self.surface {
            let cell = self.cell;
            terminal.draw(|frame| draw_frame(frame, surface, cell, &status))?;
        }
        Ok(deferred)
    }
}

/// Status line on top, the surface below it.
pub fn draw_frame(frame: &mut Frame, surface: &Surface, cell: CellSize, status: &str) {
    let area = frame.area();
    let header = Block::default()
        .title(status.to_string())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, Rect::new(area.x, area.y, area.width, 1));

    let content = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
    draw_surface(frame.buffer_mut(), content, surface, cell);
}
