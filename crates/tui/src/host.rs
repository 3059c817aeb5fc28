//! Drives render passes from the terminal event loop.

use std::io::Stdout;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind, MouseEventKind};
use lifeline_core::render::{DrawControl, RenderHost, Surface};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::app::draw_frame;
use crate::renderer::CellSize;

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Input that makes the pass on screen stale. Pointer motion and
/// scrolling are dropped while drawing.
pub fn preempts(event: &Event) -> bool {
    match event {
        Event::Key(key) => key.kind == KeyEventKind::Press,
        Event::Mouse(mouse) => matches!(mouse.kind, MouseEventKind::Down(_)),
        Event::Resize(..) => true,
        _ => false,
    }
}

/// Pending input that [`preempts`] the pass cancels it; an elapsed
/// deadline is a tick. Events read while drawing are kept for the caller.
pub struct TerminalHost<'a> {
    terminal: &'a mut Term,
    control: DrawControl,
    cell: CellSize,
    status: String,
    deadline: Option<Instant>,
    deferred: Vec<Event>,
}

impl<'a> TerminalHost<'a> {
    pub fn new(terminal: &'a mut Term, control: DrawControl, cell: CellSize, status: String) -> Self {
        Self {
            terminal,
            control,
            cell,
            status,
            deadline: None,
            deferred: Vec::new(),
        }
    }

    /// Input consumed during the pass, oldest first.
    pub fn into_deferred(self) -> Vec<Event> {
        self.deferred
    }
}

impl RenderHost for TerminalHost<'_> {
    fn request_periodic_tick(&mut self, interval: Duration) {
        self.deadline = Some(Instant::now() + interval);
    }

    fn cancel_periodic_tick(&mut self) {
        self.deadline = None;
    }

    fn poll_cancellation(&mut self) -> bool {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.deadline = None;
            self.control.tick();
        }
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(err) => {
                    tracing::warn!(%err, "polling terminal input failed");
                    return false;
                }
            }
            match event::read() {
                Ok(event) if preempts(&event) => {
                    self.deferred.push(event);
                    return true;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "reading terminal input failed");
                    return false;
                }
            }
        }
    }

    fn on_partial_result_available(&mut self, partial: &Surface) {
        let status = format!("{} | drawing…", self.status);
        let cell = self.cell;
        if let Err(err) = self
            .terminal
            .draw(|frame| draw_frame(frame, partial, cell, &status))
        {
            tracing::warn!(%err, "painting partial surface failed");
        }
    }
}
