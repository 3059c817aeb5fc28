//! Drawing state machine shared between the engine and its host.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use super::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Ready,
    /// Drawing; the host should not show the surface yet.
    Active,
    /// Drawing; partial output may be shown.
    Background,
    /// Abandoned at the next checkpoint, until acknowledged.
    Canceled,
}

impl DrawState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => DrawState::Active,
            2 => DrawState::Background,
            3 => DrawState::Canceled,
            _ => DrawState::Ready,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            DrawState::Ready => 0,
            DrawState::Active => 1,
            DrawState::Background => 2,
            DrawState::Canceled => 3,
        }
    }

    pub fn is_drawing(self) -> bool {
        matches!(self, DrawState::Active | DrawState::Background)
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: AtomicU8,
    tick_pending: AtomicBool,
}

/// Cloneable handle to a painter's drawing state.
///
/// Hosts keep a clone to cancel a pass or deliver the periodic tick from
/// their event handling.
#[derive(Debug, Clone, Default)]
pub struct DrawControl {
    inner: Arc<Inner>,
}

impl DrawControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DrawState {
        DrawState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Preempt the pass in flight. Returns `false` when nothing was drawing.
    pub fn cancel(&self) -> bool {
        let mut current = self.inner.state.load(Ordering::Acquire);
        loop {
            if !DrawState::from_u8(current).is_drawing() {
                return false;
            }
            match self.inner.state.compare_exchange(
                current,
                DrawState::Canceled.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Deliver one periodic tick, picked up at the next checkpoint.
    pub fn tick(&self) {
        self.inner.tick_pending.store(true, Ordering::Release);
    }

    /// Move `Canceled` back to `Ready`.
    pub fn acknowledge_cancellation(&self) -> bool {
        self.inner
            .state
            .compare_exchange(
                DrawState::Canceled.as_u8(),
                DrawState::Ready.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn set(&self, state: DrawState) {
        self.inner.state.store(state.as_u8(), Ordering::Release);
    }

    pub(crate) fn take_tick(&self) -> bool {
        self.inner.tick_pending.swap(false, Ordering::AcqRel)
    }

    /// `Active` becomes `Background`; other states are left alone.
    pub(crate) fn promote(&self) {
        let _ = self.inner.state.compare_exchange(
            DrawState::Active.as_u8(),
            DrawState::Background.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

/// Services the engine needs from the windowing side.
pub trait RenderHost {
    /// Arm (or re-arm) the periodic tick. The host answers by calling
    /// [`DrawControl::tick`] once the interval elapsed.
    fn request_periodic_tick(&mut self, interval: Duration);

    fn cancel_periodic_tick(&mut self);

    /// Pump pending input; `true` preempts the current pass.
    fn poll_cancellation(&mut self) -> bool;

    /// A tick fired during a background pass; `partial` holds everything
    /// drawn so far.
    fn on_partial_result_available(&mut self, partial: &Surface);
}

/// Host that never ticks nor cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl RenderHost for NullHost {
    fn request_periodic_tick(&mut self, _interval: Duration) {}

    fn cancel_periodic_tick(&mut self) {}

    fn poll_cancellation(&mut self) -> bool {
        false
    }

    fn on_partial_result_available(&mut self, _partial: &Surface) {}
}
