//! Where simulation ticks come from.
//!
//! The engine never schedules itself. It is handed a [`TickSource`] and asks
//! it to call back at a fixed interval while physics is enabled. Production
//! code uses [`FrameTimer`], built on Slint's event-loop timer; tests and
//! hosts with their own frame signal use [`ManualTicks`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Something that can invoke a callback periodically.
pub trait TickSource {
    /// Start (or restart) calling `on_tick` every `interval`.
    fn start(&mut self, interval: Duration, on_tick: Box<dyn FnMut()>);

    /// Stop calling back. The callback is dropped before this returns.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Ticks from a repeated [`slint::Timer`] on the UI thread.
#[derive(Default)]
pub struct FrameTimer {
    timer: slint::Timer,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for FrameTimer {
    fn start(&mut self, interval: Duration, mut on_tick: Box<dyn FnMut()>) {
        self.timer
            .start(slint::TimerMode::Repeated, interval, move || on_tick());
    }

    fn stop(&mut self) {
        // `Timer::stop` keeps the closure alive; replacing the timer drops it.
        self.timer = slint::Timer::default();
    }

    fn is_running(&self) -> bool {
        self.timer.running()
    }
}

/// Ticks on demand via [`ManualTicks::fire`].
///
/// Clones share state, so a test can keep one handle while the engine owns another.
#[derive(Clone, Default)]
pub struct ManualTicks {
    callback: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
    interval: Rc<Cell<Duration>>,
    fired: Rc<Cell<usize>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke the callback once. Returns `false` if not running.
    ///
    /// The callback may stop or restart this source while it runs.
    pub fn fire(&self) -> bool {
        let Some(mut callback) = self.callback.borrow_mut().take() else {
            return false;
        };
        callback();
        self.fired.set(self.fired.get() + 1);
        let mut slot = self.callback.borrow_mut();
        // Only restore if the callback did not stop or replace itself.
        if slot.is_none() && self.interval.get() != Duration::ZERO {
            *slot = Some(callback);
        }
        true
    }

    /// Fire `n` times, stopping early if the source is stopped. Returns ticks delivered.
    pub fn fire_n(&self, n: usize) -> usize {
        (0..n).take_while(|_| self.fire()).count()
    }

    /// Total ticks delivered over this source's lifetime.
    pub fn fired(&self) -> usize {
        self.fired.get()
    }

    /// Interval requested by the last `start`, or zero while stopped.
    pub fn interval(&self) -> Duration {
        self.interval.get()
    }
}

impl TickSource for ManualTicks {
    fn start(&mut self, interval: Duration, on_tick: Box<dyn FnMut()>) {
        // Zero marks "stopped", so clamp to a nanosecond.
        self.interval.set(interval.max(Duration::from_nanos(1)));
        *self.callback.borrow_mut() = Some(on_tick);
    }

    fn stop(&mut self) {
        self.interval.set(Duration::ZERO);
        self.callback.borrow_mut().take();
    }

    fn is_running(&self) -> bool {
        self.interval.get() != Duration::ZERO
    }
}
