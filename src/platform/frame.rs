//! Frame loop driver
//!
//! The host environment (requestAnimationFrame in the browser, a plain loop
//! natively) calls [`GameLoop::on_frame`] with a monotonic timestamp. The
//! loop measures the clamped delta, runs the installed callback and asks its
//! scheduler for the next frame until told to stop.

use crate::consts::MAX_FRAME_DELTA_MS;

/// Measures frame deltas from host timestamps (milliseconds)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring from `now`
    pub fn start(&mut self, now: f64) {
        self.last = Some(now);
    }

    /// Delta since the previous frame, clamped to `[0, MAX_FRAME_DELTA_MS]`
    ///
    /// The very first tick without a `start` yields 0.
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last = Some(now);
        dt as f32
    }
}

/// Handle of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(pub i32);

/// Something that can schedule the next frame
pub trait FrameScheduler {
    /// Ask for one more frame. `None` if the host refused.
    fn request_frame(&mut self) -> Option<FrameRequest>;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// What the frame callback wants next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

type FrameCallback = Box<dyn FnMut(f32) -> LoopControl>;

pub struct GameLoop<S: FrameScheduler> {
    scheduler: S,
    clock: FrameClock,
    callback: Option<FrameCallback>,
    pending: Option<FrameRequest>,
    running: bool,
}

impl<S: FrameScheduler> GameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            clock: FrameClock::new(),
            callback: None,
            pending: None,
            running: false,
        }
    }

    /// Install or replace the per-frame callback. A running loop keeps running.
    pub fn set_callback(&mut self, callback: impl FnMut(f32) -> LoopControl + 'static) {
        self.callback = Some(Box::new(callback));
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Start requesting frames. No-op if already running.
    pub fn start(&mut self, now: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.clock.start(now);
        self.schedule();
    }

    /// Run one frame. Returns whether the loop is still running afterwards.
    pub fn on_frame(&mut self, now: f64) -> bool {
        self.pending = None;
        if !self.running {
            // Stale frame delivered after stop
            return false;
        }

        let dt = self.clock.tick(now);
        let control = match self.callback.as_mut() {
            Some(callback) => callback(dt),
            None => LoopControl::Continue,
        };

        match control {
            LoopControl::Continue if self.running => self.schedule(),
            LoopControl::Continue => {}
            LoopControl::Stop => self.stop(),
        }
        self.running
    }

    /// Stop the loop and cancel any pending frame
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
    }

    fn schedule(&mut self) {
        match self.scheduler.request_frame() {
            Some(request) => self.pending = Some(request),
            None => {
                log::warn!("Frame request refused, stopping loop");
                self.running = false;
            }
        }
    }
}

impl<S: FrameScheduler> Drop for GameLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Scheduler that only records requests; the owner delivers frames itself
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: i32,
    pub pending: Vec<FrameRequest>,
    pub cancelled: Vec<FrameRequest>,
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.pending.push(request);
        Some(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|r| *r != request);
        self.cancelled.push(request);
    }
}
