//! Animation Driver.
//!
//! The driver is the only component that advances time and triggers frames.
//! It never loops: each tick renders one frame, asks the injected
//! [`TickScheduler`] for the next tick and returns to the host. The
//! adaptive-quality policy lives here too, lowering the surface's render scale
//! in 0.25 steps while the rolling frame rate stays under target.

use std::collections::VecDeque;

use scheduler::{TickHandle, TickScheduler};

use crate::surface::{FrameTarget, RenderSurface};
use crate::timeline::FadeEnvelope;
use crate::types::{PointerState, RenderError, MIN_PIXEL_RATIO_SCALE};

/// Number of frame-rate samples in the rolling window.
pub const FRAME_HISTORY_CAPACITY: usize = 30;
/// Rolling average below which the low-frame-rate timer runs.
pub const TARGET_FPS: f64 = 50.0;
/// How long the average must stay below target before each step down.
pub const LOW_FPS_WINDOW_MS: f64 = 1000.0;
/// Render-scale decrement applied per step down.
pub const PIXEL_RATIO_STEP: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Suspended,
    /// Reduced motion: one frame was rendered at time zero and nothing is scheduled.
    SingleShot,
    Disposed,
}

/// Mutable per-session frame bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    elapsed_seconds: f64,
    frame_rates: VecDeque<f64>,
    pixel_ratio_scale: f64,
    low_fps_since: Option<f64>,
    last_frame_ms: f64,
}

impl FrameState {
    fn new(pixel_ratio_scale: f64, now_ms: f64) -> Self {
        Self {
            elapsed_seconds: 0.0,
            frame_rates: VecDeque::with_capacity(FRAME_HISTORY_CAPACITY),
            pixel_ratio_scale,
            low_fps_since: None,
            last_frame_ms: now_ms,
        }
    }

    /// Shader time of the most recent frame.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Instantaneous frame rates, oldest first.
    pub fn frame_rates(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.frame_rates.iter().copied()
    }

    pub fn average_fps(&self) -> Option<f64> {
        if self.frame_rates.is_empty() {
            return None;
        }
        Some(self.frame_rates.iter().sum::<f64>() / self.frame_rates.len() as f64)
    }

    pub fn pixel_ratio_scale(&self) -> f64 {
        self.pixel_ratio_scale
    }

    /// Host time at which the current below-target window began.
    pub fn low_fps_since(&self) -> Option<f64> {
        self.low_fps_since
    }

    fn push_frame_rate(&mut self, fps: f64) {
        if self.frame_rates.len() == FRAME_HISTORY_CAPACITY {
            self.frame_rates.pop_front();
        }
        self.frame_rates.push_back(fps);
    }

    /// Runs the adaptive-quality policy; returns the new scale when it stepped down.
    fn adapt(&mut self, now_ms: f64) -> Option<f64> {
        let average = self.average_fps()?;
        if average >= TARGET_FPS {
            self.low_fps_since = None;
            return None;
        }
        match self.low_fps_since {
            None => {
                self.low_fps_since = Some(now_ms);
                None
            }
            Some(since)
                if now_ms - since > LOW_FPS_WINDOW_MS
                    && self.pixel_ratio_scale > MIN_PIXEL_RATIO_SCALE =>
            {
                self.pixel_ratio_scale =
                    (self.pixel_ratio_scale - PIXEL_RATIO_STEP).max(MIN_PIXEL_RATIO_SCALE);
                self.low_fps_since = None;
                Some(self.pixel_ratio_scale)
            }
            Some(_) => None,
        }
    }
}

pub struct AnimationDriver<S: TickScheduler> {
    scheduler: S,
    state: DriverState,
    frame: FrameState,
    pending: Option<TickHandle>,
    origin_ms: f64,
    fade: Option<FadeEnvelope>,
}

impl<S: TickScheduler> AnimationDriver<S> {
    /// Starts the driver at host time `now_ms`, which becomes the clock origin.
    ///
    /// With `reduced_motion` one frame is rendered immediately at time zero and
    /// the driver parks in [`DriverState::SingleShot`]; otherwise the first
    /// tick is scheduled.
    pub fn start<T: FrameTarget>(
        mut scheduler: S,
        surface: &mut RenderSurface<T>,
        reduced_motion: bool,
        now_ms: f64,
    ) -> Result<Self, RenderError> {
        let frame = FrameState::new(surface.pixel_ratio_scale(), now_ms);
        if reduced_motion {
            surface.render_once(0.0, PointerState::default(), 1.0)?;
            tracing::info!("reduced motion requested; rendered a single still frame");
            return Ok(Self {
                scheduler,
                state: DriverState::SingleShot,
                frame,
                pending: None,
                origin_ms: now_ms,
                fade: None,
            });
        }

        let pending = Some(scheduler.schedule_tick());
        tracing::info!(scale = frame.pixel_ratio_scale, "fog animation started");
        Ok(Self {
            scheduler,
            state: DriverState::Running,
            frame,
            pending,
            origin_ms: now_ms,
            fade: FadeEnvelope::fog_fade_in(now_ms),
        })
    }

    /// Handles one delivered tick.
    ///
    /// Returns `Ok(false)` when the tick was ignored: the driver is not
    /// running, or `handle` is not the outstanding tick.
    pub fn tick<T: FrameTarget>(
        &mut self,
        handle: TickHandle,
        now_ms: f64,
        surface: &mut RenderSurface<T>,
        pointer: PointerState,
    ) -> Result<bool, RenderError> {
        if self.state != DriverState::Running || self.pending != Some(handle) {
            tracing::trace!(tick = handle.id(), state = ?self.state, "ignoring stale tick");
            return Ok(false);
        }
        self.pending = None;

        let delta = now_ms - self.frame.last_frame_ms;
        self.frame.last_frame_ms = now_ms;
        if delta > 0.0 {
            self.frame.push_frame_rate(1000.0 / delta);
        }

        if let Some(scale) = self.frame.adapt(now_ms) {
            surface.set_pixel_ratio_scale(scale);
            tracing::info!(scale, "adaptive quality reduced render scale");
        }

        self.frame.elapsed_seconds = (now_ms - self.origin_ms).max(0.0) / 1000.0;
        let fade = match self.fade {
            Some(envelope) => {
                let (level, finished) = envelope.level(now_ms);
                if finished {
                    self.fade = None;
                }
                level
            }
            None => 1.0,
        };

        surface.render_once(self.frame.elapsed_seconds as f32, pointer, fade)?;
        self.pending = Some(self.scheduler.schedule_tick());
        Ok(true)
    }

    /// Page hidden: withdraws the outstanding tick. Only affects a running driver.
    pub fn suspend(&mut self) {
        if self.state != DriverState::Running {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        self.state = DriverState::Suspended;
        tracing::info!(elapsed = self.frame.elapsed_seconds, "fog animation suspended");
    }

    /// Page visible again: schedules the next tick. Time keeps counting from
    /// the original origin; the hidden gap is not sampled as a frame.
    pub fn resume(&mut self, now_ms: f64) {
        if self.state != DriverState::Suspended {
            return;
        }
        self.frame.last_frame_ms = now_ms;
        self.pending = Some(self.scheduler.schedule_tick());
        self.state = DriverState::Running;
        tracing::info!("fog animation resumed");
    }

    /// Cancels any outstanding tick and stops for good. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == DriverState::Disposed {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        self.state = DriverState::Disposed;
        tracing::info!("fog animation disposed");
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
