#![forbid(unsafe_code)]

//! Throttled, token-checked animation loop.
//!
//! [`ThrottledLoop`] keeps at most one frame request outstanding and runs a
//! [`FrameCallback`] no faster than a target frame rate.
//!
//! # Invariants
//!
//! 1. At most one pending [`FrameToken`] per loop. Starting a running loop
//!    is a no-op.
//! 2. After [`stop`](ThrottledLoop::stop) returns, the callback never runs
//!    again for the cancelled chain: every delivery is checked against the
//!    pending token, so a frame already in flight is dropped as `Stale`.
//! 3. A callback that errors or panics stops the loop. The failure is
//!    logged and retained, never re-raised.
//!
//! # Throttling
//!
//! With `interval = 1000 / fps`, a delivered frame runs the callback only
//! if `now - last >= interval`. The accepted timestamp is snapped back by
//! `elapsed % interval` so the cadence does not drift when the host's frame
//! clock is not a multiple of the interval (e.g. 60 Hz display, 24 fps
//! target). The first frame after `start` always runs.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::host::{FrameScheduler, FrameToken};

/// Lowest accepted target frame rate.
pub const MIN_FPS: u32 = 1;
/// Highest accepted target frame rate.
pub const MAX_FPS: u32 = 240;

/// A per-frame callback failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The callback returned an error.
    #[error("frame callback failed: {0}")]
    Callback(String),
    /// The callback panicked.
    #[error("frame callback panicked: {0}")]
    Panicked(String),
}

impl FrameError {
    /// Convenience constructor for callback failures.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }

    fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panicked(message)
    }
}

/// Work performed on each accepted frame.
///
/// Return `Ok(true)` to keep running, `Ok(false)` to stop the loop.
pub trait FrameCallback {
    /// Run one frame at host time `now_ms`.
    fn frame(&mut self, now_ms: f64) -> Result<bool, FrameError>;
}

impl<F> FrameCallback for F
where
    F: FnMut(f64) -> Result<bool, FrameError>,
{
    fn frame(&mut self, now_ms: f64) -> Result<bool, FrameError> {
        self(now_ms)
    }
}

/// What happened to a delivered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The token was not the pending one; nothing ran.
    Stale,
    /// Too early; rescheduled without running the callback.
    Throttled,
    /// Callback ran and asked to continue; rescheduled.
    Rendered,
    /// Callback ran and asked to stop; loop stopped.
    Finished,
    /// Callback failed; loop stopped.
    Failed,
}

impl FrameOutcome {
    /// Whether this delivery stopped the loop.
    #[must_use]
    pub const fn stopped(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

/// Clamp a requested frame rate into `[MIN_FPS, MAX_FPS]`.
#[inline]
#[must_use]
pub fn clamp_fps(fps: u32) -> u32 {
    fps.clamp(MIN_FPS, MAX_FPS)
}

/// A frame-rate-throttled loop driven by host frame deliveries.
#[derive(Debug, Clone)]
pub struct ThrottledLoop {
    pending: Option<FrameToken>,
    target_fps: u32,
    interval_ms: f64,
    last_frame_ms: Option<f64>,
    frames_rendered: u64,
    last_error: Option<FrameError>,
}

impl ThrottledLoop {
    /// Create a stopped loop.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: None,
            target_fps: 60,
            interval_ms: 1000.0 / 60.0,
            last_frame_ms: None,
            frames_rendered: 0,
            last_error: None,
        }
    }

    /// Whether a frame request is outstanding.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Current target frame rate.
    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Minimum spacing between callback runs, in milliseconds.
    #[must_use]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Number of times the callback has run over this loop's lifetime.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// The failure that stopped the loop most recently, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&FrameError> {
        self.last_error.as_ref()
    }

    /// The currently pending frame token.
    #[must_use]
    pub fn pending_token(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Start the loop at `target_fps` (clamped to `[1, 240]`).
    ///
    /// Returns `false` without doing anything if the loop is already running.
    pub fn start(&mut self, host: &impl FrameScheduler, target_fps: u32) -> bool {
        if self.is_running() {
            return false;
        }
        self.target_fps = clamp_fps(target_fps);
        self.interval_ms = 1000.0 / f64::from(self.target_fps);
        self.last_frame_ms = None;
        self.last_error = None;
        self.pending = Some(host.request_frame());
        tracing::debug!(fps = self.target_fps, "animation loop started");
        true
    }

    /// Handle a frame delivered by the host.
    pub fn on_frame(
        &mut self,
        host: &impl FrameScheduler,
        token: FrameToken,
        now_ms: f64,
        callback: &mut impl FrameCallback,
    ) -> FrameOutcome {
        if self.pending != Some(token) {
            return FrameOutcome::Stale;
        }
        self.pending = None;

        if !now_ms.is_finite() {
            self.pending = Some(host.request_frame());
            return FrameOutcome::Throttled;
        }

        match self.last_frame_ms {
            Some(last) => {
                let elapsed = now_ms - last;
                if elapsed < self.interval_ms {
                    self.pending = Some(host.request_frame());
                    return FrameOutcome::Throttled;
                }
                self.last_frame_ms = Some(now_ms - (elapsed % self.interval_ms));
            }
            None => self.last_frame_ms = Some(now_ms),
        }

        let result = catch_unwind(AssertUnwindSafe(|| callback.frame(now_ms)));
        self.frames_rendered += 1;

        match result {
            Ok(Ok(true)) => {
                self.pending = Some(host.request_frame());
                FrameOutcome::Rendered
            }
            Ok(Ok(false)) => {
                self.last_frame_ms = None;
                tracing::debug!(frames = self.frames_rendered, "animation loop finished");
                FrameOutcome::Finished
            }
            Ok(Err(err)) => self.fail(err),
            Err(payload) => self.fail(FrameError::from_panic(payload.as_ref())),
        }
    }

    fn fail(&mut self, err: FrameError) -> FrameOutcome {
        tracing::warn!(error = %err, "animation loop stopped after callback failure");
        self.last_frame_ms = None;
        self.last_error = Some(err);
        FrameOutcome::Failed
    }

    /// Cancel the pending frame request. Safe to call when stopped.
    ///
    /// Returns whether the loop was running.
    pub fn stop(&mut self, host: &impl FrameScheduler) -> bool {
        self.last_frame_ms = None;
        match self.pending.take() {
            Some(token) => {
                host.cancel_frame(token);
                tracing::debug!(frames = self.frames_rendered, "animation loop stopped");
                true
            }
            None => false,
        }
    }
}

impl Default for ThrottledLoop {
    fn default() -> Self {
        Self::new()
    }
}
