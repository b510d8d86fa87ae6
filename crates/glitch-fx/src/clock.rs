#![forbid(unsafe_code)]

//! Frame-to-frame time deltas and config clamping shared by the visuals.

use glitch_runtime::FrameError;

/// Longest step a visual takes in one frame. A frame after a pause (hidden,
/// throttled host) advances by at most this much, so frozen state resumes
/// where it stopped.
pub(crate) const MAX_STEP_MS: f64 = 100.0;

/// Tracks the previous frame time and yields bounded deltas.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// Delta since the previous frame in milliseconds, in `[0, MAX_STEP_MS]`.
    /// The first frame after a reset yields 0.
    pub(crate) fn advance(&mut self, now_ms: f64) -> Result<f64, FrameError> {
        if !now_ms.is_finite() {
            return Err(FrameError::callback(format!("non-finite frame time {now_ms}")));
        }
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_STEP_MS),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        Ok(dt)
    }

    pub(crate) fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Clamp `value` into `[min, max]`, replacing NaN with `fallback`.
pub(crate) fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
