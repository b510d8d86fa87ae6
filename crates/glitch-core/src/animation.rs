#![forbid(unsafe_code)]

//! Small animation primitives.
//!
//! Time-based animations that produce normalized `f32` values (0.0–1.0).
//! They hold no clock of their own; callers advance them with
//! [`Animation::tick`] from whatever frame timestamps their host delivers.
//!
//! Animations are motion-unaware. Callers skip ticking (and jump straight
//! to the end state) when reduced motion is in effect.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out (slower end than quadratic).
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Quantized easing: snaps progress to eight discrete steps.
///
/// Gives transitions the stuttering look of a glitching display.
#[inline]
pub fn stepped(t: f32) -> f32 {
    const STEPS: f32 = 8.0;
    let t = t.clamp(0.0, 1.0);
    (t * STEPS).floor() / STEPS
}

/// Convert a frame delta in milliseconds to a [`Duration`].
///
/// Negative, NaN, or infinite deltas become zero; deltas too large for a
/// `Duration` saturate to [`Duration::MAX`].
#[inline]
#[must_use]
pub fn duration_from_ms(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// Progression from 0.0 to 1.0 over a duration, with configurable easing.
///
/// Elapsed time is tracked as [`Duration`] so repeated small ticks do not
/// drift.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with the given duration and default linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Jump straight to the end state.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.raw_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Pulse
// ---------------------------------------------------------------------------

/// Continuous sine-wave oscillation. Never completes.
///
/// `value()` oscillates between 0.0 and 1.0 at the given frequency (Hz),
/// starting from an initial phase offset.
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    frequency: f32,
    offset: f32,
    phase: f32,
}

impl Pulse {
    /// Create a pulse at the given frequency in Hz.
    ///
    /// A frequency of 1.0 means one full cycle per second.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency: frequency.abs().max(f32::MIN_POSITIVE),
            offset: 0.0,
            phase: 0.0,
        }
    }

    /// Start at the given phase (radians). Also the phase restored by `reset`.
    pub fn with_phase(mut self, offset: f32) -> Self {
        let offset = offset.rem_euclid(std::f32::consts::TAU);
        self.offset = offset;
        self.phase = offset;
        self
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Animation for Pulse {
    fn tick(&mut self, dt: Duration) {
        self.phase += std::f32::consts::TAU * self.frequency * dt.as_secs_f32();
        self.phase %= std::f32::consts::TAU;
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn value(&self) -> f32 {
        (self.phase.sin() + 1.0) / 2.0
    }

    fn reset(&mut self) {
        self.phase = self.offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn fade_progresses_and_completes() {
        let mut fade = Fade::new(MS_100);
        assert_eq!(fade.value(), 0.0);
        fade.tick(Duration::from_millis(50));
        assert!((fade.value() - 0.5).abs() < 1e-4);
        assert!(!fade.is_complete());
        fade.tick(Duration::from_millis(60));
        assert!(fade.is_complete());
        assert_eq!(fade.value(), 1.0);
    }

    #[test]
    fn fade_zero_duration_completes_on_first_tick() {
        let mut fade = Fade::new(Duration::ZERO);
        fade.tick(Duration::from_nanos(1));
        assert!(fade.is_complete());
    }

    #[test]
    fn fade_finish_and_reset() {
        let mut fade = Fade::new(MS_100).easing(ease_out);
        fade.finish();
        assert!(fade.is_complete());
        assert_eq!(fade.value(), 1.0);
        fade.reset();
        assert_eq!(fade.raw_progress(), 0.0);
    }

    #[test]
    fn pulse_never_completes() {
        let mut pulse = Pulse::new(2.0);
        pulse.tick(Duration::from_secs(100));
        assert!(!pulse.is_complete());
        assert!((0.0..=1.0).contains(&pulse.value()));
    }

    #[test]
    fn pulse_reset_restores_offset() {
        let mut pulse = Pulse::new(1.0).with_phase(1.0);
        pulse.tick(Duration::from_millis(250));
        pulse.reset();
        assert!((pulse.phase() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn stepped_quantizes() {
        assert_eq!(stepped(0.0), 0.0);
        assert_eq!(stepped(0.1), 0.0);
        assert_eq!(stepped(0.13), 0.125);
        assert_eq!(stepped(1.0), 1.0);
    }

    #[test]
    fn duration_from_ms_rejects_garbage() {
        assert_eq!(duration_from_ms(-5.0), Duration::ZERO);
        assert_eq!(duration_from_ms(f64::NAN), Duration::ZERO);
        assert_eq!(duration_from_ms(500.0), Duration::from_millis(500));
        assert_eq!(duration_from_ms(1e300), Duration::MAX);
        assert_eq!(duration_from_ms(f64::MAX), Duration::MAX);
    }
}
