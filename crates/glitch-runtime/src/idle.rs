#![forbid(unsafe_code)]

//! Randomized idle re-trigger timer.
//!
//! Some visuals glitch again on their own every now and then. An
//! [`IdleTrigger`] keeps one host timeout outstanding; each time it fires
//! it schedules the next one with a fresh jittered delay.
//!
//! The delay is uniform in `base ± base / 3`:
//!
//! ```text
//! delay = base + (r - 0.5) * base * 2/3,   r ∈ [0, 1)
//! ```
//!
//! With the default 45 s base that is 30 s to 60 s.

use glitch_core::rng::XorShift32;

use crate::host::{TimerScheduler, TimerToken};

/// Default base interval between idle triggers.
pub const DEFAULT_IDLE_BASE_MS: f64 = 45_000.0;
/// Smallest accepted base interval.
pub const MIN_IDLE_BASE_MS: f64 = 1_000.0;

/// Self-rescheduling jittered timer.
#[derive(Debug, Clone)]
pub struct IdleTrigger {
    base_ms: f64,
    rng: XorShift32,
    pending: Option<TimerToken>,
    fired: u64,
}

impl IdleTrigger {
    /// Create a disarmed trigger. `base_ms` is clamped to at least
    /// [`MIN_IDLE_BASE_MS`]; non-finite values use [`DEFAULT_IDLE_BASE_MS`].
    #[must_use]
    pub fn new(base_ms: f64, seed: u32) -> Self {
        let base_ms = if base_ms.is_finite() {
            base_ms.max(MIN_IDLE_BASE_MS)
        } else {
            DEFAULT_IDLE_BASE_MS
        };
        Self {
            base_ms,
            rng: XorShift32::new(seed),
            pending: None,
            fired: 0,
        }
    }

    /// Effective base interval.
    #[must_use]
    pub fn base_ms(&self) -> f64 {
        self.base_ms
    }

    /// Whether a timeout is outstanding.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// How many times the trigger has fired.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Draw the next jittered delay.
    pub fn next_delay_ms(&mut self) -> f64 {
        let r = self.rng.next_f64();
        self.base_ms + (r - 0.5) * self.base_ms * 2.0 / 3.0
    }

    /// Schedule the next timeout unless one is already pending.
    pub fn arm(&mut self, host: &impl TimerScheduler) {
        if self.pending.is_some() {
            return;
        }
        let delay = self.next_delay_ms();
        self.pending = Some(host.set_timeout(delay));
        tracing::trace!(delay_ms = delay, "idle trigger armed");
    }

    /// Host timer callback. Returns `true` when this was our timeout; the
    /// next one is scheduled before returning.
    pub fn on_timer(&mut self, host: &impl TimerScheduler, token: TimerToken) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        self.fired += 1;
        self.arm(host);
        true
    }

    /// Cancel the pending timeout. Safe to call when disarmed.
    pub fn cancel(&mut self, host: &impl TimerScheduler) {
        if let Some(token) = self.pending.take() {
            host.clear_timeout(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;

    #[test]
    fn delay_within_jitter_band() {
        let mut idle = IdleTrigger::new(DEFAULT_IDLE_BASE_MS, 12345);
        for _ in 0..1000 {
            let d = idle.next_delay_ms();
            assert!((30_000.0..60_000.0).contains(&d), "delay {d}");
        }
    }

    #[test]
    fn base_is_clamped() {
        assert_eq!(IdleTrigger::new(10.0, 1).base_ms(), MIN_IDLE_BASE_MS);
        assert_eq!(IdleTrigger::new(f64::NAN, 1).base_ms(), DEFAULT_IDLE_BASE_MS);
    }

    #[test]
    fn fires_and_reschedules() {
        let host = ManualHost::new();
        let mut idle = IdleTrigger::new(5_000.0, 9);
        idle.arm(&host);
        idle.arm(&host);
        assert_eq!(host.pending_timers().len(), 1);

        let (token, _) = host.take_timer().expect("timer");
        assert!(idle.on_timer(&host, token));
        assert!(!idle.on_timer(&host, token), "same token twice");
        assert_eq!(idle.fired(), 1);
        assert_eq!(host.pending_timers().len(), 1);
    }

    #[test]
    fn cancel_clears_pending() {
        let host = ManualHost::new();
        let mut idle = IdleTrigger::new(5_000.0, 9);
        idle.arm(&host);
        idle.cancel(&host);
        idle.cancel(&host);
        assert!(!idle.is_armed());
        assert!(host.pending_timers().is_empty());
    }

    #[test]
    fn same_seed_same_delays() {
        let mut a = IdleTrigger::new(45_000.0, 77);
        let mut b = IdleTrigger::new(45_000.0, 77);
        for _ in 0..10 {
            assert_eq!(a.next_delay_ms(), b.next_delay_ms());
        }
    }
}
