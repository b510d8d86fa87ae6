#![forbid(unsafe_code)]

//! Latest-wins input debouncing.
//!
//! [`Debouncer`] holds at most one pending value. Each
//! [`push`](Debouncer::push) replaces it and restarts the quiet period; the
//! value is released by [`poll`](Debouncer::poll) once `delay_ms` has passed
//! with no further pushes. Time comes from the caller, so behavior is
//! deterministic for a given event sequence.
//!
//! ```
//! use glitch_runtime::debounce::Debouncer;
//!
//! let mut d = Debouncer::new(40.0);
//! d.push("a", 0.0);
//! d.push("ar", 10.0);
//! assert_eq!(d.poll(45.0), None);
//! assert_eq!(d.poll(50.0), Some("ar"));
//! ```
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Negative or NaN delay | Treated as zero (release on next poll) |
//! | Clock going backwards | Value waits until the original deadline |

/// Time-driven, latest-wins debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// The quiet period in milliseconds.
    #[must_use]
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Whether a value is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now_ms: f64) {
        self.pending = Some((value, now_ms + self.delay_ms));
    }

    /// Release the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        let due = self.deadline()?;
        if now_ms >= due { self.flush() } else { None }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
