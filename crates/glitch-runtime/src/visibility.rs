#![forbid(unsafe_code)]

//! Viewport visibility tracking.
//!
//! A [`VisibilityTracker`] wraps one intersection observation and turns
//! the host's raw intersection ratios into visible/hidden transitions.
//!
//! # State Machine
//!
//! ```text
//!              start (observe ok)
//! Unobserved ─────────────────────▶ Observing
//!     ▲   │                            │
//!     │   │ start (observe failed)     │ stop
//!     │   ▼                            │
//!     │ FailOpen ◀─────────────────────┘
//!     │   │
//!     └───┘ stop
//! ```
//!
//! `FailOpen` is the resting state when the environment cannot observe
//! intersections: the element is reported visible once and stays visible.
//! Animating needlessly is cheaper than a component that never animates.
//!
//! # Invariants
//!
//! 1. Starting on an element the host reports as detached does nothing:
//!    no observation, no log, no transition.
//! 2. Only the most recent callback matters; no history is buffered.
//! 3. The first callback after `start` always reports; later callbacks
//!    report only when visibility changes.
//! 4. Callbacks carrying a token other than the current one are ignored.

use crate::host::{ElementId, IntersectionHost, ObserverToken};

/// Default fraction of the element that must intersect the viewport.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Observation state of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Not observing.
    Unobserved,
    /// Observing through the host.
    Observing(ObserverToken),
    /// Observation unavailable; treated as always visible.
    FailOpen,
}

/// Tracks whether one element is visible in the viewport.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    threshold: f32,
    state: TrackerState,
    visible: Option<bool>,
    fail_open_logged: bool,
}

impl VisibilityTracker {
    /// Create a tracker with the given threshold, clamped to `[0, 1]`.
    ///
    /// A NaN threshold falls back to [`DEFAULT_THRESHOLD`].
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self {
            threshold,
            state: TrackerState::Unobserved,
            visible: None,
            fail_open_logged: false,
        }
    }

    /// The effective threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Current observation state.
    #[must_use]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Whether the last reported state was visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible == Some(true)
    }

    /// Whether a given intersection ratio counts as visible.
    #[must_use]
    pub fn ratio_is_visible(&self, ratio: f32) -> bool {
        ratio > 0.0 && ratio >= self.threshold
    }

    /// Begin observing `element`.
    ///
    /// Returns `Some(true)` when the host cannot observe and the tracker
    /// fails open; otherwise the initial transition arrives later through
    /// [`on_intersection`](Self::on_intersection). Calling `start` while
    /// already started returns `None` and changes nothing.
    pub fn start(&mut self, host: &impl IntersectionHost, element: ElementId) -> Option<bool> {
        if self.state != TrackerState::Unobserved {
            return None;
        }
        if !host.is_attached(element) {
            return None;
        }

        match host.observe(element, self.threshold) {
            Ok(token) => {
                tracing::trace!(element = element.get(), threshold = self.threshold, "observing");
                self.state = TrackerState::Observing(token);
                self.visible = None;
                None
            }
            Err(err) => {
                if !self.fail_open_logged {
                    tracing::warn!(
                        element = element.get(),
                        error = %err,
                        "visibility observation unavailable, assuming visible"
                    );
                    self.fail_open_logged = true;
                }
                self.state = TrackerState::FailOpen;
                self.visible = Some(true);
                Some(true)
            }
        }
    }

    /// Host observer callback.
    ///
    /// Returns the new visibility when this callback is a transition (or the
    /// first callback since `start`), otherwise `None`.
    pub fn on_intersection(&mut self, token: ObserverToken, ratio: f32) -> Option<bool> {
        if self.state != TrackerState::Observing(token) {
            return None;
        }
        let now_visible = self.ratio_is_visible(ratio);
        if self.visible == Some(now_visible) {
            return None;
        }
        tracing::trace!(visible = now_visible, ratio, "visibility changed");
        self.visible = Some(now_visible);
        Some(now_visible)
    }

    /// Disconnect observation. Safe to call when not started.
    pub fn stop(&mut self, host: &impl IntersectionHost) {
        if let TrackerState::Observing(token) = self.state {
            host.unobserve(token);
        }
        self.state = TrackerState::Unobserved;
        self.visible = None;
    }
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;

    fn attached_host() -> (ManualHost, ElementId) {
        let host = ManualHost::new();
        let el = ElementId::new(7);
        host.attach(el);
        (host, el)
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(VisibilityTracker::new(-1.0).threshold(), 0.0);
        assert_eq!(VisibilityTracker::new(2.0).threshold(), 1.0);
        assert_eq!(VisibilityTracker::new(f32::NAN).threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn detached_element_is_a_no_op() {
        let host = ManualHost::new();
        let mut tracker = VisibilityTracker::default();
        assert_eq!(tracker.start(&host, ElementId::new(1)), None);
        assert_eq!(tracker.state(), TrackerState::Unobserved);
        assert!(host.observations().is_empty());
    }

    #[test]
    fn first_callback_always_reports() {
        let (host, el) = attached_host();
        let mut tracker = VisibilityTracker::default();
        tracker.start(&host, el);
        let token = host.observer_for(el).expect("observing");
        assert_eq!(tracker.on_intersection(token, 0.0), Some(false));
        assert_eq!(tracker.on_intersection(token, 0.0), None);
        assert_eq!(tracker.on_intersection(token, 0.5), Some(true));
        assert_eq!(tracker.on_intersection(token, 0.6), None);
        assert!(tracker.is_visible());
    }

    #[test]
    fn threshold_boundary() {
        let tracker = VisibilityTracker::new(0.25);
        assert!(!tracker.ratio_is_visible(0.2));
        assert!(tracker.ratio_is_visible(0.25));

        let zero = VisibilityTracker::new(0.0);
        assert!(!zero.ratio_is_visible(0.0));
        assert!(zero.ratio_is_visible(0.01));
        assert!(!zero.ratio_is_visible(f32::NAN));
    }

    #[test]
    fn stale_token_ignored() {
        let (host, el) = attached_host();
        let mut tracker = VisibilityTracker::default();
        tracker.start(&host, el);
        let old = host.observer_for(el).expect("observing");
        tracker.stop(&host);
        tracker.start(&host, el);
        assert_eq!(tracker.on_intersection(old, 1.0), None);
    }

    #[test]
    fn fail_open_reports_visible() {
        let host = ManualHost::without_intersection();
        let el = ElementId::new(3);
        host.attach(el);
        let mut tracker = VisibilityTracker::default();
        assert_eq!(tracker.start(&host, el), Some(true));
        assert_eq!(tracker.state(), TrackerState::FailOpen);
        assert!(tracker.is_visible());
    }

    #[test]
    fn stop_is_idempotent() {
        let (host, el) = attached_host();
        let mut tracker = VisibilityTracker::default();
        tracker.stop(&host);
        tracker.start(&host, el);
        tracker.stop(&host);
        tracker.stop(&host);
        assert_eq!(tracker.state(), TrackerState::Unobserved);
        assert!(host.observations().is_empty());
    }

    #[test]
    fn double_start_observes_once() {
        let (host, el) = attached_host();
        let mut tracker = VisibilityTracker::default();
        tracker.start(&host, el);
        tracker.start(&host, el);
        assert_eq!(host.observations().len(), 1);
    }
}
