#![forbid(unsafe_code)]

//! Host abstraction: frame requests, timers, and intersection observation.
//!
//! The runtime never owns a clock. A host (browser glue, a terminal loop, or
//! the deterministic [`ManualHost`]) hands out opaque tokens when asked to
//! schedule work and later delivers them back together with a timestamp.
//! Components compare delivered tokens against the ones they hold, so a
//! cancelled request that is already in flight is simply ignored.
//!
//! All methods take `&self`: hosts are shared between components and use
//! interior mutability, like the browser APIs they stand in for.
//!
//! # Delivery
//!
//! | Request | Host delivers via |
//! |---------|-------------------|
//! | [`FrameScheduler::request_frame`] | `on_frame(token, now_ms)` |
//! | [`TimerScheduler::set_timeout`] | `on_timer(token, now_ms)` |
//! | [`IntersectionHost::observe`] | `on_intersection(token, ratio)` |

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

macro_rules! token_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw host identifier.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw host identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }
    };
}

token_type!(
    /// Identifies one pending frame request.
    FrameToken
);
token_type!(
    /// Identifies one pending timeout.
    TimerToken
);
token_type!(
    /// Identifies one intersection observation.
    ObserverToken
);
token_type!(
    /// Identifies a component's root element within the host document.
    ElementId
);

/// A host capability is missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The environment has no intersection observation API.
    #[error("intersection observation is unavailable")]
    IntersectionUnavailable,
    /// The element is not part of the host document.
    #[error("element {0:?} is not attached")]
    NotAttached(ElementId),
}

/// Schedules per-frame callbacks (`requestAnimationFrame` in browsers).
pub trait FrameScheduler {
    /// Request one frame. The host delivers the token once.
    fn request_frame(&self) -> FrameToken;

    /// Cancel a pending frame request. Unknown tokens are ignored.
    fn cancel_frame(&self, token: FrameToken);
}

/// Schedules one-shot timeouts (`setTimeout` in browsers).
pub trait TimerScheduler {
    /// Schedule a timeout after `delay_ms` milliseconds.
    fn set_timeout(&self, delay_ms: f64) -> TimerToken;

    /// Cancel a pending timeout. Unknown tokens are ignored.
    fn clear_timeout(&self, token: TimerToken);
}

/// Observes how much of an element intersects the viewport.
pub trait IntersectionHost {
    /// Begin observing `element`, reporting whenever its intersection ratio
    /// crosses `threshold`.
    fn observe(&self, element: ElementId, threshold: f32) -> Result<ObserverToken, HostError>;

    /// Stop an observation. Unknown tokens are ignored.
    fn unobserve(&self, token: ObserverToken);

    /// Whether `element` is currently part of the document.
    fn is_attached(&self, element: ElementId) -> bool;
}

/// Everything a component needs from its host.
pub trait Host: FrameScheduler + TimerScheduler + IntersectionHost {}

impl<T: FrameScheduler + TimerScheduler + IntersectionHost + ?Sized> Host for T {}

impl<T: FrameScheduler + ?Sized> FrameScheduler for Rc<T> {
    fn request_frame(&self) -> FrameToken {
        (**self).request_frame()
    }

    fn cancel_frame(&self, token: FrameToken) {
        (**self).cancel_frame(token);
    }
}

impl<T: TimerScheduler + ?Sized> TimerScheduler for Rc<T> {
    fn set_timeout(&self, delay_ms: f64) -> TimerToken {
        (**self).set_timeout(delay_ms)
    }

    fn clear_timeout(&self, token: TimerToken) {
        (**self).clear_timeout(token);
    }
}

impl<T: IntersectionHost + ?Sized> IntersectionHost for Rc<T> {
    fn observe(&self, element: ElementId, threshold: f32) -> Result<ObserverToken, HostError> {
        (**self).observe(element, threshold)
    }

    fn unobserve(&self, token: ObserverToken) {
        (**self).unobserve(token);
    }

    fn is_attached(&self, element: ElementId) -> bool {
        (**self).is_attached(element)
    }
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for &T {
    fn request_frame(&self) -> FrameToken {
        (**self).request_frame()
    }

    fn cancel_frame(&self, token: FrameToken) {
        (**self).cancel_frame(token);
    }
}

impl<T: TimerScheduler + ?Sized> TimerScheduler for &T {
    fn set_timeout(&self, delay_ms: f64) -> TimerToken {
        (**self).set_timeout(delay_ms)
    }

    fn clear_timeout(&self, token: TimerToken) {
        (**self).clear_timeout(token);
    }
}

impl<T: IntersectionHost + ?Sized> IntersectionHost for &T {
    fn observe(&self, element: ElementId, threshold: f32) -> Result<ObserverToken, HostError> {
        (**self).observe(element, threshold)
    }

    fn unobserve(&self, token: ObserverToken) {
        (**self).unobserve(token);
    }

    fn is_attached(&self, element: ElementId) -> bool {
        (**self).is_attached(element)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ManualHost
// ─────────────────────────────────────────────────────────────────────────────

/// One active observation held by a [`ManualHost`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Token handed to the observer.
    pub token: ObserverToken,
    /// Observed element.
    pub element: ElementId,
    /// Requested threshold.
    pub threshold: f32,
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    frame_requests: u64,
    pending_frames: Vec<FrameToken>,
    pending_timers: Vec<(TimerToken, f64)>,
    observations: Vec<Observation>,
    attached: HashSet<ElementId>,
    intersection_unavailable: bool,
}

impl ManualState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Deterministic host for tests and headless embedding.
///
/// Nothing happens on its own: the caller pops pending tokens with
/// [`take_frame`](Self::take_frame) / [`take_timer`](Self::take_timer) and
/// delivers them to the component with whatever timestamp it likes.
///
/// ```
/// use glitch_runtime::host::{ElementId, FrameScheduler, ManualHost};
///
/// let host = ManualHost::new();
/// let token = host.request_frame();
/// assert_eq!(host.take_frame(), Some(token));
/// assert_eq!(host.frame_requests(), 1);
/// ```
#[derive(Default)]
pub struct ManualHost {
    state: RefCell<ManualState>,
}

impl ManualHost {
    /// Create a host with intersection observation available and no
    /// attached elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host whose environment lacks intersection observation.
    #[must_use]
    pub fn without_intersection() -> Self {
        let host = Self::new();
        host.state.borrow_mut().intersection_unavailable = true;
        host
    }

    /// Mark `element` as part of the document.
    pub fn attach(&self, element: ElementId) {
        self.state.borrow_mut().attached.insert(element);
    }

    /// Remove `element` from the document.
    pub fn detach(&self, element: ElementId) {
        self.state.borrow_mut().attached.remove(&element);
    }

    /// Total number of frame requests ever made.
    #[must_use]
    pub fn frame_requests(&self) -> u64 {
        self.state.borrow().frame_requests
    }

    /// Frame tokens requested and not yet taken or cancelled, oldest first.
    #[must_use]
    pub fn pending_frames(&self) -> Vec<FrameToken> {
        self.state.borrow().pending_frames.clone()
    }

    /// Pop the oldest pending frame token, as if the host were delivering it.
    pub fn take_frame(&self) -> Option<FrameToken> {
        let mut state = self.state.borrow_mut();
        if state.pending_frames.is_empty() {
            None
        } else {
            Some(state.pending_frames.remove(0))
        }
    }

    /// Pending timeouts with their delays, oldest first.
    #[must_use]
    pub fn pending_timers(&self) -> Vec<(TimerToken, f64)> {
        self.state.borrow().pending_timers.clone()
    }

    /// Pop the oldest pending timeout, as if it had fired.
    pub fn take_timer(&self) -> Option<(TimerToken, f64)> {
        let mut state = self.state.borrow_mut();
        if state.pending_timers.is_empty() {
            None
        } else {
            Some(state.pending_timers.remove(0))
        }
    }

    /// Active observations.
    #[must_use]
    pub fn observations(&self) -> Vec<Observation> {
        self.state.borrow().observations.clone()
    }

    /// The active observation token for `element`, if any.
    #[must_use]
    pub fn observer_for(&self, element: ElementId) -> Option<ObserverToken> {
        self.state
            .borrow()
            .observations
            .iter()
            .find(|o| o.element == element)
            .map(|o| o.token)
    }
}

impl FrameScheduler for ManualHost {
    fn request_frame(&self) -> FrameToken {
        let mut state = self.state.borrow_mut();
        let token = FrameToken::new(state.next_id());
        state.frame_requests += 1;
        state.pending_frames.push(token);
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        self.state
            .borrow_mut()
            .pending_frames
            .retain(|&pending| pending != token);
    }
}

impl TimerScheduler for ManualHost {
    fn set_timeout(&self, delay_ms: f64) -> TimerToken {
        let mut state = self.state.borrow_mut();
        let token = TimerToken::new(state.next_id());
        state.pending_timers.push((token, delay_ms));
        token
    }

    fn clear_timeout(&self, token: TimerToken) {
        self.state
            .borrow_mut()
            .pending_timers
            .retain(|&(pending, _)| pending != token);
    }
}

impl IntersectionHost for ManualHost {
    fn observe(&self, element: ElementId, threshold: f32) -> Result<ObserverToken, HostError> {
        let mut state = self.state.borrow_mut();
        if state.intersection_unavailable {
            return Err(HostError::IntersectionUnavailable);
        }
        if !state.attached.contains(&element) {
            return Err(HostError::NotAttached(element));
        }
        let token = ObserverToken::new(state.next_id());
        state.observations.push(Observation {
            token,
            element,
            threshold,
        });
        Ok(token)
    }

    fn unobserve(&self, token: ObserverToken) {
        self.state
            .borrow_mut()
            .observations
            .retain(|o| o.token != token);
    }

    fn is_attached(&self, element: ElementId) -> bool {
        self.state.borrow().attached.contains(&element)
    }
}

impl fmt::Debug for ManualHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualHost")
            .field("frame_requests", &state.frame_requests)
            .field("pending_frames", &state.pending_frames.len())
            .field("pending_timers", &state.pending_timers.len())
            .field("observations", &state.observations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_tokens_are_unique_and_cancellable() {
        let host = ManualHost::new();
        let a = host.request_frame();
        let b = host.request_frame();
        assert_ne!(a, b);
        host.cancel_frame(a);
        assert_eq!(host.pending_frames(), vec![b]);
        assert_eq!(host.frame_requests(), 2);
    }

    #[test]
    fn timers_fire_in_order() {
        let host = ManualHost::new();
        let a = host.set_timeout(10.0);
        let b = host.set_timeout(20.0);
        assert_eq!(host.take_timer(), Some((a, 10.0)));
        host.clear_timeout(b);
        assert_eq!(host.take_timer(), None);
    }

    #[test]
    fn observe_requires_attachment() {
        let host = ManualHost::new();
        let el = ElementId::new(1);
        assert_eq!(host.observe(el, 0.1), Err(HostError::NotAttached(el)));
        host.attach(el);
        let token = host.observe(el, 0.1).expect("attached element");
        assert_eq!(host.observer_for(el), Some(token));
        host.unobserve(token);
        assert!(host.observations().is_empty());
    }

    #[test]
    fn unavailable_intersection_errors() {
        let host = ManualHost::without_intersection();
        let el = ElementId::new(1);
        host.attach(el);
        assert_eq!(
            host.observe(el, 0.1),
            Err(HostError::IntersectionUnavailable)
        );
    }

    #[test]
    fn rc_host_delegates() {
        let host = Rc::new(ManualHost::new());
        let shared = Rc::clone(&host);
        shared.request_frame();
        assert_eq!(host.frame_requests(), 1);
    }
}
