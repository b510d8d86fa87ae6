#![forbid(unsafe_code)]

//! The animated visual component contract.
//!
//! [`AnimatedComponent`] wires capability detection, a
//! [`VisibilityTracker`], a [`ThrottledLoop`] and an optional
//! [`IdleTrigger`] into one attach/detach lifecycle. Concrete effects only
//! implement [`AnimatedVisual`]: what a frame draws, the frame rates they
//! want, and how they look when motion is off.
//!
//! # Lifecycle
//!
//! | Signal | Effect |
//! |--------|--------|
//! | `on_attach` | detect capabilities once; static render if reduced motion; start tracker; arm idle timer |
//! | becomes visible | start loop at desktop or mobile rate (unless reduced motion) |
//! | becomes hidden | stop loop; apply [`HidePolicy`] |
//! | `on_detach` | stop tracker, then loop, then idle timer |
//!
//! # Invariants
//!
//! 1. Reduced motion at attach means the loop never starts for this
//!    attachment, whatever visibility reports.
//! 2. The loop only runs while attached and visible.
//! 3. After `on_detach` returns, no frame or timer callback reaches the
//!    visual, even if the host delivers one already in flight.
//! 4. A failing visual stops its own loop; nothing propagates to the caller.

use glitch_core::capabilities::{Capabilities, EnvironmentProbe};
use glitch_core::notify::NotificationSink;

use crate::frame_loop::{FrameError, FrameOutcome, ThrottledLoop};
use crate::host::{ElementId, FrameToken, Host, ObserverToken, TimerToken};
use crate::idle::IdleTrigger;
use crate::visibility::{DEFAULT_THRESHOLD, VisibilityTracker};

/// Target frame rates for wide and narrow viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRates {
    /// Rate used on wide viewports.
    pub desktop: u32,
    /// Rate used on narrow (mobile) viewports.
    pub mobile: u32,
}

impl FrameRates {
    /// Create a rate pair.
    #[must_use]
    pub const fn new(desktop: u32, mobile: u32) -> Self {
        Self { desktop, mobile }
    }

    /// Same rate everywhere.
    #[must_use]
    pub const fn uniform(fps: u32) -> Self {
        Self::new(fps, fps)
    }

    /// The rate to use under `caps`.
    #[must_use]
    pub const fn select(&self, caps: &Capabilities) -> u32 {
        if caps.narrow_viewport {
            self.mobile
        } else {
            self.desktop
        }
    }
}

impl Default for FrameRates {
    fn default() -> Self {
        Self::new(60, 30)
    }
}

/// What a visual does with its state when scrolled out of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HidePolicy {
    /// Pause and resume from the same state.
    #[default]
    Freeze,
    /// Reset to the initial state.
    Reset,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The element left the viewport.
    Hidden,
    /// The component was detached.
    Detached,
    /// The visual finished on its own.
    Finished,
    /// The visual failed.
    Failed,
    /// [`AnimatedComponent::stop`] was called.
    Requested,
}

/// Playback notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackEvent {
    /// The loop started at `fps`.
    Started {
        /// Effective target frame rate.
        fps: u32,
    },
    /// The loop stopped.
    Stopped {
        /// Why it stopped.
        reason: StopReason,
    },
}

/// A concrete animated effect.
pub trait AnimatedVisual {
    /// Draw one frame at host time `now_ms`. Return `Ok(false)` when the
    /// animation has reached its end state.
    fn render_frame(&mut self, now_ms: f64) -> Result<bool, FrameError>;

    /// Show the single static representation used under reduced motion.
    fn render_static(&mut self) {}

    /// Return to the initial state. Called on hide under [`HidePolicy::Reset`].
    fn reset(&mut self) {}

    /// Arm a transient burst (hover, idle trigger).
    fn trigger(&mut self) {}

    /// Desired frame rates.
    fn frame_rates(&self) -> FrameRates {
        FrameRates::default()
    }

    /// Behavior when scrolled out of view.
    fn hide_policy(&self) -> HidePolicy {
        HidePolicy::Freeze
    }

    /// Base interval for idle re-triggers, or `None` for no idle timer.
    fn idle_interval_ms(&self) -> Option<f64> {
        None
    }
}

/// Attach/detach hooks called by whatever mounts the component.
pub trait Lifecycle {
    /// The component was inserted into the document.
    fn on_attach(&mut self, probe: &dyn EnvironmentProbe);

    /// The component is being removed. Must be safe to call at any time.
    fn on_detach(&mut self);
}

/// An [`AnimatedVisual`] bound to a host element.
pub struct AnimatedComponent<V, H> {
    visual: V,
    host: H,
    element: ElementId,
    caps: Option<Capabilities>,
    tracker: VisibilityTracker,
    frame_loop: ThrottledLoop,
    idle: Option<IdleTrigger>,
    idle_seed: u32,
    sink: Option<Box<dyn NotificationSink<PlaybackEvent>>>,
}

impl<V: AnimatedVisual, H: Host> AnimatedComponent<V, H> {
    /// Bind `visual` to `element` on `host`. Nothing happens until
    /// [`on_attach`](Lifecycle::on_attach).
    pub fn new(visual: V, host: H, element: ElementId) -> Self {
        Self {
            visual,
            host,
            element,
            caps: None,
            tracker: VisibilityTracker::new(DEFAULT_THRESHOLD),
            frame_loop: ThrottledLoop::new(),
            idle: None,
            idle_seed: element.get() as u32,
            sink: None,
        }
    }

    /// Set the visibility threshold (builder).
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.tracker = VisibilityTracker::new(threshold);
        self
    }

    /// Seed the idle jitter (builder).
    #[must_use]
    pub fn with_idle_seed(mut self, seed: u32) -> Self {
        self.idle_seed = seed;
        self
    }

    /// Receive [`PlaybackEvent`]s (builder).
    #[must_use]
    pub fn with_sink(mut self, sink: impl NotificationSink<PlaybackEvent> + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// The wrapped visual.
    pub fn visual(&self) -> &V {
        &self.visual
    }

    /// Mutable access to the wrapped visual.
    pub fn visual_mut(&mut self) -> &mut V {
        &mut self.visual
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The bound element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Capabilities detected at attach; `None` while detached.
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.caps
    }

    /// Whether `on_attach` has run without a matching `on_detach`.
    pub fn is_attached(&self) -> bool {
        self.caps.is_some()
    }

    /// Whether the element was last reported visible.
    pub fn is_visible(&self) -> bool {
        self.tracker.is_visible()
    }

    /// Whether the animation loop has a frame outstanding.
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Total frames rendered by the visual.
    pub fn frames_rendered(&self) -> u64 {
        self.frame_loop.frames_rendered()
    }

    /// The failure that last stopped the loop.
    pub fn last_error(&self) -> Option<&FrameError> {
        self.frame_loop.last_error()
    }

    /// Whether the idle timer is armed.
    pub fn idle_armed(&self) -> bool {
        self.idle.as_ref().is_some_and(IdleTrigger::is_armed)
    }

    /// Start the loop if attached, visible and motion is allowed.
    ///
    /// Returns `true` only when this call actually started the loop.
    pub fn start(&mut self) -> bool {
        let Some(caps) = self.caps else {
            return false;
        };
        if caps.reduced_motion || !self.tracker.is_visible() {
            return false;
        }
        let fps = self.visual.frame_rates().select(&caps);
        if !self.frame_loop.start(&self.host, fps) {
            return false;
        }
        let fps = self.frame_loop.target_fps();
        self.emit(PlaybackEvent::Started { fps });
        true
    }

    /// Stop the loop. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        self.stop_loop(StopReason::Requested)
    }

    /// Ask the visual for a transient burst and start the loop under the
    /// usual gates.
    ///
    /// Returns `false` (and leaves the visual alone) when detached or under
    /// reduced motion.
    pub fn trigger(&mut self) -> bool {
        match self.caps {
            Some(caps) if caps.motion_allowed() => {
                self.visual.trigger();
                self.start();
                true
            }
            _ => false,
        }
    }

    /// Host intersection callback.
    pub fn on_intersection(&mut self, token: ObserverToken, ratio: f32) {
        if let Some(visible) = self.tracker.on_intersection(token, ratio) {
            self.apply_visibility(visible);
        }
    }

    /// Host frame callback.
    pub fn on_frame(&mut self, token: FrameToken, now_ms: f64) -> FrameOutcome {
        let visual = &mut self.visual;
        let outcome = self.frame_loop.on_frame(&self.host, token, now_ms, &mut |now: f64| {
            visual.render_frame(now)
        });
        match outcome {
            FrameOutcome::Finished => self.emit(PlaybackEvent::Stopped {
                reason: StopReason::Finished,
            }),
            FrameOutcome::Failed => self.emit(PlaybackEvent::Stopped {
                reason: StopReason::Failed,
            }),
            _ => {}
        }
        outcome
    }

    /// Host timer callback. Returns whether the token was ours.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        let fired = match self.idle.as_mut() {
            Some(idle) => idle.on_timer(&self.host, token),
            None => false,
        };
        if fired {
            tracing::trace!(element = self.element.get(), "idle trigger fired");
            self.trigger();
        }
        fired
    }

    fn apply_visibility(&mut self, visible: bool) {
        if visible {
            self.start();
            return;
        }
        self.stop_loop(StopReason::Hidden);
        let motion_allowed = self.caps.is_some_and(|caps| caps.motion_allowed());
        if motion_allowed && self.visual.hide_policy() == HidePolicy::Reset {
            self.visual.reset();
        }
    }

    fn stop_loop(&mut self, reason: StopReason) -> bool {
        if !self.frame_loop.stop(&self.host) {
            return false;
        }
        self.emit(PlaybackEvent::Stopped { reason });
        true
    }

    fn emit(&mut self, event: PlaybackEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.notify(event);
        }
    }
}

impl<V: AnimatedVisual, H: Host> Lifecycle for AnimatedComponent<V, H> {
    fn on_attach(&mut self, probe: &dyn EnvironmentProbe) {
        if self.caps.is_some() {
            return;
        }
        let caps = Capabilities::detect(probe);
        self.caps = Some(caps);
        tracing::debug!(
            element = self.element.get(),
            reduced_motion = caps.reduced_motion,
            narrow_viewport = caps.narrow_viewport,
            "component attached"
        );

        if caps.reduced_motion {
            self.visual.render_static();
        }

        if let Some(visible) = self.tracker.start(&self.host, self.element) {
            self.apply_visibility(visible);
        }

        if caps.motion_allowed()
            && let Some(base_ms) = self.visual.idle_interval_ms()
        {
            let mut idle = IdleTrigger::new(base_ms, self.idle_seed);
            idle.arm(&self.host);
            self.idle = Some(idle);
        }
    }

    fn on_detach(&mut self) {
        self.tracker.stop(&self.host);
        self.stop_loop(StopReason::Detached);
        if let Some(mut idle) = self.idle.take() {
            idle.cancel(&self.host);
        }
        if self.caps.take().is_some() {
            tracing::debug!(element = self.element.get(), "component detached");
        }
    }
}

impl<V, H> std::fmt::Debug for AnimatedComponent<V, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedComponent")
            .field("element", &self.element)
            .field("caps", &self.caps)
            .field("tracker", &self.tracker)
            .field("frame_loop", &self.frame_loop)
            .field("idle", &self.idle)
            .finish_non_exhaustive()
    }
}
