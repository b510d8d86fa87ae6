#![forbid(unsafe_code)]

//! Environment capability detection.
//!
//! Components read the hosting environment once, at attach time, to decide
//! whether they may animate at all and at which frame rate. Detection is a
//! pure function of an [`EnvironmentProbe`]; nothing is cached globally.
//!
//! # Signals
//!
//! | Signal | Probe method | Unknown means |
//! |--------|--------------|---------------|
//! | Motion preference | [`EnvironmentProbe::motion_preference`] | reduced |
//! | Primary pointer | [`EnvironmentProbe::primary_pointer`] | touch |
//! | Viewport width | [`EnvironmentProbe::viewport_width`] | narrow |
//!
//! # Fail-safe rule
//!
//! Absence of a signal resolves to the less-animated interpretation. In
//! particular, motion is only considered unrestricted when the environment
//! explicitly reports "no preference".
//!
//! ```
//! use glitch_core::capabilities::{Capabilities, EnvSignals};
//!
//! let caps = Capabilities::detect(&EnvSignals::desktop());
//! assert!(!caps.reduced_motion);
//! assert!(!caps.narrow_viewport);
//!
//! let caps = Capabilities::detect(&EnvSignals::unknown());
//! assert!(caps.reduced_motion);
//! assert!(caps.touch_primary);
//! ```
//!
//! # Environment variables
//!
//! [`EnvSignals::from_env`] lets native hosts and tests feed the detector
//! without a browser:
//!
//! - `GLITCH_REDUCED_MOTION`: `reduce` or `no-preference`
//! - `GLITCH_POINTER`: `fine` or `coarse`
//! - `GLITCH_VIEWPORT_WIDTH`: logical pixels

use std::env;
use std::str::FromStr;

/// Widths below this (in logical pixels) count as a narrow viewport.
pub const NARROW_VIEWPORT_MAX: u32 = 768;

/// User preference for motion, as reported by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionPreference {
    /// The user explicitly has no motion preference.
    NoPreference,
    /// The user asked for reduced motion.
    Reduce,
}

impl FromStr for MotionPreference {
    type Err = SignalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-preference" | "no_preference" | "none" => Ok(Self::NoPreference),
            "reduce" | "reduced" => Ok(Self::Reduce),
            other => Err(SignalParseError::Motion(other.to_string())),
        }
    }
}

/// Kind of primary pointing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Mouse or trackpad with hover.
    Fine,
    /// Touch screen without hover.
    Coarse,
}

impl FromStr for PointerKind {
    type Err = SignalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fine" | "mouse" => Ok(Self::Fine),
            "coarse" | "touch" => Ok(Self::Coarse),
            other => Err(SignalParseError::Pointer(other.to_string())),
        }
    }
}

/// An environment signal string could not be understood.
///
/// Detection never surfaces this; unparseable signals are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalParseError {
    /// Unrecognized motion preference value.
    #[error("unrecognized motion preference: {0:?}")]
    Motion(String),
    /// Unrecognized pointer kind value.
    #[error("unrecognized pointer kind: {0:?}")]
    Pointer(String),
}

/// Read-only source of environment signals.
///
/// Browser hosts answer from media queries, native hosts from env vars or
/// terminal size. Every method may return `None` when the host cannot tell.
pub trait EnvironmentProbe {
    /// The `prefers-reduced-motion` answer, if any.
    fn motion_preference(&self) -> Option<MotionPreference>;

    /// The primary pointer kind, if known.
    fn primary_pointer(&self) -> Option<PointerKind>;

    /// Viewport width in logical pixels, if known.
    fn viewport_width(&self) -> Option<u32>;
}

/// Plain-data environment signals.
///
/// This is the stock [`EnvironmentProbe`]: hosts fill it in and hand it to
/// [`Capabilities::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvSignals {
    /// Motion preference, if reported.
    pub motion: Option<MotionPreference>,
    /// Primary pointer, if reported.
    pub pointer: Option<PointerKind>,
    /// Viewport width in logical pixels, if reported.
    pub viewport_width: Option<u32>,
}

impl EnvSignals {
    /// No signals at all.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            motion: None,
            pointer: None,
            viewport_width: None,
        }
    }

    /// A wide desktop with a mouse and no motion preference.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            motion: Some(MotionPreference::NoPreference),
            pointer: Some(PointerKind::Fine),
            viewport_width: Some(1440),
        }
    }

    /// A phone-sized touch screen with no motion preference.
    #[must_use]
    pub const fn mobile() -> Self {
        Self {
            motion: Some(MotionPreference::NoPreference),
            pointer: Some(PointerKind::Coarse),
            viewport_width: Some(390),
        }
    }

    /// Set the motion preference (builder).
    #[must_use]
    pub const fn with_motion(mut self, motion: MotionPreference) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Set the primary pointer (builder).
    #[must_use]
    pub const fn with_pointer(mut self, pointer: PointerKind) -> Self {
        self.pointer = Some(pointer);
        self
    }

    /// Set the viewport width (builder).
    #[must_use]
    pub const fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = Some(width);
        self
    }

    /// Read signals from `GLITCH_*` environment variables.
    ///
    /// Unset or unparseable variables are left as `None`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let motion = lookup("GLITCH_REDUCED_MOTION").and_then(|v| v.parse().ok());
        let pointer = lookup("GLITCH_POINTER").and_then(|v| v.parse().ok());
        let viewport_width = lookup("GLITCH_VIEWPORT_WIDTH").and_then(|v| v.trim().parse().ok());
        Self {
            motion,
            pointer,
            viewport_width,
        }
    }
}

impl EnvironmentProbe for EnvSignals {
    fn motion_preference(&self) -> Option<MotionPreference> {
        self.motion
    }

    fn primary_pointer(&self) -> Option<PointerKind> {
        self.pointer
    }

    fn viewport_width(&self) -> Option<u32> {
        self.viewport_width
    }
}

/// Resolved capabilities for one component instance.
///
/// Computed once at attach and treated as immutable for the component's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Animation must not run.
    pub reduced_motion: bool,
    /// The primary input is touch (no hover).
    pub touch_primary: bool,
    /// The viewport is narrower than [`NARROW_VIEWPORT_MAX`].
    pub narrow_viewport: bool,
}

impl Capabilities {
    /// Resolve capabilities from an environment probe.
    #[must_use]
    pub fn detect(probe: &(impl EnvironmentProbe + ?Sized)) -> Self {
        let reduced_motion = !matches!(
            probe.motion_preference(),
            Some(MotionPreference::NoPreference)
        );
        let touch_primary = !matches!(probe.primary_pointer(), Some(PointerKind::Fine));
        let narrow_viewport = probe
            .viewport_width()
            .is_none_or(|w| w < NARROW_VIEWPORT_MAX);

        tracing::debug!(
            reduced_motion,
            touch_primary,
            narrow_viewport,
            "capabilities detected"
        );

        Self {
            reduced_motion,
            touch_primary,
            narrow_viewport,
        }
    }

    /// Whether animation is allowed at all.
    #[inline]
    #[must_use]
    pub const fn motion_allowed(&self) -> bool {
        !self.reduced_motion
    }
}

impl Default for Capabilities {
    /// The fail-safe answer: no motion, touch, narrow.
    fn default() -> Self {
        Self::detect(&EnvSignals::unknown())
    }
}
