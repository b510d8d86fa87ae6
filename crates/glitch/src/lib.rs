#![forbid(unsafe_code)]

//! Glitch public facade crate.
//!
//! Re-exports the types most embedders need from the internal crates and
//! offers a prelude. A host typically:
//!
//! 1. implements [`Host`] (or uses [`ManualHost`] headless),
//! 2. wraps a visual from [`fx`] in an [`AnimatedComponent`],
//! 3. forwards attach/detach, intersection, frame and timer callbacks.

// --- Core re-exports -------------------------------------------------------

pub use glitch_core::capabilities::{
    Capabilities, EnvSignals, EnvironmentProbe, MotionPreference, PointerKind,
};
pub use glitch_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEvent};
pub use glitch_core::geometry::Rect;
pub use glitch_core::notify::{NotificationSink, RecordingSink};

// --- Runtime re-exports ----------------------------------------------------

pub use glitch_runtime::{
    AnimatedComponent, AnimatedVisual, Debouncer, ElementId, FrameError, FrameOutcome,
    FrameRates, FrameToken, HidePolicy, Host, HostError, KeyValueStore, Lifecycle, ManualHost,
    MemoryStore, ObserverToken, PlaybackEvent, StopReason, StorageError, TimerToken,
    UnavailableStore,
};
#[cfg(feature = "file-storage")]
pub use glitch_runtime::FileStore;

// --- Widget and visual re-exports ------------------------------------------

#[cfg(feature = "widgets")]
pub use glitch_widgets::{FilterMenu, MenuAction, MenuConfig, MenuEvent, MenuItem};

#[cfg(feature = "fx")]
pub use glitch_fx::{ParticleField, TextScramble, WaveformBars};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for glitch embedders.
///
/// Components never return these from their callbacks; they surface only
/// from APIs an embedder calls directly (storage setup, host adapters).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A host service failed.
    #[error(transparent)]
    Host(#[from] HostError),
    /// A frame callback failed.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Persistent storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Standard result type for glitch APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnimatedComponent, AnimatedVisual, EnvSignals, Error, Event, FrameRates, HidePolicy,
        Host, KeyCode, KeyEvent, Lifecycle, ManualHost, Modifiers, PlaybackEvent, Result,
    };

    #[cfg(feature = "widgets")]
    pub use crate::{FilterMenu, MenuEvent, MenuItem};

    #[cfg(feature = "fx")]
    pub use crate::{ParticleField, TextScramble, WaveformBars};

    pub use crate::{core, runtime};
    #[cfg(feature = "fx")]
    pub use crate::fx;
    #[cfg(feature = "widgets")]
    pub use crate::widgets;
}

pub use glitch_core as core;
#[cfg(feature = "fx")]
pub use glitch_fx as fx;
pub use glitch_runtime as runtime;
#[cfg(feature = "widgets")]
pub use glitch_widgets as widgets;
