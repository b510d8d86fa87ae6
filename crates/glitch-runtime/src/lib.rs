#![forbid(unsafe_code)]

//! Glitch Runtime
//!
//! The host-driven lifecycle behind every animated glitch component.
//!
//! # Key Components
//!
//! - [`Host`] - Frame, timer and intersection services supplied by the embedder
//! - [`VisibilityTracker`] - Viewport visibility with fail-open fallback
//! - [`ThrottledLoop`] - Token-checked animation loop capped at a target rate
//! - [`AnimatedComponent`] - Composes the above around an [`AnimatedVisual`]
//! - [`IdleTrigger`] - Jittered self-rescheduling re-trigger timer
//! - [`Debouncer`] - Latest-wins input debouncing
//! - [`KeyValueStore`] - Persistence seam for small string lists
//!
//! # How it fits in the system
//! `glitch-runtime` sits between `glitch-core` (capabilities, events) and
//! the concrete components in `glitch-widgets` and `glitch-fx`. It never
//! reads a clock: hosts deliver frame and timer tokens with timestamps,
//! which keeps every component deterministic under test.

pub mod animated;
pub mod debounce;
pub mod frame_loop;
pub mod host;
pub mod idle;
pub mod storage;
pub mod visibility;

pub use animated::{
    AnimatedComponent, AnimatedVisual, FrameRates, HidePolicy, Lifecycle, PlaybackEvent,
    StopReason,
};
pub use debounce::Debouncer;
pub use frame_loop::{FrameCallback, FrameError, FrameOutcome, ThrottledLoop};
pub use host::{
    ElementId, FrameScheduler, FrameToken, Host, HostError, IntersectionHost, ManualHost,
    ObserverToken, TimerScheduler, TimerToken,
};
pub use idle::IdleTrigger;
#[cfg(feature = "file-storage")]
pub use storage::FileStore;
pub use storage::{KeyValueStore, MemoryStore, StorageError, UnavailableStore};
pub use visibility::{TrackerState, VisibilityTracker};
