#![forbid(unsafe_code)]

//! Glitch Core
//!
//! Environment capability detection, canonical input events, geometry,
//! animation primitives, deterministic randomness, and notification sinks.
//!
//! # Role in glitch
//! `glitch-core` is the dependency-light foundation. It knows nothing about
//! hosts or scheduling; `glitch-runtime` builds the component lifecycle on
//! top of it, and `glitch-widgets` and `glitch-fx` consume its types.

pub mod animation;
pub mod capabilities;
pub mod event;
pub mod geometry;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod notify;
pub mod rng;
