#![forbid(unsafe_code)]

//! Concrete glitch visuals.
//!
//! Each type here implements [`AnimatedVisual`](glitch_runtime::AnimatedVisual)
//! and is meant to be wrapped in an
//! [`AnimatedComponent`](glitch_runtime::AnimatedComponent), which decides
//! when frames run. The visuals only compute state; hosts read it back
//! (`display()`, `particles()`, `heights()`) and draw it however they draw.
//!
//! | Visual | Runs | On hide | Reduced motion |
//! |--------|------|---------|----------------|
//! | [`TextScramble`] | bursts, self-terminating | freeze | plain label |
//! | [`ParticleField`] | continuously | freeze | particles at rest |
//! | [`WaveformBars`] | continuously | reset | flat bars |
//!
//! Configs deserialize with serde, fill missing fields from `Default`, and
//! clamp out-of-range values silently.

mod clock;
pub mod particles;
pub mod text_scramble;
pub mod waveform;

pub use particles::{Particle, ParticleConfig, ParticleField};
pub use text_scramble::{ScrambleConfig, TextScramble};
pub use waveform::{WaveformBars, WaveformConfig};
