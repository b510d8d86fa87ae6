#![forbid(unsafe_code)]

//! Oscillating equalizer bars.
//!
//! Each bar is a [`Pulse`] with its own seeded phase and a frequency spread
//! of ±25% around the configured base, blended with a slower second
//! harmonic so neighbouring bars do not move in lockstep. Heights are in
//! `[floor, 1]`. Unlike the other visuals the bars reset when hidden:
//! coming back into view starts from a flat line.

use glitch_core::animation::{Animation, Pulse, duration_from_ms};
use glitch_core::rng::XorShift32;
use glitch_runtime::frame_loop::clamp_fps;
use glitch_runtime::{AnimatedVisual, FrameError, FrameRates, HidePolicy};
use serde::Deserialize;

use crate::clock::{FrameClock, clamp_or};

/// Default number of bars.
pub const DEFAULT_BARS: usize = 24;
/// Largest accepted bar count.
pub const MAX_BARS: usize = 128;
/// Default oscillation frequency in Hz.
pub const DEFAULT_FREQUENCY: f32 = 1.2;
/// Default resting height.
pub const DEFAULT_FLOOR: f32 = 0.1;

/// Declarative waveform settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Number of bars, `1..=128`.
    pub bars: usize,
    /// Base frequency in Hz, `0.05..=10`.
    pub frequency: f32,
    /// Resting bar height, `0..=1`.
    pub floor: f32,
    /// Phase seed.
    pub seed: u32,
    /// Frame rate on wide viewports.
    pub desktop_fps: u32,
    /// Frame rate on narrow viewports.
    pub mobile_fps: u32,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            bars: DEFAULT_BARS,
            frequency: DEFAULT_FREQUENCY,
            floor: DEFAULT_FLOOR,
            seed: 0x0BAD_CAFE,
            desktop_fps: 30,
            mobile_fps: 20,
        }
    }
}

impl WaveformConfig {
    /// Clamp every field into its valid range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.bars = self.bars.clamp(1, MAX_BARS);
        self.frequency = clamp_or(
            f64::from(self.frequency),
            0.05,
            10.0,
            f64::from(DEFAULT_FREQUENCY),
        ) as f32;
        self.floor = clamp_or(f64::from(self.floor), 0.0, 1.0, f64::from(DEFAULT_FLOOR)) as f32;
        self.desktop_fps = clamp_fps(self.desktop_fps);
        self.mobile_fps = clamp_fps(self.mobile_fps);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Bar {
    primary: Pulse,
    harmonic: Pulse,
}

impl Bar {
    fn level(&self) -> f32 {
        0.7 * self.primary.value() + 0.3 * self.harmonic.value()
    }
}

/// Deterministic animated bar heights.
#[derive(Debug, Clone)]
pub struct WaveformBars {
    config: WaveformConfig,
    bars: Vec<Bar>,
    heights: Vec<f32>,
    clock: FrameClock,
}

impl WaveformBars {
    /// Build bars from `config`, clamping out-of-range values.
    pub fn new(config: WaveformConfig) -> Self {
        let config = config.sanitized();
        let mut rng = XorShift32::new(config.seed);
        let bars: Vec<Bar> = (0..config.bars)
            .map(|_| {
                let spread = 0.75 + 0.5 * rng.next_f32();
                let phase = rng.next_f32() * std::f32::consts::TAU;
                let primary = Pulse::new(config.frequency * spread).with_phase(phase);
                let harmonic = Pulse::new(config.frequency * 0.5).with_phase(phase * 0.5);
                Bar { primary, harmonic }
            })
            .collect();
        Self {
            heights: vec![config.floor; bars.len()],
            bars,
            config,
            clock: FrameClock::default(),
        }
    }

    /// The settings in effect after clamping.
    #[must_use]
    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    /// Current bar heights in `[floor, 1]`.
    #[must_use]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Whether every bar is at the resting height.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.heights.iter().all(|&h| h == self.config.floor)
    }
}

impl AnimatedVisual for WaveformBars {
    fn render_frame(&mut self, now_ms: f64) -> Result<bool, FrameError> {
        let dt = duration_from_ms(self.clock.advance(now_ms)?);
        let floor = self.config.floor;
        for (bar, height) in self.bars.iter_mut().zip(self.heights.iter_mut()) {
            bar.primary.tick(dt);
            bar.harmonic.tick(dt);
            *height = (floor + (1.0 - floor) * bar.level()).clamp(floor, 1.0);
        }
        Ok(true)
    }

    fn render_static(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        for bar in &mut self.bars {
            bar.primary.reset();
            bar.harmonic.reset();
        }
        self.heights.fill(self.config.floor);
        self.clock.reset();
    }

    fn frame_rates(&self) -> FrameRates {
        FrameRates::new(self.config.desktop_fps, self.config.mobile_fps)
    }

    fn hide_policy(&self) -> HidePolicy {
        HidePolicy::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bars: &mut WaveformBars, frames: u32) {
        for i in 0..frames {
            bars.render_frame(f64::from(i) * 33.0).unwrap();
        }
    }

    #[test]
    fn starts_flat() {
        let bars = WaveformBars::new(WaveformConfig::default());
        assert_eq!(bars.heights().len(), DEFAULT_BARS);
        assert!(bars.is_flat());
    }

    #[test]
    fn frames_animate_within_range() {
        let mut bars = WaveformBars::new(WaveformConfig::default());
        run(&mut bars, 30);
        assert!(!bars.is_flat());
        assert!(
            bars.heights()
                .iter()
                .all(|&h| (DEFAULT_FLOOR..=1.0).contains(&h))
        );
    }

    #[test]
    fn deterministic_for_seed() {
        let mut a = WaveformBars::new(WaveformConfig::default());
        let mut b = WaveformBars::new(WaveformConfig::default());
        run(&mut a, 25);
        run(&mut b, 25);
        assert_eq!(a.heights(), b.heights());
    }

    #[test]
    fn reset_flattens_and_restarts() {
        let mut bars = WaveformBars::new(WaveformConfig::default());
        run(&mut bars, 10);
        let after_ten = bars.heights().to_vec();
        bars.reset();
        assert!(bars.is_flat());
        run(&mut bars, 10);
        assert_eq!(bars.heights(), &after_ten[..]);
    }

    #[test]
    fn hides_with_reset_policy() {
        let bars = WaveformBars::new(WaveformConfig::default());
        assert_eq!(bars.hide_policy(), HidePolicy::Reset);
    }

    #[test]
    fn config_is_clamped() {
        let bars = WaveformBars::new(WaveformConfig {
            bars: 0,
            frequency: 100.0,
            floor: -1.0,
            ..WaveformConfig::default()
        });
        assert_eq!(bars.heights().len(), 1);
        assert_eq!(bars.config().frequency, 10.0);
        assert_eq!(bars.config().floor, 0.0);

        let many = WaveformBars::new(WaveformConfig {
            bars: 1_000,
            ..WaveformConfig::default()
        });
        assert_eq!(many.heights().len(), MAX_BARS);
    }
}
