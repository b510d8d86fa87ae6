#![forbid(unsafe_code)]

//! Character scramble over a text label.
//!
//! A burst starts fully scrambled and resolves left to right over
//! `burst_ms`: character `i` of `n` settles once progress passes `i / n`.
//! Unsettled characters are replaced by a random printable ASCII glyph with
//! probability `intensity` each frame. Whitespace never scrambles. When the
//! burst ends the label is shown plain and the frame callback returns
//! `Ok(false)`, which stops the loop until the next trigger or show.
//!
//! ```
//! use glitch_fx::{ScrambleConfig, TextScramble};
//! use glitch_runtime::AnimatedVisual;
//!
//! let mut fx = TextScramble::new(ScrambleConfig::new("ACCESS GRANTED"));
//! let mut now = 0.0;
//! while fx.render_frame(now) == Ok(true) {
//!     now += 16.0;
//! }
//! assert!(now >= 400.0);
//! assert_eq!(fx.display(), "ACCESS GRANTED");
//! ```

use glitch_core::rng::XorShift32;
use glitch_runtime::frame_loop::clamp_fps;
use glitch_runtime::{AnimatedVisual, FrameError, FrameRates, HidePolicy};
use serde::Deserialize;
use tracing::trace;

use crate::clock::{FrameClock, clamp_or};

/// Default burst length.
pub const DEFAULT_BURST_MS: f64 = 400.0;
/// Default per-character scramble probability.
pub const DEFAULT_INTENSITY: f32 = 0.6;
/// Default idle re-trigger interval.
pub const DEFAULT_IDLE_MS: f64 = 45_000.0;

const MIN_BURST_MS: f64 = 50.0;
const MAX_BURST_MS: f64 = 10_000.0;
const MIN_IDLE_MS: f64 = 1_000.0;

/// Declarative scramble settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrambleConfig {
    /// The label that resolves at the end of each burst.
    pub text: String,
    /// Burst length in milliseconds.
    pub burst_ms: f64,
    /// Chance an unsettled character shows a random glyph, `0..=1`.
    pub intensity: f32,
    /// Idle re-trigger base interval; `null` disables idle bursts.
    pub idle_ms: Option<f64>,
    /// Frame rate on wide viewports.
    pub desktop_fps: u32,
    /// Frame rate on narrow viewports.
    pub mobile_fps: u32,
    /// Seed for glyph selection.
    pub seed: u32,
}

impl Default for ScrambleConfig {
    fn default() -> Self {
        let rates = FrameRates::default();
        Self {
            text: String::new(),
            burst_ms: DEFAULT_BURST_MS,
            intensity: DEFAULT_INTENSITY,
            idle_ms: Some(DEFAULT_IDLE_MS),
            desktop_fps: rates.desktop,
            mobile_fps: rates.mobile,
            seed: 0x5C4A_3B1E,
        }
    }
}

impl ScrambleConfig {
    /// Defaults with the given label.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Clamp every field into its valid range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.burst_ms = clamp_or(self.burst_ms, MIN_BURST_MS, MAX_BURST_MS, DEFAULT_BURST_MS);
        self.intensity = if self.intensity.is_nan() {
            DEFAULT_INTENSITY
        } else {
            self.intensity.clamp(0.0, 1.0)
        };
        self.idle_ms = self
            .idle_ms
            .map(|ms| clamp_or(ms, MIN_IDLE_MS, f64::MAX, DEFAULT_IDLE_MS));
        self.desktop_fps = clamp_fps(self.desktop_fps);
        self.mobile_fps = clamp_fps(self.mobile_fps);
        self
    }
}

/// Scrambling text label.
#[derive(Debug, Clone)]
pub struct TextScramble {
    config: ScrambleConfig,
    chars: Vec<char>,
    display: String,
    rng: XorShift32,
    clock: FrameClock,
    elapsed_ms: f64,
    bursting: bool,
}

impl TextScramble {
    /// Create a scramble from `config`, clamping out-of-range values.
    pub fn new(config: ScrambleConfig) -> Self {
        let config = config.sanitized();
        let chars: Vec<char> = config.text.chars().collect();
        Self {
            display: config.text.clone(),
            rng: XorShift32::new(config.seed),
            chars,
            config,
            clock: FrameClock::default(),
            elapsed_ms: 0.0,
            bursting: false,
        }
    }

    /// The settings in effect after clamping.
    #[must_use]
    pub fn config(&self) -> &ScrambleConfig {
        &self.config
    }

    /// The plain label.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.config.text
    }

    /// What should be drawn right now.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Whether a burst is in progress.
    #[must_use]
    pub fn is_bursting(&self) -> bool {
        self.bursting
    }

    /// Replace the label. Any burst in progress restarts.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.config.text = text.into();
        self.chars = self.config.text.chars().collect();
        self.restart();
        self.display.clone_from(&self.config.text);
    }

    fn restart(&mut self) {
        self.elapsed_ms = 0.0;
        self.clock.reset();
        self.bursting = false;
    }

    fn scramble(&mut self, progress: f64) {
        let total = self.chars.len().max(1) as f64;
        let intensity = self.config.intensity;
        let mut out = String::with_capacity(self.config.text.len());
        for (idx, &c) in self.chars.iter().enumerate() {
            let settled = progress > idx as f64 / total;
            if settled || c.is_whitespace() {
                out.push(c);
            } else if self.rng.next_f32() < intensity {
                out.push(random_glyph(&mut self.rng));
            } else {
                out.push(c);
            }
        }
        self.display = out;
    }
}

/// A printable ASCII glyph (`!` through `~`).
fn random_glyph(rng: &mut XorShift32) -> char {
    char::from(33 + (rng.next_u32() % 94) as u8)
}

impl AnimatedVisual for TextScramble {
    fn render_frame(&mut self, now_ms: f64) -> Result<bool, FrameError> {
        let dt = self.clock.advance(now_ms)?;
        if !self.bursting {
            trace!(text = %self.config.text, "scramble burst started");
            self.bursting = true;
        }
        self.elapsed_ms += dt;

        let progress = self.elapsed_ms / self.config.burst_ms;
        if progress >= 1.0 {
            self.restart();
            self.display.clone_from(&self.config.text);
            trace!(text = %self.config.text, "scramble burst finished");
            return Ok(false);
        }
        self.scramble(progress);
        Ok(true)
    }

    fn render_static(&mut self) {
        self.restart();
        self.display.clone_from(&self.config.text);
    }

    fn reset(&mut self) {
        self.render_static();
    }

    fn trigger(&mut self) {
        self.restart();
    }

    fn frame_rates(&self) -> FrameRates {
        FrameRates::new(self.config.desktop_fps, self.config.mobile_fps)
    }

    fn hide_policy(&self) -> HidePolicy {
        HidePolicy::Freeze
    }

    fn idle_interval_ms(&self) -> Option<f64> {
        self.config.idle_ms
    }
}
