#![forbid(unsafe_code)]

//! Drifting particles in a unit box.
//!
//! Spawn positions and velocities come from a seeded [`XorShift32`], so a
//! given config always produces the same field. Particles move in straight
//! lines and reflect off the box edges. Hiding freezes the field; showing
//! it again continues from where it stopped.

use std::f32::consts::TAU;

use glitch_core::rng::XorShift32;
use glitch_runtime::frame_loop::clamp_fps;
use glitch_runtime::{AnimatedVisual, FrameError, FrameRates, HidePolicy};
use serde::Deserialize;

use crate::clock::{FrameClock, clamp_or};

/// Default particle count.
pub const DEFAULT_COUNT: usize = 64;
/// Largest accepted particle count.
pub const MAX_COUNT: usize = 512;
/// Default speed in box widths per second.
pub const DEFAULT_SPEED: f32 = 0.15;

const MAX_SPEED: f32 = 2.0;

/// Declarative particle settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Number of particles, `1..=512`.
    pub count: usize,
    /// Top speed in box widths per second, `0..=2`.
    pub speed: f32,
    /// Spawn seed.
    pub seed: u32,
    /// Frame rate on wide viewports.
    pub desktop_fps: u32,
    /// Frame rate on narrow viewports.
    pub mobile_fps: u32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        let rates = FrameRates::default();
        Self {
            count: DEFAULT_COUNT,
            speed: DEFAULT_SPEED,
            seed: 0x00C0_FFEE,
            desktop_fps: rates.desktop,
            mobile_fps: rates.mobile,
        }
    }
}

impl ParticleConfig {
    /// Clamp every field into its valid range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.count = self.count.clamp(1, MAX_COUNT);
        self.speed = clamp_or(
            f64::from(self.speed),
            0.0,
            f64::from(MAX_SPEED),
            f64::from(DEFAULT_SPEED),
        ) as f32;
        self.desktop_fps = clamp_fps(self.desktop_fps);
        self.mobile_fps = clamp_fps(self.mobile_fps);
        self
    }
}

/// One particle. Coordinates are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Horizontal velocity in units per second.
    pub vx: f32,
    /// Vertical velocity in units per second.
    pub vy: f32,
}

impl Particle {
    fn step(&mut self, dt_secs: f32) {
        (self.x, self.vx) = reflect(self.x + self.vx * dt_secs, self.vx);
        (self.y, self.vy) = reflect(self.y + self.vy * dt_secs, self.vy);
    }
}

/// Fold a coordinate back into `[0, 1]`, flipping velocity on a bounce.
fn reflect(pos: f32, vel: f32) -> (f32, f32) {
    if pos < 0.0 {
        ((-pos).min(1.0), vel.abs())
    } else if pos > 1.0 {
        ((2.0 - pos).max(0.0), -vel.abs())
    } else {
        (pos, vel)
    }
}

/// Deterministic particle field.
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: ParticleConfig,
    rest: Vec<Particle>,
    particles: Vec<Particle>,
    clock: FrameClock,
}

impl ParticleField {
    /// Spawn a field from `config`, clamping out-of-range values.
    pub fn new(config: ParticleConfig) -> Self {
        let config = config.sanitized();
        let mut rng = XorShift32::new(config.seed);
        let rest: Vec<Particle> = (0..config.count)
            .map(|_| {
                let x = rng.next_f32();
                let y = rng.next_f32();
                let angle = rng.next_f32() * TAU;
                let magnitude = config.speed * (0.5 + 0.5 * rng.next_f32());
                Particle {
                    x,
                    y,
                    vx: angle.cos() * magnitude,
                    vy: angle.sin() * magnitude,
                }
            })
            .collect();
        Self {
            particles: rest.clone(),
            rest,
            config,
            clock: FrameClock::default(),
        }
    }

    /// The settings in effect after clamping.
    #[must_use]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Current particle state.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Spawn state, also shown under reduced motion.
    #[must_use]
    pub fn rest_positions(&self) -> &[Particle] {
        &self.rest
    }
}

impl AnimatedVisual for ParticleField {
    fn render_frame(&mut self, now_ms: f64) -> Result<bool, FrameError> {
        let dt_secs = (self.clock.advance(now_ms)? / 1000.0) as f32;
        for p in &mut self.particles {
            p.step(dt_secs);
        }
        Ok(true)
    }

    fn render_static(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.particles.clone_from(&self.rest);
        self.clock.reset();
    }

    fn frame_rates(&self) -> FrameRates {
        FrameRates::new(self.config.desktop_fps, self.config.mobile_fps)
    }

    fn hide_policy(&self) -> HidePolicy {
        HidePolicy::Freeze
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_box(p: &Particle) -> bool {
        (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)
    }

    #[test]
    fn spawn_is_deterministic() {
        let a = ParticleField::new(ParticleConfig::default());
        let b = ParticleField::new(ParticleConfig::default());
        assert_eq!(a.particles(), b.particles());
        assert_eq!(a.particles().len(), DEFAULT_COUNT);
        assert!(a.particles().iter().all(in_box));
    }

    #[test]
    fn different_seeds_differ() {
        let a = ParticleField::new(ParticleConfig::default());
        let b = ParticleField::new(ParticleConfig {
            seed: 7,
            ..ParticleConfig::default()
        });
        assert_ne!(a.particles(), b.particles());
    }

    #[test]
    fn count_is_clamped() {
        let zero = ParticleField::new(ParticleConfig {
            count: 0,
            ..ParticleConfig::default()
        });
        assert_eq!(zero.particles().len(), 1);
        let huge = ParticleField::new(ParticleConfig {
            count: 100_000,
            ..ParticleConfig::default()
        });
        assert_eq!(huge.particles().len(), MAX_COUNT);
    }

    #[test]
    fn frames_move_particles_and_stay_in_box() {
        let mut field = ParticleField::new(ParticleConfig {
            speed: MAX_SPEED,
            ..ParticleConfig::default()
        });
        let start = field.particles().to_vec();
        for i in 0..200 {
            assert_eq!(field.render_frame(f64::from(i) * 16.0), Ok(true));
        }
        assert_ne!(field.particles(), &start[..]);
        assert!(field.particles().iter().all(in_box));
    }

    #[test]
    fn zero_speed_is_still() {
        let mut field = ParticleField::new(ParticleConfig {
            speed: 0.0,
            ..ParticleConfig::default()
        });
        let start = field.particles().to_vec();
        for i in 0..10 {
            field.render_frame(f64::from(i) * 16.0).unwrap();
        }
        assert_eq!(field.particles(), &start[..]);
    }

    #[test]
    fn reset_and_static_return_to_rest() {
        let mut field = ParticleField::new(ParticleConfig::default());
        for i in 0..20 {
            field.render_frame(f64::from(i) * 16.0).unwrap();
        }
        field.render_static();
        assert_eq!(field.particles(), field.rest_positions());
    }

    #[test]
    fn reflect_bounces() {
        assert_eq!(reflect(-0.25, -1.0), (0.25, 1.0));
        assert_eq!(reflect(1.25, 1.0), (0.75, -1.0));
        assert_eq!(reflect(0.5, 1.0), (0.5, 1.0));
    }

    #[test]
    fn nan_speed_falls_back() {
        let field = ParticleField::new(ParticleConfig {
            speed: f32::NAN,
            ..ParticleConfig::default()
        });
        assert_eq!(field.config().speed, DEFAULT_SPEED);
    }
}
