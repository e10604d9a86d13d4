//! Fireworks particle engine
//!
//! Sparks are simulated in screen points, one step per display frame at
//! 60 Hz. The engine knows nothing about painting; the UI crate draws
//! whatever `sparks()` holds after each step.

use std::f32::consts::TAU;
use egui::{Color32, Pos2, Vec2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::FireworksConfig;
use crate::schedule::{Scheduler, TimerId};

/// A single transient particle
#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    pub pos: Pos2,
    pub vel: Vec2,

    /// Frames left before the spark is removed
    pub life: u32,

    pub color: Color32,
}

/// Which periodic trigger fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireworkTrigger {
    Small,
    Big,
}

/// Drawing surface bounds in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

/// Owns the active sparks and the two burst timers
pub struct ParticleEngine {
    config: FireworksConfig,
    sparks: Vec<Spark>,
    surface: Surface,
    small_timer: Option<TimerId>,
    big_timer: Option<TimerId>,
    rng: StdRng,
}

impl ParticleEngine {
    pub fn new(config: FireworksConfig, rng: StdRng) -> Self {
        Self {
            config,
            sparks: Vec::new(),
            surface: Surface::default(),
            small_timer: None,
            big_timer: None,
            rng,
        }
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }

    /// Running means at least one burst timer is armed
    pub fn is_running(&self) -> bool {
        self.small_timer.is_some() || self.big_timer.is_some()
    }

    pub fn timers(&self) -> (Option<TimerId>, Option<TimerId>) {
        (self.small_timer, self.big_timer)
    }

    /// Track the viewport size random bursts are placed in
    pub fn resize(&mut self, width: f32, height: f32) {
        let surface = Surface { width, height };
        if surface != self.surface {
            debug!("Fireworks surface resized to {}x{}", width, height);
            self.surface = surface;
        }
    }

    /// Arm both burst timers. No-op when already running.
    /// Returns whether the engine was started by this call.
    pub fn start<T>(&mut self, timers: &mut Scheduler<T>) -> bool
    where
        T: From<FireworkTrigger>,
    {
        if self.is_running() {
            return false;
        }

        let [min, max] = self.config.big_interval_ms;
        let big_period = self.rng.gen_range(min..max);

        self.small_timer = Some(timers.schedule_every(self.config.small_interval_ms, FireworkTrigger::Small.into()));
        self.big_timer = Some(timers.schedule_every(big_period, FireworkTrigger::Big.into()));

        debug!("Fireworks started (big bursts every {}ms)", big_period);
        true
    }

    /// Cancel both timers and discard every spark.
    /// Returns whether the engine was running.
    pub fn stop<T>(&mut self, timers: &mut Scheduler<T>) -> bool {
        let was_running = self.is_running();

        if let Some(id) = self.small_timer.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.big_timer.take() {
            timers.cancel(id);
        }
        self.sparks.clear();

        if was_running {
            debug!("Fireworks stopped");
        }
        was_running
    }

    /// Handle a fired burst timer
    pub fn trigger(&mut self, trigger: FireworkTrigger) {
        let amount = match trigger {
            FireworkTrigger::Small => self.config.small_amount,
            FireworkTrigger::Big => self.config.big_amount,
        };
        self.trigger_random_bursts(amount);
    }

    /// Append `count` sparks flying out from `origin` in random directions
    pub fn burst(&mut self, origin: Pos2, color: Color32, count: usize) {
        let [speed_min, speed_max] = self.config.speed;
        let [life_min, life_max] = self.config.lifetime;

        self.sparks.reserve(count);
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(speed_min..speed_max);
            self.sparks.push(Spark {
                pos: origin,
                vel: Vec2::angled(angle) * speed,
                life: self.rng.gen_range(life_min..life_max),
                color,
            });
        }
    }

    /// Fire `amount` bursts at random points in the sky band
    pub fn trigger_random_bursts(&mut self, amount: usize) {
        let Surface { width, height } = self.surface;
        let [band_top, band_bottom] = self.config.sky_band;
        let [count_min, count_max] = self.config.spark_count;

        for _ in 0..amount {
            let x = self.rng.gen::<f32>() * width;
            let y = height * (band_top + self.rng.gen::<f32>() * (band_bottom - band_top));
            let Some(&[r, g, b]) = self.config.palette.choose(&mut self.rng) else {
                return;
            };
            let count = self.rng.gen_range(count_min..count_max);
            self.burst(Pos2::new(x, y), Color32::from_rgb(r, g, b), count);
        }
    }

    /// Advance every spark by one frame: age, fall, move
    pub fn tick(&mut self) {
        let gravity = self.config.gravity;
        self.sparks.retain_mut(|spark| {
            spark.life = spark.life.saturating_sub(1);
            if spark.life == 0 {
                return false;
            }
            spark.vel.y += gravity;
            spark.pos += spark.vel;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn engine() -> ParticleEngine {
        let mut engine = ParticleEngine::new(FireworksConfig::default(), StdRng::seed_from_u64(11));
        engine.resize(1000.0, 600.0);
        engine
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Fired(FireworkTrigger);

    impl From<FireworkTrigger> for Fired {
        fn from(trigger: FireworkTrigger) -> Self {
            Fired(trigger)
        }
    }

    #[test]
    fn test_burst_ranges() {
        let mut engine = engine();
        let origin = Pos2::new(100.0, 50.0);
        engine.burst(origin, Color32::WHITE, 200);

        assert_eq!(engine.sparks().len(), 200);
        for spark in engine.sparks() {
            assert_eq!(spark.pos, origin);
            let speed = spark.vel.length();
            assert!(speed >= 1.5 - 1e-4 && speed < 5.5 + 1e-4, "speed {}", speed);
            assert!((40..100).contains(&spark.life));
            assert_eq!(spark.color, Color32::WHITE);
        }
    }

    #[test]
    fn test_random_bursts_stay_in_sky_band() {
        let mut engine = engine();
        engine.trigger_random_bursts(20);

        let count = engine.sparks().len();
        assert!(count >= 20 * 60 && count < 20 * 85, "count {}", count);

        let palette: Vec<Color32> = FireworksConfig::default()
            .palette
            .iter()
            .map(|&[r, g, b]| Color32::from_rgb(r, g, b))
            .collect();
        for spark in engine.sparks() {
            assert!(spark.pos.x >= 0.0 && spark.pos.x < 1000.0);
            assert!(spark.pos.y >= 30.0 && spark.pos.y < 300.0);
            assert!(palette.contains(&spark.color));
        }
    }

    #[test]
    fn test_zero_bursts_is_noop() {
        let mut engine = engine();
        engine.trigger_random_bursts(0);
        assert!(engine.sparks().is_empty());
    }

    #[test]
    fn test_tick_applies_gravity_then_moves() {
        let mut engine = engine();
        engine.burst(Pos2::ZERO, Color32::WHITE, 1);
        let before = engine.sparks()[0].clone();

        engine.tick();

        let after = &engine.sparks()[0];
        assert_eq!(after.life, before.life - 1);
        assert!((after.vel.y - (before.vel.y + 0.02)).abs() < 1e-6);
        assert!((after.pos.x - before.vel.x).abs() < 1e-5);
        assert!((after.pos.y - after.vel.y).abs() < 1e-5);
    }

    #[test]
    fn test_sparks_expire() {
        let mut engine = engine();
        engine.burst(Pos2::ZERO, Color32::WHITE, 50);
        for _ in 0..99 {
            engine.tick();
        }
        assert!(engine.sparks().is_empty());
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut engine = engine();
        let mut timers: Scheduler<Fired> = Scheduler::new();

        assert!(engine.start(&mut timers));
        let armed = engine.timers();
        assert!(!engine.start(&mut timers));

        assert_eq!(engine.timers(), armed);
        assert_eq!(timers.pending(), 2);
    }

    #[test]
    fn test_stop_clears_everything() {
        let mut engine = engine();
        let mut timers: Scheduler<Fired> = Scheduler::new();

        engine.start(&mut timers);
        engine.trigger(FireworkTrigger::Big);
        assert!(!engine.sparks().is_empty());

        assert!(engine.stop(&mut timers));
        assert!(engine.sparks().is_empty());
        assert_eq!(engine.timers(), (None, None));
        assert_eq!(timers.pending(), 0);

        assert!(!engine.stop(&mut timers));
    }

    #[test]
    fn test_timers_fire_small_and_big_bursts() {
        let mut engine = engine();
        let mut timers: Scheduler<Fired> = Scheduler::new();
        engine.start(&mut timers);

        let mut small = 0;
        let mut big = 0;
        for frame in 1..=10_000 / 100 {
            while let Some(Fired(trigger)) = timers.pop_due(frame * 100) {
                match trigger {
                    FireworkTrigger::Small => small += 1,
                    FireworkTrigger::Big => big += 1,
                }
            }
        }

        assert_eq!(small, 10_000 / 700);
        assert_eq!(big, 1);
    }
}
