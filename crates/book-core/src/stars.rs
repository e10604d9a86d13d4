//! Background star field
//!
//! Generated once at startup. Each star only carries the parameters its
//! drift animation needs; the painter evaluates the animation per frame.

use std::f32::consts::PI;
use rand::Rng;

use crate::config::StarLayerConfig;

/// One decorative star
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Horizontal position, percent of the viewport width
    pub left_pct: f32,

    /// Seconds before the star first appears
    pub delay_secs: f32,

    /// Seconds for one drift cycle
    pub duration_secs: f32,
}

impl Star {
    /// Progress through the current drift cycle, `None` before the delay
    pub fn phase(&self, time_secs: f64) -> Option<f32> {
        let elapsed = time_secs - self.delay_secs as f64;
        if elapsed < 0.0 {
            return None;
        }
        Some((elapsed / self.duration_secs as f64).fract() as f32)
    }

    /// Opacity for a given phase: fades in, peaks mid-cycle, fades out
    pub fn opacity(phase: f32) -> f32 {
        (phase * PI).sin().max(0.0)
    }
}

/// Stars sharing a vertical band
#[derive(Debug, Clone)]
pub struct StarLayer {
    /// Band top and bottom as fractions of viewport height
    pub band: [f32; 2],
    pub stars: Vec<Star>,
}

/// All background layers
#[derive(Debug, Clone, Default)]
pub struct StarField {
    pub layers: Vec<StarLayer>,
}

impl StarField {
    pub fn generate(layers: &[StarLayerConfig], rng: &mut impl Rng) -> Self {
        let layers = layers
            .iter()
            .map(|layer| StarLayer {
                band: layer.band,
                stars: (0..layer.count)
                    .map(|_| Star {
                        left_pct: rng.gen::<f32>() * 100.0,
                        delay_secs: rng.gen::<f32>() * 6.0,
                        duration_secs: 6.0 + rng.gen::<f32>() * 8.0,
                    })
                    .collect(),
            })
            .collect();

        Self { layers }
    }

    pub fn star_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.stars.len()).sum()
    }
}
