//! Star field painter

use egui::{Painter, Pos2, Rect};
use book_core::{Star, StarField};

use crate::theme::star_color;

/// Paint every star that has passed its delay.
///
/// Stars drift from the bottom of their band to the top once per cycle
/// and twinkle in and out on the way.
pub fn paint_stars(painter: &Painter, rect: Rect, field: &StarField, time_secs: f64) {
    for layer in &field.layers {
        let [top, bottom] = layer.band;
        let band_top = rect.top() + rect.height() * top;
        let band_height = rect.height() * (bottom - top);

        for star in &layer.stars {
            let Some(phase) = star.phase(time_secs) else {
                continue;
            };

            let alpha = Star::opacity(phase);
            if alpha < 0.02 {
                continue;
            }

            let pos = Pos2::new(
                rect.left() + rect.width() * star.left_pct / 100.0,
                band_top + band_height * (1.0 - phase),
            );
            // Longer cycles read as farther away
            let radius = 0.8 + 8.0 / star.duration_secs;
            painter.circle_filled(pos, radius, star_color().linear_multiply(alpha));
        }
    }
}
