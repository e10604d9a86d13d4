//! Fireworks overlay painter

use egui::{Color32, Painter, Vec2};
use book_core::ParticleEngine;

/// Draw every live spark as a small filled circle.
///
/// Colours go out premultiplied with zero alpha, which egui blends
/// additively, so overlapping sparks brighten.
pub fn paint_fireworks(painter: &Painter, origin: Vec2, engine: &ParticleEngine) {
    let radius = engine.config().spark_radius;

    for spark in engine.sparks() {
        let [r, g, b, _] = spark.color.to_array();
        painter.circle_filled(
            spark.pos + origin,
            radius,
            Color32::from_rgba_premultiplied(r, g, b, 0),
        );
    }
}
