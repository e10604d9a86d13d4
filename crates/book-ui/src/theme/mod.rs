use egui::{Context, Visuals, Style, Color32, Rounding, Stroke, FontId, FontFamily, TextStyle};
use std::collections::BTreeMap;

/// Theme configuration
pub struct Theme {
    pub name: String,
    pub dark_mode: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "Emerald Night".to_string(),
            dark_mode: true,
        }
    }
}

/// Apply the application theme (deep night sky behind a paper book)
pub fn apply_theme(ctx: &Context, _theme: &Theme) {
    let mut style = Style::default();
    let mut visuals = Visuals::dark();

    let text_color = Color32::from_rgb(230, 226, 210);      // Moonlit text

    // Window and panel styling
    visuals.window_fill = night_color();
    visuals.panel_fill = night_color();
    visuals.extreme_bg_color = Color32::from_rgb(6, 10, 18);

    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, text_color);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    // Selection and highlighting
    visuals.selection.bg_fill = accent_color().linear_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent_color());

    // Font sizes
    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(11.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(15.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(22.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace));

    style.text_styles = font_sizes;

    // Apply the style and visuals
    ctx.set_style(style);
    ctx.set_visuals(visuals);
}

/// Sky behind everything
pub fn night_color() -> Color32 {
    Color32::from_rgb(10, 16, 28)
}

/// Emerald accent used for highlights and the cover emblem
pub fn accent_color() -> Color32 {
    Color32::from_rgb(140, 255, 201)
}

/// Page paper
pub fn paper_color() -> Color32 {
    Color32::from_rgb(244, 236, 214)
}

/// Back of a turned page, slightly shaded
pub fn verso_color() -> Color32 {
    Color32::from_rgb(226, 216, 190)
}

/// Printed text
pub fn ink_color() -> Color32 {
    Color32::from_rgb(48, 38, 30)
}

/// Cover leather
pub fn cover_color() -> Color32 {
    Color32::from_rgb(38, 72, 58)
}

/// Cover lining seen when it lies open
pub fn lining_color() -> Color32 {
    Color32::from_rgb(92, 60, 120)
}

/// Foil lettering and trim
pub fn gold_color() -> Color32 {
    Color32::from_rgb(248, 215, 119)
}

/// Star tint
pub fn star_color() -> Color32 {
    Color32::from_rgb(236, 240, 255)
}
