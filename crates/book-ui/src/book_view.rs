//! Book spread painter
//!
//! Every page and the cover is drawn as a leaf hinged on the spine. A
//! leaf's turn `t` runs from 0 (lying on the right) to 1 (lying on the
//! left); between the two it is foreshortened and lifted toward the
//! viewer, which is what sells the flip.

use std::f32::consts::PI;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Response, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use book_core::{BookController, CurlDirection, PageContent, PageView};

use crate::theme;

/// Page width over height
const PAGE_ASPECT: f32 = 0.72;

/// Outward shift per turned page on the left stack
const STACK_STEP: f32 = 1.5;

/// Deepest stack offset drawn
const MAX_STACK: usize = 12;

/// Page edges hinted on the right-hand block
const MAX_EDGE_LINES: usize = 6;

/// How much of the allotted area the spread may take
const DEFAULT_FILL: f32 = 0.82;

/// Painter for the cover and pages
pub struct BookView {
    /// Fraction of the available area the open spread may fill
    pub fill: f32,
}

impl Default for BookView {
    fn default() -> Self {
        Self { fill: DEFAULT_FILL }
    }
}

/// Where the spread sits on screen
#[derive(Debug, Clone, Copy)]
struct SpreadLayout {
    spine_x: f32,
    top: f32,
    page_w: f32,
    height: f32,
}

impl SpreadLayout {
    fn fit(rect: Rect, fill: f32) -> Self {
        let avail = rect.size() * fill;
        let height = avail.y.min(avail.x * 0.5 / PAGE_ASPECT);
        let page_w = height * PAGE_ASPECT;
        Self {
            spine_x: rect.center().x,
            top: rect.center().y - height * 0.5,
            page_w,
            height,
        }
    }

    fn right_page(&self) -> Rect {
        Rect::from_min_size(Pos2::new(self.spine_x, self.top), Vec2::new(self.page_w, self.height))
    }

    fn left_page(&self) -> Rect {
        Rect::from_min_size(Pos2::new(self.spine_x - self.page_w, self.top), Vec2::new(self.page_w, self.height))
    }
}

impl BookView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the book filling the remaining space of `ui`
    pub fn ui(&self, ui: &mut Ui, book: &BookController, title: &str, contents: &[PageContent]) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);
        let layout = SpreadLayout::fit(rect, self.fill);

        let now_ms = book.now_ms();
        let curl_ms = book.timing().curl_ms;
        let cover_secs = book.timing().cover_close_ms as f32 / 1000.0;
        let open_t = ui
            .ctx()
            .animate_bool_with_time(response.id.with("cover"), book.is_open(), cover_secs);

        paint_shadow(&painter, &layout, open_t);

        // An open cover lies under the left stack
        if open_t >= 0.5 {
            paint_cover(&painter, &layout, open_t, title);
        }

        paint_edges(&painter, &layout, book.last_index() - book.current_index());

        let index = book.current_index();
        let is_turning = |page: &PageView| page.curl_progress(now_ms, curl_ms).map_or(false, |p| p < 1.0);
        // The page under a current page that is still swinging back into place
        let revealed = match book.pages().get(index) {
            Some(current) if is_turning(current) => Some(index + 1),
            _ => None,
        };

        let mut order: Vec<&PageView> = book.pages().iter().collect();
        order.sort_by_key(|page| (page.curl.is_some(), page.z_index));

        for page in order {
            let at_rest = !is_turning(page);

            if page.role.is_right() && at_rest {
                if page.position != index && Some(page.position) != revealed {
                    continue;
                }
                paint_recto(&painter, &layout, page, contents.get(page.position));
            } else if at_rest {
                if page.stack_depth > MAX_STACK + 1 {
                    continue;
                }
                paint_verso(&painter, &layout, page);
            } else {
                paint_turning(&painter, &layout, leaf_turn(page, now_ms, curl_ms));
            }
        }

        if open_t < 0.5 {
            paint_cover(&painter, &layout, open_t, title);
        }

        paint_hint(&painter, rect, book.is_open());

        response
    }
}

/// Turn of a page at `now_ms`, following its curl if it has one
fn leaf_turn(page: &PageView, now_ms: u64, curl_ms: u64) -> f32 {
    let rest = if page.role.is_right() { 0.0 } else { 1.0 };

    match (page.curl, page.curl_progress(now_ms, curl_ms)) {
        (Some(curl), Some(progress)) if progress < 1.0 => {
            let eased = smoothstep(progress);
            match curl.direction {
                CurlDirection::Forward => eased,
                CurlDirection::Back => 1.0 - eased,
            }
        }
        _ => rest,
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Quad of a leaf hinged at the spine, clockwise on screen
fn leaf_points(spine_x: f32, top: f32, height: f32, width: f32, turn: f32) -> Option<Vec<Pos2>> {
    let angle = turn.clamp(0.0, 1.0) * PI;
    let reach = width * angle.cos();
    if reach.abs() < 0.5 {
        return None;
    }

    let lift = height * 0.06 * angle.sin();
    let outer_x = spine_x + reach;
    let mut points = vec![
        Pos2::new(spine_x, top),
        Pos2::new(outer_x, top - lift),
        Pos2::new(outer_x, top + height + lift),
        Pos2::new(spine_x, top + height),
    ];
    if reach < 0.0 {
        points.reverse();
    }
    Some(points)
}

/// Darken an opaque colour
fn shade(color: Color32, factor: f32) -> Color32 {
    let [r, g, b, _] = color.to_array();
    let f = factor.clamp(0.0, 1.0);
    Color32::from_rgb((r as f32 * f) as u8, (g as f32 * f) as u8, (b as f32 * f) as u8)
}

fn paint_shadow(painter: &Painter, layout: &SpreadLayout, open_t: f32) {
    let left = layout.spine_x - layout.page_w * open_t;
    let shadow = Rect::from_min_max(
        Pos2::new(left, layout.top),
        Pos2::new(layout.spine_x + layout.page_w, layout.top + layout.height),
    )
    .translate(Vec2::new(6.0, 10.0))
    .expand(4.0);
    painter.rect_filled(shadow, Rounding::same(8.0), Color32::from_black_alpha(110));
}

/// Hint of the unread block on the right
fn paint_edges(painter: &Painter, layout: &SpreadLayout, remaining: usize) {
    let right = layout.right_page();
    for k in (1..=remaining.min(MAX_EDGE_LINES)).rev() {
        let offset = k as f32 * STACK_STEP;
        let edge = right.translate(Vec2::new(offset, offset * 0.5));
        painter.rect_filled(edge, Rounding::same(2.0), shade(theme::paper_color(), 0.92 - k as f32 * 0.03));
    }
}

fn paint_recto(painter: &Painter, layout: &SpreadLayout, page: &PageView, content: Option<&PageContent>) {
    let rect = layout.right_page();
    painter.rect_filled(rect, Rounding::same(2.0), theme::paper_color());
    painter.line_segment(
        [rect.left_top(), rect.left_bottom()],
        Stroke::new(2.0, shade(theme::paper_color(), 0.75)),
    );

    let ink = theme::ink_color();
    let text_rect = rect.shrink(layout.page_w * 0.1);

    if let Some(content) = content {
        let title_font = FontId::proportional((layout.height * 0.045).clamp(14.0, 30.0));
        let body_font = FontId::proportional((layout.height * 0.03).clamp(11.0, 20.0));

        let title = painter.layout(content.title.clone(), title_font, ink, text_rect.width());
        let title_height = title.size().y;
        painter.galley(text_rect.left_top(), title);

        let body = painter.layout(content.body.clone(), body_font, ink, text_rect.width());
        painter.galley(text_rect.left_top() + Vec2::new(0.0, title_height + 16.0), body);
    }

    painter.text(
        Pos2::new(text_rect.center().x, text_rect.bottom()),
        Align2::CENTER_BOTTOM,
        format!("{}", page.position + 1),
        FontId::proportional(12.0),
        ink.linear_multiply(0.6),
    );
}

fn paint_verso(painter: &Painter, layout: &SpreadLayout, page: &PageView) {
    let depth = page.stack_depth.min(MAX_STACK);
    let offset = depth as f32 * STACK_STEP;
    let rect = layout
        .left_page()
        .translate(Vec2::new(-offset, offset * 0.5));

    let color = shade(theme::verso_color(), 1.0 - depth as f32 * 0.02);
    painter.rect_filled(rect, Rounding::same(2.0), color);

    // Only the top sheet of the stack is readable
    if page.stack_depth == 1 {
        painter.line_segment(
            [rect.right_top(), rect.right_bottom()],
            Stroke::new(2.0, shade(theme::verso_color(), 0.7)),
        );
        painter.text(
            Pos2::new(rect.center().x, rect.bottom() - layout.page_w * 0.1),
            Align2::CENTER_BOTTOM,
            format!("{}", page.position + 1),
            FontId::proportional(12.0),
            theme::ink_color().linear_multiply(0.4),
        );
    }
}

fn paint_turning(painter: &Painter, layout: &SpreadLayout, turn: f32) {
    let Some(points) = leaf_points(layout.spine_x, layout.top, layout.height, layout.page_w, turn) else {
        return;
    };

    // Darkest edge-on, brightest lying flat
    let tilt = (turn * PI).sin();
    let base = if turn < 0.5 { theme::paper_color() } else { theme::verso_color() };
    painter.add(Shape::convex_polygon(
        points,
        shade(base, 1.0 - tilt * 0.3),
        Stroke::new(1.0, shade(base, 0.7)),
    ));
}

fn paint_cover(painter: &Painter, layout: &SpreadLayout, open_t: f32, title: &str) {
    let overhang = 6.0;
    let Some(points) = leaf_points(
        layout.spine_x,
        layout.top - overhang,
        layout.height + overhang * 2.0,
        layout.page_w + overhang,
        open_t,
    ) else {
        return;
    };

    let tilt = (open_t * PI).sin();
    let front = open_t < 0.5;
    let base = if front { theme::cover_color() } else { theme::lining_color() };
    painter.add(Shape::convex_polygon(
        points,
        shade(base, 1.0 - tilt * 0.35),
        Stroke::new(2.0, theme::gold_color().linear_multiply(if front { 0.9 } else { 0.4 })),
    ));

    // Lettering only while the cover faces the reader squarely
    if open_t < 0.05 {
        let face = Rect::from_min_size(
            Pos2::new(layout.spine_x, layout.top - overhang),
            Vec2::new(layout.page_w + overhang, layout.height + overhang * 2.0),
        );
        painter.rect_stroke(face.shrink(layout.page_w * 0.06), Rounding::same(4.0), Stroke::new(1.5, theme::gold_color()));

        let font = FontId::proportional((layout.height * 0.06).clamp(16.0, 40.0));
        let galley = painter.layout(title.to_owned(), font, theme::gold_color(), face.width() * 0.7);
        let pos = face.center() - galley.size() * 0.5 - Vec2::new(0.0, layout.height * 0.1);
        painter.galley(pos, galley);

        painter.circle_stroke(
            face.center() + Vec2::new(0.0, layout.height * 0.15),
            layout.page_w * 0.12,
            Stroke::new(1.5, theme::accent_color()),
        );
    }
}

fn paint_hint(painter: &Painter, rect: Rect, open: bool) {
    let text = if open {
        "Click, tap or \u{2192} to turn the page  \u{00b7}  \u{2190} to go back"
    } else {
        "Click or tap to open"
    };
    painter.text(
        Pos2::new(rect.center().x, rect.bottom() - 12.0),
        Align2::CENTER_BOTTOM,
        text,
        FontId::proportional(13.0),
        Color32::from_white_alpha(90),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_core::{Curl, PageRole};

    fn page(role: PageRole, curl: Option<Curl>) -> PageView {
        PageView {
            position: 0,
            role,
            stack_depth: 0,
            z_index: 200,
            curl,
        }
    }

    #[test]
    fn test_leaf_turn_at_rest() {
        assert_eq!(leaf_turn(&page(PageRole::Current, None), 0, 750), 0.0);
        assert_eq!(leaf_turn(&page(PageRole::Right, None), 0, 750), 0.0);
        assert_eq!(leaf_turn(&page(PageRole::Left, None), 0, 750), 1.0);
    }

    #[test]
    fn test_leaf_turn_follows_curl() {
        let forward = Some(Curl { direction: CurlDirection::Forward, started_ms: 0 });
        let back = Some(Curl { direction: CurlDirection::Back, started_ms: 0 });

        assert!((leaf_turn(&page(PageRole::Left, forward), 375, 750) - 0.5).abs() < 1e-6);
        assert_eq!(leaf_turn(&page(PageRole::Left, forward), 0, 750), 0.0);
        assert_eq!(leaf_turn(&page(PageRole::Current, back), 0, 750), 1.0);
        assert_eq!(leaf_turn(&page(PageRole::Current, back), 750, 750), 0.0);
    }

    #[test]
    fn test_leaf_points_flip_sides() {
        let right = leaf_points(100.0, 0.0, 200.0, 80.0, 0.0).unwrap();
        assert!(right.iter().all(|p| p.x >= 100.0));

        let left = leaf_points(100.0, 0.0, 200.0, 80.0, 1.0).unwrap();
        assert!(left.iter().all(|p| p.x <= 100.0));

        assert!(leaf_points(100.0, 0.0, 200.0, 80.0, 0.5).is_none());
    }

    #[test]
    fn test_layout_fits_rect() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(1200.0, 800.0));
        let layout = SpreadLayout::fit(rect, 0.8);
        assert!(layout.page_w * 2.0 <= 1200.0 * 0.8 + 1e-3);
        assert!(layout.height <= 800.0 * 0.8 + 1e-3);
        assert_eq!(layout.spine_x, 600.0);
    }
}
