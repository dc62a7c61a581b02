use egui::{Align2, Color32, FontId, Pos2, Rect, Shape, Stroke};
use nalgebra::{Matrix2, Vector2};

use crate::math::{apply, AreaOrientation};


/// Minimal 2D drawing target the scene is painted on.
pub trait Surface {
    fn rect(&self) -> Rect;
    fn clear(&mut self, color: Color32);
    fn line(&mut self, points: [Pos2; 2], stroke: Stroke);
    fn polygon(&mut self, points: Vec<Pos2>, fill: Color32, stroke: Stroke);
    fn text(&mut self, pos: Pos2, text: &str, font: FontId, color: Color32);
}

/// A fixed-size region of an egui painter. Drawing is clipped to the region,
/// which keeps its size even while scrolled out of view.
#[derive(Clone)]
pub struct Canvas {
    painter: egui::Painter,
    rect: Rect,
}

impl Canvas {
    pub fn new(ui: &egui::Ui, rect: Rect) -> Self {
        Self {
            painter: ui.painter_at(rect),
            rect,
        }
    }
}

impl Surface for Canvas {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn clear(&mut self, color: Color32) {
        self.painter.rect_filled(self.rect, 0.0, color);
    }

    fn line(&mut self, points: [Pos2; 2], stroke: Stroke) {
        self.painter.line_segment(points, stroke);
    }

    fn polygon(&mut self, points: Vec<Pos2>, fill: Color32, stroke: Stroke) {
        self.painter.add(Shape::convex_polygon(points, fill, stroke));
    }

    fn text(&mut self, pos: Pos2, text: &str, font: FontId, color: Color32) {
        self.painter.text(pos, Align2::LEFT_BOTTOM, text, font, color);
    }
}


#[derive(Clone, Debug)]
pub struct SceneStyle {
    pub pixels_per_unit: f32,
    pub background: Color32,
    pub grid: Stroke,
    pub axes: Stroke,
    pub square_outline: Stroke,
    pub collapsed_fill: Color32,
    pub flipped_fill: Color32,
    pub preserved_fill: Color32,
    pub i_hat: Color32,
    pub j_hat: Color32,
    pub vector_width: f32,
    pub head_len: f32,
    pub label_font: FontId,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            pixels_per_unit: 30.0,
            background: Color32::from_rgb(24, 24, 24),
            grid: Stroke::new(0.5, Color32::from_rgb(0x44, 0x44, 0x44)),
            axes: Stroke::new(1.5, Color32::from_rgb(0x77, 0x77, 0x77)),
            square_outline: Stroke::new(1.5, Color32::from_rgb(0xFF, 0xD7, 0x00)),
            collapsed_fill: Color32::from_rgba_unmultiplied(128, 128, 128, 153),
            flipped_fill: Color32::from_rgba_unmultiplied(255, 70, 70, 102),
            preserved_fill: Color32::from_rgba_unmultiplied(255, 255, 100, 128),
            i_hat: Color32::from_rgb(0x32, 0xCD, 0x32),
            j_hat: Color32::from_rgb(0xFF, 0x63, 0x47),
            vector_width: 3.0,
            head_len: 10.0,
            label_font: FontId::proportional(14.0),
        }
    }
}

impl SceneStyle {
    pub fn with_grid_alpha(mut self, alpha: u8) -> Self {
        let [r, g, b, _] = self.grid.color.to_array();
        self.grid.color = Color32::from_rgba_unmultiplied(r, g, b, alpha);
        self
    }

    pub fn square_fill(&self, m: &Matrix2<f64>) -> Color32 {
        match AreaOrientation::classify(m) {
            AreaOrientation::Collapsed => self.collapsed_fill,
            AreaOrientation::Flipped => self.flipped_fill,
            AreaOrientation::Preserved => self.preserved_fill,
        }
    }
}


/// Maps plane coordinates to screen pixels: origin at the surface center, y up.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    origin: Pos2,
    scale: f32,
    half_extent: egui::Vec2,
}

impl Viewport {
    pub fn new(rect: Rect, scale: f32) -> Self {
        Self {
            origin: rect.center(),
            scale,
            half_extent: rect.size() / (2.0 * scale),
        }
    }

    pub fn to_screen(&self, v: &Vector2<f64>) -> Pos2 {
        self.origin + egui::vec2(v.x as f32 * self.scale, -(v.y as f32) * self.scale)
    }

    /// Visible half-width and half-height in plane units.
    pub fn half_extent(&self) -> egui::Vec2 {
        self.half_extent
    }
}


/// Paints one frame: a grid, unit square and axes warped by `m`, then the two
/// basis arrows at their literal coordinates.
///
/// The arrows are deliberately not run through `m`, so callers can animate the
/// grid and the vectors toward different targets.
pub fn render_scene(
    surface: &mut impl Surface,
    style: &SceneStyle,
    i_hat: &Vector2<f64>,
    j_hat: &Vector2<f64>,
    m: &Matrix2<f64>,
    show_unit_square: bool,
) {
    let rect = surface.rect();
    if !rect.is_positive() {
        log::error!("Cannot render scene onto a surface with no area ({rect:?})");
        return;
    }
    if !(style.pixels_per_unit.is_finite() && style.pixels_per_unit > 0.0) {
        log::error!("Cannot render scene at {} pixels per unit", style.pixels_per_unit);
        return;
    }

    surface.clear(style.background);

    let view = Viewport::new(rect, style.pixels_per_unit);
    let project = |x: f64, y: f64| view.to_screen(&apply(m, &Vector2::new(x, y)));

    draw_grid_2d(surface, &view, &project, style.grid);

    if show_unit_square {
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .map(|(x, y)| project(x, y))
            .to_vec();
        surface.polygon(corners, style.square_fill(m), style.square_outline);
    }

    draw_axes_2d(surface, &view, &project, style.axes);

    let origin = view.to_screen(&Vector2::zeros());
    draw_arrow(surface, style, origin, view.to_screen(i_hat), style.i_hat, "î");
    draw_arrow(surface, style, origin, view.to_screen(j_hat), style.j_hat, "ĵ");
}


fn draw_grid_2d(
    surface: &mut impl Surface,
    view: &Viewport,
    project: &impl Fn(f64, f64) -> Pos2,
    stroke: Stroke,
) {
    let half = view.half_extent();
    let (hx, hy) = (half.x as f64, half.y as f64);

    let nx = hx.floor() as i32;
    for i in -nx..=nx {
        let x = i as f64;
        surface.line([project(x, -hy), project(x, hy)], stroke);
    }

    let ny = hy.floor() as i32;
    for i in -ny..=ny {
        let y = i as f64;
        surface.line([project(-hx, y), project(hx, y)], stroke);
    }
}


fn draw_axes_2d(
    surface: &mut impl Surface,
    view: &Viewport,
    project: &impl Fn(f64, f64) -> Pos2,
    stroke: Stroke,
) {
    let half = view.half_extent();
    let (hx, hy) = (half.x as f64, half.y as f64);
    surface.line([project(-hx, 0.0), project(hx, 0.0)], stroke);
    surface.line([project(0.0, -hy), project(0.0, hy)], stroke);
}


/// Shaft, two-stroke head and a label just past the tip.
pub fn draw_arrow(
    surface: &mut impl Surface,
    style: &SceneStyle,
    start: Pos2,
    end: Pos2,
    color: Color32,
    label: &str,
) {
    let stroke = Stroke::new(style.vector_width, color);
    surface.line([start, end], stroke);

    let delta = end - start;
    let angle = delta.y.atan2(delta.x);
    let spread = std::f32::consts::FRAC_PI_6;
    for side in [angle - spread, angle + spread] {
        let barb = end - style.head_len * egui::vec2(side.cos(), side.sin());
        surface.line([end, barb], stroke);
    }

    surface.text(end + egui::vec2(5.0, -5.0), label, style.label_font.clone(), color);
}
