use crate::color::Rgba;
use crate::geometry::Point;

/// Drawing surface the network paints onto each tick.
pub trait Renderer {
    fn clear_region(&mut self, width: f64, height: f64);
    fn fill_region(&mut self, color: Rgba, width: f64, height: f64);
    fn draw_circle(&mut self, center: Point, radius: f64, color: Rgba);
    fn draw_line(&mut self, from: Point, to: Point, color: Rgba);
}
