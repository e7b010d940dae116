use crate::color::Rgba;
use crate::geometry::Point;
use crate::renderer::Renderer;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Dots per terminal cell, horizontally and vertically
pub const DOTS_X: usize = 2;
pub const DOTS_Y: usize = 4;

/// A single rendered Braille cell with position and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Dot-addressable drawing surface backed by Braille characters.
///
/// Every dot remembers the most opaque color drawn onto it during the
/// current frame; the surface is cleared at the start of each frame.
#[derive(Debug, Clone)]
pub struct BrailleSurface {
    canvas_width: u16,
    canvas_height: u16,
    dots: Vec<Option<Rgba>>,
    background: Rgba,
}

impl BrailleSurface {
    pub fn new(canvas_width: u16, canvas_height: u16) -> Self {
        let mut surface = Self {
            canvas_width: 0,
            canvas_height: 0,
            dots: Vec::new(),
            background: Rgba::BLACK,
        };
        surface.resize(canvas_width, canvas_height);
        surface
    }

    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.dots = vec![None; self.dot_width() * self.dot_height()];
    }

    pub fn dot_width(&self) -> usize {
        self.canvas_width as usize * DOTS_X
    }

    pub fn dot_height(&self) -> usize {
        self.canvas_height as usize * DOTS_Y
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Color at a dot, if anything was drawn there this frame
    pub fn dot(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.dot_width() && y < self.dot_height() {
            self.dots[y * self.dot_width() + x]
        } else {
            None
        }
    }

    fn plot(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || color.a <= 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let width = self.dot_width();
        if x >= width || y >= self.dot_height() {
            return;
        }
        let slot = &mut self.dots[y * width + x];
        match slot {
            Some(existing) if existing.a >= color.a => {}
            _ => *slot = Some(color),
        }
    }

    /// Pack the dot buffer into Braille characters, skipping empty cells
    pub fn cells(&self) -> Vec<BrailleCell> {
        let mut cells = Vec::new();

        for cy in 0..self.canvas_height {
            for cx in 0..self.canvas_width {
                let mut pattern: u8 = 0;
                let mut strongest: Option<Rgba> = None;

                let base_x = cx as usize * DOTS_X;
                let base_y = cy as usize * DOTS_Y;

                for dx in 0..DOTS_X {
                    for dy in 0..DOTS_Y {
                        if let Some(color) = self.dot(base_x + dx, base_y + dy) {
                            pattern |= BRAILLE_DOTS[dx][dy];
                            if strongest.map_or(true, |s| color.a > s.a) {
                                strongest = Some(color);
                            }
                        }
                    }
                }

                if let Some(color) = strongest {
                    let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                    cells.push(BrailleCell {
                        x: cx,
                        y: cy,
                        char: braille_char,
                        color: color.blend_over(self.background),
                    });
                }
            }
        }

        cells
    }
}

impl Renderer for BrailleSurface {
    fn clear_region(&mut self, width: f64, height: f64) {
        let w = (width.max(0.0).ceil() as usize).min(self.dot_width());
        let h = (height.max(0.0).ceil() as usize).min(self.dot_height());
        let stride = self.dot_width();
        if stride == 0 {
            return;
        }
        for row in self.dots.chunks_mut(stride).take(h) {
            row[..w].fill(None);
        }
    }

    fn fill_region(&mut self, color: Rgba, width: f64, height: f64) {
        // Terminal cells carry a single background, so a fill sets it
        // for the whole surface and wipes the covered dots
        self.background = color;
        self.clear_region(width, height);
    }

    fn draw_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        let cx = center.x.floor() as i64;
        let cy = center.y.floor() as i64;
        self.plot(cx, cy, color);

        let r = radius.max(0.0);
        let (x0, x1) = ((center.x - r).floor() as i64, (center.x + r).floor() as i64);
        let (y0, y1) = ((center.y - r).floor() as i64, (center.y + r).floor() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= r * r {
                    self.plot(x, y, color);
                }
            }
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgba) {
        // Bresenham
        let (mut x, mut y) = (from.x.floor() as i64, from.y.floor() as i64);
        let (x1, y1) = (to.x.floor() as i64, to.y.floor() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Plane size, in dots, for a canvas of the given terminal size
pub fn calculate_plane_size(canvas_width: u16, canvas_height: u16) -> (f64, f64) {
    (
        (canvas_width as usize * DOTS_X) as f64,
        (canvas_height as usize * DOTS_Y) as f64,
    )
}

/// Centre of a terminal cell, in dots, relative to the canvas origin
pub fn cell_center(col: u16, row: u16) -> Point {
    Point::new(
        col as f64 * DOTS_X as f64 + DOTS_X as f64 / 2.0,
        row as f64 * DOTS_Y as f64 + DOTS_Y as f64 / 2.0,
    )
}
