//! Draw pass and drawing surfaces.

use crate::color::Rgb;
use crate::config::{GridConfig, TextBoost};
use crate::grid::{CellGrid, Rect, SurfaceGeometry};
use crate::mask::GlyphMask;

/// A 2D target the grid is painted onto. Coordinates are physical pixels.
pub trait DrawSurface {
    /// Rebuild the backing store at `physical_*` pixels, displayed at the
    /// logical size.
    fn resize(&mut self, geometry: &SurfaceGeometry);
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64);
}

pub fn displayed_opacity(raw: f64, covered: bool, boost: &TextBoost) -> f64 {
    if covered { boost.apply(raw) } else { raw }
}

/// Clear, then fill every cell with `color` at its (possibly boosted) opacity.
pub fn draw_grid<S: DrawSurface + ?Sized>(
    surface: &mut S,
    grid: &CellGrid,
    mask: Option<&GlyphMask>,
    color: Rgb,
    config: &GridConfig,
) {
    surface.clear();
    let g = grid.geometry();
    for col in 0..g.cols {
        for row in 0..g.rows {
            let rect = grid.cell_rect(col, row, config.square_size, config.grid_gap);
            let raw = grid.opacities()[grid.index(col, row)];
            let covered = mask.is_some_and(|m| m.covers(rect));
            surface.fill_rect(rect, color, displayed_opacity(raw, covered, &config.boost));
        }
    }
}

/// Software RGBA surface (straight alpha, source-over blending).
#[derive(Clone, Debug, Default)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[o],
            self.pixels[o + 1],
            self.pixels[o + 2],
            self.pixels[o + 3],
        ])
    }
}

impl DrawSurface for PixelSurface {
    fn resize(&mut self, geometry: &SurfaceGeometry) {
        self.width = geometry.physical_width();
        self.height = geometry.physical_height();
        self.pixels = vec![0; self.width as usize * self.height as usize * 4];
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64) {
        let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        let x0 = rect.x.round().max(0.0) as u32;
        let y0 = rect.y.round().max(0.0) as u32;
        let x1 = ((rect.x + rect.w).round().max(0.0) as u32).min(self.width);
        let y1 = ((rect.y + rect.h).round().max(0.0) as u32).min(self.height);
        let src = [color.r as f64, color.g as f64, color.b as f64];
        for y in y0..y1 {
            for x in x0..x1 {
                let o = (y as usize * self.width as usize + x as usize) * 4;
                let dst_a = self.pixels[o + 3] as f64 / 255.0;
                let out_a = a + dst_a * (1.0 - a);
                if out_a <= 0.0 {
                    continue;
                }
                for c in 0..3 {
                    let d = self.pixels[o + c] as f64;
                    let v = (src[c] * a + d * dst_a * (1.0 - a)) / out_a;
                    self.pixels[o + c] = v.round().clamp(0.0, 255.0) as u8;
                }
                self.pixels[o + 3] = (out_a * 255.0).round() as u8;
            }
        }
    }
}
