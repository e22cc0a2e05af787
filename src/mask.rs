//! Watermark mask: which physical pixels lie under the rendered text.

use crate::config::FontSpec;
use crate::grid::{Rect, SurfaceGeometry};

/// One coverage byte per physical pixel, row-major. Never displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl GlyphMask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    /// Build from an RGBA buffer (as returned by `getImageData`). The text is
    /// drawn in white, so the red channel is enough.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        let n = width as usize * height as usize;
        if rgba.len() < n * 4 {
            return None;
        }
        let coverage = rgba.chunks_exact(4).take(n).map(|px| px[0]).collect();
        Some(Self {
            width,
            height,
            coverage,
        })
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut coverage = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                coverage.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            coverage,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    /// Whether any pixel of `rect` (clipped to the mask) is non-zero. Origin
    /// and extent are truncated the way `getImageData` truncates its region.
    pub fn covers(&self, rect: Rect) -> bool {
        let (x, y) = (rect.x.floor(), rect.y.floor());
        let x0 = x.max(0.0);
        let y0 = y.max(0.0);
        let x1 = (x + rect.w.floor()).min(self.width as f64);
        let y1 = (y + rect.h.floor()).min(self.height as f64);
        if !(x1 > x0 && y1 > y0) {
            return false;
        }
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);
        let stride = self.width as usize;
        (y0..y1).any(|y| self.coverage[y * stride + x0..y * stride + x1].iter().any(|&c| c > 0))
    }
}

/// Renders watermark text into a [`GlyphMask`] matching the surface geometry,
/// centred both ways.
pub trait MaskRasterizer {
    fn rasterize(&mut self, text: &str, font: FontSpec, geometry: &SurfaceGeometry)
    -> Option<GlyphMask>;
}

/// Rasterizer for hosts without text rendering; the watermark is skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMask;

impl MaskRasterizer for NoMask {
    fn rasterize(&mut self, _: &str, _: FontSpec, _: &SurfaceGeometry) -> Option<GlyphMask> {
        None
    }
}
