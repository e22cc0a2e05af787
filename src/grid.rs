//! Grid geometry and the per-cell opacity buffer.

use rand::Rng;

use log::warn;

use crate::config::{GridConfig, MAX_DIMENSION};

/// Upper bound on device pixel ratio; keeps the backing store within canvas limits.
pub const MAX_DPR: f64 = 3.0;

/// Larger grids are not built at all.
pub const MAX_CELLS: usize = 1 << 22;

/// Axis-aligned rectangle in physical (device) pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Size of the drawing surface and the grid laid over it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceGeometry {
    /// Logical (CSS) pixels.
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
    pub cols: usize,
    pub rows: usize,
}

impl SurfaceGeometry {
    /// Explicit overrides in `config` win over the measured container size.
    pub fn measure(config: &GridConfig, measured_w: f64, measured_h: f64, dpr: f64) -> Self {
        let width = sanitize(config.width.unwrap_or(measured_w));
        let height = sanitize(config.height.unwrap_or(measured_h));
        let dpr = if dpr.is_finite() && dpr > 0.0 {
            dpr.min(MAX_DPR)
        } else {
            1.0
        };
        let pitch = config.pitch();
        let (mut cols, mut rows) = if pitch > 0.0 && pitch.is_finite() {
            (
                (width / pitch).ceil() as usize,
                (height / pitch).ceil() as usize,
            )
        } else {
            (0, 0)
        };
        if cols.checked_mul(rows).is_none_or(|n| n > MAX_CELLS) {
            warn!("flicker grid of {cols}x{rows} cells exceeds {MAX_CELLS}; not drawing");
            (cols, rows) = (0, 0);
        }
        Self {
            width,
            height,
            dpr,
            cols,
            rows,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols.saturating_mul(self.rows)
    }

    pub fn physical_width(&self) -> u32 {
        (self.width * self.dpr).round() as u32
    }

    pub fn physical_height(&self) -> u32 {
        (self.height * self.dpr).round() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.physical_width() == 0 || self.physical_height() == 0
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, MAX_DIMENSION) } else { 0.0 }
}

/// Opacity per cell, column-major (`col * rows + row`).
#[derive(Clone, Debug)]
pub struct CellGrid {
    geometry: SurfaceGeometry,
    opacities: Vec<f64>,
}

impl CellGrid {
    pub fn new<R: Rng>(geometry: SurfaceGeometry, max_opacity: f64, rng: &mut R) -> Self {
        let opacities = (0..geometry.cell_count())
            .map(|_| sample(max_opacity, rng))
            .collect();
        Self {
            geometry,
            opacities,
        }
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn opacities(&self) -> &[f64] {
        &self.opacities
    }

    pub fn index(&self, col: usize, row: usize) -> usize {
        col * self.geometry.rows + row
    }

    pub fn opacity(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.geometry.cols || row >= self.geometry.rows {
            return None;
        }
        self.opacities.get(self.index(col, row)).copied()
    }

    /// Resample each cell with probability `chance * dt`. Returns how many
    /// cells were resampled.
    pub fn flicker<R: Rng>(
        &mut self,
        dt: f64,
        chance: f64,
        max_opacity: f64,
        rng: &mut R,
    ) -> usize {
        if !(dt > 0.0) || !(chance > 0.0) {
            return 0;
        }
        let p = (chance * dt).min(1.0);
        let mut resampled = 0;
        for o in self.opacities.iter_mut() {
            if rng.r#gen::<f64>() < p {
                *o = sample(max_opacity, rng);
                resampled += 1;
            }
        }
        resampled
    }

    /// Physical-pixel rectangle of cell `(col, row)`.
    pub fn cell_rect(&self, col: usize, row: usize, square_size: f64, grid_gap: f64) -> Rect {
        let pitch = (square_size + grid_gap) * self.geometry.dpr;
        let side = square_size * self.geometry.dpr;
        Rect {
            x: col as f64 * pitch,
            y: row as f64 * pitch,
            w: side,
            h: side,
        }
    }
}

fn sample<R: Rng>(max_opacity: f64, rng: &mut R) -> f64 {
    rng.r#gen::<f64>() * max_opacity
}
