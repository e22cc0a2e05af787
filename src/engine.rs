//! The flicker grid engine: sizing, visibility gating and the per-frame
//! update/draw pass. Host specifics (surface, text rendering, frame timing)
//! come in through traits so the whole loop runs without a browser.

use log::debug;
use rand::Rng;

use crate::color::{ColorResolver, Rgb, resolve_or_fallback};
use crate::config::GridConfig;
use crate::frame::{FrameScheduler, FrameState};
use crate::grid::{CellGrid, SurfaceGeometry};
use crate::mask::{GlyphMask, MaskRasterizer};
use crate::render::{DrawSurface, draw_grid};

/// Entry points a host drives from its observers.
pub trait GridInstance {
    fn resize(&mut self, measured_w: f64, measured_h: f64, dpr: f64);
    fn set_visible(&mut self, visible: bool);
    fn teardown(&mut self);
}

pub struct FlickerEngine<S, M, F, R> {
    config: GridConfig,
    color: Rgb,
    grid: Option<CellGrid>,
    mask: Option<GlyphMask>,
    frame: FrameState,
    visible: bool,
    frames_drawn: u64,
    surface: S,
    rasterizer: M,
    scheduler: F,
    rng: R,
}

impl<S, M, F, R> FlickerEngine<S, M, F, R>
where
    S: DrawSurface,
    M: MaskRasterizer,
    F: FrameScheduler,
    R: Rng,
{
    pub fn new(
        config: GridConfig,
        resolver: &dyn ColorResolver,
        surface: S,
        rasterizer: M,
        scheduler: F,
        rng: R,
    ) -> Self {
        let color = resolve_or_fallback(resolver, &config.color);
        Self {
            config,
            color,
            grid: None,
            mask: None,
            frame: FrameState::default(),
            visible: false,
            frames_drawn: 0,
            surface,
            rasterizer,
            scheduler,
            rng,
        }
    }

    /// Recompute geometry from the container size. Resets every cell and the
    /// watermark mask.
    pub fn resize(&mut self, measured_w: f64, measured_h: f64, dpr: f64) {
        if self.frame.torn_down {
            return;
        }
        let geometry = SurfaceGeometry::measure(&self.config, measured_w, measured_h, dpr);
        self.surface.resize(&geometry);
        self.grid = Some(CellGrid::new(geometry, self.config.max_opacity, &mut self.rng));
        self.mask = if self.config.has_watermark() && !geometry.is_empty() {
            self.rasterizer
                .rasterize(&self.config.text, self.config.font(), &geometry)
        } else {
            None
        };
        debug!(
            "flicker grid resized to {}x{} @{} ({}x{} cells, mask: {})",
            geometry.width,
            geometry.height,
            geometry.dpr,
            geometry.cols,
            geometry.rows,
            self.mask.is_some()
        );
        if self.visible {
            self.frame.start(&mut self.scheduler);
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.frame.torn_down {
            return;
        }
        self.visible = visible;
        if visible {
            if self.grid.is_some() {
                self.frame.start(&mut self.scheduler);
            }
        } else {
            self.frame.stop(&mut self.scheduler);
        }
    }

    /// One scheduled frame: flicker, draw, request the next. Returns whether
    /// anything was drawn. At most one frame stays pending afterwards; a
    /// callback arriving while another is queued replaces it.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> bool {
        if self.frame.torn_down {
            return false;
        }
        if !self.frame.is_running || !self.visible {
            return false;
        }
        let Some(grid) = self.grid.as_mut() else {
            return false;
        };
        let dt = self.frame.advance(timestamp_ms);
        grid.flicker(
            dt,
            self.config.flicker_chance,
            self.config.max_opacity,
            &mut self.rng,
        );
        draw_grid(
            &mut self.surface,
            grid,
            self.mask.as_ref(),
            self.color,
            &self.config,
        );
        self.frames_drawn += 1;
        self.frame.schedule_next(&mut self.scheduler);
        true
    }

    /// Cancel pending frames; every later call becomes a no-op.
    pub fn teardown(&mut self) {
        if self.frame.torn_down {
            return;
        }
        self.frame.teardown(&mut self.scheduler);
        self.visible = false;
        debug!("flicker grid torn down after {} frames", self.frames_drawn);
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn geometry(&self) -> Option<&SurfaceGeometry> {
        self.grid.as_ref().map(CellGrid::geometry)
    }

    pub fn grid(&self) -> Option<&CellGrid> {
        self.grid.as_ref()
    }

    pub fn mask(&self) -> Option<&GlyphMask> {
        self.mask.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_running
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_torn_down(&self) -> bool {
        self.frame.torn_down
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

impl<S, M, F, R> GridInstance for FlickerEngine<S, M, F, R>
where
    S: DrawSurface,
    M: MaskRasterizer,
    F: FrameScheduler,
    R: Rng,
{
    fn resize(&mut self, measured_w: f64, measured_h: f64, dpr: f64) {
        FlickerEngine::resize(self, measured_w, measured_h, dpr);
    }

    fn set_visible(&mut self, visible: bool) {
        FlickerEngine::set_visible(self, visible);
    }

    fn teardown(&mut self) {
        FlickerEngine::teardown(self);
    }
}
