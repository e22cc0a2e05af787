use std::cell::RefCell;
use std::rc::Rc;

use flicker_grid::{
    BuiltinColors, DrawSurface, FlickerEngine, FontSpec, FrameHandle, FrameScheduler, GlyphMask,
    GridConfig, MaskRasterizer, PixelSurface, Rect, Rgb, SurfaceGeometry,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Stands in for real text rendering: a solid block centred on the surface,
/// roughly where "Nyxie" would land.
struct BlockText {
    calls: Rc<RefCell<Vec<String>>>,
}

impl MaskRasterizer for BlockText {
    fn rasterize(&mut self, text: &str, font: FontSpec, g: &SurfaceGeometry) -> Option<GlyphMask> {
        self.calls.borrow_mut().push(format!("{text} {}", font.css()));
        let (w, h) = (g.physical_width(), g.physical_height());
        let (cx, cy) = (w / 2, h / 2);
        Some(GlyphMask::from_fn(w, h, |x, y| {
            u8::from(x + 60 >= cx && x < cx + 60 && y + 20 >= cy && y < cy + 20) * 255
        }))
    }
}

#[derive(Clone, Default)]
struct Frames(Rc<RefCell<Option<FrameHandle>>>);

impl FrameScheduler for Frames {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        *self.0.borrow_mut() = Some(FrameHandle(1));
        Some(FrameHandle(1))
    }
    fn cancel_frame(&mut self, _: FrameHandle) {
        *self.0.borrow_mut() = None;
    }
}

impl Frames {
    fn fire(&self) -> bool {
        self.0.borrow_mut().take().is_some()
    }
}

fn alpha_at(surface: &PixelSurface, rect: Rect) -> u8 {
    surface
        .pixel(rect.x as u32 + 1, rect.y as u32 + 1)
        .map(|px| px[3])
        .unwrap_or(0)
}

#[test]
fn watermark_brightens_cells_under_text() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let frames = Frames::default();
    let config = GridConfig {
        text: "Nyxie".into(),
        color: "#ffffff".into(),
        width: Some(300.0),
        height: Some(150.0),
        ..GridConfig::default()
    };
    let mut engine = FlickerEngine::new(
        config.clone(),
        &BuiltinColors,
        PixelSurface::new(),
        BlockText {
            calls: calls.clone(),
        },
        frames.clone(),
        StdRng::seed_from_u64(2024),
    );
    engine.resize(800.0, 800.0, 1.0);
    engine.set_visible(true);
    assert!(frames.fire());
    assert!(engine.on_frame(0.0));

    let grid = engine.grid().unwrap();
    let g = *grid.geometry();
    assert_eq!((g.cols, g.rows, grid.opacities().len()), (50, 25, 1250));
    assert_eq!(engine.color(), Rgb::new(255, 255, 255));
    assert_eq!(calls.borrow().len(), 1);
    assert!(calls.borrow()[0].starts_with("Nyxie 600 140px"));

    let mask = engine.mask().unwrap();
    let surface = engine.surface();
    let (mut covered, mut uncovered) = (0, 0);
    for col in 0..g.cols {
        for row in 0..g.rows {
            let rect = grid.cell_rect(col, row, config.square_size, config.grid_gap);
            let raw = grid.opacity(col, row).unwrap();
            let shown = if mask.covers(rect) {
                covered += 1;
                let boosted = (raw * 3.0 + 0.4).min(1.0);
                assert!(boosted > raw);
                boosted
            } else {
                uncovered += 1;
                raw
            };
            let expected = (shown * 255.0).round() as u8;
            assert_eq!(alpha_at(surface, rect), expected, "cell {col},{row}");
        }
    }
    assert!(covered > 0 && uncovered > covered);
}

#[test]
fn resize_rebuilds_surface_and_mask() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut engine = FlickerEngine::new(
        GridConfig {
            text: "Nyxie".into(),
            ..GridConfig::default()
        },
        &BuiltinColors,
        PixelSurface::new(),
        BlockText {
            calls: calls.clone(),
        },
        Frames::default(),
        StdRng::seed_from_u64(1),
    );
    engine.resize(300.0, 150.0, 2.0);
    assert_eq!((engine.surface().width(), engine.surface().height()), (600, 300));
    assert_eq!(engine.mask().unwrap().width(), 600);
    engine.resize(120.0, 60.0, 1.0);
    assert_eq!(engine.geometry().unwrap().cols, 20);
    assert_eq!(engine.mask().unwrap().width(), 120);
    assert_eq!(calls.borrow().len(), 2);
    // an empty surface never asks for a mask
    engine.resize(0.0, 0.0, 1.0);
    assert!(engine.mask().is_none());
    assert_eq!(calls.borrow().len(), 2);
}

#[derive(Default, Clone)]
struct CountingSurface(Rc<RefCell<usize>>);

impl DrawSurface for CountingSurface {
    fn resize(&mut self, _: &SurfaceGeometry) {}
    fn clear(&mut self) {
        *self.0.borrow_mut() += 1;
    }
    fn fill_rect(&mut self, _: Rect, _: Rgb, _: f64) {}
}

#[test]
fn no_draws_after_teardown_even_if_a_timer_fires() {
    let draws = CountingSurface::default();
    let frames = Frames::default();
    let mut engine = FlickerEngine::new(
        GridConfig::default(),
        &BuiltinColors,
        draws.clone(),
        flicker_grid::NoMask,
        frames.clone(),
        StdRng::seed_from_u64(3),
    );
    engine.resize(90.0, 90.0, 1.0);
    engine.set_visible(true);
    for n in 0..3 {
        assert!(frames.fire());
        assert!(engine.on_frame(n as f64 * 16.7));
    }
    engine.teardown();
    assert!(!frames.fire());
    // a stale callback from the host still arrives
    assert!(!engine.on_frame(100.0));
    engine.set_visible(true);
    assert!(!frames.fire());
    assert_eq!(*draws.0.borrow(), 3);
}
