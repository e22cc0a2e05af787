//! Flickering grid backdrop: a field of faint squares whose opacities
//! re-randomize over time, optionally brightened under a text watermark.
//!
//! The engine ([`engine::FlickerEngine`]) is host-agnostic; [`web`] binds it to
//! a browser canvas and [`components`] wraps that as a yew component.

pub mod color;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod grid;
pub mod host;
pub mod mask;
pub mod render;
pub mod util;
pub mod web;

pub use color::{BuiltinColors, ColorResolver, Rgb};
pub use config::{FontSpec, GridConfig, TextBoost};
pub use engine::{FlickerEngine, GridInstance};
pub use error::{ColorError, ConfigError};
pub use frame::{FrameHandle, FrameScheduler, FrameState};
pub use grid::{CellGrid, Rect, SurfaceGeometry};
pub use host::{Mount, Observation, ObserverHost, Size};
pub use mask::{GlyphMask, MaskRasterizer, NoMask};
pub use render::{DrawSurface, PixelSurface, draw_grid};
