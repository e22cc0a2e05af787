//! Configuration for a flicker grid instance.
//!
//! A `GridConfig` is fixed for the lifetime of one instance. Changing any field
//! means building a new instance, never mutating a running one.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest logical width or height a grid is laid out over.
pub const MAX_DIMENSION: f64 = 8192.0;

const FONT_FAMILY: &str = r#""Geist", -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif"#;

/// Brightness lift for cells under watermark glyphs: `min(1, o*gain + offset)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBoost {
    pub gain: f64,
    pub offset: f64,
}

impl Default for TextBoost {
    fn default() -> Self {
        Self {
            gain: 3.0,
            offset: 0.4,
        }
    }
}

impl TextBoost {
    pub fn apply(&self, opacity: f64) -> f64 {
        (opacity * self.gain + self.offset).min(1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub weight: u16,
}

impl FontSpec {
    /// CSS `font` shorthand, e.g. `600 140px "Geist", ...`.
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size, FONT_FAMILY)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub square_size: f64,
    pub grid_gap: f64,
    /// Probability per second that a cell picks a new opacity.
    pub flicker_chance: f64,
    pub color: String,
    pub max_opacity: f64,
    /// Watermark text; empty disables the mask.
    pub text: String,
    pub font_size: f64,
    pub font_weight: u16,
    /// Explicit logical size; `None` means "measure the container".
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub boost: TextBoost,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            square_size: 3.0,
            grid_gap: 3.0,
            flicker_chance: 0.2,
            color: "rgb(209, 213, 219)".to_string(),
            max_opacity: 0.15,
            text: String::new(),
            font_size: 140.0,
            font_weight: 600,
            width: None,
            height: None,
            boost: TextBoost::default(),
        }
    }
}

impl GridConfig {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: GridConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Distance between the origins of two neighbouring cells.
    pub fn pitch(&self) -> f64 {
        self.square_size + self.grid_gap
    }

    pub fn has_watermark(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn font(&self) -> FontSpec {
        FontSpec {
            size: self.font_size,
            weight: self.font_weight,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("square_size", self.square_size)?;
        non_negative("grid_gap", self.grid_gap)?;
        unit("flicker_chance", self.flicker_chance)?;
        unit("max_opacity", self.max_opacity)?;
        positive("font_size", self.font_size)?;
        if let Some(w) = self.width {
            dimension("width", w)?;
        }
        if let Some(h) = self.height {
            dimension("height", h)?;
        }
        non_negative("boost.gain", self.boost.gain)?;
        if !self.boost.offset.is_finite() {
            return Err(out_of_range("boost.offset", self.boost.offset, "must be finite"));
        }
        Ok(())
    }
}

fn out_of_range(field: &'static str, value: f64, reason: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        value,
        reason,
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value, "must be a positive number"))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value, "must be zero or more"))
    }
}

fn dimension(field: &'static str, value: f64) -> Result<(), ConfigError> {
    non_negative(field, value)?;
    if value > MAX_DIMENSION {
        return Err(out_of_range(field, value, "exceeds the maximum grid dimension"));
    }
    Ok(())
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(field, value, "must lie in [0, 1]"))
    }
}
