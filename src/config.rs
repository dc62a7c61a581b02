//! Start-up configuration, read from an optional RON file.

use std::{path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::animation::{Easing, OverlapPolicy, TransitionOptions};
use crate::render::SceneStyle;


#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub pixels_per_unit: f32,
    pub transition_duration_ms: u64,
    pub show_unit_square: bool,
    pub easing: Easing,
    pub overlap_policy: OverlapPolicy,
    pub grid_alpha: u8,
}

/// Smallest grid spacing the renderer is allowed to draw.
pub const MIN_PIXELS_PER_UNIT: f32 = 2.0;


impl Default for VizConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 300.0,
            pixels_per_unit: 30.0,
            transition_duration_ms: 500,
            show_unit_square: true,
            easing: Easing::Linear,
            overlap_policy: OverlapPolicy::Supersede,
            grid_alpha: 255,
        }
    }
}

impl VizConfig {
    /// Reads the config at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not open {}", path.display()))?;

        let config: Self = ron::from_str(&text)
            .map_err(anyhow::Error::from)
            .with_context(|| format!("Invalid syntax in {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.pixels_per_unit.is_finite() && self.pixels_per_unit >= MIN_PIXELS_PER_UNIT,
            "pixels_per_unit must be at least {MIN_PIXELS_PER_UNIT}, got {}",
            self.pixels_per_unit
        );
        for (name, size) in [("canvas_width", self.canvas_width), ("canvas_height", self.canvas_height)] {
            ensure!(size.is_finite() && size > 0.0, "{name} must be positive, got {size}");
        }
        Ok(())
    }

    pub fn transition_options(&self) -> TransitionOptions {
        TransitionOptions {
            duration: Duration::from_millis(self.transition_duration_ms),
            show_unit_square: self.show_unit_square,
            easing: self.easing,
        }
    }

    pub fn scene_style(&self) -> SceneStyle {
        SceneStyle {
            pixels_per_unit: self.pixels_per_unit,
            ..SceneStyle::default()
        }
        .with_grid_alpha(self.grid_alpha)
    }
}
