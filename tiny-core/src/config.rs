//! Surface construction options.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TinyError};

/// Options recognised when creating a [`Surface`](crate::surface::Surface).
///
/// Missing fields take the defaults: 640 × 480, scale 1, empty title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Logical width of the drawable area in pixels.
    pub width: u32,
    /// Logical height of the drawable area in pixels.
    pub height: u32,
    /// Integer upscale applied to both dimensions. 0 is treated as 1.
    pub scale: u32,
    /// Window caption.
    pub title: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            scale: 1,
            title: String::new(),
        }
    }
}

impl SurfaceConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Coerce out-of-range values. Only the scale is corrected; width and
    /// height are the caller's responsibility.
    pub fn normalized(mut self) -> Self {
        if self.scale == 0 {
            self.scale = 1;
        }
        self
    }

    /// Client-area size in physical pixels, before decoration adjustment.
    ///
    /// Width and height are not range-checked, but their scaled product
    /// must fit native window coordinates (`i32`).
    pub fn physical_size(&self) -> Result<(i32, i32)> {
        let scale = self.scale.max(1);
        let too_large = || TinyError::SurfaceTooLarge {
            width: self.width,
            height: self.height,
            scale,
        };
        let extent = |logical: u32| {
            logical
                .checked_mul(scale)
                .and_then(|physical| i32::try_from(physical).ok())
                .ok_or_else(too_large)
        };
        Ok((extent(self.width)?, extent(self.height)?))
    }
}

// ── Tests ────────────────────────────────────────────────────────
