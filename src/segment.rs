//! The shared output unit for every bolt generator.

use serde::{Deserialize, Serialize};

/// One line of a lightning bolt. Generators append these to a caller-owned
/// vector; the host's rasterizer strokes them afterwards. Coordinates are
/// raster-space for the 2D generators and world-space for the 3D tree
/// search, which is the only producer of non-zero `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub z1: f32,
    pub x2: f32,
    pub y2: f32,
    pub z2: f32,
    /// True for side channels, false for the main trunk.
    pub is_branch: bool,
    /// Relative brightness in [0, 1].
    pub intensity: f32,
    /// Recursion depth or step number, depending on the generator.
    pub depth: u32,
}

impl Segment {
    /// Flat segment in the raster plane (`z = 0`).
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, is_branch: bool, intensity: f32, depth: u32) -> Self {
        Self {
            x1,
            y1,
            z1: 0.0,
            x2,
            y2,
            z2: 0.0,
            is_branch,
            intensity,
            depth,
        }
    }

    pub fn new_3d(
        x1: f32,
        y1: f32,
        z1: f32,
        x2: f32,
        y2: f32,
        z2: f32,
        is_branch: bool,
        intensity: f32,
        depth: u32,
    ) -> Self {
        Self {
            x1,
            y1,
            z1,
            x2,
            y2,
            z2,
            is_branch,
            intensity,
            depth,
        }
    }

    pub fn length(&self) -> f32 {
        let dx = self.x2 - self.x1;
        let dy = self.y2 - self.y1;
        let dz = self.z2 - self.z1;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Axis-aligned raster bounds shared by the 2D generators.
/// Valid coordinates lie in `[0, width) x [0, height)`; clamping targets
/// `width - 1` / `height - 1` so clamped points stay strokeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x < self.width as f32 && y >= 0.0 && y < self.height as f32
    }

    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(0.0, self.width as f32 - 1.0)
    }

    pub fn clamp_y(&self, y: f32) -> f32 {
        y.clamp(0.0, self.height as f32 - 1.0)
    }
}
