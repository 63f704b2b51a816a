//! Quad geometry and pixel/NDC conversion.
//!
//! The sandbox draws a single rectangle. It is described in window pixels
//! (origin top-left, y down) and converted to normalized device coordinates
//! (origin centre, y up) before upload.

use cgmath::Vector2;

/// A single vertex: position only, matching attribute location 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
}

/// Converts a window-pixel coordinate to NDC for a given resolution.
///
/// `(0, 0)` maps to `(-1, 1)` and `resolution` maps to `(1, -1)`.
pub fn pixel_to_ndc(pixel: Vector2<f32>, resolution: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(
        -1.0 + pixel.x / resolution.x * 2.0,
        1.0 - pixel.y / resolution.y * 2.0,
    )
}

/// Inverse of [`pixel_to_ndc`].
pub fn ndc_to_pixel(ndc: Vector2<f32>, resolution: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(
        (ndc.x + 1.0) * 0.5 * resolution.x,
        (1.0 - ndc.y) * 0.5 * resolution.y,
    )
}

/// CPU-side geometry of a rectangle: 4 corners, 2 triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadMesh {
    /// Top left, top right, bottom right, bottom left.
    pub vertices: [QuadVertex; 4],
}

impl QuadMesh {
    /// Two counter-clockwise triangles sharing the top-right/bottom-left edge.
    pub const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

    /// Builds the rectangle spanning `origin..origin + size` in window pixels.
    pub fn from_pixels(origin: Vector2<f32>, size: Vector2<f32>, resolution: Vector2<f32>) -> Self {
        let top_left = pixel_to_ndc(origin, resolution);
        let bottom_right = pixel_to_ndc(origin + size, resolution);
        let vertex = |x: f32, y: f32| QuadVertex {
            position: [x, y, 0.0],
        };
        Self {
            vertices: [
                vertex(top_left.x, top_left.y),
                vertex(bottom_right.x, top_left.y),
                vertex(bottom_right.x, bottom_right.y),
                vertex(top_left.x, bottom_right.y),
            ],
        }
    }

    /// A rectangle covering the whole surface.
    pub fn fullscreen(resolution: Vector2<f32>) -> Self {
        Self::from_pixels(Vector2::new(0.0, 0.0), resolution, resolution)
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &'static [u8] {
        bytemuck::cast_slice(&Self::INDICES)
    }
}
