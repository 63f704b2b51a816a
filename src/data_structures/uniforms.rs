//! Per-frame shader inputs.

use cgmath::Vector2;
use instant::Duration;

pub const U_RESOLUTION: &str = "u_resolution";
pub const U_MOUSE: &str = "u_mouse";
pub const U_TIME: &str = "u_time";
pub const U_FRAME: &str = "u_frame";

/// Values uploaded as uniforms on every draw.
///
/// `time` and `frame` only change in fixed updates and `cursor` only when
/// events are handled; rendering reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Simulated seconds since the scene started.
    pub time: f32,
    /// Number of fixed updates so far.
    pub frame: i32,
    pub resolution: Vector2<f32>,
    /// Last cursor position seen in a window event, in window pixels.
    pub cursor: Vector2<f32>,
}

impl FrameUniforms {
    pub fn new(resolution: Vector2<f32>) -> Self {
        Self {
            time: 0.0,
            frame: 0,
            resolution,
            cursor: Vector2::new(0.0, 0.0),
        }
    }

    /// One fixed update: time moves by `dt`, the frame counter by one.
    pub fn advance(&mut self, dt: Duration) {
        self.time += dt.as_secs_f32();
        self.frame = self.frame.wrapping_add(1);
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(Vector2::new(0.0, 0.0))
    }
}

/// Read-only view of the render surface handed to scenes each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    /// Current drawable size in pixels.
    pub resolution: Vector2<f32>,
    /// Cursor position in window pixels, origin top-left.
    pub cursor: Vector2<f32>,
}

impl SurfaceState {
    pub fn new(resolution: Vector2<f32>, cursor: Vector2<f32>) -> Self {
        Self { resolution, cursor }
    }
}
