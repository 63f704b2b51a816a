//! Engine configuration.
//!
//! [`Settings`] is plain data with defaults matching the sandbox: a 1080×720
//! window, a 60 Hz simulation and a GL 3.3 core context with depth, stencil
//! and 4× MSAA. There are no flags or environment variables; change a value
//! with one of the `with_*` methods before handing it to the engine.

use std::path::PathBuf;

use cgmath::Vector2;

use crate::{logging::LoggingConfig, timestep::DEFAULT_TICK_RATE};

/// Directory the default scene loads shaders and textures from, relative to
/// the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Requirements for the OpenGL context and its default framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlRequirements {
    pub depth_bits: u8,
    pub stencil_bits: u8,
    /// Upper bound for MSAA samples; the best available config up to this is used.
    pub samples: u8,
    pub version: (u8, u8),
    pub vsync: bool,
}

impl Default for GlRequirements {
    fn default() -> Self {
        Self {
            depth_bits: 24,
            stencil_bits: 8,
            samples: 4,
            version: (3, 3),
            vsync: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    /// Window title; replaced by the scene name when a scene is attached.
    pub title: String,
    pub clear_colour: [f32; 4],
    pub tick_rate: u32,
    pub data_dir: PathBuf,
    pub gl: GlRequirements,
    /// Stop after this many presented frames. `None` runs until the window closes.
    pub frame_limit: Option<u64>,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 720,
            title: "OpenGL".to_string(),
            clear_colour: [0.2, 0.3, 0.3, 1.0],
            tick_rate: DEFAULT_TICK_RATE,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            gl: GlRequirements::default(),
            frame_limit: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_clear_colour(mut self, colour: [f32; 4]) -> Self {
        self.clear_colour = colour;
        self
    }

    /// Sets the number of fixed updates per simulated second.
    ///
    /// # Panics
    ///
    /// Panics if `rate == 0`.
    pub fn with_tick_rate(mut self, rate: u32) -> Self {
        assert!(rate > 0, "tick rate must be positive, got {}", rate);
        self.tick_rate = rate;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_gl(mut self, gl: GlRequirements) -> Self {
        self.gl = gl;
        self
    }

    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Window size in pixels as floats, the form scenes and uniforms use.
    pub fn resolution(&self) -> Vector2<f32> {
        Vector2::new(self.width as f32, self.height as f32)
    }
}
