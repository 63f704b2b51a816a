//! shader-ngin
//!
//! A small OpenGL sandbox for experimenting with shaders. It opens a window,
//! builds a vertex + geometry + fragment shader program from files on disk and
//! draws a textured quad with it, feeding the shaders the time, a frame
//! counter, the mouse position and the resolution. Simulation runs on a fixed
//! 60 Hz clock; rendering happens once per frame.
//!
//! High-level modules
//! - `context`: the desktop window, GL context and event collection
//! - `data_structures`: quad geometry, texture registrations, frame uniforms
//! - `engine`: the engine, the fixed-timestep loop and the platform seam
//! - `gpu`: the slice of OpenGL the engine uses, and its `glow` implementation
//! - `logging`: logger initialisation
//! - `resources`: loading files from the data directory and uploading them
//! - `scene`: the scene hooks and the default shader scene
//! - `settings`: engine configuration
//! - `shader`: shader compilation, linking and diagnostics
//! - `timestep`: tick accounting for the loop
//!
//! ```no_run
//! use shader_ngin::{Engine, ShaderScene, gpu::GlowGpu, settings::DEFAULT_DATA_DIR};
//!
//! let mut engine = Engine::new(1080, 720);
//! engine.attach_scene(ShaderScene::<GlowGpu>::new(DEFAULT_DATA_DIR));
//! engine.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod context;
pub mod data_structures;
pub mod engine;
pub mod gpu;
pub mod logging;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod shader;
pub mod timestep;

pub use engine::{Engine, Platform};
pub use scene::{Scene, ShaderScene};
pub use shader::Diagnostic;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::Vector2;
pub use winit::dpi::PhysicalSize;
pub use winit::event::WindowEvent;
