//! Scenes: the hooks the engine drives and the default shader sandbox.
//!
//! A scene owns every GPU object it creates. The engine only hands it a
//! [`Gpu`] and a read-only [`SurfaceState`] and calls the hooks in a fixed
//! order.
//!
//! # User-facing types
//!
//! - [`Scene<G>`] is the trait for anything the engine can run
//! - [`ShaderScene<G>`] draws one textured quad through the vertex, geometry
//!   and fragment shaders found in the data directory
//!
//! # Lifecycle
//!
//! 1. `attach()` once, when the engine takes the scene
//! 2. `init()` once, after the GL context exists
//! 3. per frame: `handle_event()` and `update()` for every fixed tick, then
//!    `clear()` and `render()`
//! 4. `destroy()` once, after the loop stopped

use std::{fmt::Debug, marker::PhantomData, path::PathBuf};

use cgmath::Vector2;
use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    data_structures::{
        mesh::{self, QuadMesh},
        texture::TextureBinding,
        uniforms::{FrameUniforms, SurfaceState, U_FRAME, U_MOUSE, U_RESOLUTION, U_TIME},
    },
    gpu::Gpu,
    resources::{
        Assets,
        mesh::QuadBuffers,
        texture::{bind_textures, upload_texture},
    },
    shader::{Diagnostic, ShaderProgram, ShaderSources},
};

/// Name of the built-in scene; also becomes the window title.
pub const SHADER_SCENE_NAME: &str = "The Shader Scene";
/// Texture the built-in scene samples, relative to the data directory.
pub const DEFAULT_TEXTURE: &str = "texture/container.jpg";
/// Sampler uniform the built-in texture is exposed as.
pub const DEFAULT_SAMPLER: &str = "texture1";

/// Trait for implementing something the engine can run.
///
/// Hooks are called by the engine only, in the order described in the module
/// docs. `G` is the graphics backend; the desktop engine uses
/// [`crate::gpu::GlowGpu`].
pub trait Scene<G: Gpu> {
    /// Human readable name, used as the window title.
    fn name(&self) -> &str;

    /// Receives the surface resolution when the engine takes ownership.
    fn attach(&mut self, resolution: Vector2<f32>);

    /// Creates the GPU resources.
    ///
    /// Errors are fatal and end the run. Recoverable problems (bad GLSL, an
    /// unreadable image) should be logged and kept on the scene instead.
    fn init(&mut self, gpu: &G) -> anyhow::Result<()>;

    /// Clears the framebuffer before `render`.
    fn clear(&mut self, gpu: &G);

    fn render(&mut self, gpu: &G, surface: &SurfaceState);

    /// Releases everything `init` created. The scene is not used afterwards.
    fn destroy(&mut self, gpu: &G);

    /// Called for every window event, before the tick's `update`.
    fn handle_event(&mut self, _event: &WindowEvent) {}

    /// One fixed simulation step of length `dt`.
    fn update(&mut self, dt: Duration);

    /// Registers textures before they are uploaded in `init`.
    fn add_textures(&mut self) {}
}

impl<G: Gpu> Debug for dyn Scene<G> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Scene").field(&self.name()).finish()
    }
}

/// A fullscreen quad shaded by `shader/{vertex.vert,geometry.geom,fragment.frag}`.
///
/// Uniforms set on every draw: one `sampler2D` per registered texture (bound
/// to the unit matching its registration order), `u_resolution`, `u_mouse`,
/// `u_time` and `u_frame`.
#[derive(Debug)]
pub struct ShaderScene<G: Gpu> {
    name: String,
    assets: Assets,
    resolution: Vector2<f32>,
    pending: Vec<(PathBuf, String)>,
    textures: Vec<TextureBinding<G::Texture>>,
    program: Option<ShaderProgram<G>>,
    quad: Option<QuadBuffers<G>>,
    uniforms: FrameUniforms,
    diagnostics: Vec<Diagnostic>,
}

impl<G: Gpu> ShaderScene<G> {
    /// The sandbox scene: data from `data_dir`, sampling
    /// `texture/container.jpg` as `texture1`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::builder(data_dir)
            .texture(DEFAULT_TEXTURE, DEFAULT_SAMPLER)
            .build()
    }

    /// Starts a scene with no textures.
    pub fn builder(data_dir: impl Into<PathBuf>) -> ShaderSceneBuilder<G> {
        ShaderSceneBuilder {
            name: SHADER_SCENE_NAME.to_string(),
            data_dir: data_dir.into(),
            textures: Vec::new(),
            gpu: PhantomData,
        }
    }

    /// Problems met during `init`, in the order they occurred.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    pub fn resolution(&self) -> Vector2<f32> {
        self.resolution
    }

    pub fn textures(&self) -> &[TextureBinding<G::Texture>] {
        &self.textures
    }

    /// Converts a window pixel position to NDC for the current resolution.
    pub fn pixel_to_ndc(&self, pixel: Vector2<f32>) -> Vector2<f32> {
        mesh::pixel_to_ndc(pixel, self.resolution)
    }

    fn release(&mut self, gpu: &G) {
        if let Some(quad) = self.quad.take() {
            quad.delete(gpu);
        }
        for binding in &mut self.textures {
            if let Some(texture) = binding.take_handle() {
                gpu.delete_texture(texture);
            }
        }
        if let Some(program) = self.program.take() {
            program.delete(gpu);
        }
    }
}

impl<G: Gpu> Scene<G> for ShaderScene<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&mut self, resolution: Vector2<f32>) {
        self.resolution = resolution;
        self.uniforms.resolution = resolution;
    }

    fn init(&mut self, gpu: &G) -> anyhow::Result<()> {
        let sources = ShaderSources::load(&self.assets)?;
        let (program, diagnostics) = ShaderProgram::build(gpu, &sources)?;
        self.program = Some(program);
        self.diagnostics.extend(diagnostics);

        self.add_textures();

        let mesh = QuadMesh::fullscreen(self.resolution);
        self.quad = Some(QuadBuffers::upload(gpu, &mesh)?);

        for binding in &mut self.textures {
            if let Some(diagnostic) = upload_texture(gpu, binding)? {
                self.diagnostics.push(diagnostic);
            }
        }

        log::info!(
            "{} ready: {} texture(s), {} diagnostic(s)",
            self.name,
            self.textures.len(),
            self.diagnostics.len()
        );
        Ok(())
    }

    fn clear(&mut self, gpu: &G) {
        gpu.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
    }

    fn render(&mut self, gpu: &G, surface: &SurfaceState) {
        let (Some(program), Some(quad)) = (&self.program, &self.quad) else {
            log::warn!("{} rendered before init", self.name);
            return;
        };

        bind_textures(gpu, &self.textures);
        program.use_program(gpu);
        for (unit, binding) in self.textures.iter().enumerate() {
            program.set_i32(gpu, binding.uniform(), unit as i32);
        }

        program.set_vec2(gpu, U_RESOLUTION, self.uniforms.resolution);
        program.set_vec2(gpu, U_MOUSE, surface.cursor);
        program.set_f32(gpu, U_TIME, self.uniforms.time);
        program.set_i32(gpu, U_FRAME, self.uniforms.frame);

        quad.draw(gpu);
    }

    fn destroy(&mut self, gpu: &G) {
        self.release(gpu);
        log::debug!("{} destroyed", self.name);
    }

    fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::CursorMoved { position, .. } = event {
            self.uniforms.cursor = Vector2::new(position.x as f32, position.y as f32);
        }
    }

    fn update(&mut self, dt: Duration) {
        self.uniforms.advance(dt);
    }

    fn add_textures(&mut self) {
        for (path, uniform) in self.pending.drain(..) {
            self.textures
                .push(TextureBinding::new(self.assets.path(path), uniform));
        }
    }
}

/// Builder for a [`ShaderScene`] with a custom name or texture set.
#[derive(Debug)]
pub struct ShaderSceneBuilder<G: Gpu> {
    name: String,
    data_dir: PathBuf,
    textures: Vec<(PathBuf, String)>,
    gpu: PhantomData<fn() -> G>,
}

impl<G: Gpu> ShaderSceneBuilder<G> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a texture at `path` (relative to the data directory) exposed as
    /// the sampler `uniform`. Units follow the order of the calls.
    pub fn texture(mut self, path: impl Into<PathBuf>, uniform: impl Into<String>) -> Self {
        self.textures.push((path.into(), uniform.into()));
        self
    }

    pub fn build(self) -> ShaderScene<G> {
        ShaderScene {
            name: self.name,
            assets: Assets::new(self.data_dir),
            resolution: Vector2::new(0.0, 0.0),
            pending: self.textures,
            textures: Vec::new(),
            program: None,
            quad: None,
            uniforms: FrameUniforms::default(),
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::gpu::GlowGpu;

    #[test]
    fn should_register_the_container_texture_by_default() {
        let mut scene: ShaderScene<GlowGpu> = ShaderScene::new("data");
        assert_eq!(scene.name(), SHADER_SCENE_NAME);
        assert!(scene.textures().is_empty());
        scene.add_textures();
        assert_eq!(scene.textures().len(), 1);
        assert_eq!(scene.textures()[0].uniform(), DEFAULT_SAMPLER);
        assert!(scene.textures()[0].path().ends_with(DEFAULT_TEXTURE));
        assert!(scene.textures()[0].handle().is_none());
    }

    #[test]
    fn should_build_without_textures() {
        let mut scene: ShaderScene<GlowGpu> =
            ShaderScene::<GlowGpu>::builder("data").name("bare").build();
        scene.add_textures();
        assert_eq!(scene.name(), "bare");
        assert!(scene.textures().is_empty());
    }

    #[test]
    fn should_advance_uniforms_on_update() {
        let mut scene: ShaderScene<GlowGpu> = ShaderScene::new("data");
        scene.attach(Vector2::new(1080.0, 720.0));
        for _ in 0..30 {
            scene.update(Duration::from_nanos(16_666_666));
        }
        assert_eq!(scene.uniforms().frame, 30);
        assert_relative_eq!(scene.uniforms().time, 0.5, epsilon = 1e-4);
        assert_eq!(scene.uniforms().resolution, Vector2::new(1080.0, 720.0));
    }

    #[test]
    fn should_map_window_corners_to_ndc() {
        let mut scene: ShaderScene<GlowGpu> = ShaderScene::new("data");
        scene.attach(Vector2::new(800.0, 600.0));
        let top_left = scene.pixel_to_ndc(Vector2::new(0.0, 0.0));
        let bottom_right = scene.pixel_to_ndc(Vector2::new(800.0, 600.0));
        assert_relative_eq!(top_left.x, -1.0);
        assert_relative_eq!(top_left.y, 1.0);
        assert_relative_eq!(bottom_right.x, 1.0);
        assert_relative_eq!(bottom_right.y, -1.0);
    }
}
