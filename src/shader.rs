//! Shader program lifecycle: load, compile, link, use, release.
//!
//! Building a program never aborts on bad GLSL. Every stage is compiled even
//! if an earlier one failed, the program is linked anyway, and whatever the
//! driver complained about comes back as a list of [`Diagnostic`]s next to the
//! (possibly unusable) program. Only missing source files and failures to
//! allocate GL objects are hard errors.
//!
//! # Lifecycle
//!
//! 1. [`ShaderSources::load`] reads `shader/vertex.vert`, `shader/geometry.geom`
//!    and `shader/fragment.frag` below the data directory
//! 2. [`ShaderProgram::build`] compiles the three stages, links them and deletes
//!    the stage objects again
//! 3. [`ShaderProgram::use_program`] and the `set_*` helpers upload uniforms each draw
//! 4. [`ShaderProgram::delete`] releases the program

use std::{fmt, path::PathBuf};

use anyhow::anyhow;
use cgmath::Vector2;

use crate::{gpu::Gpu, resources::Assets};

/// One programmable stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Geometry,
    Fragment,
}

impl ShaderStage {
    /// Stages in compile/attach order.
    pub const ALL: [ShaderStage; 3] = [
        ShaderStage::Vertex,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
    ];

    /// The `glow` shader type constant.
    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    /// Source file below the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "shader/vertex.vert",
            ShaderStage::Geometry => "shader/geometry.geom",
            ShaderStage::Fragment => "shader/fragment.frag",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Geometry => "GEOMETRY",
            ShaderStage::Fragment => "FRAGMENT",
        })
    }
}

/// A non-fatal problem met while preparing a scene's GPU resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("ERROR::SHADER::{stage}::COMPILATION_FAILED\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("ERROR::SHADER::PROGRAM::LINKING_FAILED\n{log}")]
    Link { log: String },
    #[error("failed to load texture {}: {reason}", path.display())]
    Texture { path: PathBuf, reason: String },
}

/// GLSL text of the three stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub geometry: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Reads all three stages. A missing or unreadable file is an error
    /// naming its path.
    pub fn load(assets: &Assets) -> anyhow::Result<Self> {
        Ok(Self {
            vertex: assets.load_string(ShaderStage::Vertex.file_name())?,
            geometry: assets.load_string(ShaderStage::Geometry.file_name())?,
            fragment: assets.load_string(ShaderStage::Fragment.file_name())?,
        })
    }

    pub fn get(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Geometry => &self.geometry,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// A linked program handle.
///
/// Valid from [`ShaderProgram::build`] until [`ShaderProgram::delete`], which
/// consumes it.
#[derive(Debug)]
pub struct ShaderProgram<G: Gpu> {
    program: G::Program,
}

impl<G: Gpu> ShaderProgram<G> {
    /// Compiles and links `sources`, returning the program and every
    /// compile/link diagnostic in stage order.
    pub fn build(gpu: &G, sources: &ShaderSources) -> anyhow::Result<(Self, Vec<Diagnostic>)> {
        let mut diagnostics = Vec::new();
        let mut shaders = Vec::with_capacity(ShaderStage::ALL.len());

        for stage in ShaderStage::ALL {
            let shader = match gpu.create_shader(stage.gl_type()) {
                Ok(shader) => shader,
                Err(e) => {
                    shaders.iter().for_each(|&shader| gpu.delete_shader(shader));
                    return Err(anyhow!("create_shader({stage}) failed: {e}"));
                }
            };
            gpu.shader_source(shader, sources.get(stage));
            gpu.compile_shader(shader);
            if !gpu.get_shader_compile_status(shader) {
                let diagnostic = Diagnostic::Compile {
                    stage,
                    log: gpu.get_shader_info_log(shader),
                };
                log::error!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
            shaders.push(shader);
        }

        let program = match gpu.create_program() {
            Ok(program) => program,
            Err(e) => {
                shaders.iter().for_each(|&shader| gpu.delete_shader(shader));
                return Err(anyhow!("create_program failed: {e}"));
            }
        };
        for &shader in &shaders {
            gpu.attach_shader(program, shader);
        }
        gpu.link_program(program);
        if !gpu.get_program_link_status(program) {
            let diagnostic = Diagnostic::Link {
                log: gpu.get_program_info_log(program),
            };
            log::error!("{}", diagnostic);
            diagnostics.push(diagnostic);
        }

        // Stage objects are only needed until link time.
        for shader in shaders {
            gpu.delete_shader(shader);
        }

        Ok((Self { program }, diagnostics))
    }

    pub fn handle(&self) -> G::Program {
        self.program
    }

    pub fn use_program(&self, gpu: &G) {
        gpu.use_program(Some(self.program));
    }

    pub fn set_i32(&self, gpu: &G, name: &str, value: i32) {
        let location = gpu.get_uniform_location(self.program, name);
        gpu.uniform_1_i32(location.as_ref(), value);
    }

    pub fn set_f32(&self, gpu: &G, name: &str, value: f32) {
        let location = gpu.get_uniform_location(self.program, name);
        gpu.uniform_1_f32(location.as_ref(), value);
    }

    pub fn set_vec2(&self, gpu: &G, name: &str, value: Vector2<f32>) {
        let location = gpu.get_uniform_location(self.program, name);
        gpu.uniform_2_f32(location.as_ref(), value.x, value.y);
    }

    pub fn delete(self, gpu: &G) {
        gpu.delete_program(self.program);
    }
}
