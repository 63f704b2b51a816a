//! Texture registrations.
//!
//! A [`TextureBinding`] ties an image file to the sampler uniform that reads
//! it. Bindings are registered before the scene is initialised; the GPU handle
//! appears once the texture object has been created and stays until the scene
//! is destroyed. The n-th registered binding is always bound to texture unit n.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct TextureBinding<T> {
    path: PathBuf,
    uniform: String,
    handle: Option<T>,
}

impl<T: Copy> TextureBinding<T> {
    pub fn new(path: impl Into<PathBuf>, uniform: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            uniform: uniform.into(),
            handle: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the `sampler2D` uniform this texture is exposed as.
    pub fn uniform(&self) -> &str {
        &self.uniform
    }

    pub fn handle(&self) -> Option<T> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: T) {
        self.handle = Some(handle);
    }

    pub(crate) fn take_handle(&mut self) -> Option<T> {
        self.handle.take()
    }
}
