//! Loading files from the data directory and turning them into GPU resources.
//!
//! - [`Assets`] resolves paths below the data directory and reads text/bytes
//! - `mesh` uploads and draws the quad
//! - `texture` decodes images and uploads them as 2D textures

pub mod mesh;
pub mod texture;

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Root of the on-disk data (`shader/`, `texture/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `file_name` below the root.
    pub fn path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn load_string(&self, file_name: impl AsRef<Path>) -> anyhow::Result<String> {
        let path = self.path(file_name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to load text from {}", path.display()))
    }

    pub fn load_binary(&self, file_name: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
        let path = self.path(file_name);
        std::fs::read(&path)
            .with_context(|| format!("failed to load bytes from {}", path.display()))
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_DATA_DIR)
    }
}
