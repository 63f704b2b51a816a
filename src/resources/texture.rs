use std::path::Path;

use anyhow::anyhow;
use image::RgbImage;

use crate::{data_structures::texture::TextureBinding, gpu::Gpu, shader::Diagnostic};

/// Decodes an image file into tightly packed RGB8 pixels.
pub fn decode_rgb(path: &Path) -> anyhow::Result<RgbImage> {
    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

/// Creates the GPU texture for `binding` and uploads its image.
///
/// Sampling: repeat on both axes, trilinear minification, linear
/// magnification, full mipmap chain.
///
/// Failing to create the texture object is fatal. Failing to decode the image
/// is not: the texture stays allocated without data and the problem is
/// returned as a [`Diagnostic`].
pub fn upload_texture<G: Gpu>(
    gpu: &G,
    binding: &mut TextureBinding<G::Texture>,
) -> anyhow::Result<Option<Diagnostic>> {
    let texture = gpu
        .create_texture()
        .map_err(|e| anyhow!("create_texture failed for {}: {e}", binding.path().display()))?;
    binding.set_handle(texture);

    gpu.bind_texture(glow::TEXTURE_2D, Some(texture));
    gpu.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
    gpu.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
    gpu.tex_parameter_i32(
        glow::TEXTURE_2D,
        glow::TEXTURE_MIN_FILTER,
        glow::LINEAR_MIPMAP_LINEAR as i32,
    );
    gpu.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);

    let diagnostic = match decode_rgb(binding.path()) {
        Ok(rgb) => {
            let (width, height) = rgb.dimensions();
            // RGB rows are not 4-byte aligned for most widths.
            gpu.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gpu.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB as i32,
                width as i32,
                height as i32,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                Some(rgb.as_raw()),
            );
            gpu.generate_mipmap(glow::TEXTURE_2D);
            log::debug!(
                "Uploaded {} ({}x{}) as {}",
                binding.path().display(),
                width,
                height,
                binding.uniform()
            );
            None
        }
        Err(e) => {
            let diagnostic = Diagnostic::Texture {
                path: binding.path().to_path_buf(),
                reason: format!("{e:#}"),
            };
            log::error!("{}", diagnostic);
            Some(diagnostic)
        }
    };

    gpu.bind_texture(glow::TEXTURE_2D, None);
    Ok(diagnostic)
}

/// Binds every texture to the unit matching its registration index.
pub fn bind_textures<G: Gpu>(gpu: &G, bindings: &[TextureBinding<G::Texture>]) {
    for (unit, binding) in bindings.iter().enumerate() {
        gpu.active_texture(glow::TEXTURE0 + unit as u32);
        gpu.bind_texture(glow::TEXTURE_2D, binding.handle());
    }
}
