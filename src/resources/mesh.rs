use anyhow::anyhow;

use crate::{data_structures::mesh::QuadMesh, gpu::Gpu};

/// Attribute location of the vertex position in the vertex shader.
pub const POSITION_ATTRIBUTE: u32 = 0;

/// GPU side of a [`QuadMesh`]: one vertex array with a vertex and an index buffer.
///
/// Immutable after upload. [`QuadBuffers::delete`] consumes the value so the
/// handles cannot be used after release.
#[derive(Debug)]
pub struct QuadBuffers<G: Gpu> {
    vao: G::VertexArray,
    vbo: G::Buffer,
    ebo: G::Buffer,
}

impl<G: Gpu> QuadBuffers<G> {
    pub fn upload(gpu: &G, mesh: &QuadMesh) -> anyhow::Result<Self> {
        let vao = gpu
            .create_vertex_array()
            .map_err(|e| anyhow!("create_vertex_array failed: {e}"))?;
        let vbo = match gpu.create_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                gpu.delete_vertex_array(vao);
                return Err(anyhow!("create_buffer (vertices) failed: {e}"));
            }
        };
        let ebo = match gpu.create_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                gpu.delete_buffer(vbo);
                gpu.delete_vertex_array(vao);
                return Err(anyhow!("create_buffer (indices) failed: {e}"));
            }
        };

        // The element buffer binding is recorded in the VAO, so bind the VAO first.
        gpu.bind_vertex_array(Some(vao));

        gpu.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gpu.buffer_data_u8_slice(glow::ARRAY_BUFFER, mesh.vertex_bytes(), glow::STATIC_DRAW);

        gpu.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        gpu.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            mesh.index_bytes(),
            glow::STATIC_DRAW,
        );

        let stride = (3 * std::mem::size_of::<f32>()) as i32;
        gpu.vertex_attrib_pointer_f32(POSITION_ATTRIBUTE, 3, glow::FLOAT, false, stride, 0);
        gpu.enable_vertex_attrib_array(POSITION_ATTRIBUTE);

        gpu.bind_buffer(glow::ARRAY_BUFFER, None);
        gpu.bind_vertex_array(None);

        Ok(Self { vao, vbo, ebo })
    }

    pub fn draw(&self, gpu: &G) {
        gpu.bind_vertex_array(Some(self.vao));
        gpu.draw_elements(
            glow::TRIANGLES,
            QuadMesh::INDICES.len() as i32,
            glow::UNSIGNED_INT,
            0,
        );
    }

    pub fn delete(self, gpu: &G) {
        gpu.delete_vertex_array(self.vao);
        gpu.delete_buffer(self.vbo);
        gpu.delete_buffer(self.ebo);
    }
}
