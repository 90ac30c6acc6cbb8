// Vertex buffer + vertex array pairs
//
// Each mesh owns one static buffer of tightly packed vec3 positions and one
// vertex array mapping attribute slot 0 onto it.

use anyhow::{Context, Result};
use glow::HasContext;
use std::rc::Rc;

use crate::scene::{self, Triangle};

/// Attribute slot the vertex shader reads positions from
pub const POSITION_LOCATION: u32 = 0;

const VERTICES_PER_TRIANGLE: i32 = 3;

/// One uploaded triangle. Buffer and vertex array are deleted on drop.
pub struct TriangleMesh {
    gl: Rc<glow::Context>,
    vbo: glow::NativeBuffer,
    vao: glow::NativeVertexArray,
}

impl TriangleMesh {
    /// Bind the vertex array and draw its three vertices as a triangle list.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, VERTICES_PER_TRIANGLE);
        }
    }
}

impl Drop for TriangleMesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
        }
    }
}

/// Upload one triangle with a `STATIC_DRAW` hint.
pub fn upload_triangle(gl: &Rc<glow::Context>, vertices: &Triangle) -> Result<TriangleMesh> {
    let bytes = scene::vertex_bytes(vertices);

    unsafe {
        let vbo = gl
            .create_buffer()
            .map_err(anyhow::Error::msg)
            .context("Failed to create vertex buffer")?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, glow::STATIC_DRAW);

        let vao = match gl.create_vertex_array() {
            Ok(vao) => vao,
            Err(e) => {
                gl.delete_buffer(vbo);
                anyhow::bail!("Failed to create vertex array: {}", e);
            }
        };
        gl.bind_vertex_array(Some(vao));
        gl.enable_vertex_attrib_array(POSITION_LOCATION);
        // 3 floats per vertex, stride 0 = tightly packed, offset 0
        gl.vertex_attrib_pointer_f32(POSITION_LOCATION, 3, glow::FLOAT, false, 0, 0);

        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        log::debug!("Uploaded triangle ({} bytes)", bytes.len());
        Ok(TriangleMesh {
            gl: Rc::clone(gl),
            vbo,
            vao,
        })
    }
}

/// Upload every triangle in order; the frame loop draws them in the same order.
pub fn upload_triangles(gl: &Rc<glow::Context>, triangles: &[Triangle]) -> Result<Vec<TriangleMesh>> {
    triangles
        .iter()
        .enumerate()
        .map(|(i, t)| upload_triangle(gl, t).with_context(|| format!("Triangle #{}", i + 1)))
        .collect()
}
