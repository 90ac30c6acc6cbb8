// Fixed-function pipeline state
//
// Depth testing and rasterizer setup. GL keeps this as global context
// state, so it is applied once after the context is current.

use glow::HasContext;

use crate::config::GraphicsConfig;

/// Depth test with LESS comparison
pub fn apply_depth_state(gl: &glow::Context, config: &GraphicsConfig) {
    unsafe {
        if config.depth_test {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
        } else {
            gl.disable(glow::DEPTH_TEST);
        }
    }
}

/// No culling, clockwise front faces. With `back_face_wireframe` back faces
/// are drawn as outlines and front faces filled.
///
/// Per-face polygon modes only exist in compatibility contexts; a core
/// context reports INVALID_ENUM, which is logged and otherwise ignored.
pub fn apply_rasterizer_state(gl: &glow::Context, config: &GraphicsConfig) {
    unsafe {
        gl.disable(glow::CULL_FACE);
        gl.front_face(glow::CW);

        if config.back_face_wireframe {
            gl.polygon_mode(glow::FRONT, glow::FILL);
            gl.polygon_mode(glow::BACK, glow::LINE);
        } else {
            gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
        }

        let error = gl.get_error();
        if error != glow::NO_ERROR {
            log::warn!(
                "Rasterizer state partially rejected ({}); back faces will be filled",
                error_name(error)
            );
        }
    }
}

pub fn error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "unknown GL error",
    }
}
