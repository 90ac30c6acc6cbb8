// Backend module - OpenGL abstraction layer
//
// Design: Thin wrapper around glow/glutin with owning handle types
// Every GL object is released when its wrapper drops

pub mod buffer;
pub mod context;
pub mod debug;
pub mod pipeline;
pub mod shader;

pub use buffer::TriangleMesh;
pub use context::GlHost;
pub use shader::ShaderProgram;
