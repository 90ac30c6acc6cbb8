// Static geometry drawn every frame

use glam::Vec3;

/// One triangle: three positions, no other attributes
pub type Triangle = [Vec3; 3];

/// Clockwise; front-facing with the clockwise winding set in the pipeline.
pub const TRIANGLE_A: Triangle = [
    Vec3::new(0.0, 0.5, 0.0),
    Vec3::new(0.5, -0.5, 0.0),
    Vec3::new(-0.5, -0.5, 0.0),
];

/// Counter-clockwise; shows its back face.
pub const TRIANGLE_B: Triangle = [
    Vec3::new(-0.6, -0.4, 0.0),
    Vec3::new(0.6, -0.4, 0.0),
    Vec3::new(0.0, 0.6, 0.0),
];

pub fn default_triangles() -> Vec<Triangle> {
    vec![TRIANGLE_A, TRIANGLE_B]
}

/// Tightly packed x,y,z floats as uploaded to the vertex buffer
pub fn vertex_bytes(triangle: &Triangle) -> &[u8] {
    bytemuck::cast_slice(triangle.as_slice())
}
