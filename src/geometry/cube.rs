//! Unit cube generation

use bytemuck::{Pod, Zeroable};

/// Vertex layout for the cube mesh: position, normal, uv.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// A [-1, 1] cube as 36 non-indexed triangle-list vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMesh {
    pub vertices: Vec<CubeVertex>,
}

impl CubeMesh {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

const fn v(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> CubeVertex {
    CubeVertex { position, normal, uv }
}

/// Two counter-clockwise triangles per face, wound so back-face culling
/// removes whichever side of the cube faces away from the viewer.
/// Face order: back, front, left, right, bottom, top.
const CUBE_VERTICES: [CubeVertex; 36] = [
    // back face (-Z)
    v([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
    v([1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
    v([1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
    v([1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
    v([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
    v([-1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
    // front face (+Z)
    v([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    v([1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
    v([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
    v([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
    v([-1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
    v([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    // left face (-X)
    v([-1.0, 1.0, 1.0], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    v([-1.0, 1.0, -1.0], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    v([-1.0, -1.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    v([-1.0, -1.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    v([-1.0, -1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 0.0]),
    v([-1.0, 1.0, 1.0], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    // right face (+X)
    v([1.0, 1.0, 1.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
    v([1.0, -1.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
    v([1.0, 1.0, -1.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
    v([1.0, -1.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
    v([1.0, 1.0, 1.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
    v([1.0, -1.0, 1.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
    // bottom face (-Y)
    v([-1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [0.0, 1.0]),
    v([1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [1.0, 1.0]),
    v([1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [1.0, 0.0]),
    v([1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [1.0, 0.0]),
    v([-1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [0.0, 0.0]),
    v([-1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [0.0, 1.0]),
    // top face (+Y)
    v([-1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
    v([1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([-1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([-1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
];

/// Generate the unit cube.
pub fn generate_cube() -> CubeMesh {
    CubeMesh {
        vertices: CUBE_VERTICES.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn exactly_36_vertices() {
        assert_eq!(generate_cube().vertex_count(), 36);
    }

    #[test]
    fn first_vertex_of_literal_table() {
        let mesh = generate_cube();
        let v = &mesh.vertices[0];
        assert_eq!(v.position, [-1.0, -1.0, -1.0]);
        assert_eq!(v.normal, [0.0, 0.0, -1.0]);
        assert_eq!(v.uv, [0.0, 0.0]);
    }

    #[test]
    fn positions_within_extents_and_normals_axis_aligned() {
        let mesh = generate_cube();
        for v in &mesh.vertices {
            for c in v.position {
                assert!(c == 1.0 || c == -1.0);
            }
            let n = Vec3::from(v.normal);
            assert_eq!(n.length(), 1.0);
            assert_eq!(n.abs().max_element(), 1.0);
            for c in v.uv {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn winding_faces_outward() {
        let mesh = generate_cube();
        // Each face's first triangle: the cross product of its edges must
        // point into the hemisphere of the declared face normal.
        for face in 0..6 {
            let base = face * 6;
            let a = Vec3::from(mesh.vertices[base].position);
            let b = Vec3::from(mesh.vertices[base + 1].position);
            let c = Vec3::from(mesh.vertices[base + 2].position);
            let normal = Vec3::from(mesh.vertices[base].normal);
            let winding = (b - a).cross(c - a);
            assert!(
                winding.dot(normal) > 0.0,
                "face {face} winds inward: {winding:?} vs {normal:?}"
            );
        }
    }

    #[test]
    fn every_face_normal_constant_across_its_six_vertices() {
        let mesh = generate_cube();
        for face in 0..6 {
            let base = face * 6;
            let n = mesh.vertices[base].normal;
            for i in 1..6 {
                assert_eq!(mesh.vertices[base + i].normal, n);
            }
        }
    }
}
