//! Procedural UV-sphere generation

use bytemuck::{Pod, Zeroable};

use super::GeometryError;

/// Vertex layout for the sphere mesh: position, uv, normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

/// A unit UV-sphere as one continuous triangle strip.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
    pub longitude_segments: u32,
    pub latitude_segments: u32,
}

impl SphereMesh {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Vertex at grid position (x, y); row-major with `longitude_segments + 1`
    /// vertices per row.
    pub fn vertex_at(&self, x: u32, y: u32) -> &SphereVertex {
        &self.vertices[(y * (self.longitude_segments + 1) + x) as usize]
    }
}

/// Generate a unit sphere with the given grid resolution.
///
/// Vertices are laid out row by row from the north pole (v = 0) to the south
/// pole (v = 1). Positions sit on the unit sphere and double as normals. The
/// index sequence is a single triangle strip that zig-zags: even rows run
/// west to east, odd rows run back east to west, so consecutive rows share
/// their seam vertices without restart indices.
pub fn generate_sphere(
    longitude_segments: u32,
    latitude_segments: u32,
) -> Result<SphereMesh, GeometryError> {
    if longitude_segments == 0 || latitude_segments == 0 {
        return Err(GeometryError::InvalidSegments {
            longitude: longitude_segments,
            latitude: latitude_segments,
        });
    }

    let mut vertices =
        Vec::with_capacity(((longitude_segments + 1) * (latitude_segments + 1)) as usize);

    for y in 0..=latitude_segments {
        for x in 0..=longitude_segments {
            let u = x as f32 / longitude_segments as f32;
            let v = y as f32 / latitude_segments as f32;

            let px = (u * 2.0 * std::f32::consts::PI).cos() * (v * std::f32::consts::PI).sin();
            let py = (v * std::f32::consts::PI).cos();
            let pz = (u * 2.0 * std::f32::consts::PI).sin() * (v * std::f32::consts::PI).sin();

            vertices.push(SphereVertex {
                position: [px, py, pz],
                uv: [u, v],
                normal: [px, py, pz],
            });
        }
    }

    let row = longitude_segments + 1;
    let mut indices = Vec::with_capacity((2 * row * latitude_segments) as usize);

    for y in 0..latitude_segments {
        if y % 2 == 0 {
            for x in 0..=longitude_segments {
                indices.push(y * row + x);
                indices.push((y + 1) * row + x);
            }
        } else {
            for x in (0..=longitude_segments).rev() {
                indices.push((y + 1) * row + x);
                indices.push(y * row + x);
            }
        }
    }

    Ok(SphereMesh {
        vertices,
        indices,
        longitude_segments,
        latitude_segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn vertex_and_index_counts() {
        for (n, m) in [(1, 1), (4, 4), (64, 64), (3, 7)] {
            let mesh = generate_sphere(n, m).unwrap();
            assert_eq!(mesh.vertex_count(), (n + 1) * (m + 1), "vertices {n}x{m}");
            assert_eq!(mesh.index_count(), 2 * (n + 1) * m, "indices {n}x{m}");
        }
    }

    #[test]
    fn four_by_four_counts() {
        let mesh = generate_sphere(4, 4).unwrap();
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.index_count(), 40);
    }

    #[test]
    fn first_vertex_is_north_pole() {
        let mesh = generate_sphere(4, 4).unwrap();
        let v = &mesh.vertices[0];
        assert!((v.position[0]).abs() < EPS);
        assert!((v.position[1] - 1.0).abs() < EPS);
        assert!((v.position[2]).abs() < EPS);
    }

    #[test]
    fn positions_are_unit_length_and_equal_normals() {
        let mesh = generate_sphere(16, 8).unwrap();
        for v in &mesh.vertices {
            assert_eq!(v.position, v.normal);
            let len = (v.position[0] * v.position[0]
                + v.position[1] * v.position[1]
                + v.position[2] * v.position[2])
                .sqrt();
            assert!((len - 1.0).abs() < EPS, "|position| = {len}");
        }
    }

    #[test]
    fn uv_corners() {
        let mesh = generate_sphere(8, 6).unwrap();
        assert_eq!(mesh.vertex_at(0, 0).uv, [0.0, 0.0]);
        assert_eq!(mesh.vertex_at(8, 6).uv, [1.0, 1.0]);
    }

    #[test]
    fn indices_in_bounds_and_cover_every_vertex() {
        let mesh = generate_sphere(6, 5).unwrap();
        let count = mesh.vertex_count();
        let mut seen = vec![false; count as usize];
        for &i in &mesh.indices {
            assert!(i < count, "index {i} out of bounds {count}");
            seen[i as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "unreferenced vertex");
    }

    #[test]
    fn strip_rows_alternate_direction() {
        let mesh = generate_sphere(2, 2).unwrap();
        // Row 0 ascends: first pair references grid (0,0) and (0,1).
        assert_eq!(mesh.indices[0], 0);
        assert_eq!(mesh.indices[1], 3);
        // Row 1 descends: its first pair references the east edge.
        assert_eq!(mesh.indices[6], 2 * 3 + 2);
        assert_eq!(mesh.indices[7], 1 * 3 + 2);
    }

    #[test]
    fn zero_segments_rejected() {
        assert!(matches!(
            generate_sphere(0, 4),
            Err(GeometryError::InvalidSegments { longitude: 0, latitude: 4 })
        ));
        assert!(matches!(
            generate_sphere(4, 0),
            Err(GeometryError::InvalidSegments { longitude: 4, latitude: 0 })
        ));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_sphere(12, 9).unwrap();
        let b = generate_sphere(12, 9).unwrap();
        assert_eq!(a, b);
    }
}
