//! Procedural mesh generation and caching
//!
//! Geometry here is pure data; uploading it to the GPU is the renderer's
//! business. Both shapes are deterministic, so the cache builds each of them
//! at most once and hands out references afterwards.

mod cube;
mod sphere;

pub use cube::{generate_cube, CubeMesh, CubeVertex};
pub use sphere::{generate_sphere, SphereMesh, SphereVertex};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("sphere segment counts must be at least 1, got {longitude}x{latitude}")]
    InvalidSegments { longitude: u32, latitude: u32 },

    #[error("sphere already built at {built_longitude}x{built_latitude}, requested {longitude}x{latitude}")]
    ResolutionMismatch {
        built_longitude: u32,
        built_latitude: u32,
        longitude: u32,
        latitude: u32,
    },
}

/// Lazily built, build-at-most-once mesh storage.
///
/// Not thread-safe; the render loop owns it and drives it from one thread.
#[derive(Debug, Default)]
pub struct MeshCache {
    sphere: Option<SphereMesh>,
    cube: Option<CubeMesh>,
    sphere_builds: u32,
    cube_builds: u32,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit sphere at the given resolution, built on first call.
    ///
    /// The cache pins the resolution of the first successful build; asking
    /// for a different one afterwards is an error rather than a silent
    /// rebuild or a mismatched result.
    pub fn sphere(
        &mut self,
        longitude_segments: u32,
        latitude_segments: u32,
    ) -> Result<&SphereMesh, GeometryError> {
        match self.sphere {
            Some(ref mesh)
                if mesh.longitude_segments == longitude_segments
                    && mesh.latitude_segments == latitude_segments => {}
            Some(ref mesh) => {
                return Err(GeometryError::ResolutionMismatch {
                    built_longitude: mesh.longitude_segments,
                    built_latitude: mesh.latitude_segments,
                    longitude: longitude_segments,
                    latitude: latitude_segments,
                })
            }
            None => {
                let mesh = generate_sphere(longitude_segments, latitude_segments)?;
                log::debug!(
                    "built sphere mesh: {}x{} segments, {} vertices, {} indices",
                    longitude_segments,
                    latitude_segments,
                    mesh.vertex_count(),
                    mesh.index_count()
                );
                self.sphere_builds += 1;
                self.sphere = Some(mesh);
            }
        }
        Ok(self.sphere.as_ref().expect("sphere just checked or built"))
    }

    /// The unit cube, built on first call.
    pub fn cube(&mut self) -> &CubeMesh {
        if self.cube.is_none() {
            self.cube_builds += 1;
        }
        self.cube.get_or_insert_with(generate_cube)
    }

    /// How many times the sphere has actually been generated.
    pub fn sphere_builds(&self) -> u32 {
        self.sphere_builds
    }

    /// How many times the cube has actually been generated.
    pub fn cube_builds(&self) -> u32 {
        self.cube_builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_builds_once() {
        let mut cache = MeshCache::new();
        assert_eq!(cache.sphere_builds(), 0);

        let first = cache.sphere(8, 8).unwrap().clone();
        assert_eq!(cache.sphere_builds(), 1);

        let second = cache.sphere(8, 8).unwrap().clone();
        assert_eq!(cache.sphere_builds(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn cube_builds_once() {
        let mut cache = MeshCache::new();
        assert_eq!(cache.cube_builds(), 0);

        let first = cache.cube().clone();
        assert_eq!(cache.cube_builds(), 1);

        let second = cache.cube().clone();
        assert_eq!(cache.cube_builds(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn resolution_mismatch_rejected_without_rebuilding() {
        let mut cache = MeshCache::new();
        cache.sphere(16, 8).unwrap();

        let err = cache.sphere(8, 8).unwrap_err();
        assert_eq!(
            err,
            GeometryError::ResolutionMismatch {
                built_longitude: 16,
                built_latitude: 8,
                longitude: 8,
                latitude: 8,
            }
        );
        assert_eq!(cache.sphere_builds(), 1);

        // The original resolution still resolves.
        assert!(cache.sphere(16, 8).is_ok());
    }

    #[test]
    fn invalid_segments_do_not_poison_the_cache() {
        let mut cache = MeshCache::new();
        assert!(cache.sphere(0, 0).is_err());
        assert_eq!(cache.sphere_builds(), 0);

        assert!(cache.sphere(4, 4).is_ok());
        assert_eq!(cache.sphere_builds(), 1);
    }
}
