//! PBR demo: physically-based rendering with image-based lighting.
//!
//! The library side holds the procedural geometry, the scene and camera
//! types, asset loading, and the wgpu renderer; the binary wires them to a
//! window and an event loop.

pub mod geometry;
pub mod renderer;
pub mod resources;
pub mod scene;

use std::path::PathBuf;

pub use renderer::{RenderError, Renderer};

/// Demo configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Directory the texture sets and the environment map live under.
    pub asset_root: PathBuf,
    /// Grid resolution of the sphere mesh (both axes).
    pub sphere_segments: u32,
    /// Texture set names, one sphere each.
    pub texture_sets: Vec<String>,
    /// Equirectangular HDR file name under `<asset_root>/textures/hdr/`.
    pub environment_map: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "PBR Demo".to_string(),
            width: 1600,
            height: 900,
            vsync: true,
            asset_root: PathBuf::from("assets"),
            sphere_segments: 64,
            texture_sets: ["cobble", "space", "rusted", "granite", "wood"]
                .map(String::from)
                .to_vec(),
            environment_map: "Lobby-Center_Env.hdr".to_string(),
        }
    }
}
