//! Texture loading and fallbacks

use std::path::{Path, PathBuf};

use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture {path}: {source}")]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Decoded RGBA8 pixel data, ready for upload.
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
    /// Whether the data is color (sRGB) or linear (normal/metallic/roughness/ao).
    pub srgb: bool,
}

impl TextureData {
    /// Load a texture from file.
    pub fn from_file<P: AsRef<Path>>(path: P, srgb: bool) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(img, &name, srgb))
    }

    fn from_image(img: DynamicImage, name: &str, srgb: bool) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            data: rgba.into_raw(),
            name: name.to_string(),
            srgb,
        }
    }

    /// Create a 1x1 solid color texture.
    pub fn solid_color(color: [u8; 4], name: &str, srgb: bool) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
            name: name.to_string(),
            srgb,
        }
    }

    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white", true)
    }

    pub fn black() -> Self {
        Self::solid_color([0, 0, 0, 255], "black", false)
    }

    /// Flat tangent-space normal (0, 0, 1), encoded as (128, 128, 255).
    pub fn default_normal() -> Self {
        Self::solid_color([128, 128, 255, 255], "default_normal", false)
    }

    /// Mid-grey, a usable stand-in for a missing roughness map.
    pub fn grey() -> Self {
        Self::solid_color([128, 128, 128, 255], "grey", false)
    }
}

/// The five maps of one PBR material.
pub struct PbrTextureSet {
    pub name: String,
    pub albedo: TextureData,
    pub normal: TextureData,
    pub metallic: TextureData,
    pub roughness: TextureData,
    pub ao: TextureData,
}

impl PbrTextureSet {
    /// Load `<dir>/<name>/<name>_<map>.png` for each of the five maps.
    ///
    /// A map that fails to load is logged and replaced by a neutral
    /// fallback; each field is assigned only once its load has resolved.
    pub fn load<P: AsRef<Path>>(dir: P, name: &str) -> Self {
        let dir = dir.as_ref().join(name);
        let map_path = |map: &str| dir.join(format!("{name}_{map}.png"));

        let albedo = Self::load_map(&map_path("albedo"), true, TextureData::white);
        let normal = Self::load_map(&map_path("normal"), false, TextureData::default_normal);
        let metallic = Self::load_map(&map_path("metallic"), false, TextureData::black);
        let roughness = Self::load_map(&map_path("roughness"), false, TextureData::grey);
        let ao = Self::load_map(&map_path("ao"), false, TextureData::white);

        Self {
            name: name.to_string(),
            albedo,
            normal,
            metallic,
            roughness,
            ao,
        }
    }

    fn load_map(path: &Path, srgb: bool, fallback: fn() -> TextureData) -> TextureData {
        match TextureData::from_file(path, srgb) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("{e}; using fallback");
                fallback()
            }
        }
    }

    pub fn maps(&self) -> [&TextureData; 5] {
        [
            &self.albedo,
            &self.normal,
            &self.metallic,
            &self.roughness,
            &self.ao,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_is_single_pixel() {
        let tex = TextureData::solid_color([10, 20, 30, 255], "test", true);
        assert_eq!((tex.width, tex.height), (1, 1));
        assert_eq!(tex.data, vec![10, 20, 30, 255]);
    }

    #[test]
    fn default_normal_points_up() {
        let tex = TextureData::default_normal();
        assert_eq!(tex.data, vec![128, 128, 255, 255]);
        assert!(!tex.srgb);
    }

    #[test]
    fn missing_set_falls_back_per_map() {
        let set = PbrTextureSet::load("does/not/exist", "nothing");
        assert_eq!(set.albedo.data, TextureData::white().data);
        assert_eq!(set.normal.data, TextureData::default_normal().data);
        assert_eq!(set.metallic.data, TextureData::black().data);
        assert_eq!(set.roughness.data, TextureData::grey().data);
        assert_eq!(set.ao.data, TextureData::white().data);
        assert!(set.albedo.srgb);
    }
}
