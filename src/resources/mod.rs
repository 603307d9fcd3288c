//! Asset loading

mod texture;

pub use texture::{PbrTextureSet, TextureData, TextureError};
