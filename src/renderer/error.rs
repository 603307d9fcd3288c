//! Renderer error types

use thiserror::Error;

use crate::geometry::GeometryError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to initialize renderer: {0}")]
    InitializationFailed(String),

    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),

    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),

    #[error("Surface lost")]
    SurfaceLost,

    #[error("Out of GPU memory")]
    OutOfMemory,

    #[error("Failed to acquire frame: {0}")]
    AcquireImageFailed(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type RenderResult<T> = Result<T, RenderError>;
