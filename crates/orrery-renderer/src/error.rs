//! Renderer errors

/// Errors that drop a frame.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("Surface lost or outdated")]
    SurfaceLost,
    #[error("Out of GPU memory")]
    OutOfMemory,
    #[error("GPU validation failed: {0}")]
    Validation(String),
    #[error("Missing GPU resource: {0}")]
    MissingResource(String),
}

impl From<wgpu::Error> for RenderError {
    fn from(error: wgpu::Error) -> Self {
        match error {
            wgpu::Error::OutOfMemory { .. } => RenderError::OutOfMemory,
            other => RenderError::Validation(other.to_string()),
        }
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(error: wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            _ => RenderError::SurfaceLost,
        }
    }
}
