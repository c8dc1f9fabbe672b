//! Error taxonomy for the texture pipeline and model loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while ingesting images or loading the model.
///
/// Everything except [`CustomizerError::AssetLoad`] is recoverable: the upload
/// or bind is abandoned and the previous texture stays on the mesh.
#[derive(Debug, Error)]
pub enum CustomizerError {
    /// The chosen file could not be read into memory.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HEIC to raster conversion failed.
    #[error("HEIC conversion failed: {0}")]
    Conversion(String),

    /// The normalized image could not be decoded into a texture.
    #[error("texture decode failed: {0}")]
    TextureDecode(String),

    /// The 3D model could not be loaded. Fatal for the viewport.
    #[error("failed to load model {}: {reason}", path.display())]
    AssetLoad { path: PathBuf, reason: String },
}

impl CustomizerError {
    /// Whether the error only affects the texture path (mesh keeps rendering).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CustomizerError::AssetLoad { .. })
    }
}

pub type Result<T, E = CustomizerError> = std::result::Result<T, E>;
