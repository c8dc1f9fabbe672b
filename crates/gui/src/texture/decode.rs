//! CPU-side texture images

use shared::ResourceId;

use crate::error::{CustomizerError, Result};

/// Decoded RGBA8 pixels ready for GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureImage {
    /// Resource this texture was decoded from
    pub source: ResourceId,
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, first row is the top of the source image unless flipped
    pub rgba: Vec<u8>,
    pub flipped_y: bool,
}

impl TextureImage {
    /// Decode encoded image bytes (PNG, JPEG, ...).
    pub fn decode(source: ResourceId, bytes: &[u8], flip_y: bool) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| CustomizerError::TextureDecode(e.to_string()))?;
        Ok(Self::from_dynamic(source, img, flip_y))
    }

    pub fn from_dynamic(source: ResourceId, img: image::DynamicImage, flip_y: bool) -> Self {
        let img = if flip_y { img.flipv() } else { img };
        let rgba = img.to_rgba8();
        Self {
            source,
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
            flipped_y: flip_y,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }
}
