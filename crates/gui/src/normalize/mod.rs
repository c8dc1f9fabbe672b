//! Image normalization: user file → renderer-loadable image payload.
//!
//! HEIC files go through a [`HeicConverter`] and come out as JPEG bytes that
//! the [`ResourceStore`] exposes behind an object URL. Every other format is
//! natively decodable, so it is wrapped as a base64 data URL unchanged.

mod heic;
mod resource;

use std::path::Path;
use std::sync::Arc;

use shared::HEIC_MIME;

use crate::error::{CustomizerError, Result};

pub use heic::{ConversionRequest, HeicConverter, LibheifConverter, TargetFormat};
pub use resource::{
    decode_data_url, encode_data_url, ImageResource, ResourcePayload, ResourceStore,
};

/// Fallback MIME for files with an unknown extension
const UNKNOWN_MIME: &str = "application/octet-stream";

/// A file the user picked, already read into memory.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageSource {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Build a source from a file path, deriving the MIME type from the extension.
    pub fn from_path(path: &Path, bytes: Vec<u8>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(shared::mime_from_extension)
            .unwrap_or(UNKNOWN_MIME);
        Self::new(name, mime, bytes)
    }

    pub fn is_heic(&self) -> bool {
        self.mime == HEIC_MIME
    }
}

/// Output of [`ImageNormalizer::normalize`], not yet registered in a store.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedImage {
    /// Converted bytes that need an object URL
    Blob { mime: String, bytes: Vec<u8> },
    /// Natively displayable image as a self-contained data URL
    DataUrl {
        mime: String,
        url: String,
        byte_len: usize,
    },
}

impl NormalizedImage {
    pub fn mime(&self) -> &str {
        match self {
            NormalizedImage::Blob { mime, .. } | NormalizedImage::DataUrl { mime, .. } => mime,
        }
    }
}

/// Converts user-supplied files into loadable image payloads.
#[derive(Clone)]
pub struct ImageNormalizer {
    converter: Arc<dyn HeicConverter>,
    quality: f32,
}

impl ImageNormalizer {
    pub fn new(converter: Arc<dyn HeicConverter>, quality: f32) -> Self {
        Self { converter, quality }
    }

    pub fn normalize(&self, source: ImageSource) -> Result<NormalizedImage> {
        if source.is_heic() {
            let request = ConversionRequest {
                target: TargetFormat::Jpeg,
                quality: self.quality,
            };
            let bytes = self
                .converter
                .convert(&source.bytes, request)
                .map_err(CustomizerError::Conversion)?;
            tracing::info!(
                "Converted {} ({} bytes HEIC -> {} bytes JPEG)",
                source.name,
                source.bytes.len(),
                bytes.len()
            );
            Ok(NormalizedImage::Blob {
                mime: request.target.mime().to_string(),
                bytes,
            })
        } else {
            let url = encode_data_url(&source.mime, &source.bytes);
            Ok(NormalizedImage::DataUrl {
                mime: source.mime,
                url,
                byte_len: source.bytes.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{png_bytes, RecordingConverter};

    #[test]
    fn test_from_path_derives_mime() {
        let src = ImageSource::from_path(Path::new("/tmp/photo.HEIC"), vec![]);
        assert_eq!(src.mime, HEIC_MIME);
        assert_eq!(src.name, "photo.HEIC");

        let src = ImageSource::from_path(Path::new("art.png"), vec![]);
        assert_eq!(src.mime, "image/png");

        let src = ImageSource::from_path(Path::new("notes"), vec![]);
        assert_eq!(src.mime, UNKNOWN_MIME);
    }

    #[test]
    fn test_png_passes_through_without_conversion() {
        let converter = Arc::new(RecordingConverter::succeeding());
        let normalizer = ImageNormalizer::new(converter.clone(), 0.8);
        let bytes = png_bytes(2, 2, [10, 20, 30, 255]);

        let out = normalizer
            .normalize(ImageSource::new("a.png", "image/png", bytes.clone()))
            .unwrap();

        assert!(converter.calls().is_empty());
        match out {
            NormalizedImage::DataUrl { mime, url, byte_len } => {
                assert_eq!(mime, "image/png");
                assert_eq!(byte_len, bytes.len());
                assert_eq!(decode_data_url(&url).unwrap().1, bytes);
            }
            other => panic!("Expected DataUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_heic_converts_to_jpeg_at_configured_quality() {
        let converter = Arc::new(RecordingConverter::succeeding());
        let normalizer = ImageNormalizer::new(converter.clone(), 0.8);

        let out = normalizer
            .normalize(ImageSource::new("b.heic", HEIC_MIME, vec![0, 1, 2]))
            .unwrap();

        let calls = converter.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, TargetFormat::Jpeg);
        assert!((calls[0].quality - 0.8).abs() < f32::EPSILON);
        assert_eq!(out.mime(), "image/jpeg");
        assert!(matches!(out, NormalizedImage::Blob { .. }));
    }

    #[test]
    fn test_heic_failure_maps_to_conversion_error() {
        let normalizer = ImageNormalizer::new(Arc::new(RecordingConverter::failing()), 0.8);
        let err = normalizer
            .normalize(ImageSource::new("c.heic", HEIC_MIME, vec![1]))
            .unwrap_err();
        assert!(matches!(err, CustomizerError::Conversion(_)));
    }

    #[test]
    fn test_heif_mime_is_not_special_cased() {
        let converter = Arc::new(RecordingConverter::succeeding());
        let normalizer = ImageNormalizer::new(converter.clone(), 0.8);
        let out = normalizer
            .normalize(ImageSource::new("d.heif", "image/heif", vec![1]))
            .unwrap();
        assert!(converter.calls().is_empty());
        assert!(matches!(out, NormalizedImage::DataUrl { .. }));
    }
}
