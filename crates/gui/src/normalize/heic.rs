//! HEIC to JPEG conversion

use image::codecs::jpeg::JpegEncoder;
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

/// Raster format produced by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
}

impl TargetFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Parameters of a single conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    pub target: TargetFormat,
    /// Encoder quality in 0.0..=1.0
    pub quality: f32,
}

/// Converts HEIC bytes into a broadly supported raster format.
///
/// Runs on the blocking pool, never on the UI thread.
pub trait HeicConverter: Send + Sync {
    fn convert(&self, heic: &[u8], request: ConversionRequest) -> Result<Vec<u8>, String>;
}

/// Converter backed by libheif.
#[derive(Default)]
pub struct LibheifConverter;

impl HeicConverter for LibheifConverter {
    fn convert(&self, heic: &[u8], request: ConversionRequest) -> Result<Vec<u8>, String> {
        let lib = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(heic).map_err(|e| e.to_string())?;
        let handle = ctx.primary_image_handle().map_err(|e| e.to_string())?;
        let decoded = lib
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| e.to_string())?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| "decoded HEIC has no interleaved RGB plane".to_string())?;

        let width = plane.width;
        let height = plane.height;
        let row_len = width as usize * 3;

        // libheif rows may be padded past width * 3
        let mut rgb = Vec::with_capacity(row_len * height as usize);
        for y in 0..height as usize {
            let start = y * plane.stride;
            let row = plane
                .data
                .get(start..start + row_len)
                .ok_or_else(|| format!("HEIC plane truncated at row {y}"))?;
            rgb.extend_from_slice(row);
        }

        let buffer = image::RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| "HEIC plane size does not match dimensions".to_string())?;

        match request.target {
            TargetFormat::Jpeg => encode_jpeg(&buffer, request.quality),
        }
    }
}

fn encode_jpeg(buffer: &image::RgbImage, quality: f32) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality))
        .encode_image(buffer)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

/// Map 0.0..=1.0 onto the encoder's 1..=100 scale.
fn jpeg_quality(quality: f32) -> u8 {
    ((quality.clamp(0.0, 1.0) * 100.0).round() as u8).max(1)
}
