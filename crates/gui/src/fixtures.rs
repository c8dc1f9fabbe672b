//! Factory functions for creating test data.
//!
//! Provides encoded images, a small two-surface glTF model and a recording
//! HEIC converter, used by unit tests, the harness and the agent interface.

use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use shared::HEIC_MIME;

use crate::model::{AssetCache, LoadedModel, ModelAsset};
use crate::normalize::{ConversionRequest, HeicConverter, ImageSource};

/// Cache key the fixture model is mounted under
pub const QUAD_MODEL_KEY: &str = "fixture://quad.gltf";

// ── Images ──────────────────────────────────────────────────────

fn encode(img: image::DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .expect("in-memory image encoding cannot fail");
    out.into_inner()
}

/// Solid-color PNG.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    encode(img.into(), ImageFormat::Png)
}

/// 1x2 PNG with distinct top and bottom rows, for orientation checks.
pub fn two_row_png(top: [u8; 4], bottom: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_fn(1, 2, |_, y| if y == 0 { Rgba(top) } else { Rgba(bottom) });
    encode(img.into(), ImageFormat::Png)
}

/// Solid-color JPEG.
pub fn jpeg_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    encode(img.into(), ImageFormat::Jpeg)
}

pub fn png_source(name: &str, rgba: [u8; 4]) -> ImageSource {
    ImageSource::new(name, "image/png", png_bytes(4, 4, rgba))
}

/// A source labelled HEIC. The bytes are opaque to [`RecordingConverter`].
pub fn heic_source(name: &str) -> ImageSource {
    ImageSource::new(name, HEIC_MIME, b"ftypheic-fixture".to_vec())
}

// ── HEIC converter ──────────────────────────────────────────────

/// Fake converter that records every request.
///
/// A succeeding instance returns a real 2x2 JPEG so the result decodes.
pub struct RecordingConverter {
    calls: Mutex<Vec<ConversionRequest>>,
    fail: bool,
}

impl RecordingConverter {
    pub fn succeeding() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<ConversionRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl HeicConverter for RecordingConverter {
    fn convert(&self, _heic: &[u8], request: ConversionRequest) -> Result<Vec<u8>, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }
        if self.fail {
            Err("unsupported HEIC variant".to_string())
        } else {
            Ok(jpeg_bytes(2, 2, [200, 30, 30]))
        }
    }
}

// ── Model ───────────────────────────────────────────────────────

/// Corners of one quad surface in the XY plane at depth `z`
fn quad_positions(z: f32) -> [[f32; 3]; 4] {
    [
        [-0.5, -1.0, z],
        [0.5, -1.0, z],
        [0.5, 1.0, z],
        [-0.5, 1.0, z],
    ]
}

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
/// Bytes per surface: 4 positions + 4 UVs + 6 u16 indices
const SURFACE_BYTES: usize = 48 + 32 + 12;

/// glTF JSON with two quad surfaces ("front" and "back") and an embedded buffer.
pub fn quad_model_gltf() -> String {
    let surfaces = [("front", 0.05f32), ("back", -0.05f32)];

    let mut buffer = Vec::with_capacity(SURFACE_BYTES * surfaces.len());
    let mut views = Vec::new();
    let mut accessors = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();

    for (i, (name, z)) in surfaces.iter().enumerate() {
        let base = buffer.len();
        for p in quad_positions(*z) {
            for c in p {
                buffer.extend_from_slice(&c.to_le_bytes());
            }
        }
        for uv in QUAD_UVS {
            for c in uv {
                buffer.extend_from_slice(&c.to_le_bytes());
            }
        }
        for idx in QUAD_INDICES {
            buffer.extend_from_slice(&idx.to_le_bytes());
        }

        let view = views.len();
        views.push(serde_json::json!({ "buffer": 0, "byteOffset": base, "byteLength": 48, "target": 34962 }));
        views.push(serde_json::json!({ "buffer": 0, "byteOffset": base + 48, "byteLength": 32, "target": 34962 }));
        views.push(serde_json::json!({ "buffer": 0, "byteOffset": base + 80, "byteLength": 12, "target": 34963 }));

        let acc = accessors.len();
        accessors.push(serde_json::json!({
            "bufferView": view, "componentType": 5126, "count": 4, "type": "VEC3",
            "min": [-0.5, -1.0, z], "max": [0.5, 1.0, z]
        }));
        accessors.push(serde_json::json!({
            "bufferView": view + 1, "componentType": 5126, "count": 4, "type": "VEC2"
        }));
        accessors.push(serde_json::json!({
            "bufferView": view + 2, "componentType": 5123, "count": 6, "type": "SCALAR"
        }));

        meshes.push(serde_json::json!({
            "name": name,
            "primitives": [{
                "attributes": { "POSITION": acc, "TEXCOORD_0": acc + 1 },
                "indices": acc + 2,
                "material": 0
            }]
        }));
        nodes.push(serde_json::json!({ "mesh": i }));
    }

    let uri = format!(
        "data:application/octet-stream;base64,{}",
        STANDARD.encode(&buffer)
    );

    serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": nodes,
        "meshes": meshes,
        "materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [0.9, 0.9, 0.9, 1.0] } }],
        "accessors": accessors,
        "bufferViews": views,
        "buffers": [{ "byteLength": buffer.len(), "uri": uri }]
    })
    .to_string()
}

/// glTF JSON with one unnamed triangle primitive using the given indices.
///
/// Indices past 2 point outside the three-vertex position buffer.
pub fn triangle_gltf(indices: &[u16]) -> String {
    let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    let mut buffer = Vec::new();
    for p in positions {
        for c in p {
            buffer.extend_from_slice(&c.to_le_bytes());
        }
    }
    for idx in indices {
        buffer.extend_from_slice(&idx.to_le_bytes());
    }
    // Keep the buffer 4-byte aligned
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }

    let uri = format!(
        "data:application/octet-stream;base64,{}",
        STANDARD.encode(&buffer)
    );

    serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
            },
            { "bufferView": 1, "componentType": 5123, "count": indices.len(), "type": "SCALAR" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": indices.len() * 2, "target": 34963 }
        ],
        "buffers": [{ "byteLength": buffer.len(), "uri": uri }]
    })
    .to_string()
}

/// The fixture model parsed into an asset.
pub fn quad_model_asset() -> ModelAsset {
    let mut cache = AssetCache::new();
    let asset = cache
        .load_slice(Path::new(QUAD_MODEL_KEY), quad_model_gltf().as_bytes())
        .expect("fixture glTF must parse");
    (*asset).clone()
}

/// The fixture model mounted with fresh materials.
pub fn quad_model() -> LoadedModel {
    LoadedModel::from_asset(&quad_model_asset())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_fixture_decodes() {
        let img = image::load_from_memory(&png_bytes(3, 2, [1, 2, 3, 255])).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn test_quad_model_has_two_surfaces() {
        let model = quad_model();
        let names: Vec<_> = model.surfaces().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["front", "back"]);
        assert!((model.bounds().size().y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_recording_converter_records() {
        let converter = RecordingConverter::failing();
        let request = ConversionRequest {
            target: crate::normalize::TargetFormat::Jpeg,
            quality: 0.5,
        };
        assert!(converter.convert(&[], request).is_err());
        assert_eq!(converter.calls(), vec![request]);
    }
}
