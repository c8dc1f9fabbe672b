//! In-memory resource registry backing object URLs and data URLs.
//!
//! Every accepted upload allocates exactly one entry; the session releases the
//! previous entry when a new image supersedes it, so repeated uploads never
//! accumulate memory.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use shared::{DecodeStatus, ImageMeta, ResourceId};

use super::NormalizedImage;

const OBJECT_URL_PREFIX: &str = "blob:case-customizer/";

/// Handle to a registered image, loadable through [`ResourceStore::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
    pub id: ResourceId,
    pub mime: String,
    /// Size of the image payload (decoded bytes, not the URL text)
    pub byte_len: usize,
    pub url: String,
    pub status: DecodeStatus,
}

impl ImageResource {
    pub fn meta(&self) -> ImageMeta {
        ImageMeta {
            id: self.id,
            mime: self.mime.clone(),
            byte_len: self.byte_len,
            status: self.status,
        }
    }

    pub fn is_object_url(&self) -> bool {
        self.url.starts_with(OBJECT_URL_PREFIX)
    }
}

/// Payload behind a URL, cheap to clone into a background task.
#[derive(Debug, Clone)]
pub enum ResourcePayload {
    Blob(Arc<[u8]>),
    Data(Arc<str>),
}

impl ResourcePayload {
    /// Raw image bytes (data URLs are base64-decoded here, off the UI thread).
    pub fn into_bytes(self) -> Result<Vec<u8>, String> {
        match self {
            ResourcePayload::Blob(bytes) => Ok(bytes.to_vec()),
            ResourcePayload::Data(url) => decode_data_url(&url).map(|(_, bytes)| bytes),
        }
    }
}

/// Registry of live image resources keyed by id and URL.
#[derive(Default)]
pub struct ResourceStore {
    next_id: ResourceId,
    entries: HashMap<ResourceId, (String, ResourcePayload)>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a resource for a normalized image and return its handle.
    pub fn register(&mut self, image: NormalizedImage) -> ImageResource {
        self.next_id += 1;
        let id = self.next_id;

        let (mime, byte_len, url, payload) = match image {
            NormalizedImage::Blob { mime, bytes } => {
                let url = format!("{OBJECT_URL_PREFIX}{}", uuid::Uuid::new_v4());
                let byte_len = bytes.len();
                (mime, byte_len, url, ResourcePayload::Blob(bytes.into()))
            }
            NormalizedImage::DataUrl {
                mime,
                url,
                byte_len,
            } => {
                let payload = ResourcePayload::Data(Arc::from(url.as_str()));
                (mime, byte_len, url, payload)
            }
        };

        self.entries.insert(id, (url.clone(), payload));
        tracing::debug!("Registered image resource {id} ({mime}, {byte_len} bytes)");

        ImageResource {
            id,
            mime,
            byte_len,
            url,
            status: DecodeStatus::Pending,
        }
    }

    /// Release a resource. Returns false if it was already gone.
    pub fn release(&mut self, id: ResourceId) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed {
            tracing::debug!("Released image resource {id}");
        }
        removed
    }

    /// Look up the payload behind a URL.
    pub fn fetch(&self, url: &str) -> Option<ResourcePayload> {
        self.entries
            .values()
            .find(|(u, _)| u == url)
            .map(|(_, payload)| payload.clone())
    }

    /// Number of resources currently allocated
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Data URLs ────────────────────────────────────────────────

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 data URL into (mime, bytes).
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_string())?;
    let (mime, data) = rest
        .split_once(";base64,")
        .ok_or_else(|| "data URL is not base64-encoded".to_string())?;
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| format!("invalid base64 payload: {e}"))?;
    Ok((mime.to_string(), bytes))
}
