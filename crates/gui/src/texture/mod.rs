//! Texture binding: image resource → decoded texture → every model surface.
//!
//! Decoding runs on the blocking pool and reports back over a channel that the
//! frame loop drains, so a slow decode never stalls rendering. Only the most
//! recently requested resource is ever applied.

mod decode;

use std::sync::Arc;

use shared::ResourceId;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::{CustomizerError, Result};
use crate::model::LoadedModel;
use crate::normalize::{ImageResource, ResourceStore};

pub use decode::TextureImage;

/// glTF UVs expect rows top-first, so uploads are never flipped.
pub const FLIP_Y: bool = false;

/// What [`TextureBinder::request`] did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindRequest {
    Started,
    AlreadyBound,
    AlreadyPending,
}

/// A finished background decode
#[derive(Debug)]
pub struct DecodeCompletion {
    pub resource: ResourceId,
    pub result: Result<TextureImage>,
}

pub struct TextureBinder {
    runtime: Handle,
    tx: UnboundedSender<DecodeCompletion>,
    rx: UnboundedReceiver<DecodeCompletion>,
    /// Resource whose texture is currently on the model
    bound: Option<ResourceId>,
    /// Latest requested resource that has not been applied yet
    pending: Option<ResourceId>,
    in_flight: usize,
}

impl TextureBinder {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            runtime,
            tx,
            rx,
            bound: None,
            pending: None,
            in_flight: 0,
        }
    }

    pub fn bound(&self) -> Option<ResourceId> {
        self.bound
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Forget what is bound (a freshly mounted model has no texture yet).
    pub fn reset(&mut self) {
        self.bound = None;
        self.pending = None;
    }

    /// Start decoding `resource` unless it is already bound or in flight.
    pub fn request(
        &mut self,
        resource: &ImageResource,
        store: &ResourceStore,
    ) -> Result<BindRequest> {
        if self.pending == Some(resource.id) {
            return Ok(BindRequest::AlreadyPending);
        }
        if self.pending.is_none() && self.bound == Some(resource.id) {
            return Ok(BindRequest::AlreadyBound);
        }

        let payload = store.fetch(&resource.url).ok_or_else(|| {
            CustomizerError::TextureDecode(format!("resource {} was released", resource.id))
        })?;

        self.pending = Some(resource.id);
        self.in_flight += 1;

        let id = resource.id;
        let tx = self.tx.clone();
        self.runtime.spawn_blocking(move || {
            let result = payload
                .into_bytes()
                .map_err(CustomizerError::TextureDecode)
                .and_then(|bytes| TextureImage::decode(id, &bytes, FLIP_Y));
            // Receiver lives as long as the binder; a closed channel means teardown.
            let _ = tx.send(DecodeCompletion {
                resource: id,
                result,
            });
        });

        tracing::debug!("Texture decode started for resource {id}");
        Ok(BindRequest::Started)
    }

    /// Drain finished decodes, dropping stale ones.
    pub fn poll(&mut self) -> Vec<DecodeCompletion> {
        let mut fresh = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(c) = self.accept(completion) {
                fresh.push(c);
            }
        }
        fresh
    }

    /// Wait for the next fresh decode. Returns None when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<DecodeCompletion> {
        while self.in_flight > 0 {
            let completion = self.rx.recv().await?;
            if let Some(c) = self.accept(completion) {
                return Some(c);
            }
        }
        None
    }

    fn accept(&mut self, completion: DecodeCompletion) -> Option<DecodeCompletion> {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.pending != Some(completion.resource) {
            tracing::debug!(
                "Dropping stale texture decode for resource {}",
                completion.resource
            );
            return None;
        }
        self.pending = None;
        Some(completion)
    }

    /// Put a decoded texture on every surface of the model.
    ///
    /// Returns the number of surfaces updated.
    pub fn apply(&mut self, model: &mut LoadedModel, texture: TextureImage) -> usize {
        let source = texture.source;
        let texture = Arc::new(texture);
        let mut updated = 0;
        for surface in model.surfaces_mut() {
            surface.material.set_texture(texture.clone());
            updated += 1;
        }
        self.bound = Some(source);
        tracing::info!(
            "Bound texture from resource {source} ({}x{}) to {updated} surfaces",
            texture.width,
            texture.height
        );
        updated
    }
}
