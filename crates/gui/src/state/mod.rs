pub mod image_slot;
pub mod loading;
pub mod rotation;
pub mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use shared::{DecodeStatus, ViewSnapshot};
use tokio::runtime::Handle;

use crate::error::Result;
use crate::interaction::{Action, InteractionController, StateChange};
use crate::lighting::LightingPreset;
use crate::model::{AssetCache, BindOutcome, ModelView};
use crate::normalize::{HeicConverter, ImageNormalizer, ImageResource, ImageSource};
use crate::normalize::ResourceStore;
use crate::upload::{UploadCompletion, UploadPipeline, UploadSeq};

pub use image_slot::{ImageObserver, ImageSlot};
pub use loading::LoadingGate;
pub use rotation::RotationState;
pub use settings::AppSettings;

/// What the customizer is busy with, for the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Idle,
    /// Reading and normalizing the named file
    Uploading(String),
    /// Decoding the texture for the current image
    Decoding,
}

/// Combined application state
///
/// Owns the splash gate, the current image and its backing store, the model
/// view and the upload pipeline. All mutation goes through the action methods
/// below; background work reports back through [`AppState::poll`].
pub struct AppState {
    pub settings: AppSettings,
    pub lighting: LightingPreset,
    loading: LoadingGate,
    rotation: RotationState,
    controller: InteractionController,
    image: ImageSlot,
    store: ResourceStore,
    model_view: ModelView,
    assets: AssetCache,
    uploads: UploadPipeline,
    /// Name of the latest submitted upload while it is in flight
    pending_upload: Option<String>,
    last_error: Option<String>,
}

impl AppState {
    pub fn new(
        settings: AppSettings,
        runtime: Handle,
        converter: Arc<dyn HeicConverter>,
        now: Instant,
    ) -> Self {
        let normalizer = ImageNormalizer::new(converter, settings.upload.heic_quality);
        Self {
            lighting: LightingPreset::resolve(&settings.lighting.preset),
            loading: LoadingGate::new(now, settings.splash_delay()),
            rotation: RotationState::default(),
            controller: InteractionController::new(settings.interaction.rotation_step),
            image: ImageSlot::default(),
            store: ResourceStore::new(),
            model_view: ModelView::new(runtime.clone(), settings.model.clone(), settings.spring),
            assets: AssetCache::new(),
            uploads: UploadPipeline::new(runtime, normalizer),
            pending_upload: None,
            last_error: None,
            settings,
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn model_view(&self) -> &ModelView {
        &self.model_view
    }

    pub fn model_view_mut(&mut self) -> &mut ModelView {
        &mut self.model_view
    }

    pub fn current_image(&self) -> Option<&ImageResource> {
        self.image.current()
    }

    pub fn live_resources(&self) -> usize {
        self.store.live_count()
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn activity(&self) -> Activity {
        if let Some(name) = &self.pending_upload {
            return Activity::Uploading(name.clone());
        }
        if self.model_view.decodes_in_flight() > 0 {
            return Activity::Decoding;
        }
        Activity::Idle
    }

    /// Uploads or decodes still running
    pub fn is_busy(&self) -> bool {
        self.uploads.in_flight() > 0 || self.model_view.decodes_in_flight() > 0
    }

    // ── Actions ──────────────────────────────────────────────

    pub fn dispatch(&mut self, action: Action) {
        match self.controller.translate(self.rotation, action) {
            StateChange::Rotation(rotation) => self.rotation = rotation,
            StateChange::Hover(hovered) => self.model_view.set_hovered(hovered),
        }
    }

    /// File chooser result. A cancelled dialog (`None`) changes nothing.
    pub fn select_file(&mut self, path: Option<PathBuf>) -> Option<UploadSeq> {
        let path = path?;
        self.pending_upload = Some(file_name(&path));
        Some(self.uploads.submit_path(path))
    }

    pub fn select_source(&mut self, source: ImageSource) -> UploadSeq {
        self.pending_upload = Some(source.name.clone());
        self.uploads.submit_source(source)
    }

    /// Advance the splash gate; mounts the configured model when it opens.
    ///
    /// Returns true on the frame the gate opens.
    pub fn advance(&mut self, now: Instant) -> bool {
        if !self.loading.update(now) {
            return false;
        }
        if self.model_view.model().is_none() && self.model_view.load_error().is_none() {
            let path = self.settings.model.path.clone();
            // Failure is kept on the model view and shown instead of the viewport
            let _ = self.mount_model(&path);
        }
        true
    }

    pub fn mount_model(&mut self, path: &Path) -> Result<()> {
        self.model_view
            .mount(&mut self.assets, path, self.image.current(), &self.store)
    }

    /// Mount an in-memory glTF/GLB, cached under `key`.
    pub fn mount_model_bytes(&mut self, key: &Path, bytes: &[u8]) -> Result<()> {
        self.model_view.mount_bytes(
            &mut self.assets,
            key,
            bytes,
            self.image.current(),
            &self.store,
        )
    }

    // ── Background results ───────────────────────────────────

    /// Apply everything that finished since the last frame.
    pub fn poll(&mut self) {
        for completion in self.uploads.poll() {
            self.complete_upload(completion);
        }
        for outcome in self.model_view.poll() {
            self.finish_bind(outcome);
        }
    }

    /// Wait until no upload or decode is in flight, applying results as they land.
    pub async fn settle(&mut self) {
        loop {
            if let Some(completion) = self.uploads.next_completion().await {
                self.complete_upload(completion);
                continue;
            }
            if let Some(outcome) = self.model_view.next_bind().await {
                self.finish_bind(outcome);
                continue;
            }
            break;
        }
    }

    /// Accept a finished upload if it is the latest one.
    ///
    /// Returns true when it became the current image.
    pub fn complete_upload(&mut self, completion: UploadCompletion) -> bool {
        if !self.uploads.is_current(completion.seq) {
            tracing::debug!(
                "Dropping stale upload #{} ({})",
                completion.seq,
                completion.name
            );
            return false;
        }
        self.pending_upload = None;

        match completion.result {
            Ok(image) => {
                let resource = self.store.register(image);
                tracing::info!(
                    "Upload #{} ({}) ready as resource {}",
                    completion.seq,
                    completion.name,
                    resource.id
                );
                self.last_error = None;
                self.image
                    .replace(resource, &mut self.store, &mut self.model_view);
                true
            }
            Err(e) => {
                tracing::warn!("Upload {} failed: {e}", completion.name);
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    fn finish_bind(&mut self, outcome: BindOutcome) {
        match outcome.result {
            Ok(_) => {
                self.image.set_status(outcome.resource, DecodeStatus::Ready);
            }
            Err(e) => {
                if self.image.set_status(outcome.resource, DecodeStatus::Failed) {
                    self.last_error = Some(e.to_string());
                }
            }
        }
    }

    /// Release every image resource; called once when the app closes.
    pub fn shutdown(&mut self) {
        self.image.clear(&mut self.store);
        let orphaned = self.store.live_count();
        if orphaned > 0 {
            tracing::debug!("Dropping {orphaned} orphaned image resources");
        }
        self.store.clear();
    }

    /// Advance per-frame animation.
    pub fn tick(&mut self, dt: f32) {
        self.model_view.tick(dt, &self.rotation);
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let image = self.image.current();
        ViewSnapshot {
            loading: self.loading.is_loading(),
            angle: self.rotation.angle,
            hovered: self.model_view.is_hovered(),
            transform: self.model_view.transform(),
            image: image.map(|r| r.meta()),
            surface_count: self
                .model_view
                .model()
                .map_or(0, |m| m.surfaces().len()),
            textured_surfaces: image.map_or(0, |r| self.model_view.textured_with(r.id)),
            last_error: self
                .last_error
                .clone()
                .or_else(|| self.model_view.load_error().map(str::to_string)),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{quad_model_gltf, RecordingConverter};
    use std::time::Duration;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn state(rt: &tokio::runtime::Runtime, now: Instant) -> AppState {
        AppState::new(
            AppSettings::default(),
            rt.handle().clone(),
            Arc::new(RecordingConverter::succeeding()),
            now,
        )
    }

    #[test]
    fn test_cancelled_selection_is_ignored() {
        let rt = runtime();
        let mut state = state(&rt, Instant::now());
        assert_eq!(state.select_file(None), None);
        assert!(!state.is_busy());
        assert_eq!(state.activity(), Activity::Idle);
    }

    #[test]
    fn test_advance_mounts_configured_model_once() {
        let rt = runtime();
        let start = Instant::now();
        let mut state = state(&rt, start);
        state.settings.model.path = PathBuf::from("/nonexistent/case.glb");

        assert!(!state.advance(start));
        assert!(state.is_loading());
        assert!(state.advance(start + Duration::from_millis(1000)));
        assert!(!state.is_loading());
        // Missing asset surfaces as an error instead of a model
        assert!(state.model_view().load_error().is_some());
        assert!(state.snapshot().last_error.is_some());
        assert!(!state.advance(start + Duration::from_secs(3)));
    }

    #[test]
    fn test_mounted_model_is_not_replaced_by_gate() {
        let rt = runtime();
        let start = Instant::now();
        let mut state = state(&rt, start);
        state
            .mount_model_bytes(Path::new("fixture://quad"), quad_model_gltf().as_bytes())
            .unwrap();
        state.advance(start + Duration::from_secs(2));
        assert_eq!(state.assets().loads(), 1);
        assert_eq!(state.snapshot().surface_count, 2);
        assert!(state.snapshot().last_error.is_none());
    }

    #[test]
    fn test_dispatch_routes_hover_to_model_view() {
        let rt = runtime();
        let mut state = state(&rt, Instant::now());
        state.dispatch(Action::PointerEnter);
        assert!(state.model_view().is_hovered());
        state.dispatch(Action::PointerLeave);
        assert!(!state.model_view().is_hovered());
    }
}
