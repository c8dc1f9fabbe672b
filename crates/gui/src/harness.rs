//! Headless test harness for driving the customizer without a window.
//!
//! Owns its own tokio runtime, a recording HEIC converter and the fixture
//! model, so tests and scripted agents can exercise the full upload → decode →
//! bind pipeline deterministically.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::{ResourceId, ViewSnapshot};

use crate::fixtures::{self, RecordingConverter, QUAD_MODEL_KEY};
use crate::interaction::Action;
use crate::normalize::{ConversionRequest, ImageSource};
use crate::state::{AppSettings, AppState};
use crate::upload::UploadSeq;
use crate::validation::MeshValidator;

/// Simulated frame length used by [`TestHarness::tick`]
const FRAME: f32 = 1.0 / 60.0;

/// Headless customizer: app state, runtime, fake converter and a manual clock
pub struct TestHarness {
    runtime: tokio::runtime::Runtime,
    converter: Arc<RecordingConverter>,
    state: AppState,
    clock: Instant,
}

impl TestHarness {
    /// Fixture model mounted, splash gate already open, converter succeeding.
    pub fn new() -> Self {
        Self::with_converter(RecordingConverter::succeeding())
    }

    /// Like [`Self::new`] but with a converter that rejects every HEIC file.
    pub fn with_failing_converter() -> Self {
        Self::with_converter(RecordingConverter::failing())
    }

    fn with_converter(converter: RecordingConverter) -> Self {
        let mut harness = Self::at_startup(AppSettings::default(), converter);
        harness
            .state
            .mount_model_bytes(Path::new(QUAD_MODEL_KEY), fixtures::quad_model_gltf().as_bytes())
            .expect("fixture model must mount");
        let delay = harness.state.settings.splash_delay();
        harness.advance_clock(delay);
        harness
    }

    /// Fresh state at startup: gate closed, nothing mounted.
    pub fn at_startup(settings: AppSettings, converter: RecordingConverter) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("failed to build test runtime");
        let converter = Arc::new(converter);
        let clock = Instant::now();
        let state = AppState::new(settings, runtime.handle().clone(), converter.clone(), clock);
        Self {
            runtime,
            converter,
            state,
            clock,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    // ── Clock ─────────────────────────────────────────────────

    /// Move the manual clock forward and advance the splash gate.
    ///
    /// Returns true if the gate opened.
    pub fn advance_clock(&mut self, by: Duration) -> bool {
        self.clock += by;
        self.state.advance(self.clock)
    }

    // ── Actions ───────────────────────────────────────────────

    pub fn rotate_left(&mut self) {
        self.state.dispatch(Action::RotateLeft);
    }

    pub fn rotate_right(&mut self) {
        self.state.dispatch(Action::RotateRight);
    }

    pub fn hover_enter(&mut self) {
        self.state.dispatch(Action::PointerEnter);
    }

    pub fn hover_leave(&mut self) {
        self.state.dispatch(Action::PointerLeave);
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state.dispatch(action);
    }

    /// Submit an upload without waiting for it.
    pub fn upload(&mut self, source: ImageSource) -> UploadSeq {
        self.state.select_source(source)
    }

    pub fn upload_png(&mut self, name: &str, rgba: [u8; 4]) -> UploadSeq {
        self.upload(fixtures::png_source(name, rgba))
    }

    pub fn upload_heic(&mut self, name: &str) -> UploadSeq {
        self.upload(fixtures::heic_source(name))
    }

    pub fn upload_path(&mut self, path: impl Into<PathBuf>) -> Option<UploadSeq> {
        self.state.select_file(Some(path.into()))
    }

    /// Block until every upload and decode has been applied.
    pub fn settle(&mut self) {
        self.runtime.block_on(self.state.settle());
    }

    /// Run `seconds` of simulated frames (poll + animate).
    pub fn tick(&mut self, seconds: f32) {
        let mut remaining = seconds;
        while remaining > 0.0 {
            let dt = remaining.min(FRAME);
            self.state.poll();
            self.state.tick(dt);
            remaining -= dt;
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn angle(&self) -> f32 {
        self.state.rotation().angle
    }

    pub fn scale(&self) -> f32 {
        self.state.model_view().transform().scale
    }

    pub fn yaw(&self) -> f32 {
        self.state.model_view().transform().yaw
    }

    /// Texture source of every surface, in surface order
    pub fn surface_sources(&self) -> Vec<Option<ResourceId>> {
        self.state
            .model_view()
            .model()
            .map(|m| m.texture_sources())
            .unwrap_or_default()
    }

    pub fn current_image_id(&self) -> Option<ResourceId> {
        self.state.current_image().map(|r| r.id)
    }

    pub fn converter_calls(&self) -> Vec<ConversionRequest> {
        self.converter.calls()
    }

    pub fn live_resources(&self) -> usize {
        self.state.live_resources()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.snapshot()
    }

    /// Validation errors across all surfaces, prefixed with the surface name
    pub fn validate_surfaces(&self) -> Vec<String> {
        let Some(model) = self.state.model_view().model() else {
            return vec!["no model mounted".to_string()];
        };
        model
            .surfaces()
            .iter()
            .flat_map(|s| {
                MeshValidator::new(&s.mesh)
                    .validate_all()
                    .into_iter()
                    .map(move |e| format!("{}: {e}", s.name))
            })
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
