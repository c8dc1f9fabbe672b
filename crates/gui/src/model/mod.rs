//! The displayed phone-case model: geometry, materials, hover scale and framing.

mod asset;
mod framing;
mod spring;

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use shared::{ModelTransform, ResourceId};
use tokio::runtime::Handle;

use crate::error::{CustomizerError, Result};
use crate::normalize::{ImageResource, ResourceStore};
use crate::state::image_slot::ImageObserver;
use crate::state::rotation::RotationState;
use crate::state::settings::ModelSettings;
use crate::texture::{DecodeCompletion, TextureBinder, TextureImage};
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::{ray_hits_model, Aabb, Ray};

pub use asset::{AssetCache, ModelAsset, SurfaceGeometry};
pub use framing::Framing;
pub use spring::{Spring, SpringConfig};

// ── Materials & surfaces ─────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Material {
    pub base_color: [f32; 4],
    pub texture: Option<Arc<TextureImage>>,
    /// Set when the texture changed and the GPU copy is out of date
    pub needs_update: bool,
    /// Bumped on every texture change
    pub version: u64,
}

impl Material {
    pub fn new(base_color: [f32; 4]) -> Self {
        Self {
            base_color,
            texture: None,
            needs_update: false,
            version: 0,
        }
    }

    pub fn set_texture(&mut self, texture: Arc<TextureImage>) {
        self.texture = Some(texture);
        self.needs_update = true;
        self.version += 1;
    }

    pub fn texture_source(&self) -> Option<ResourceId> {
        self.texture.as_ref().map(|t| t.source)
    }
}

#[derive(Debug, Clone)]
pub struct Surface {
    pub name: String,
    pub mesh: Arc<MeshData>,
    pub material: Material,
}

/// A mounted instance of a [`ModelAsset`] with its own materials.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    surfaces: Vec<Surface>,
    bounds: Aabb,
    pub transform: ModelTransform,
}

impl LoadedModel {
    pub fn from_asset(asset: &ModelAsset) -> Self {
        let surfaces = asset
            .surfaces
            .iter()
            .map(|g| Surface {
                name: g.name.clone(),
                mesh: g.mesh.clone(),
                material: Material::new(g.base_color),
            })
            .collect();
        Self {
            surfaces,
            bounds: asset.bounds,
            transform: ModelTransform::default(),
        }
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surfaces_mut(&mut self) -> &mut [Surface] {
        &mut self.surfaces
    }

    /// Model-space bounds
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.transform.yaw)
            * Mat4::from_scale(Vec3::splat(self.transform.scale))
    }

    /// Resource each surface is textured with, in surface order
    pub fn texture_sources(&self) -> Vec<Option<ResourceId>> {
        self.surfaces
            .iter()
            .map(|s| s.material.texture_source())
            .collect()
    }

    /// Indices of surfaces whose material changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<usize> {
        let mut dirty = Vec::new();
        for (i, surface) in self.surfaces.iter_mut().enumerate() {
            if surface.material.needs_update {
                surface.material.needs_update = false;
                dirty.push(i);
            }
        }
        dirty
    }

    pub fn hit_test(&self, ray: &Ray) -> bool {
        ray_hits_model(
            ray,
            &self.model_matrix(),
            &self.bounds,
            self.surfaces.iter().map(|s| s.mesh.as_ref()),
        )
    }
}

// ── ModelView ────────────────────────────────────────────────

/// Result of binding one image resource to the model
#[derive(Debug)]
pub struct BindOutcome {
    pub resource: ResourceId,
    /// Number of surfaces textured
    pub result: Result<usize>,
}

/// Owns the mounted model, hover state and eased scale.
pub struct ModelView {
    settings: ModelSettings,
    model: Option<LoadedModel>,
    load_error: Option<String>,
    /// Bumped on every successful mount; the camera refits when it changes
    load_generation: u64,
    binder: TextureBinder,
    /// Request failures waiting to be reported by the next poll
    failed: VecDeque<BindOutcome>,
    hovered: bool,
    scale: Spring,
    transform: ModelTransform,
}

impl ModelView {
    pub fn new(runtime: Handle, settings: ModelSettings, spring: SpringConfig) -> Self {
        let scale = Spring::new(spring, settings.base_scale);
        let transform = ModelTransform {
            yaw: 0.0,
            scale: settings.base_scale,
        };
        Self {
            settings,
            model: None,
            load_error: None,
            load_generation: 0,
            binder: TextureBinder::new(runtime),
            failed: VecDeque::new(),
            hovered: false,
            scale,
            transform,
        }
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut LoadedModel> {
        self.model.as_mut()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn load_generation(&self) -> u64 {
        self.load_generation
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn transform(&self) -> ModelTransform {
        self.transform
    }

    pub fn decodes_in_flight(&self) -> usize {
        self.binder.in_flight()
    }

    /// Load the model at `path` through the cache and mount it.
    ///
    /// `current` is the image already selected, bound as soon as the mesh is ready.
    pub fn mount(
        &mut self,
        cache: &mut AssetCache,
        path: &Path,
        current: Option<&ImageResource>,
        store: &ResourceStore,
    ) -> Result<()> {
        let loaded = cache.load(path);
        self.finish_load(loaded, current, store)
    }

    /// Like [`Self::mount`] for an in-memory glTF/GLB cached under `key`.
    pub fn mount_bytes(
        &mut self,
        cache: &mut AssetCache,
        key: &Path,
        bytes: &[u8],
        current: Option<&ImageResource>,
        store: &ResourceStore,
    ) -> Result<()> {
        let loaded = cache.load_slice(key, bytes);
        self.finish_load(loaded, current, store)
    }

    fn finish_load(
        &mut self,
        loaded: Result<Arc<ModelAsset>>,
        current: Option<&ImageResource>,
        store: &ResourceStore,
    ) -> Result<()> {
        match loaded {
            Ok(asset) => {
                self.mount_asset(&asset, current, store);
                Ok(())
            }
            Err(e) => {
                tracing::error!("{e}");
                self.model = None;
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn mount_asset(
        &mut self,
        asset: &ModelAsset,
        current: Option<&ImageResource>,
        store: &ResourceStore,
    ) {
        let mut model = LoadedModel::from_asset(asset);
        model.transform = self.transform;
        self.model = Some(model);
        self.load_error = None;
        self.load_generation += 1;
        self.binder.reset();

        if let Some(resource) = current {
            self.request_bind(resource, store);
        }
    }

    fn request_bind(&mut self, resource: &ImageResource, store: &ResourceStore) {
        if let Err(e) = self.binder.request(resource, store) {
            tracing::warn!("Texture bind for resource {} failed: {e}", resource.id);
            self.failed.push_back(BindOutcome {
                resource: resource.id,
                result: Err(e),
            });
        }
    }

    /// The only hover trigger: pointer enter (true) / leave (false).
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
        self.scale.set_target(if hovered {
            self.settings.hover_scale
        } else {
            self.settings.base_scale
        });
    }

    /// Hover scale still moving
    pub fn is_animating(&self) -> bool {
        !self.scale.is_settled()
    }

    /// Advance the scale spring and pick up the latest rotation.
    pub fn tick(&mut self, dt: f32, rotation: &RotationState) {
        let scale = self.scale.step(dt);
        self.transform = ModelTransform {
            yaw: rotation.angle + self.settings.reveal_offset,
            scale,
        };
        if let Some(model) = self.model.as_mut() {
            model.transform = self.transform;
        }
    }

    /// Apply finished decodes to the model.
    pub fn poll(&mut self) -> Vec<BindOutcome> {
        let mut outcomes: Vec<BindOutcome> = self.failed.drain(..).collect();
        for completion in self.binder.poll() {
            outcomes.push(self.complete(completion));
        }
        outcomes
    }

    /// Wait for the next bind to finish. Returns None when nothing is pending.
    pub async fn next_bind(&mut self) -> Option<BindOutcome> {
        if let Some(outcome) = self.failed.pop_front() {
            return Some(outcome);
        }
        let completion = self.binder.next_completion().await?;
        Some(self.complete(completion))
    }

    fn complete(&mut self, completion: DecodeCompletion) -> BindOutcome {
        let resource = completion.resource;
        let result = match (completion.result, self.model.as_mut()) {
            (Ok(texture), Some(model)) => Ok(self.binder.apply(model, texture)),
            (Ok(_), None) => Err(CustomizerError::TextureDecode(
                "no model mounted".to_string(),
            )),
            (Err(e), _) => {
                tracing::warn!("Texture decode for resource {resource} failed: {e}");
                Err(e)
            }
        };
        BindOutcome { resource, result }
    }

    /// Camera framing for the mounted model at its resting scale.
    pub fn framing(&self, fov_y: f32, aspect: f32) -> Option<Framing> {
        self.model.as_ref().map(|model| {
            Framing::fit(
                model.bounds(),
                self.settings.base_scale,
                fov_y,
                aspect,
                self.settings.fit_margin,
            )
        })
    }

    /// Surfaces currently textured with `resource`
    pub fn textured_with(&self, resource: ResourceId) -> usize {
        self.model.as_ref().map_or(0, |m| {
            m.surfaces()
                .iter()
                .filter(|s| s.material.texture_source() == Some(resource))
                .count()
        })
    }
}

impl ImageObserver for ModelView {
    fn image_changed(&mut self, resource: &ImageResource, store: &ResourceStore) {
        // Without a mesh the bind happens at mount time
        if self.model.is_some() {
            self.request_bind(resource, store);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{quad_model, quad_model_asset};
    use std::f32::consts::PI;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn view(rt: &tokio::runtime::Runtime) -> ModelView {
        ModelView::new(
            rt.handle().clone(),
            ModelSettings::default(),
            SpringConfig::default(),
        )
    }

    #[test]
    fn test_tick_applies_reveal_offset() {
        let rt = runtime();
        let mut view = view(&rt);
        view.mount_asset(&quad_model_asset(), None, &ResourceStore::new());
        view.tick(0.016, &RotationState { angle: PI });
        let t = view.model().unwrap().transform;
        assert!((t.yaw - (PI + 0.08)).abs() < 1e-6);
        assert!((t.scale - 1.6).abs() < 1e-6);
    }

    #[test]
    fn test_hover_drives_scale_toward_targets() {
        let rt = runtime();
        let mut view = view(&rt);
        let rotation = RotationState::default();

        view.set_hovered(true);
        for _ in 0..60 {
            view.tick(1.0 / 60.0, &rotation);
        }
        assert!((view.transform().scale - 1.7).abs() < 0.001);

        view.set_hovered(false);
        for _ in 0..60 {
            view.tick(1.0 / 60.0, &rotation);
        }
        assert!((view.transform().scale - 1.6).abs() < 0.001);
    }

    #[test]
    fn test_mount_bumps_generation_and_frames() {
        let rt = runtime();
        let mut view = view(&rt);
        assert!(view.framing(1.0, 1.0).is_none());
        view.mount_asset(&quad_model_asset(), None, &ResourceStore::new());
        assert_eq!(view.load_generation(), 1);
        let framing = view.framing(50f32.to_radians(), 1.5).unwrap();
        assert!(framing.distance > 0.0);
    }

    #[test]
    fn test_mount_failure_records_error() {
        let rt = runtime();
        let mut view = view(&rt);
        let mut cache = AssetCache::new();
        let result = view.mount(
            &mut cache,
            Path::new("/nonexistent/model.glb"),
            None,
            &ResourceStore::new(),
        );
        assert!(result.is_err());
        assert!(view.model().is_none());
        assert!(view.load_error().is_some());
    }

    #[test]
    fn test_take_dirty_clears_flags() {
        let mut model = quad_model();
        let texture = Arc::new(TextureImage {
            source: 3,
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
            flipped_y: false,
        });
        for surface in model.surfaces_mut() {
            surface.material.set_texture(texture.clone());
        }
        assert_eq!(model.take_dirty().len(), model.surfaces().len());
        assert!(model.take_dirty().is_empty());
        assert_eq!(model.texture_sources(), vec![Some(3); model.surfaces().len()]);
    }

    #[test]
    fn test_hit_test_follows_scale() {
        let mut model = quad_model();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::NEG_Z,
        };
        assert!(model.hit_test(&ray));
        model.transform.scale = 1.6;
        let edge = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0) + Vec3::new(5.0, 0.0, 0.0),
            direction: Vec3::NEG_Z,
        };
        assert!(!model.hit_test(&edge));
    }
}
