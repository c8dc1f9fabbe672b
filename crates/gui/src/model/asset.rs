//! glTF asset loading with a per-path cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Mat4;

use crate::error::{CustomizerError, Result};
use crate::validation::MeshValidator;
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

/// One paintable primitive of the asset, in model space.
#[derive(Debug, Clone)]
pub struct SurfaceGeometry {
    pub name: String,
    pub mesh: Arc<MeshData>,
    pub base_color: [f32; 4],
}

/// Parsed, immutable glTF geometry shared between mounts.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub surfaces: Vec<SurfaceGeometry>,
    pub bounds: Aabb,
}

/// Parses each asset at most once.
#[derive(Default)]
pub struct AssetCache {
    assets: HashMap<PathBuf, Arc<ModelAsset>>,
    loads: usize,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times an asset was actually parsed
    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.assets.contains_key(path)
    }

    /// Load a glTF/GLB file, or return the cached copy.
    pub fn load(&mut self, path: &Path) -> Result<Arc<ModelAsset>> {
        if let Some(asset) = self.assets.get(path) {
            return Ok(asset.clone());
        }

        let (doc, buffers, _images) = gltf::import(path).map_err(|e| asset_error(path, e))?;
        let asset = Arc::new(build_asset(path, &doc, &buffers)?);
        self.insert(path, asset.clone());
        Ok(asset)
    }

    /// Load an in-memory glTF/GLB under `key`, or return the cached copy.
    pub fn load_slice(&mut self, key: &Path, bytes: &[u8]) -> Result<Arc<ModelAsset>> {
        if let Some(asset) = self.assets.get(key) {
            return Ok(asset.clone());
        }

        let (doc, buffers, _images) = gltf::import_slice(bytes).map_err(|e| asset_error(key, e))?;
        let asset = Arc::new(build_asset(key, &doc, &buffers)?);
        self.insert(key, asset.clone());
        Ok(asset)
    }

    fn insert(&mut self, path: &Path, asset: Arc<ModelAsset>) {
        self.loads += 1;
        tracing::info!(
            "Loaded model {} ({} surfaces)",
            path.display(),
            asset.surfaces.len()
        );
        self.assets.insert(path.to_path_buf(), asset);
    }
}

fn asset_error(path: &Path, reason: impl ToString) -> CustomizerError {
    CustomizerError::AssetLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn build_asset(path: &Path, doc: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<ModelAsset> {
    let mut surfaces = Vec::new();

    let scene = doc.default_scene().or_else(|| doc.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(path, &node, Mat4::IDENTITY, buffers, &mut surfaces)?;
            }
        }
        // No scene: take meshes as-is
        None => {
            for mesh in doc.meshes() {
                collect_mesh(path, &mesh, &Mat4::IDENTITY, buffers, &mut surfaces)?;
            }
        }
    }

    if surfaces.is_empty() {
        return Err(asset_error(path, "no triangle primitives"));
    }

    let bounds = surfaces
        .iter()
        .fold(Aabb::EMPTY, |acc, s| acc.union(&Aabb::from_mesh(&s.mesh)));

    Ok(ModelAsset { surfaces, bounds })
}

fn collect_node(
    path: &Path,
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<SurfaceGeometry>,
) -> Result<()> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        collect_mesh(path, &mesh, &world, buffers, out)?;
    }
    for child in node.children() {
        collect_node(path, &child, world, buffers, out)?;
    }
    Ok(())
}

fn collect_mesh(
    path: &Path,
    mesh: &gltf::Mesh,
    world: &Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<SurfaceGeometry>,
) -> Result<()> {
    for (i, prim) in mesh.primitives().enumerate() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            tracing::debug!("Skipping non-triangle primitive {i} of mesh {:?}", mesh.name());
            continue;
        }

        let reader = prim.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|n| n.collect())
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uv| uv.into_f32().collect())
            .unwrap_or_default();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        if positions.is_empty() || indices.len() < 3 {
            continue;
        }

        let name = match (mesh.name(), mesh.primitives().len()) {
            (Some(name), 1) => name.to_string(),
            (Some(name), _) => format!("{name}.{i}"),
            (None, _) => format!("surface_{}", out.len()),
        };

        let mesh_data = MeshData::from_parts(&positions, &normals, &uvs, indices);
        let validator = MeshValidator::new(&mesh_data);
        if !validator.is_index_stride_valid() || !validator.are_indices_in_range() {
            return Err(asset_error(
                path,
                format!(
                    "surface {name}: indices out of range for {} vertices",
                    validator.vertex_count()
                ),
            ));
        }

        let material = prim.material();
        let mesh_data = mesh_data.transformed(world);

        out.push(SurfaceGeometry {
            name,
            mesh: Arc::new(mesh_data),
            base_color: material.pbr_metallic_roughness().base_color_factor(),
        });
    }
    Ok(())
}
