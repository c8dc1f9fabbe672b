use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use glow::HasContext;
use shared::ResourceId;

use case_customizer_lib::texture::TextureImage;

use super::mesh::{MeshData, VERTEX_STRIDE};

// ── Render parameters ────────────────────────────────────────

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    /// Camera view-projection
    pub view_projection: glam::Mat4,
    /// Model placement (rotation + hover scale)
    pub model: glam::Mat4,
    /// Background color RGB
    pub bg_color: [u8; 3],
    pub ambient: f32,
    pub directional: f32,
    /// Direction the light comes from (world space, normalized)
    pub light_dir: glam::Vec3,
}

/// One surface as the UI thread sees it this frame
#[derive(Clone)]
pub struct SurfaceDraw {
    pub mesh: Arc<MeshData>,
    pub base_color: [f32; 4],
    pub texture: Option<Arc<TextureImage>>,
}

/// Texture work needed to bring the GPU cache in line with the bound surfaces
#[derive(Debug, Default, PartialEq)]
pub struct TextureSync {
    /// One image per source not yet on the GPU
    pub upload: Vec<Arc<TextureImage>>,
    /// Cached sources no surface samples any more
    pub release: Vec<ResourceId>,
}

/// Plan uploads for the `changed` draws and releases against the surfaces'
/// `bound` sources, given what is already `cached`.
pub fn plan_texture_sync<'a>(
    changed: impl IntoIterator<Item = &'a SurfaceDraw>,
    bound: &[Option<ResourceId>],
    cached: &HashSet<ResourceId>,
) -> TextureSync {
    let mut plan = TextureSync::default();
    let mut queued = HashSet::new();
    for image in changed.into_iter().filter_map(|d| d.texture.as_ref()) {
        if !cached.contains(&image.source) && queued.insert(image.source) {
            plan.upload.push(image.clone());
        }
    }

    let live: HashSet<ResourceId> = bound.iter().flatten().copied().collect();
    plan.release = cached.difference(&live).copied().collect();
    plan.release.sort_unstable();
    plan
}

// ── GPU handles ──────────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuSurface {
    mesh: GpuMesh,
    base_color: [f32; 4],
    /// Key into the shared texture cache
    texture: Option<ResourceId>,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    program: glow::Program,
    surfaces: Vec<GpuSurface>,
    /// One GPU texture per image resource, shared by every surface sampling it
    textures: HashMap<ResourceId, glow::Texture>,
    /// Surfaces whose material changed since the last sync
    dirty: BTreeSet<usize>,
    /// Model load generation the surfaces were uploaded from
    generation: u64,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Self {
        Self {
            program: compile_program(gl, MESH_VERT, MESH_FRAG),
            surfaces: Vec::new(),
            textures: HashMap::new(),
            dirty: BTreeSet::new(),
            generation: 0,
        }
    }

    /// Queue surfaces whose material changed; consumed by the next sync.
    pub fn mark_dirty(&mut self, surfaces: impl IntoIterator<Item = usize>) {
        self.dirty.extend(surfaces);
    }

    /// Bring GPU state in line with this frame's surfaces.
    ///
    /// Meshes are re-uploaded when the model generation changes. Textures are
    /// rebound for dirty surfaces and uploaded once per source.
    pub fn sync_surfaces(&mut self, gl: &glow::Context, generation: u64, draws: &[SurfaceDraw]) {
        if generation != self.generation || draws.len() != self.surfaces.len() {
            self.clear_meshes(gl);
            self.generation = generation;
            self.surfaces = draws
                .iter()
                .map(|d| GpuSurface {
                    mesh: upload_mesh(gl, &d.mesh),
                    base_color: d.base_color,
                    texture: None,
                })
                .collect();
            self.dirty = (0..draws.len()).collect();
        }
        if self.dirty.is_empty() {
            return;
        }

        let changed: Vec<&SurfaceDraw> = std::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|i| {
                let draw = draws.get(i)?;
                self.surfaces[i].texture = draw.texture.as_ref().map(|t| t.source);
                Some(draw)
            })
            .collect();
        let bound: Vec<Option<ResourceId>> = self.surfaces.iter().map(|s| s.texture).collect();
        let cached: HashSet<ResourceId> = self.textures.keys().copied().collect();
        let plan = plan_texture_sync(changed, &bound, &cached);

        for source in plan.release {
            if let Some(texture) = self.textures.remove(&source) {
                unsafe { gl.delete_texture(texture) };
            }
        }
        for image in plan.upload {
            self.textures.insert(image.source, upload_texture(gl, &image));
        }
    }

    fn clear_meshes(&mut self, gl: &glow::Context) {
        for surface in self.surfaces.drain(..) {
            unsafe {
                gl.delete_vertex_array(surface.mesh.vao);
                gl.delete_buffer(surface.mesh.vbo);
                gl.delete_buffer(surface.mesh.ibo);
            }
        }
    }

    fn clear_textures(&mut self, gl: &glow::Context) {
        for (_, texture) in self.textures.drain() {
            unsafe { gl.delete_texture(texture) };
        }
    }

    /// Render the model
    pub fn paint(&self, gl: &glow::Context, params: &RenderParams) {
        let [x, y, w, h] = params.viewport.map(|v| v as i32);
        let mvp = params.view_projection * params.model;

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(
                params.bg_color[0] as f32 / 255.0,
                params.bg_color[1] as f32 / 255.0,
                params.bg_color[2] as f32 / 255.0,
                1.0,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            gl.use_program(Some(self.program));
            set_uniform_mat4(gl, self.program, "u_mvp", &mvp);
            set_uniform_mat4(gl, self.program, "u_model", &params.model);
            set_uniform_vec3(gl, self.program, "u_light_dir", &params.light_dir);
            set_uniform_f32(gl, self.program, "u_ambient", params.ambient);
            set_uniform_f32(gl, self.program, "u_directional", params.directional);
            let sampler = gl.get_uniform_location(self.program, "u_texture");
            gl.uniform_1_i32(sampler.as_ref(), 0);

            for surface in &self.surfaces {
                let c = surface.base_color;
                let color_loc = gl.get_uniform_location(self.program, "u_base_color");
                gl.uniform_4_f32(color_loc.as_ref(), c[0], c[1], c[2], c[3]);
                let has_tex = gl.get_uniform_location(self.program, "u_has_texture");
                let texture = surface.texture.and_then(|id| self.textures.get(&id).copied());
                gl.uniform_1_i32(has_tex.as_ref(), texture.is_some() as i32);

                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, texture);
                draw_mesh(gl, &surface.mesh);
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        self.clear_meshes(gl);
        self.clear_textures(gl);
        unsafe { gl.delete_program(self.program) };
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> GpuMesh {
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (VERTEX_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // uv: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck_cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        }
    }
}

/// Upload RGBA8 rows as-is (first row at v = 0, no flip).
fn upload_texture(gl: &glow::Context, image: &TextureImage) -> glow::Texture {
    unsafe {
        let texture = gl.create_texture().unwrap();
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            image.width as i32,
            image.height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(&image.rgba)),
        );
        gl.generate_mipmap(glow::TEXTURE_2D);
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR_MIPMAP_LINEAR as i32,
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);

        tracing::debug!(
            "Uploaded {}x{} texture from resource {}",
            image.width,
            image.height,
            image.source
        );
        texture
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> glow::Program {
    unsafe {
        let program = gl.create_program().unwrap();

        let vert = gl.create_shader(glow::VERTEX_SHADER).unwrap();
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER).unwrap();
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
        }

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        program
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;
uniform mat4 u_model;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

out vec3 v_normal;
out vec2 v_uv;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = mat3(transpose(inverse(u_model))) * a_normal;
    v_uv = a_uv;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;
uniform float u_ambient;
uniform float u_directional;
uniform vec4 u_base_color;
uniform bool u_has_texture;
uniform sampler2D u_texture;

in vec3 v_normal;
in vec2 v_uv;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    float diffuse = abs(dot(n, u_light_dir));
    vec4 albedo = u_has_texture ? texture(u_texture, v_uv) : u_base_color;
    // 0.35 stands in for the environment map fill
    float light = min(u_ambient + diffuse * u_directional + 0.35, 1.0);
    frag_color = vec4(albedo.rgb * light, albedo.a);
}
"#;
