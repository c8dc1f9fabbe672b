use glam::{Mat3, Mat4, Vec3};

/// Floats per vertex: position(3) + normal(3) + uv(2)
pub const VERTEX_STRIDE: usize = 8;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, u, v]
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// 8 floats per vertex: position(3) + normal(3) + uv(2)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Interleave separate attribute streams.
    ///
    /// Missing normals are recomputed from the triangles; missing UVs default to 0.
    pub fn from_parts(
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        uvs: &[[f32; 2]],
        indices: Vec<u32>,
    ) -> Self {
        let computed;
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            computed = vertex_normals(positions, &indices);
            computed.as_slice()
        };

        let mut vertices = Vec::with_capacity(positions.len() * VERTEX_STRIDE);
        for (i, p) in positions.iter().enumerate() {
            let n = normals[i];
            let uv = uvs.get(i).copied().unwrap_or([0.0, 0.0]);
            vertices.extend_from_slice(&[p[0], p[1], p[2], n[0], n[1], n[2], uv[0], uv[1]]);
        }

        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * VERTEX_STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn uv(&self, index: usize) -> [f32; 2] {
        let base = index * VERTEX_STRIDE;
        [self.vertices[base + 6], self.vertices[base + 7]]
    }

    /// Bake a node transform into positions and normals.
    pub fn transformed(mut self, matrix: &Mat4) -> Self {
        if *matrix == Mat4::IDENTITY {
            return self;
        }
        let normal_matrix = Mat3::from_mat4(*matrix).inverse().transpose();
        for chunk in self.vertices.chunks_exact_mut(VERTEX_STRIDE) {
            let p = matrix.transform_point3(Vec3::new(chunk[0], chunk[1], chunk[2]));
            let n = (normal_matrix * Vec3::new(chunk[3], chunk[4], chunk[5])).normalize_or_zero();
            chunk[..6].copy_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
        self
    }
}

/// Area-weighted vertex normals
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let pb = Vec3::from(positions[b]);
        let pc = Vec3::from(positions[c]);
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                [0.0, 1.0, 0.0]
            } else {
                n.to_array()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData::from_parts(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[],
            &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        // CCW in XY plane faces +Z
        assert_eq!(&mesh.vertices[3..6], &[0.0, 0.0, 1.0]);
        assert_eq!(mesh.uv(1), [1.0, 0.0]);
    }

    #[test]
    fn test_transformed_moves_positions() {
        let mesh = triangle().transformed(&Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(mesh.position(0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(mesh.position(2), Vec3::new(0.0, 3.0, 0.0));
        // Translation leaves normals alone
        assert_eq!(&mesh.vertices[3..6], &[0.0, 0.0, 1.0]);
    }
}
