//! The mesh currency passed across the evaluator boundary.

use csged_ir::Transform;
use nalgebra::Point3;

/// A triangle mesh with flat vertex and index arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f32>,
    /// Triangle indices `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create a mesh from flat arrays.
    pub fn new(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Map every vertex through a 4×4 affine transform.
    pub fn apply_transform(&mut self, transform: &Transform) {
        let m = transform.to_matrix();
        for v in self.vertices.chunks_exact_mut(3) {
            let p = m.transform_point(&Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            v[0] = p.x as f32;
            v[1] = p.y as f32;
            v[2] = p.z as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> TriangleMesh {
        TriangleMesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2])
    }

    #[test]
    fn counts() {
        let mesh = triangle();
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_triangles(), 1);
        assert!(!mesh.is_empty());
        assert!(TriangleMesh::default().is_empty());
    }

    #[test]
    fn translation_moves_vertices() {
        let mut mesh = triangle();
        mesh.apply_transform(&Transform::from_translation(1.0, 2.0, 3.0));
        assert_relative_eq!(mesh.vertices[0], 1.0);
        assert_relative_eq!(mesh.vertices[1], 2.0);
        assert_relative_eq!(mesh.vertices[2], 3.0);
        assert_relative_eq!(mesh.vertices[3], 2.0);
        // Indices untouched.
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn identity_is_a_noop() {
        let mut mesh = triangle();
        let before = mesh.clone();
        mesh.apply_transform(&Transform::identity());
        assert_eq!(mesh, before);
    }
}
