//! Mesh input and the world-space geometry snapshot built from it.

use meshcast_math::{Point3, Transform, Vec3};

use crate::error::{RaycastError, Result};

/// Source of local-space mesh data.
///
/// Implement this for whatever owns your mesh; the ray caster only reads
/// vertex positions and the flat triangle index list.
pub trait MeshSource {
    /// Vertex positions in local space.
    fn positions(&self) -> &[Point3];
    /// Triangle indices, three per triangle, in winding order.
    fn indices(&self) -> &[u32];
}

/// A plain indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create a mesh from vertices and indices.
    pub fn new(vertices: Vec<Point3>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Square in the XY plane centered on the origin, facing +Z.
    ///
    /// Two triangles share the diagonal from `(-h, -h)` to `(h, h)`.
    pub fn quad(half_extent: f64) -> Self {
        let h = half_extent;
        Self::new(
            vec![
                Point3::new(-h, -h, 0.0),
                Point3::new(h, -h, 0.0),
                Point3::new(h, h, 0.0),
                Point3::new(-h, h, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// Axis-aligned box centered on the origin with outward-facing triangles.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let vertices = (0..8)
            .map(|i| {
                let sign = |bit: u32| if i & bit == 0 { -1.0 } else { 1.0 };
                Point3::new(
                    sign(1) * half_extents.x,
                    sign(2) * half_extents.y,
                    sign(4) * half_extents.z,
                )
            })
            .collect();

        // Corners counter-clockwise as seen from outside.
        const FACES: [[u32; 4]; 6] = [
            [1, 3, 7, 5], // +X
            [0, 4, 6, 2], // -X
            [2, 6, 7, 3], // +Y
            [0, 1, 5, 4], // -Y
            [4, 5, 7, 6], // +Z
            [0, 2, 3, 1], // -Z
        ];
        let indices = FACES
            .iter()
            .flat_map(|&[a, b, c, d]| [a, b, c, a, c, d])
            .collect();

        Self::new(vertices, indices)
    }

    /// `segments` x `segments` quads tiling a `size` x `size` square in the
    /// XY plane, centered on the origin and facing +Z.
    pub fn grid(segments: u32, size: f64) -> Self {
        let n = segments.max(1);
        let row = n + 1;
        let step = size / n as f64;
        let start = -size / 2.0;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for j in 0..row {
            for i in 0..row {
                vertices.push(Point3::new(
                    start + i as f64 * step,
                    start + j as f64 * step,
                    0.0,
                ));
            }
        }

        let mut indices = Vec::with_capacity((n * n * 6) as usize);
        for j in 0..n {
            for i in 0..n {
                let a = j * row + i;
                let b = a + 1;
                let c = b + row;
                let d = a + row;
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }

        Self::new(vertices, indices)
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

impl MeshSource for TriangleMesh {
    fn positions(&self) -> &[Point3] {
        &self.vertices
    }

    fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// Three vertices in winding order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex; both edges start here.
    pub v0: Point3,
    /// Second vertex.
    pub v1: Point3,
    /// Third vertex.
    pub v2: Point3,
}

impl Triangle {
    /// Create a triangle.
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Edge vectors `(v1 - v0, v2 - v0)`.
    #[inline]
    pub fn edges(&self) -> (Vec3, Vec3) {
        (self.v1 - self.v0, self.v2 - self.v0)
    }

    /// Unit normal following the winding, zero for degenerate triangles.
    pub fn normal(&self) -> Vec3 {
        let (e1, e2) = self.edges();
        e1.cross(&e2).try_normalize(0.0).unwrap_or_else(Vec3::zeros)
    }
}

/// World-space snapshot of a mesh, immutable once built.
///
/// Indices are validated on construction, so [`MeshGeometry::triangle`]
/// never goes out of bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    vertices: Vec<Point3>,
    indices: Vec<u32>,
}

impl MeshGeometry {
    /// Transform every vertex of `mesh` into world space and validate the
    /// index buffer.
    pub fn from_source<M: MeshSource + ?Sized>(mesh: &M, transform: &Transform) -> Result<Self> {
        let vertices: Vec<Point3> = mesh
            .positions()
            .iter()
            .map(|p| transform.apply_point(p))
            .collect();
        Self::from_world(vertices, mesh.indices().to_vec())
    }

    /// Build from vertices already in world space.
    pub fn from_world(vertices: Vec<Point3>, indices: Vec<u32>) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(RaycastError::InvalidMesh(indices.len()));
        }
        if let Some((pos, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertices.len())
        {
            return Err(RaycastError::IndexOutOfRange {
                triangle: pos / 3,
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self { vertices, indices })
    }

    /// World-space vertices.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Flat triangle indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The `index`-th triangle.
    ///
    /// # Panics
    /// If `index >= self.triangle_count()`.
    #[inline]
    pub fn triangle(&self, index: usize) -> Triangle {
        let i = &self.indices[index * 3..index * 3 + 3];
        Triangle::new(
            self.vertices[i[0] as usize],
            self.vertices[i[1] as usize],
            self.vertices[i[2] as usize],
        )
    }

    /// All triangles in index order.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }
}
