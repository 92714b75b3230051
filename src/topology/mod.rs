pub mod face;
pub mod halfedge;
pub mod vertex;

pub use face::{FaceData, FaceId};
pub use halfedge::{HalfEdgeData, HalfEdgeId};
pub use vertex::{VertexData, VertexId};

use std::collections::HashMap;

use tracing::debug;

use crate::error::TopologyError;
use crate::math::{Aabb, Matrix4f, Point3, Vector3};

/// Immutable triangle mesh stored as a half-edge arena.
///
/// Vertices, half-edges and faces reference each other only through integer
/// handles. The half-edges of face `f` occupy slots `3f..3f + 3`; boundary
/// half-edges follow after all face half-edges.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    vertices: Vec<VertexData>,
    halfedges: Vec<HalfEdgeData>,
    faces: Vec<FaceData>,
}

impl SurfaceMesh {
    /// Builds a mesh from vertex positions and counter-clockwise triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if a triangle references a missing vertex, repeats a
    /// vertex, or if a directed edge is shared by two faces (non-manifold or
    /// inconsistently oriented input).
    pub fn from_triangles(
        positions: Vec<Point3>,
        triangles: &[[u32; 3]],
    ) -> Result<Self, TopologyError> {
        let vertex_count = positions.len();
        if u32::try_from(vertex_count).is_err() {
            return Err(TopologyError::TooManyElements(vertex_count));
        }
        // Face half-edges plus at most one boundary half-edge each.
        if u32::try_from(triangles.len().saturating_mul(6)).is_err() {
            return Err(TopologyError::TooManyElements(triangles.len()));
        }

        let mut vertices: Vec<VertexData> = positions.into_iter().map(VertexData::new).collect();
        let mut faces = Vec::with_capacity(triangles.len());
        let mut origins_targets = Vec::with_capacity(triangles.len() * 3);
        let mut directed: HashMap<(u32, u32), HalfEdgeId> = HashMap::new();

        for (t, tri) in triangles.iter().enumerate() {
            for &index in tri {
                if index as usize >= vertex_count {
                    return Err(TopologyError::IndexOutOfBounds {
                        triangle: t,
                        index,
                        count: vertex_count,
                    });
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
                return Err(TopologyError::DegenerateTriangle(t));
            }

            let first = HalfEdgeId(to_u32(origins_targets.len()));
            for i in 0..3 {
                let from = tri[i];
                let to = tri[(i + 1) % 3];
                let id = HalfEdgeId(to_u32(origins_targets.len()));
                if directed.insert((from, to), id).is_some() {
                    return Err(TopologyError::NonManifoldEdge { from, to });
                }
                origins_targets.push((from, to));
            }
            faces.push(FaceData {
                vertices: tri.map(VertexId),
                halfedge: first,
            });
        }

        let face_halfedges = origins_targets.len();
        let mut halfedges: Vec<HalfEdgeData> = origins_targets
            .iter()
            .enumerate()
            .map(|(i, &(from, to))| HalfEdgeData {
                origin: VertexId(from),
                target: VertexId(to),
                twin: HalfEdgeId(to_u32(i)),
                face: Some(FaceId(to_u32(i / 3))),
            })
            .collect();

        // Pair twins in slot order so boundary half-edges get deterministic ids.
        for i in 0..face_halfedges {
            let (from, to) = origins_targets[i];
            if let Some(&twin) = directed.get(&(to, from)) {
                halfedges[i].twin = twin;
            } else {
                let boundary = HalfEdgeId(to_u32(halfedges.len()));
                halfedges.push(HalfEdgeData {
                    origin: VertexId(to),
                    target: VertexId(from),
                    twin: HalfEdgeId(to_u32(i)),
                    face: None,
                });
                halfedges[i].twin = boundary;
                vertices[from as usize].is_boundary = true;
                vertices[to as usize].is_boundary = true;
            }
        }

        debug!(
            vertices = vertices.len(),
            faces = faces.len(),
            boundary_halfedges = halfedges.len() - face_halfedges,
            "built surface mesh"
        );

        Ok(Self {
            vertices,
            halfedges,
            faces,
        })
    }

    /// Number of vertices, including isolated ones.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Iterates over all vertex handles in index order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(|i| VertexId(to_u32(i)))
    }

    /// Checks that a handle refers to a vertex of this mesh.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn check_vertex(&self, id: VertexId) -> Result<(), TopologyError> {
        self.vertex(id).map(|_| ())
    }

    /// Returns the vertex data, or an error if the handle is invalid.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id.index())
            .ok_or(TopologyError::InvalidVertex {
                index: id.0,
                count: self.vertices.len(),
            })
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn point(&self, id: VertexId) -> Result<Point3, TopologyError> {
        self.vertex(id).map(|v| v.point)
    }

    /// Returns `true` if the vertex touches an edge with no opposing face.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn is_boundary(&self, id: VertexId) -> Result<bool, TopologyError> {
        self.vertex(id).map(|v| v.is_boundary)
    }

    /// Iterates over the boundary vertices in index order.
    pub fn boundary_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_boundary)
            .map(|(i, _)| VertexId(to_u32(i)))
    }

    /// Returns the half-edge data, or an error if the handle is invalid.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidHalfEdge` if the handle is out of range.
    pub fn halfedge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData, TopologyError> {
        self.halfedges
            .get(id.index())
            .ok_or(TopologyError::InvalidHalfEdge(id.0))
    }

    /// Iterates over all half-edges: face half-edges first, then boundary ones.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdgeData)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId(to_u32(i)), he))
    }

    /// Iterates over the half-edges leaving `v`, boundary ones included.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn outgoing_halfedges(
        &self,
        v: VertexId,
    ) -> Result<impl Iterator<Item = (HalfEdgeId, &HalfEdgeData)> + '_, TopologyError> {
        self.check_vertex(v)?;
        Ok(self.halfedges().filter(move |(_, he)| he.origin == v))
    }

    /// Iterates over all faces in index order.
    pub fn faces(&self) -> impl Iterator<Item = &FaceData> + '_ {
        self.faces.iter()
    }

    /// Flat triangle index list, three entries per face.
    #[must_use]
    pub fn triangle_indices(&self) -> Vec<u32> {
        self.faces
            .iter()
            .flat_map(|f| f.vertices.map(|v| v.0))
            .collect()
    }

    /// Area-weighted vertex normals; isolated vertices get a zero normal.
    #[must_use]
    pub fn vertex_normals(&self) -> Vec<Vector3> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for face in &self.faces {
            let [a, b, c] = face.vertices.map(|v| self.vertices[v.index()].point);
            let n = (b - a).cross(&(c - a));
            for v in face.vertices {
                normals[v.index()] += n;
            }
        }
        for n in &mut normals {
            if let Some(unit) = n.try_normalize(0.0) {
                *n = unit;
            }
        }
        normals
    }

    /// Bounding box of all vertex positions, `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| &v.point))
    }

    /// Model transform that centers the mesh and scales it into `[-1, 1]^3`.
    ///
    /// An empty mesh gets the identity.
    #[must_use]
    pub fn normalizing_transform(&self) -> Matrix4f {
        self.bounding_box()
            .map_or_else(Matrix4f::identity, |aabb| aabb.normalizing_transform())
    }
}

/// Converts an arena index that was range-checked at construction.
#[allow(clippy::cast_possible_truncation)]
fn to_u32(index: usize) -> u32 {
    index as u32
}
