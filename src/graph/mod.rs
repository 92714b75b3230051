//! Weighted vertex-adjacency graph over a [`SurfaceMesh`] and shortest paths on it.

mod shortest_path;

pub use shortest_path::{PathTable, ShortestPathSearch};

use crate::error::TopologyError;
use crate::topology::{SurfaceMesh, VertexId};

/// A weighted neighbor of a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// The adjacent vertex.
    pub vertex: VertexId,
    /// Euclidean length of the connecting edge.
    pub weight: f64,
}

/// Adjacency list of a mesh, cached once and indexed by vertex handle.
///
/// Each undirected mesh edge appears once in the list of each endpoint.
/// Neighbor order follows half-edge order, which keeps path tie-breaking
/// deterministic for identical input.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph {
    adjacency: Vec<Vec<Neighbor>>,
    edge_count: usize,
}

impl AdjacencyGraph {
    /// Derives the graph from the mesh's half-edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a half-edge references a vertex outside the mesh.
    pub fn from_mesh(mesh: &SurfaceMesh) -> Result<Self, TopologyError> {
        let mut adjacency: Vec<Vec<Neighbor>> = vec![Vec::new(); mesh.vertex_count()];
        let mut edge_count = 0;

        for (_, he) in mesh.halfedges() {
            let a = mesh.point(he.origin)?;
            let b = mesh.point(he.target)?;
            let list = &mut adjacency[he.origin.index()];
            if list.iter().any(|n| n.vertex == he.target) {
                continue;
            }
            list.push(Neighbor {
                vertex: he.target,
                weight: (b - a).norm(),
            });
            if he.origin < he.target {
                edge_count += 1;
            }
        }

        Ok(Self {
            adjacency,
            edge_count,
        })
    }

    /// Number of vertices, including isolated ones.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Checks that a handle refers to a vertex of this graph.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn check_vertex(&self, v: VertexId) -> Result<(), TopologyError> {
        self.neighbors(v).map(|_| ())
    }

    /// Neighbors of `v` with edge weights. Empty for an isolated vertex.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn neighbors(&self, v: VertexId) -> Result<&[Neighbor], TopologyError> {
        self.adjacency
            .get(v.index())
            .map(Vec::as_slice)
            .ok_or(TopologyError::InvalidVertex {
                index: v.0,
                count: self.adjacency.len(),
            })
    }

    /// Weight of the direct edge `u`–`v`, or `None` if they are not adjacent.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if either handle is out of range.
    pub fn weight(&self, u: VertexId, v: VertexId) -> Result<Option<f64>, TopologyError> {
        self.check_vertex(v)?;
        Ok(self
            .neighbors(u)?
            .iter()
            .find(|n| n.vertex == v)
            .map(|n| n.weight))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::creation::MakeGrid;
    use crate::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn grid_adjacency_is_symmetric() {
        let mesh = MakeGrid::new(3, 3, 1.0).execute().unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        assert_eq!(graph.edge_count(), mesh.edge_count());
        for u in mesh.vertices() {
            for n in graph.neighbors(u).unwrap() {
                let back = graph.weight(n.vertex, u).unwrap().unwrap();
                assert_relative_eq!(back, n.weight);
            }
        }
    }

    #[test]
    fn weights_are_euclidean() {
        let mesh = MakeGrid::new(1, 1, 2.0).execute().unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        // Diagonal of the single cell: 0 -> 3.
        let diagonal = graph.weight(VertexId(0), VertexId(3)).unwrap().unwrap();
        assert_relative_eq!(diagonal, 8.0_f64.sqrt());
        assert_relative_eq!(
            graph.weight(VertexId(0), VertexId(1)).unwrap().unwrap(),
            2.0
        );
        // The other diagonal is not an edge.
        assert_eq!(graph.weight(VertexId(1), VertexId(2)).unwrap(), None);
    }

    #[test]
    fn interior_vertex_has_six_neighbors() {
        let mesh = MakeGrid::new(2, 2, 1.0).execute().unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        assert_eq!(graph.neighbors(VertexId(4)).unwrap().len(), 6);
    }

    #[test]
    fn isolated_and_invalid_vertices() {
        let mesh = SurfaceMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(3.0, 3.0, 3.0),
            ],
            &[[0, 1, 2]],
        )
        .unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        assert!(graph.neighbors(VertexId(3)).unwrap().is_empty());
        assert!(matches!(
            graph.neighbors(VertexId(4)),
            Err(TopologyError::InvalidVertex { index: 4, count: 4 })
        ));
    }
}
