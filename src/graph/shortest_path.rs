use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::error::{PathError, TopologyError};
use crate::topology::VertexId;

use super::AdjacencyGraph;

/// Single-source shortest-path search (Dijkstra) over an [`AdjacencyGraph`].
///
/// Runs once per source; the resulting [`PathTable`] answers path queries to
/// any target.
pub struct ShortestPathSearch {
    source: VertexId,
}

impl ShortestPathSearch {
    /// Creates a new `ShortestPathSearch` from `source`.
    #[must_use]
    pub fn new(source: VertexId) -> Self {
        Self { source }
    }

    /// Executes the search, settling every vertex reachable from the source.
    ///
    /// Vertices are settled in non-decreasing distance order. Equal heap keys
    /// are popped in push order, and a predecessor is only replaced on a
    /// strictly shorter distance, so the first-discovered route wins ties.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the source is not in the graph.
    pub fn execute(&self, graph: &AdjacencyGraph) -> Result<PathTable, TopologyError> {
        graph.check_vertex(self.source)?;

        let n = graph.vertex_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut predecessor: Vec<Option<VertexId>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut frontier = BinaryHeap::new();
        let mut seq = 0_u64;

        dist[self.source.index()] = 0.0;
        frontier.push(Frontier {
            dist: 0.0,
            seq,
            vertex: self.source,
        });

        let mut settled_count = 0_usize;
        while let Some(Frontier { dist: d, vertex: u, .. }) = frontier.pop() {
            if settled[u.index()] {
                continue;
            }
            settled[u.index()] = true;
            settled_count += 1;

            for neighbor in graph.neighbors(u)? {
                let v = neighbor.vertex;
                if settled[v.index()] {
                    continue;
                }
                let candidate = d + neighbor.weight;
                if candidate < dist[v.index()] {
                    dist[v.index()] = candidate;
                    predecessor[v.index()] = Some(u);
                    seq += 1;
                    frontier.push(Frontier {
                        dist: candidate,
                        seq,
                        vertex: v,
                    });
                }
            }
        }

        trace!(source = %self.source, settled = settled_count, "shortest paths computed");

        Ok(PathTable {
            source: self.source,
            dist,
            predecessor,
        })
    }
}

/// Heap entry; ordered so that `BinaryHeap` pops the smallest distance first
/// and, among equal distances, the earliest push.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    dist: f64,
    seq: u64,
    vertex: VertexId,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

/// Shortest distances and predecessor links from one source vertex.
#[derive(Debug, Clone)]
pub struct PathTable {
    source: VertexId,
    dist: Vec<f64>,
    predecessor: Vec<Option<VertexId>>,
}

impl PathTable {
    /// Returns `true` if `target` is reachable from the source.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn has_path(&self, target: VertexId) -> Result<bool, TopologyError> {
        Ok(self.distance(target)?.is_some())
    }

    /// Shortest distance to `target`, or `None` if it is unreachable.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidVertex` if the handle is out of range.
    pub fn distance(&self, target: VertexId) -> Result<Option<f64>, TopologyError> {
        let d = self
            .dist
            .get(target.index())
            .ok_or(TopologyError::InvalidVertex {
                index: target.0,
                count: self.dist.len(),
            })?;
        Ok(d.is_finite().then_some(*d))
    }

    /// Vertices from the source to `target`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns `PathError::Unreachable` if `target` cannot be reached, or a
    /// topology error if the handle is out of range.
    pub fn get_path(&self, target: VertexId) -> Result<Vec<VertexId>, PathError> {
        if !self.has_path(target)? {
            return Err(PathError::Unreachable {
                from: self.source,
                to: target,
            });
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(prev) = self.predecessor[current.index()] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::creation::MakeGrid;
    use crate::math::Point3;
    use crate::topology::SurfaceMesh;
    use approx::assert_relative_eq;

    fn bumpy_grid() -> SurfaceMesh {
        // Deterministic, irregular heights so paths are not all ties.
        let heights = (0..36_u32)
            .map(|i| f64::from((i * 7 + 3) % 5) * 0.3)
            .collect();
        MakeGrid::new(5, 5, 1.0)
            .with_heights(heights)
            .execute()
            .unwrap()
    }

    #[test]
    fn paths_are_valid_and_match_distances() {
        let mesh = bumpy_grid();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        for source in [VertexId(0), VertexId(14), VertexId(35)] {
            let table = ShortestPathSearch::new(source).execute(&graph).unwrap();
            for target in mesh.vertices() {
                let path = table.get_path(target).unwrap();
                assert_eq!(path.first(), Some(&source));
                assert_eq!(path.last(), Some(&target));

                let mut total = 0.0;
                for pair in path.windows(2) {
                    total += graph.weight(pair[0], pair[1]).unwrap().unwrap();
                }
                assert_relative_eq!(
                    total,
                    table.distance(target).unwrap().unwrap(),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn source_path_is_just_the_source() {
        let mesh = MakeGrid::new(2, 2, 1.0).execute().unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        let table = ShortestPathSearch::new(VertexId(4)).execute(&graph).unwrap();
        assert_eq!(table.get_path(VertexId(4)).unwrap(), vec![VertexId(4)]);
        assert_relative_eq!(table.distance(VertexId(4)).unwrap().unwrap(), 0.0);
    }

    #[test]
    fn direct_edge_is_the_shortest_path() {
        let tube = crate::creation::MakeTube::new(1.0, 2.0, 8, 3)
            .execute()
            .unwrap();
        for mesh in [bumpy_grid(), tube] {
            let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
            for u in mesh.vertices() {
                let table = ShortestPathSearch::new(u).execute(&graph).unwrap();
                for n in graph.neighbors(u).unwrap() {
                    assert_eq!(table.get_path(n.vertex).unwrap(), vec![u, n.vertex]);
                    assert_relative_eq!(
                        table.distance(n.vertex).unwrap().unwrap(),
                        n.weight,
                        epsilon = 1e-12
                    );
                }
            }
        }

        let flat = MakeGrid::new(2, 2, 1.0).execute().unwrap();
        let graph = AdjacencyGraph::from_mesh(&flat).unwrap();
        let table = ShortestPathSearch::new(VertexId(0)).execute(&graph).unwrap();
        assert_eq!(
            table.get_path(VertexId(1)).unwrap(),
            vec![VertexId(0), VertexId(1)]
        );
        assert_relative_eq!(table.distance(VertexId(1)).unwrap().unwrap(), 1.0);
    }

    #[test]
    fn equal_routes_prefer_first_discovered() {
        // Single cell split along 0-3: 1 -> 2 costs 2 via either 0 or 3.
        let mesh = MakeGrid::new(1, 1, 1.0).execute().unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        let first = ShortestPathSearch::new(VertexId(1)).execute(&graph).unwrap();
        assert_eq!(
            first.get_path(VertexId(2)).unwrap(),
            vec![VertexId(1), VertexId(3), VertexId(2)]
        );
        let again = ShortestPathSearch::new(VertexId(1)).execute(&graph).unwrap();
        assert_eq!(
            again.get_path(VertexId(2)).unwrap(),
            first.get_path(VertexId(2)).unwrap()
        );
    }

    #[test]
    fn disconnected_component_is_unreachable() {
        let mesh = SurfaceMesh::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(6.0, 0.0, 0.0),
                Point3::new(5.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [3, 4, 5]],
        )
        .unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        let table = ShortestPathSearch::new(VertexId(0)).execute(&graph).unwrap();
        assert!(!table.has_path(VertexId(4)).unwrap());
        assert_eq!(table.distance(VertexId(4)).unwrap(), None);
        assert!(matches!(
            table.get_path(VertexId(4)),
            Err(PathError::Unreachable { .. })
        ));
    }

    #[test]
    fn invalid_handles_are_errors() {
        let mesh = MakeGrid::new(1, 1, 1.0).execute().unwrap();
        let graph = AdjacencyGraph::from_mesh(&mesh).unwrap();
        assert!(ShortestPathSearch::new(VertexId(9)).execute(&graph).is_err());
        let table = ShortestPathSearch::new(VertexId(0)).execute(&graph).unwrap();
        assert!(table.has_path(VertexId(4)).is_err());
        assert!(matches!(
            table.get_path(VertexId(4)),
            Err(PathError::Topology(_))
        ));
    }
}
