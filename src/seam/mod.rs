//! Interactive seam construction.
//!
//! A seam starts on a boundary vertex, grows by shortest edge paths to each
//! clicked vertex, and closes once it reaches the boundary again.

mod geometry;

pub use geometry::SeamGeometry;

use tracing::{debug, info};

use crate::error::SeamError;
use crate::graph::{AdjacencyGraph, PathTable, ShortestPathSearch};
use crate::render::{to_gpu_point, Color};
use crate::topology::{SurfaceMesh, VertexId};

/// Lifecycle of a seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeamState {
    /// No vertex yet.
    Empty,
    /// At least one vertex, still accepting extensions.
    Open,
    /// Ended on the boundary; no further vertices are accepted.
    Closed,
}

/// Why a click left the seam unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The seam is already closed.
    SeamClosed,
    /// A seam must start on a boundary vertex.
    StartNotOnBoundary,
    /// The vertex lies in a different connected component.
    Unreachable,
    /// The vertex is already the end of the seam.
    AlreadyAtEnd,
}

/// Outcome of [`SeamPath::add_vertex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeamEdit {
    /// The seam was started at this vertex.
    Started(VertexId),
    /// The seam was extended by `appended` vertices and remains open.
    Extended { appended: usize },
    /// The seam was extended by `appended` vertices and is now closed.
    Closed { appended: usize },
    /// Nothing changed.
    Ignored(IgnoreReason),
}

/// Visual parameters of a seam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeamStyle {
    /// Color of the seam's line strip and points.
    pub color: Color,
    /// Point sprite size of the seam vertices, in pixels.
    pub point_size: f32,
}

impl Default for SeamStyle {
    fn default() -> Self {
        Self {
            color: [0.7, 0.2, 0.6, 1.0],
            point_size: 15.0,
        }
    }
}

/// An ordered, possibly closed chain of mesh vertices.
///
/// Consecutive vertices are joined by mesh edges. Mutated only through
/// [`SeamPath::add_vertex`] and [`SeamPath::reset`]; every change regenerates
/// [`SeamGeometry`] from the full sequence.
#[derive(Debug, Clone)]
pub struct SeamPath<'m> {
    mesh: &'m SurfaceMesh,
    graph: Option<AdjacencyGraph>,
    vertices: Vec<VertexId>,
    closed: bool,
    geometry: SeamGeometry,
}

impl<'m> SeamPath<'m> {
    /// Creates an empty seam on `mesh`.
    #[must_use]
    pub fn new(mesh: &'m SurfaceMesh) -> Self {
        Self {
            mesh,
            graph: None,
            vertices: Vec::new(),
            closed: false,
            geometry: SeamGeometry::default(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SeamState {
        if self.closed {
            SeamState::Closed
        } else if self.vertices.is_empty() {
            SeamState::Empty
        } else {
            SeamState::Open
        }
    }

    /// Returns `true` once the seam has ended on the boundary.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns `true` if no vertex has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The seam's vertices in insertion order.
    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Render geometry derived from the current vertices.
    #[must_use]
    pub fn geometry(&self) -> &SeamGeometry {
        &self.geometry
    }

    /// Adds a clicked vertex to the seam.
    ///
    /// An empty seam only starts on a boundary vertex. An open seam is
    /// extended by the shortest edge path from its last vertex to `v` and
    /// closes when `v` is on the boundary. Clicks that cannot change the seam
    /// return [`SeamEdit::Ignored`] and leave it untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` is not a vertex of the mesh; the seam is left
    /// untouched.
    pub fn add_vertex(&mut self, v: VertexId) -> Result<SeamEdit, SeamError> {
        let on_boundary = self.mesh.is_boundary(v)?;

        if self.closed {
            return Ok(self.ignore(v, IgnoreReason::SeamClosed));
        }

        let Some(&last) = self.vertices.last() else {
            if !on_boundary {
                return Ok(self.ignore(v, IgnoreReason::StartNotOnBoundary));
            }
            self.vertices.push(v);
            self.regenerate_geometry()?;
            debug!(vertex = %v, "seam started");
            return Ok(SeamEdit::Started(v));
        };

        let table = self.paths_from(last)?;
        if !table.has_path(v)? {
            return Ok(self.ignore(v, IgnoreReason::Unreachable));
        }
        let path = table.get_path(v)?;
        let appended = path.len() - 1;
        if appended == 0 {
            return Ok(self.ignore(v, IgnoreReason::AlreadyAtEnd));
        }

        self.vertices.extend_from_slice(&path[1..]);
        self.closed = on_boundary;
        self.regenerate_geometry()?;

        if self.closed {
            info!(vertices = self.vertices.len(), "seam closed");
            Ok(SeamEdit::Closed { appended })
        } else {
            debug!(appended, vertices = self.vertices.len(), "seam extended");
            Ok(SeamEdit::Extended { appended })
        }
    }

    /// Discards the seam so a new one can be started.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.closed = false;
        self.geometry.replace(Vec::new());
        debug!("seam reset");
    }

    /// Total length of the seam's edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a seam vertex is not part of the mesh.
    pub fn length(&self) -> Result<f64, SeamError> {
        let mut total = 0.0;
        for pair in self.vertices.windows(2) {
            total += (self.mesh.point(pair[1])? - self.mesh.point(pair[0])?).norm();
        }
        Ok(total)
    }

    /// Shortest paths from `source`, building the adjacency graph on first use.
    fn paths_from(&mut self, source: VertexId) -> Result<PathTable, SeamError> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => AdjacencyGraph::from_mesh(self.mesh)?,
        };
        let table = ShortestPathSearch::new(source).execute(&graph);
        self.graph = Some(graph);
        Ok(table?)
    }

    fn regenerate_geometry(&mut self) -> Result<(), SeamError> {
        let points = self
            .vertices
            .iter()
            .map(|&v| self.mesh.point(v).map(|p| to_gpu_point(&p)))
            .collect::<Result<Vec<_>, _>>()?;
        self.geometry.replace(points);
        Ok(())
    }

    fn ignore(&self, v: VertexId, reason: IgnoreReason) -> SeamEdit {
        debug!(vertex = %v, ?reason, "seam click ignored");
        SeamEdit::Ignored(reason)
    }
}
