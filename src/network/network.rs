use crate::contracted::{ContractedGraph, EdgeBasedContractedGraph};
use crate::network::edge::{EdgeData, FatEdge, Traversal, Vertex};
use crate::network::{DirectedEdgeId, EdgeId, VertexId};
use crate::restriction::RestrictionIndex;

use geo::{Destination, Geodesic, Point};
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rstar::{RTree, AABB};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{Debug, Formatter};

/// The contracted hierarchies attached to one profile.
#[derive(Debug, Default)]
pub struct ContractedSet {
    pub node_based: Option<ContractedGraph>,
    pub edge_based: Option<EdgeBasedContractedGraph>,
}

/// A frozen road network: the geometric graph, the typed edge payloads,
/// a spatial index over edge polylines, and the per-profile restriction
/// and hierarchy attachments.
///
/// Immutable once assembled. Many queries may run over the same network
/// concurrently; per-query state never lives here.
pub struct RoutingNetwork {
    graph: DiGraph<Vertex, EdgeData>,
    index_edge: RTree<FatEdge>,

    profiles: FxHashSet<String>,
    edge_profile_count: u16,

    restrictions: FxHashMap<String, RestrictionIndex>,
    contracted: FxHashMap<String, ContractedSet>,
}

impl Debug for RoutingNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RoutingNetwork with {} vertices, {} edges",
            self.vertex_count(),
            self.edge_count()
        )
    }
}

impl RoutingNetwork {
    pub(crate) fn assemble(
        graph: DiGraph<Vertex, EdgeData>,
        index_edge: RTree<FatEdge>,
        profiles: FxHashSet<String>,
        edge_profile_count: u16,
    ) -> Self {
        RoutingNetwork {
            graph,
            index_edge,
            profiles,
            edge_profile_count,
            restrictions: FxHashMap::default(),
            contracted: FxHashMap::default(),
        }
    }

    /// Attaches the restriction index for a profile. Builder-style; the
    /// network stays immutable once queries begin.
    pub fn with_restrictions(mut self, profile: impl Into<String>, index: RestrictionIndex) -> Self {
        self.restrictions.insert(profile.into(), index);
        self
    }

    /// Attaches a node-based contracted hierarchy for a profile.
    pub fn with_contracted(mut self, profile: impl Into<String>, contracted: ContractedGraph) -> Self {
        self.contracted.entry(profile.into()).or_default().node_based = Some(contracted);
        self
    }

    /// Attaches an edge-based contracted hierarchy for a profile.
    pub fn with_edge_contracted(
        mut self,
        profile: impl Into<String>,
        contracted: EdgeBasedContractedGraph,
    ) -> Self {
        self.contracted.entry(profile.into()).or_default().edge_based = Some(contracted);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct edge-profile identifiers in use; factor caches
    /// are sized to this.
    pub fn edge_profile_count(&self) -> u16 {
        self.edge_profile_count
    }

    pub fn supports(&self, profile: &str) -> bool {
        self.profiles.contains(profile)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.node_weight(id.into())
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.graph
            .node_indices()
            .map(|ix| (ix.into(), &self.graph[ix]))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.graph
            .edge_indices()
            .map(|ix| (ix.into(), &self.graph[ix]))
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeData> {
        self.graph.edge_weight(id.into())
    }

    /// Stored endpoints of an edge, in `(from, to)` order.
    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(VertexId, VertexId)> {
        self.graph
            .edge_endpoints(id.into())
            .map(|(a, b)| (a.into(), b.into()))
    }

    /// Resolves a directed identifier to its payload and the traversal
    /// endpoints in `(tail, head)` order.
    pub fn get_edge(&self, directed: DirectedEdgeId) -> Option<(&EdgeData, (VertexId, VertexId))> {
        let data = self.edge(directed.edge())?;
        let (from, to) = self.edge_endpoints(directed.edge())?;

        let ends = if directed.is_forward() {
            (from, to)
        } else {
            (to, from)
        };

        Some((data, ends))
    }

    /// The canonical directed identifier of an edge: the direction that
    /// follows the data as stored. Callers persist this value; the sign
    /// mirrors the inversion flag exactly.
    pub fn id_directed(&self, id: EdgeId) -> Option<DirectedEdgeId> {
        self.edge(id)
            .map(|data| DirectedEdgeId::new(id, !data.data_inverted))
    }

    /// All traversals leaving `vertex`, in either stored orientation.
    /// Direction semantics are left to the caller: a backward search
    /// interprets `forward` against the reversed graph.
    pub fn adjacent(&self, vertex: VertexId) -> impl Iterator<Item = Traversal<'_>> + '_ {
        let node = vertex.into();

        let outgoing = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| Traversal {
                edge: e.id().into(),
                data: e.weight(),
                neighbour: e.target().into(),
                forward: true,
            });

        let incoming = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| Traversal {
                edge: e.id().into(),
                data: e.weight(),
                neighbour: e.source().into(),
                forward: false,
            });

        outgoing.chain(incoming)
    }

    /// Every edge joining `a` to `b`, regardless of stored orientation.
    /// `forward` reports whether travelling `a → b` follows the stored
    /// direction. Parallel edges yield multiple items.
    pub fn edges_between<'a>(
        &'a self,
        a: VertexId,
        b: VertexId,
    ) -> impl Iterator<Item = (EdgeId, &'a EdgeData, bool)> + 'a {
        let ab = self
            .graph
            .edges_connecting(a.into(), b.into())
            .map(|e| (e.id().into(), e.weight(), true));

        let ba = self
            .graph
            .edges_connecting(b.into(), a.into())
            .map(|e| (e.id().into(), e.weight(), false));

        ab.chain(ba)
    }

    /// Full polyline of an edge in logical `from → to` order, endpoints
    /// included and the inversion flag already applied.
    pub fn edge_polyline(&self, id: EdgeId) -> Option<Vec<Point>> {
        let data = self.edge(id)?;
        let (from, to) = self.edge_endpoints(id)?;

        let mut points = Vec::with_capacity(2 + data.shape.as_ref().map_or(0, |s| s.len()));
        points.push(self.vertex(from)?.position());
        points.extend(data.shape_forward());
        points.push(self.vertex(to)?.position());

        Some(points)
    }

    /// Finds all indexed edges within a square radius of the position.
    pub fn scan_edges<'a>(
        &'a self,
        point: &Point,
        distance: f64,
    ) -> impl Iterator<Item = &'a FatEdge> {
        let bottom_right = Geodesic.destination(*point, 135.0, distance);
        let top_left = Geodesic.destination(*point, 315.0, distance);

        let bbox = AABB::from_corners(top_left, bottom_right);
        self.index_edge.locate_in_envelope_intersecting(&bbox)
    }

    pub fn restrictions(&self, profile: &str) -> Option<&RestrictionIndex> {
        self.restrictions.get(profile)
    }

    pub fn contracted(&self, profile: &str) -> Option<&ContractedSet> {
        self.contracted.get(profile)
    }
}
