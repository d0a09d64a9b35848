use petgraph::graph::{EdgeIndex, NodeIndex};
use std::fmt::{Debug, Formatter};
use std::num::NonZeroI64;

/// Identifier of a vertex in a frozen routing network.
///
/// Vertex identifiers are dense: after [`NetworkBuilder::freeze`](crate::network::NetworkBuilder::freeze)
/// they cover `0..vertex_count` without gaps, ordered along a Hilbert curve
/// so that spatially close vertices receive close identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

/// Identifier of an edge in a frozen routing network. Dense, insertion-ordered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl Debug for VertexId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl Debug for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl From<NodeIndex> for VertexId {
    fn from(ix: NodeIndex) -> Self {
        VertexId(ix.index() as u32)
    }
}

impl From<VertexId> for NodeIndex {
    fn from(id: VertexId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

impl From<EdgeIndex> for EdgeId {
    fn from(ix: EdgeIndex) -> Self {
        EdgeId(ix.index() as u32)
    }
}

impl From<EdgeId> for EdgeIndex {
    fn from(id: EdgeId) -> Self {
        EdgeIndex::new(id.0 as usize)
    }
}

/// An edge identifier with a pinned traversal direction.
///
/// The encoding is stable and intended for external storage: an edge `e`
/// traversed in stored `from → to` order is `+(e + 1)`, the reverse
/// traversal is `-(e + 1)`. Zero never occurs, which is what makes the
/// niche-optimised [`NonZeroI64`] representation possible.
///
/// ```
/// use routier::network::{DirectedEdgeId, EdgeId};
///
/// let forward = DirectedEdgeId::forward(EdgeId(41));
/// assert_eq!(forward.raw(), 42);
/// assert_eq!(forward.edge(), EdgeId(41));
/// assert_eq!(forward.reversed().raw(), -42);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectedEdgeId(NonZeroI64);

impl DirectedEdgeId {
    pub fn new(edge: EdgeId, forward: bool) -> Self {
        let magnitude = edge.0 as i64 + 1;
        let raw = if forward { magnitude } else { -magnitude };

        // Magnitude is at least one, the constructor cannot observe zero.
        DirectedEdgeId(NonZeroI64::new(raw).unwrap())
    }

    pub fn forward(edge: EdgeId) -> Self {
        Self::new(edge, true)
    }

    pub fn backward(edge: EdgeId) -> Self {
        Self::new(edge, false)
    }

    /// Decodes a persisted raw value. Zero and out-of-range magnitudes
    /// are rejected by the caller against the network's edge count.
    pub fn from_raw(raw: i64) -> Option<Self> {
        NonZeroI64::new(raw).map(DirectedEdgeId)
    }

    pub fn raw(self) -> i64 {
        self.0.get()
    }

    pub fn edge(self) -> EdgeId {
        EdgeId((self.0.get().unsigned_abs() - 1) as u32)
    }

    pub fn is_forward(self) -> bool {
        self.0.get() > 0
    }

    pub fn reversed(self) -> Self {
        // The negation of a non-zero value is non-zero.
        DirectedEdgeId(NonZeroI64::new(-self.0.get()).unwrap())
    }
}

impl Debug for DirectedEdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let arrow = if self.is_forward() { "→" } else { "←" };
        write!(f, "{:?}{arrow}", self.edge())
    }
}
