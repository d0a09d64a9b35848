use crate::network::{DirectedEdgeId, RoutingNetwork, VertexId};
use crate::profile::FactorSource;
use crate::resolve::RouterPoint;

use smallvec::SmallVec;

/// A search starting point: one endpoint of a resolved edge, preloaded
/// with the partial weight between the [`RouterPoint`] and that
/// endpoint. Searches seed from these rather than raw vertices, which
/// lets them begin and end inside an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePath {
    pub vertex: VertexId,
    pub weight: f32,
    /// The directed traversal of the resolved edge this path follows.
    pub edge: DirectedEdgeId,
    /// The traversal's tail vertex, present only when the point sits
    /// exactly on it and the edge is therefore traversed in full. The
    /// restriction-aware kernel needs it: a full first traversal can
    /// already begin a forbidden sequence.
    pub tail: Option<VertexId>,
}

impl EdgePath {
    /// Starting points of a search leaving `point`: each reachable
    /// endpoint of the resolved edge, weighted with the on-edge cost of
    /// getting there from the point.
    pub fn for_source(
        network: &RoutingNetwork,
        factors: &FactorSource<'_>,
        point: &RouterPoint,
    ) -> SmallVec<[EdgePath; 2]> {
        let mut paths = SmallVec::new();

        let Some(data) = network.edge(point.edge) else {
            return paths;
        };
        let Some((from, to)) = network.edge_endpoints(point.edge) else {
            return paths;
        };

        let factor = factors.factor(data.profile_id);
        if !factor.is_traversable() {
            return paths;
        }

        let weight = data.distance / factor.value;
        let fraction = point.fraction();

        if factor.allows(true) {
            paths.push(EdgePath {
                vertex: to,
                weight: (1.0 - fraction) * weight,
                edge: DirectedEdgeId::forward(point.edge),
                tail: (point.offset == 0).then_some(from),
            });
        }

        if factor.allows(false) {
            paths.push(EdgePath {
                vertex: from,
                weight: fraction * weight,
                edge: DirectedEdgeId::backward(point.edge),
                tail: (point.offset == u16::MAX).then_some(to),
            });
        }

        paths
    }

    /// Starting points of a search arriving at `point`: each endpoint
    /// the route may enter the resolved edge through, weighted with the
    /// on-edge cost from that endpoint to the point.
    pub fn for_target(
        network: &RoutingNetwork,
        factors: &FactorSource<'_>,
        point: &RouterPoint,
    ) -> SmallVec<[EdgePath; 2]> {
        let mut paths = SmallVec::new();

        let Some(data) = network.edge(point.edge) else {
            return paths;
        };
        let Some((from, to)) = network.edge_endpoints(point.edge) else {
            return paths;
        };

        let factor = factors.factor(data.profile_id);
        if !factor.is_traversable() {
            return paths;
        }

        let weight = data.distance / factor.value;
        let fraction = point.fraction();

        if factor.allows(true) {
            paths.push(EdgePath {
                vertex: from,
                weight: fraction * weight,
                edge: DirectedEdgeId::forward(point.edge),
                tail: None,
            });
        }

        if factor.allows(false) {
            paths.push(EdgePath {
                vertex: to,
                weight: (1.0 - fraction) * weight,
                edge: DirectedEdgeId::backward(point.edge),
                tail: None,
            });
        }

        paths
    }

    /// Starting points weighted in raw meters instead of profile cost;
    /// used by bounded reachability queries.
    pub fn for_source_distance(
        network: &RoutingNetwork,
        factors: &FactorSource<'_>,
        point: &RouterPoint,
    ) -> SmallVec<[EdgePath; 2]> {
        let mut paths = Self::for_source(network, factors, point);

        if let Some(data) = network.edge(point.edge) {
            let fraction = point.fraction();
            for path in paths.iter_mut() {
                let travelled = if path.edge.is_forward() {
                    1.0 - fraction
                } else {
                    fraction
                };
                path.weight = travelled * data.distance;
            }
        }

        paths
    }
}

/// The weight of staying on the shared edge between two points resolved
/// onto it, if the profile permits travelling that way. `None` when the
/// points sit on different edges or the direction is closed.
pub fn direct_weight(
    network: &RoutingNetwork,
    factors: &FactorSource<'_>,
    source: &RouterPoint,
    target: &RouterPoint,
) -> Option<f32> {
    if source.edge != target.edge {
        return None;
    }

    let data = network.edge(source.edge)?;
    let factor = factors.factor(data.profile_id);
    if !factor.is_traversable() {
        return None;
    }

    let weight = data.distance / factor.value;
    let gap = target.fraction() - source.fraction();

    let allowed = if gap >= 0.0 {
        factor.allows(true)
    } else {
        factor.allows(false)
    };

    allowed.then(|| gap.abs() * weight)
}
