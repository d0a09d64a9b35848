use crate::contracted::ContractedGraph;
use crate::network::{DirectedEdgeId, EdgeId};

/// A contracted hierarchy whose nodes are the *directed edges* of the
/// underlying network rather than its vertices.
///
/// Turn restrictions are encoded structurally: a forbidden edge-to-edge
/// transition simply has no hierarchy edge, so any search over this
/// graph honours restrictions without inspecting them.
///
/// Directed edge `e` maps onto hierarchy node `2e` (forward) or
/// `2e + 1` (backward); the mapping is total over the network's edges so
/// no lookup table is needed.
#[derive(Debug, Clone)]
pub struct EdgeBasedContractedGraph {
    hierarchy: ContractedGraph,
}

impl EdgeBasedContractedGraph {
    /// Creates an empty edge-expanded hierarchy over a network with
    /// `edge_count` edges. `level[node]` follows the node encoding.
    pub fn new(edge_count: usize, level: Vec<u32>) -> Self {
        EdgeBasedContractedGraph {
            hierarchy: ContractedGraph::new(edge_count * 2, level),
        }
    }

    /// Wraps an already-assembled hierarchy laid out in the directed
    /// edge node encoding.
    pub fn from_hierarchy(hierarchy: ContractedGraph) -> Self {
        EdgeBasedContractedGraph { hierarchy }
    }

    #[inline]
    pub fn node_of(directed: DirectedEdgeId) -> u32 {
        directed.edge().0 * 2 + u32::from(!directed.is_forward())
    }

    #[inline]
    pub fn directed_of(node: u32) -> DirectedEdgeId {
        DirectedEdgeId::new(EdgeId(node / 2), node % 2 == 0)
    }

    pub fn hierarchy(&self) -> &ContractedGraph {
        &self.hierarchy
    }

    pub fn hierarchy_mut(&mut self) -> &mut ContractedGraph {
        &mut self.hierarchy
    }

    /// Expands shortcut transitions back into the full directed-edge
    /// sequence they summarise.
    pub fn expand_directed(&self, path: &[DirectedEdgeId]) -> Vec<DirectedEdgeId> {
        let nodes = path.iter().map(|d| Self::node_of(*d)).collect::<Vec<_>>();

        self.hierarchy
            .expand_path(&nodes)
            .into_iter()
            .map(Self::directed_of)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn node_mapping_round_trips() {
        for raw in [1i64, -1, 42, -42, 1000] {
            let directed = DirectedEdgeId::from_raw(raw).unwrap();
            assert_eq!(
                EdgeBasedContractedGraph::directed_of(EdgeBasedContractedGraph::node_of(directed)),
                directed,
            );
        }
    }
}
