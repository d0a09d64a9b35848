use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A hierarchy edge. Both weight components travel with the edge:
/// `weight_forward` prices the stored `from → to` traversal,
/// `weight_backward` the reverse; an infinite component closes that
/// direction. Shortcut edges additionally name the node they bypass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractedEdge {
    pub weight_forward: f32,
    pub weight_backward: f32,
    /// The intermediate hierarchy node this edge summarises, when the
    /// edge is a shortcut rather than an original edge.
    pub contracted: Option<u32>,
}

impl ContractedEdge {
    pub fn original(weight_forward: f32, weight_backward: f32) -> Self {
        ContractedEdge {
            weight_forward,
            weight_backward,
            contracted: None,
        }
    }

    pub fn shortcut(weight_forward: f32, weight_backward: f32, contracted: u32) -> Self {
        ContractedEdge {
            weight_forward,
            weight_backward,
            contracted: Some(contracted),
        }
    }

    pub fn is_shortcut(&self) -> bool {
        self.contracted.is_some()
    }
}

/// A node-addressed contracted graph: original edges plus shortcuts,
/// and a contraction level per node. Searches only climb the hierarchy
/// (lower level to strictly higher level); shortcut expansion descends
/// it again afterwards.
///
/// Nodes are plain `u32` indices. For the node-based hierarchy these
/// coincide with vertex identifiers of the underlying network; the
/// edge-based wrapper maps directed edges onto them instead.
#[derive(Debug, Clone)]
pub struct ContractedGraph {
    graph: DiGraph<(), ContractedEdge>,
    level: Vec<u32>,
}

impl ContractedGraph {
    /// Creates an empty hierarchy over `node_count` nodes with the given
    /// contraction levels (`level[node]` = position in contraction order).
    pub fn new(node_count: usize, level: Vec<u32>) -> Self {
        let mut graph = DiGraph::with_capacity(node_count, node_count * 2);
        for _ in 0..node_count {
            graph.add_node(());
        }

        debug_assert_eq!(level.len(), node_count);
        ContractedGraph { graph, level }
    }

    pub fn add_edge(&mut self, from: u32, to: u32, edge: ContractedEdge) {
        self.graph
            .add_edge(NodeIndex::new(from as usize), NodeIndex::new(to as usize), edge);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn shortcut_count(&self) -> usize {
        self.graph.edge_weights().filter(|e| e.is_shortcut()).count()
    }

    #[inline]
    pub fn level(&self, node: u32) -> u32 {
        self.level[node as usize]
    }

    /// Hierarchy connections incident to `node` whose far endpoint sits
    /// strictly higher. Storage orientation carries no meaning beyond
    /// which weight component prices which traversal, so both stored
    /// directions are scanned. Yields the neighbour, the edge, and
    /// whether moving to the neighbour follows the stored `from → to`
    /// orientation; the caller pairs that flag with its search
    /// direction to pick the component.
    pub(crate) fn upward(
        &self,
        node: u32,
    ) -> impl Iterator<Item = (u32, &ContractedEdge, bool)> + '_ {
        let here = self.level(node);
        let index = NodeIndex::new(node as usize);

        let outgoing = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|e| (e.target().index() as u32, e.weight(), true));

        let incoming = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .map(|e| (e.source().index() as u32, e.weight(), false));

        outgoing
            .chain(incoming)
            .filter(move |(next, _, _)| self.level[*next as usize] > here)
    }

    /// The cheapest stored connection for travelling `a → b`, in either
    /// stored orientation. Returns the effective weight and the bypassed
    /// node when the connection is a shortcut.
    fn best_connection(&self, a: u32, b: u32) -> Option<(f32, Option<u32>)> {
        let forward = self
            .graph
            .edges_connecting(NodeIndex::new(a as usize), NodeIndex::new(b as usize))
            .map(|e| (e.weight().weight_forward, e.weight().contracted));

        let backward = self
            .graph
            .edges_connecting(NodeIndex::new(b as usize), NodeIndex::new(a as usize))
            .map(|e| (e.weight().weight_backward, e.weight().contracted));

        forward
            .chain(backward)
            .filter(|(w, _)| w.is_finite())
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
    }

    /// Replaces every shortcut step in `path` with the nodes it
    /// summarises, until only original connections remain.
    ///
    /// Expansion runs on an explicit stack: hierarchies over large
    /// networks nest shortcuts deeply enough to overflow the call stack.
    pub fn expand_path(&self, path: &[u32]) -> Vec<u32> {
        let Some(&first) = path.first() else {
            return Vec::new();
        };

        let mut expanded = vec![first];
        for pair in path.windows(2) {
            self.expand_pair(pair[0], pair[1], &mut expanded);
        }

        expanded
    }

    /// Appends the expansion of the step `a → b` to `out`, excluding `a`
    /// itself (assumed already emitted) and including `b`.
    fn expand_pair(&self, a: u32, b: u32, out: &mut Vec<u32>) {
        let mut stack = vec![(a, b)];

        while let Some((from, to)) = stack.pop() {
            match self.best_connection(from, to) {
                Some((_, Some(via))) => {
                    // Right half first so the left half is expanded first.
                    stack.push((via, to));
                    stack.push((from, via));
                }
                _ => out.push(to),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expansion_unwinds_nested_shortcuts() {
        // 0 - 1 - 2 - 3 in a chain; contract 1, then 2.
        let mut ch = ContractedGraph::new(4, vec![3, 0, 1, 2]);
        ch.add_edge(0, 1, ContractedEdge::original(1.0, 1.0));
        ch.add_edge(1, 2, ContractedEdge::original(1.0, 1.0));
        ch.add_edge(2, 3, ContractedEdge::original(1.0, 1.0));
        ch.add_edge(0, 2, ContractedEdge::shortcut(2.0, 2.0, 1));
        ch.add_edge(0, 3, ContractedEdge::shortcut(3.0, 3.0, 2));

        assert_eq!(ch.expand_path(&[0, 3]), vec![0, 1, 2, 3]);
        assert_eq!(ch.expand_path(&[3, 0]), vec![3, 2, 1, 0]);
    }

    #[test]
    fn upward_respects_levels() {
        let mut ch = ContractedGraph::new(3, vec![0, 2, 1]);
        ch.add_edge(0, 1, ContractedEdge::original(1.0, 1.0));
        ch.add_edge(1, 2, ContractedEdge::original(1.0, 1.0));

        assert_eq!(ch.upward(0).count(), 1);
        // 1 is the top of the hierarchy, nothing is higher.
        assert_eq!(ch.upward(1).count(), 0);
        // 2 ascends to 1 through an edge stored the other way round.
        assert_eq!(ch.upward(2).count(), 1);
    }

    #[test]
    fn upward_sees_both_stored_orientations() {
        // 0 and 2 both sit above 1, and both connections are stored
        // with the higher node as `from`; neither may be dropped.
        let mut ch = ContractedGraph::new(3, vec![1, 0, 2]);
        ch.add_edge(0, 1, ContractedEdge::original(4.0, 5.0));
        ch.add_edge(2, 1, ContractedEdge::original(6.0, 7.0));

        let up = ch.upward(1).collect::<Vec<_>>();
        assert_eq!(up.len(), 2);

        assert!(up
            .iter()
            .any(|(next, edge, forward)| *next == 0 && !*forward && edge.weight_backward == 5.0));
        assert!(up
            .iter()
            .any(|(next, edge, forward)| *next == 2 && !*forward && edge.weight_backward == 7.0));

        // The top of the hierarchy has nowhere further to climb.
        assert_eq!(ch.upward(2).count(), 0);
    }
}
