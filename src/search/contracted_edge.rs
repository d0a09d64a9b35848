use crate::contracted::EdgeBasedContractedGraph;
use crate::network::{DirectedEdgeId, RoutingNetwork, VertexId};
use crate::profile::FactorSource;
use crate::search::contracted::{Ascent, HierarchyWorker};
use crate::search::path::EdgePath;
use crate::search::{SearchBudget, SearchError, SearchOutcome};

#[cfg(feature = "tracing")]
use tracing::Level;

/// Bidirectional search over an edge-expanded contracted hierarchy.
///
/// Hierarchy nodes are directed edges, so forbidden turns simply have no
/// transition and restrictions hold by construction. The forward weight
/// of a node covers the full traversal of its edge; the backward weight
/// covers it too, so a meeting subtracts the doubly-counted edge once.
pub struct EdgeContractedDijkstra<'n> {
    network: &'n RoutingNetwork,
    factors: FactorSource<'n>,
    contracted: &'n EdgeBasedContractedGraph,
    budget: SearchBudget,
}

impl<'n> EdgeContractedDijkstra<'n> {
    pub fn new(
        network: &'n RoutingNetwork,
        factors: FactorSource<'n>,
        contracted: &'n EdgeBasedContractedGraph,
    ) -> Self {
        EdgeContractedDijkstra {
            network,
            factors,
            contracted,
            budget: SearchBudget::default(),
        }
    }

    pub fn budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Full weighted cost of traversing a directed edge.
    fn edge_weight(&self, directed: DirectedEdgeId) -> Option<f32> {
        let (data, _) = self.network.get_edge(directed)?;
        let factor = self.factors.factor(data.profile_id);

        factor
            .is_traversable()
            .then(|| data.distance / factor.value)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    pub fn run(
        self,
        sources: &[EdgePath],
        targets: &[EdgePath],
    ) -> Result<SearchOutcome, SearchError> {
        let hierarchy = self.contracted.hierarchy();

        let mut forward = HierarchyWorker::new(hierarchy, Ascent::Forward);
        let mut backward = HierarchyWorker::new(hierarchy, Ascent::Backward);

        forward.seed(
            sources
                .iter()
                .map(|p| (EdgeBasedContractedGraph::node_of(p.edge), p.weight)),
        );
        backward.seed(
            targets
                .iter()
                .map(|p| (EdgeBasedContractedGraph::node_of(p.edge), p.weight)),
        );

        let mut best: Option<(f32, usize, usize)> = None;
        let mut limited = false;

        loop {
            self.budget.check_cancelled()?;

            let settled = forward.space.settled_count() + backward.space.settled_count();
            if !self.budget.allows_settled(settled) {
                limited = true;
                break;
            }

            let front = forward.peek();
            let back = backward.peek();

            let front_open = front.is_some_and(|f| best.is_none_or(|(meet, _, _)| f <= meet));
            let back_open = back.is_some_and(|b| best.is_none_or(|(meet, _, _)| b <= meet));

            if !front_open && !back_open {
                break;
            }

            let lowest = match (front, back) {
                (Some(f), Some(b)) => f.min(b),
                (Some(f), None) => f,
                (None, Some(b)) => b,
                (None, None) => break,
            };
            if !self.budget.allows_weight(lowest) {
                limited = true;
                break;
            }

            let expand_forward = match (front_open, back_open) {
                (true, true) => front <= back,
                (open, _) => open,
            };

            let meeting = if expand_forward {
                forward.step().and_then(|(index, node, weight)| {
                    backward
                        .space
                        .visited_weight(&node)
                        .map(|(other, other_index)| (node, weight + other, index, other_index))
                })
            } else {
                backward.step().and_then(|(index, node, weight)| {
                    forward
                        .space
                        .visited_weight(&node)
                        .map(|(other, other_index)| (node, other + weight, other_index, index))
                })
            };

            if let Some((node, joined, forward_index, backward_index)) = meeting {
                let directed = EdgeBasedContractedGraph::directed_of(node);
                let Some(edge_weight) = self.edge_weight(directed) else {
                    continue;
                };

                // Both halves priced the meeting edge in full.
                let total = joined - edge_weight;
                if total >= 0.0 && best.is_none_or(|(meet, _, _)| total < meet) {
                    best = Some((total, forward_index, backward_index));
                }
            }
        }

        let Some((weight, forward_index, backward_index)) = best else {
            return Err(if limited {
                SearchError::BudgetSpent
            } else {
                SearchError::Exhausted
            });
        };

        let mut nodes = forward.space.path_from(forward_index);
        let tail = backward.space.path_from(backward_index);
        nodes.extend(tail.into_iter().rev().skip(1));

        let directed = nodes
            .iter()
            .map(|n| EdgeBasedContractedGraph::directed_of(*n))
            .collect::<Vec<_>>();
        let expanded = self.contracted.expand_directed(&directed);

        // The vertex chain covers every fully traversed edge; the final
        // (target) edge is entered at its tail and trimmed by the route
        // builder, so its head is dropped.
        let path = expanded
            .iter()
            .take(expanded.len().saturating_sub(1))
            .filter_map(|d| self.network.get_edge(*d).map(|(_, (_, head))| head))
            .collect::<Vec<VertexId>>();

        Ok(SearchOutcome { weight, path })
    }
}
