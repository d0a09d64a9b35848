use crate::contracted::ContractedGraph;
use crate::network::VertexId;
use crate::search::path::EdgePath;
use crate::search::space::{SearchSpace, NO_PARENT};
use crate::search::{SearchBudget, SearchError, SearchOutcome};

#[cfg(feature = "tracing")]
use tracing::Level;

/// Which weight component a hierarchy frontier accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ascent {
    Forward,
    Backward,
}

/// One frontier climbing a contracted hierarchy: only edges towards
/// strictly higher contraction levels are relaxed. The weight component
/// of each move follows from the frontier's direction combined with the
/// stored orientation of the connection it rides.
pub(crate) struct HierarchyWorker<'h> {
    hierarchy: &'h ContractedGraph,
    ascent: Ascent,
    pub(crate) space: SearchSpace<u32>,
}

impl<'h> HierarchyWorker<'h> {
    pub fn new(hierarchy: &'h ContractedGraph, ascent: Ascent) -> Self {
        HierarchyWorker {
            hierarchy,
            ascent,
            space: SearchSpace::new(),
        }
    }

    pub fn seed(&mut self, seeds: impl IntoIterator<Item = (u32, f32)>) {
        for (node, weight) in seeds {
            self.space.push(node, NO_PARENT, weight);
        }
    }

    pub fn peek(&mut self) -> Option<f32> {
        self.space.peek()
    }

    pub fn step(&mut self) -> Option<(usize, u32, f32)> {
        let (index, weight) = self.space.pop()?;
        let node = *self.space.node(index);

        for (next, edge, stored_forward) in self.hierarchy.upward(node) {
            // A forward frontier riding a connection along its stored
            // orientation pays the forward component; against it, the
            // backward one. A backward frontier pays the opposite,
            // since it explores the reversed connection.
            let component = match (self.ascent, stored_forward) {
                (Ascent::Forward, true) | (Ascent::Backward, false) => edge.weight_forward,
                (Ascent::Forward, false) | (Ascent::Backward, true) => edge.weight_backward,
            };

            if !component.is_finite() {
                continue;
            }

            self.space.push(next, index, weight + component);
        }

        Some((index, node, weight))
    }

    /// Drives the frontier to exhaustion within the budget; used by the
    /// many-to-many engine to build middle sets.
    pub fn drain(&mut self, budget: &SearchBudget) -> Result<(), SearchError> {
        loop {
            budget.check_cancelled()?;

            if !budget.allows_settled(self.space.settled_count()) {
                return Ok(());
            }

            match self.peek() {
                None => return Ok(()),
                Some(weight) if !budget.allows_weight(weight) => return Ok(()),
                Some(_) => {
                    self.step();
                }
            }
        }
    }
}

/// Bidirectional search over a node-based contracted hierarchy.
///
/// Both frontiers only climb; shortcut edges are taken as-is during the
/// search and unwound into original edges afterwards. The search stops
/// when *both* frontier tops exceed the best meeting weight, since a
/// cheaper meeting would need both halves to still improve.
pub struct ContractedDijkstra<'n> {
    contracted: &'n ContractedGraph,
    budget: SearchBudget,
}

impl<'n> ContractedDijkstra<'n> {
    pub fn new(contracted: &'n ContractedGraph) -> Self {
        ContractedDijkstra {
            contracted,
            budget: SearchBudget::default(),
        }
    }

    pub fn budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    pub fn run(
        self,
        sources: &[EdgePath],
        targets: &[EdgePath],
    ) -> Result<SearchOutcome, SearchError> {
        let mut forward = HierarchyWorker::new(self.contracted, Ascent::Forward);
        let mut backward = HierarchyWorker::new(self.contracted, Ascent::Backward);

        forward.seed(sources.iter().map(|p| (p.vertex.0, p.weight)));
        backward.seed(targets.iter().map(|p| (p.vertex.0, p.weight)));

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

            // Prefer the cheaper open frontier.
            let expand_forward = match (front_open, back_open) {
                (true, true) => front <= back,
                (open, _) => open,
            };

            if expand_forward {
                if let Some((index, node, weight)) = forward.step() {
                    if let Some((other, other_index)) = backward.space.visited_weight(&node) {
                        let total = weight + other;
                        if best.is_none_or(|(meet, _, _)| total < meet) {
                            best = Some((total, index, other_index));
                        }
                    }
                }
            } else if let Some((index, node, weight)) = backward.step() {
                if let Some((other, other_index)) = forward.space.visited_weight(&node) {
                    let total = weight + other;
                    if best.is_none_or(|(meet, _, _)| total < meet) {
                        best = Some((total, other_index, index));
                    }
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

        // Shortcuts expand only at reconstruction time.
        let path = self
            .contracted
            .expand_path(&nodes)
            .into_iter()
            .map(VertexId)
            .collect();

        Ok(SearchOutcome { weight, path })
    }
}
