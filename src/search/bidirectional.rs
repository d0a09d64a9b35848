use crate::network::RoutingNetwork;
use crate::profile::FactorSource;
use crate::search::dijkstra::{DijkstraWorker, Metric, SearchDirection};
use crate::search::path::EdgePath;
use crate::search::{SearchBudget, SearchError, SearchOutcome};

#[cfg(feature = "tracing")]
use tracing::Level;

/// Bidirectional Dijkstra over the uncontracted network.
///
/// A forward frontier grows from the source, a backward one from the
/// target; whichever frontier currently has the cheaper top is expanded.
/// The search keeps the best weight at which the frontiers have touched
/// and stops once the two tops together can no longer beat it.
pub struct BidirectionalDijkstra<'n> {
    network: &'n RoutingNetwork,
    factors: FactorSource<'n>,
    budget: SearchBudget,
}

impl<'n> BidirectionalDijkstra<'n> {
    pub fn new(network: &'n RoutingNetwork, factors: FactorSource<'n>) -> Self {
        BidirectionalDijkstra {
            network,
            factors,
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
        let mut forward = DijkstraWorker::new(
            self.network,
            self.factors,
            SearchDirection::Forward,
            Metric::Weighted,
        );
        let mut backward = DijkstraWorker::new(
            self.network,
            self.factors,
            SearchDirection::Backward,
            Metric::Weighted,
        );

        forward.seed(sources);
        backward.seed(targets);

        // (total weight, forward arena index, backward arena index)
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

            // An exhausted frontier keeps participating through its
            // settled set; the live side continues alone until nothing
            // cheaper than the best meeting can remain.
            let expand_forward = match (front, back) {
                (None, None) => break,
                (Some(f), Some(b)) => {
                    if let Some((meet, _, _)) = best {
                        if f + b > meet {
                            break;
                        }
                    }
                    f <= b
                }
                (Some(f), None) => {
                    if best.is_some_and(|(meet, _, _)| f > meet) {
                        break;
                    }
                    true
                }
                (None, Some(b)) => {
                    if best.is_some_and(|(meet, _, _)| b > meet) {
                        break;
                    }
                    false
                }
            };

            let lowest = match (front, back) {
                (Some(f), Some(b)) => f.min(b),
                (Some(f), None) => f,
                (None, Some(b)) => b,
                (None, None) => unreachable!(),
            };
            if !self.budget.allows_weight(lowest) {
                limited = true;
                break;
            }

            if expand_forward {
                if let Some((index, vertex, weight)) = forward.step() {
                    if let Some((other, other_index)) = backward.space.visited_weight(&vertex) {
                        let total = weight + other;
                        if best.is_none_or(|(meet, _, _)| total < meet) {
                            best = Some((total, index, other_index));
                        }
                    }
                }
            } else if let Some((index, vertex, weight)) = backward.step() {
                if let Some((other, other_index)) = forward.space.visited_weight(&vertex) {
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

        // Forward chain runs source → meeting vertex; the backward chain
        // is reversed and re-joined at the meeting vertex.
        let mut path = forward.space.path_from(forward_index);
        let tail = backward.space.path_from(backward_index);
        path.extend(tail.into_iter().rev().skip(1));

        Ok(SearchOutcome { weight, path })
    }
}
