use crate::network::{DirectedEdgeId, RoutingNetwork, VertexId};
use crate::profile::FactorSource;
use crate::restriction::RestrictionIndex;
use crate::search::path::EdgePath;
use crate::search::space::{SearchSpace, NO_PARENT};
use crate::search::{SearchBudget, SearchError, SearchOutcome};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[cfg(feature = "tracing")]
use tracing::Level;

/// Search state of the restriction-aware kernel: a directed edge that
/// has been traversed to its head, plus the trailing vertices needed to
/// recognise any restriction that could still complete.
///
/// The window always ends with the head vertex of `edge` and never grows
/// beyond one less than the longest restriction, so states stay small
/// and states reached along restriction-equivalent histories collapse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeState {
    edge: DirectedEdgeId,
    window: SmallVec<[VertexId; 3]>,
}

impl EdgeState {
    #[inline]
    fn head(&self) -> VertexId {
        *self.window.last().unwrap()
    }
}

/// Dijkstra over directed edges, honouring turn restrictions exactly.
///
/// Used directly when restrictions rule out the vertex-addressed kernels
/// and no edge-expanded hierarchy exists; the router presents it through
/// the same interface as the bidirectional kernels.
pub struct EdgeDijkstra<'n> {
    network: &'n RoutingNetwork,
    factors: FactorSource<'n>,
    restrictions: &'n RestrictionIndex,
    budget: SearchBudget,
}

impl<'n> EdgeDijkstra<'n> {
    pub fn new(
        network: &'n RoutingNetwork,
        factors: FactorSource<'n>,
        restrictions: &'n RestrictionIndex,
    ) -> Self {
        EdgeDijkstra {
            network,
            factors,
            restrictions,
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
        let slots = [SmallVec::from_slice(targets)];
        let mut results = self.run_many(sources, &slots)?;

        match results.pop().flatten() {
            Some((weight, path)) => Ok(SearchOutcome { weight, path }),
            None => Err(SearchError::Exhausted),
        }
    }

    /// Runs one forward search against any number of target slots,
    /// returning the best weight and vertex path per slot.
    pub fn run_many(
        self,
        sources: &[EdgePath],
        targets: &[SmallVec<[EdgePath; 2]>],
    ) -> Result<Vec<Option<(f32, Vec<VertexId>)>>, SearchError> {
        let window_len = self.restrictions.max_len().saturating_sub(1).max(1);

        // Arrivals keyed by the directed edge a route would enter the
        // target through, valued with the on-edge cost to the point.
        let mut arrivals: FxHashMap<DirectedEdgeId, Vec<(usize, f32)>> = FxHashMap::default();
        for (slot, paths) in targets.iter().enumerate() {
            for path in paths {
                arrivals.entry(path.edge).or_default().push((slot, path.weight));
            }
        }

        let mut best: Vec<Option<(f32, usize)>> = vec![None; targets.len()];
        let mut space: SearchSpace<EdgeState> = SearchSpace::new();

        for path in sources {
            // A point sitting on the tail traverses the whole first
            // edge, so the tail joins the window straight away.
            let mut window: SmallVec<[VertexId; 3]> =
                path.tail.into_iter().chain([path.vertex]).collect();

            let start = window.len().saturating_sub(window_len);
            window.drain(..start);

            space.push(
                EdgeState {
                    edge: path.edge,
                    window,
                },
                NO_PARENT,
                path.weight,
            );
        }

        loop {
            self.budget.check_cancelled()?;

            if !self.budget.allows_settled(space.settled_count()) {
                break;
            }

            let Some(top) = space.peek() else {
                break;
            };

            if !self.budget.allows_weight(top) {
                break;
            }

            // Once every slot has an arrival no cheaper weight remains:
            // future arrivals only add non-negative on-edge cost.
            if best.iter().all(Option::is_some) {
                let worst = best
                    .iter()
                    .map(|b| b.unwrap().0)
                    .fold(f32::NEG_INFINITY, f32::max);
                if top > worst {
                    break;
                }
            }

            let Some((index, weight)) = space.pop() else {
                break;
            };
            let state = space.node(index).clone();
            let head = state.head();

            for traversal in self.network.adjacent(head) {
                // Never bounce straight back along the edge just taken.
                if traversal.edge == state.edge.edge() {
                    continue;
                }

                let factor = self.factors.factor(traversal.data.profile_id);
                if !factor.allows(traversal.forward) {
                    continue;
                }

                let next = DirectedEdgeId::new(traversal.edge, traversal.forward);

                let mut sequence = state.window.clone();
                sequence.push(traversal.neighbour);

                // A forbidden transition is unusable even to enter the
                // target edge: the edge-expanded hierarchy omits such
                // transitions entirely, and both kernels must agree.
                if self.restrictions.forbids_suffix(&sequence) {
                    continue;
                }

                if let Some(entries) = arrivals.get(&next) {
                    for (slot, arrival) in entries {
                        let total = weight + arrival;
                        if best[*slot].is_none_or(|(current, _)| total < current) {
                            best[*slot] = Some((total, index));
                        }
                    }
                }

                let start = sequence.len().saturating_sub(window_len);
                let window = SmallVec::from_slice(&sequence[start..]);

                let cost = traversal.data.distance / factor.value;
                space.push(EdgeState { edge: next, window }, index, weight + cost);
            }
        }

        let results = best
            .into_iter()
            .map(|slot| {
                slot.map(|(weight, index)| {
                    let path = space
                        .path_from(index)
                        .iter()
                        .map(EdgeState::head)
                        .collect::<Vec<_>>();

                    (weight, path)
                })
            })
            .collect();

        Ok(results)
    }
}
