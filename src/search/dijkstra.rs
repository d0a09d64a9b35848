use crate::network::{RoutingNetwork, VertexId};
use crate::profile::FactorSource;
use crate::search::path::EdgePath;
use crate::search::space::{SearchSpace, NO_PARENT};
use crate::search::{SearchBudget, SearchError};

#[cfg(feature = "tracing")]
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    /// Traverses the graph with every edge direction logically reversed.
    Backward,
}

/// What a relaxation step accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Profile-weighted cost: `distance / factor`.
    Weighted,
    /// Raw meters; the factor only gates access. Used by bounded
    /// reachability queries such as the connectivity check.
    Distance,
}

/// One directional frontier over the plain network. The bidirectional
/// kernels drive two of these in lockstep; [`Dijkstra`] drives one to
/// exhaustion.
pub(crate) struct DijkstraWorker<'n> {
    network: &'n RoutingNetwork,
    factors: FactorSource<'n>,
    direction: SearchDirection,
    metric: Metric,
    pub(crate) space: SearchSpace<VertexId>,
}

impl<'n> DijkstraWorker<'n> {
    pub fn new(
        network: &'n RoutingNetwork,
        factors: FactorSource<'n>,
        direction: SearchDirection,
        metric: Metric,
    ) -> Self {
        DijkstraWorker {
            network,
            factors,
            direction,
            metric,
            space: SearchSpace::new(),
        }
    }

    pub fn seed(&mut self, paths: &[EdgePath]) {
        for path in paths {
            self.space.push(path.vertex, NO_PARENT, path.weight);
        }
    }

    pub fn peek(&mut self) -> Option<f32> {
        self.space.peek()
    }

    /// Settles the cheapest open vertex and relaxes its neighbourhood.
    pub fn step(&mut self) -> Option<(usize, VertexId, f32)> {
        let (index, weight) = self.space.pop()?;
        let vertex = *self.space.node(index);

        self.relax(index, vertex, weight);
        Some((index, vertex, weight))
    }

    fn relax(&mut self, index: usize, vertex: VertexId, weight: f32) {
        for traversal in self.network.adjacent(vertex) {
            let factor = self.factors.factor(traversal.data.profile_id);

            // A backward frontier runs over the reversed graph: moving
            // towards the neighbour means the edge is really traversed
            // the other way round.
            let orientation = match self.direction {
                SearchDirection::Forward => traversal.forward,
                SearchDirection::Backward => !traversal.forward,
            };

            if !factor.allows(orientation) {
                continue;
            }

            let cost = match self.metric {
                Metric::Weighted => traversal.data.distance / factor.value,
                Metric::Distance => traversal.data.distance,
            };

            self.space.push(traversal.neighbour, index, weight + cost);
        }
    }
}

/// Plain one-directional Dijkstra, run to exhaustion within the budget.
///
/// This is a reachability kernel rather than a point-to-point one: it
/// settles everything the budget allows and hands back the settled set
/// for the caller to interrogate.
pub struct Dijkstra<'n> {
    network: &'n RoutingNetwork,
    factors: FactorSource<'n>,
    direction: SearchDirection,
    metric: Metric,
    budget: SearchBudget,
}

impl<'n> Dijkstra<'n> {
    pub fn new(network: &'n RoutingNetwork, factors: FactorSource<'n>) -> Self {
        Dijkstra {
            network,
            factors,
            direction: SearchDirection::Forward,
            metric: Metric::Weighted,
            budget: SearchBudget::default(),
        }
    }

    pub fn direction(mut self, direction: SearchDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    pub fn run(self, sources: &[EdgePath]) -> Result<SettledSet, SearchError> {
        let Dijkstra {
            network,
            factors,
            direction,
            metric,
            budget,
        } = self;

        let mut worker = DijkstraWorker::new(network, factors, direction, metric);
        worker.seed(sources);

        let mut reached_limit = false;

        loop {
            budget.check_cancelled()?;

            if !budget.allows_settled(worker.space.settled_count()) {
                reached_limit = true;
                break;
            }

            match worker.peek() {
                None => break,
                Some(weight) if !budget.allows_weight(weight) => {
                    reached_limit = true;
                    break;
                }
                Some(_) => {
                    worker.step();
                }
            }
        }

        Ok(SettledSet {
            space: worker.space,
            reached_limit,
        })
    }
}

/// The frozen result of a reachability run.
pub struct SettledSet {
    space: SearchSpace<VertexId>,
    reached_limit: bool,
}

impl SettledSet {
    /// Final weight and predecessor of a settled vertex.
    pub fn has_settled(&self, vertex: VertexId) -> Option<(f32, Option<VertexId>)> {
        self.space.settled_weight(&vertex).map(|(weight, index)| {
            let predecessor = {
                let chain = self.space.path_from(index);
                (chain.len() >= 2).then(|| chain[chain.len() - 2])
            };

            (weight, predecessor)
        })
    }

    /// The settled chain root → `vertex`, when the vertex was settled.
    pub fn path(&self, vertex: VertexId) -> Option<Vec<VertexId>> {
        self.space
            .settled_weight(&vertex)
            .map(|(_, index)| self.space.path_from(index))
    }

    pub fn settled_count(&self) -> usize {
        self.space.settled_count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f32)> + '_ {
        self.space.settled_iter().map(|(vertex, weight)| (*vertex, weight))
    }

    /// Whether the run was cut short by its budget rather than by
    /// running out of reachable vertices.
    pub fn reached_limit(&self) -> bool {
        self.reached_limit
    }
}
