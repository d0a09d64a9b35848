use crate::contracted::{ContractedGraph, EdgeBasedContractedGraph};
use crate::network::{ContractedSet, RoutingNetwork, VertexId};
use crate::profile::FactorSource;
use crate::restriction::RestrictionIndex;
use crate::resolve::RouterPoint;
use crate::route::{BuildRoute, Route};
use crate::search::contracted::{Ascent, HierarchyWorker};
use crate::search::dijkstra::Dijkstra;
use crate::search::edge_based::EdgeDijkstra;
use crate::search::path::{direct_weight, EdgePath};
use crate::search::{SearchBudget, SearchError};

use log::warn;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[cfg(feature = "tracing")]
use tracing::Level;

/// A dense cost matrix. Unreachable pairs hold `f32::INFINITY`; rows and
/// columns dominated by unreachable entries are listed as invalid.
#[derive(Debug, Clone)]
pub struct WeightMatrix {
    pub weights: Vec<Vec<f32>>,
    pub invalid_sources: Vec<usize>,
    pub invalid_targets: Vec<usize>,
}

/// Full route grid. Slots without a usable route hold `None`.
pub struct ManyToManyRoutes {
    pub routes: Vec<Vec<Option<Route>>>,
    pub invalid_sources: Vec<usize>,
    pub invalid_targets: Vec<usize>,
}

/// The many-to-many engine: shares one directional search per source
/// (and per target, over a hierarchy) across a whole row of the matrix.
///
/// Rows are independent searches over immutable state and run in
/// parallel; a single search stays sequential.
pub struct MatrixEngine<'n> {
    network: &'n RoutingNetwork,
    factors: FactorSource<'n>,
    budget: SearchBudget,
}

impl<'n> MatrixEngine<'n> {
    pub fn new(network: &'n RoutingNetwork, factors: FactorSource<'n>, budget: SearchBudget) -> Self {
        MatrixEngine {
            network,
            factors,
            budget,
        }
    }

    fn source_paths(&self, points: &[RouterPoint]) -> Vec<SmallVec<[EdgePath; 2]>> {
        points
            .iter()
            .map(|p| EdgePath::for_source(self.network, &self.factors, p))
            .collect()
    }

    fn target_paths(&self, points: &[RouterPoint]) -> Vec<SmallVec<[EdgePath; 2]>> {
        points
            .iter()
            .map(|p| EdgePath::for_target(self.network, &self.factors, p))
            .collect()
    }

    /// Computes the weight matrix, choosing the cheapest applicable
    /// algorithm for the attached graphs and restrictions.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    pub fn weights(
        &self,
        contracted: Option<&ContractedSet>,
        restrictions: Option<&RestrictionIndex>,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<WeightMatrix, SearchError> {
        let complex = restrictions.is_some_and(|r| !r.is_empty());

        let mut weights = match (contracted, complex) {
            (Some(set), true) if set.edge_based.is_some() => {
                self.weights_edge_contracted(set.edge_based.as_ref().unwrap(), sources, targets)?
            }
            (Some(set), false) if set.node_based.is_some() => {
                self.weights_contracted(set.node_based.as_ref().unwrap(), sources, targets)?
            }
            (_, true) => {
                if contracted.is_some() {
                    warn!(
                        "complex restrictions without an edge-based contracted graph, \
                         falling back to the plain restriction-aware search"
                    );
                }
                self.weights_restricted(restrictions.unwrap(), sources, targets)?
            }
            _ => self.weights_plain(sources, targets)?,
        };

        // A trip confined to the shared edge never leaves it; the search
        // only prices paths through the vertices.
        for (i, source) in sources.iter().enumerate() {
            for (j, target) in targets.iter().enumerate() {
                if let Some(direct) = direct_weight(self.network, &self.factors, source, target) {
                    let slot = &mut weights[i][j];
                    *slot = slot.min(direct);
                }
            }
        }

        let (invalid_sources, invalid_targets) = mark_invalid(&weights);

        Ok(WeightMatrix {
            weights,
            invalid_sources,
            invalid_targets,
        })
    }

    /// One plain forward search per source row.
    fn weights_plain(
        &self,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<Vec<Vec<f32>>, SearchError> {
        let source_paths = self.source_paths(sources);
        let target_paths = self.target_paths(targets);

        source_paths
            .par_iter()
            .map(|paths| {
                let settled = Dijkstra::new(self.network, self.factors)
                    .budget(self.budget.clone())
                    .run(paths)?;

                let row = target_paths
                    .iter()
                    .map(|arrivals| {
                        arrivals
                            .iter()
                            .filter_map(|arrival| {
                                settled
                                    .has_settled(arrival.vertex)
                                    .map(|(weight, _)| weight + arrival.weight)
                            })
                            .fold(f32::INFINITY, f32::min)
                    })
                    .collect::<Vec<_>>();

                Ok(row)
            })
            .collect()
    }

    /// One restriction-aware forward search per source row.
    fn weights_restricted(
        &self,
        restrictions: &RestrictionIndex,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<Vec<Vec<f32>>, SearchError> {
        let source_paths = self.source_paths(sources);
        let target_paths = self.target_paths(targets);

        source_paths
            .par_iter()
            .map(|paths| {
                let results = EdgeDijkstra::new(self.network, self.factors, restrictions)
                    .budget(self.budget.clone())
                    .run_many(paths, &target_paths)?;

                Ok(results
                    .into_iter()
                    .map(|slot| slot.map_or(f32::INFINITY, |(weight, _)| weight))
                    .collect())
            })
            .collect()
    }

    /// Middle-set algorithm over the node-based hierarchy: every source
    /// climbs forward, every target climbs backward, and each pair meets
    /// at the cheapest shared node.
    fn weights_contracted(
        &self,
        contracted: &ContractedGraph,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<Vec<Vec<f32>>, SearchError> {
        let source_paths = self.source_paths(sources);
        let target_paths = self.target_paths(targets);

        let forward = source_paths
            .par_iter()
            .map(|paths| self.middle_set(contracted, Ascent::Forward, paths))
            .collect::<Result<Vec<_>, _>>()?;

        let backward = target_paths
            .par_iter()
            .map(|paths| self.middle_set(contracted, Ascent::Backward, paths))
            .collect::<Result<Vec<_>, _>>()?;

        let weights = forward
            .par_iter()
            .map(|row| {
                backward
                    .iter()
                    .map(|column| {
                        row.iter()
                            .filter_map(|(node, f)| column.get(node).map(|b| f + b))
                            .fold(f32::INFINITY, f32::min)
                    })
                    .collect()
            })
            .collect();

        Ok(weights)
    }

    /// The same middle-set scheme over the edge-expanded hierarchy; the
    /// meeting edge is priced by both halves and subtracted once.
    fn weights_edge_contracted(
        &self,
        contracted: &EdgeBasedContractedGraph,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<Vec<Vec<f32>>, SearchError> {
        let source_paths = self.source_paths(sources);
        let target_paths = self.target_paths(targets);

        let seed = |paths: &SmallVec<[EdgePath; 2]>| {
            paths
                .iter()
                .map(|p| (EdgeBasedContractedGraph::node_of(p.edge), p.weight))
                .collect::<SmallVec<[(u32, f32); 2]>>()
        };

        let hierarchy = contracted.hierarchy();

        let drain = |ascent: Ascent, seeds: SmallVec<[(u32, f32); 2]>| {
            let mut worker = HierarchyWorker::new(hierarchy, ascent);
            worker.seed(seeds);
            worker.drain(&self.budget)?;

            Ok::<_, SearchError>(
                worker
                    .space
                    .settled_iter()
                    .map(|(node, weight)| (*node, weight))
                    .collect::<FxHashMap<u32, f32>>(),
            )
        };

        let forward = source_paths
            .par_iter()
            .map(|paths| drain(Ascent::Forward, seed(paths)))
            .collect::<Result<Vec<_>, _>>()?;

        let backward = target_paths
            .par_iter()
            .map(|paths| drain(Ascent::Backward, seed(paths)))
            .collect::<Result<Vec<_>, _>>()?;

        let meeting_weight = |node: &u32| {
            let directed = EdgeBasedContractedGraph::directed_of(*node);
            let (data, _) = self.network.get_edge(directed)?;
            let factor = self.factors.factor(data.profile_id);

            factor
                .is_traversable()
                .then(|| data.distance / factor.value)
        };

        let weights = forward
            .par_iter()
            .map(|row| {
                backward
                    .iter()
                    .map(|column| {
                        row.iter()
                            .filter_map(|(node, f)| {
                                let b = column.get(node)?;
                                let total = f + b - meeting_weight(node)?;
                                (total >= 0.0).then_some(total)
                            })
                            .fold(f32::INFINITY, f32::min)
                    })
                    .collect()
            })
            .collect();

        Ok(weights)
    }

    fn middle_set(
        &self,
        contracted: &ContractedGraph,
        ascent: Ascent,
        paths: &SmallVec<[EdgePath; 2]>,
    ) -> Result<FxHashMap<u32, f32>, SearchError> {
        let mut worker = HierarchyWorker::new(contracted, ascent);
        worker.seed(paths.iter().map(|p| (p.vertex.0, p.weight)));
        worker.drain(&self.budget)?;

        Ok(worker
            .space
            .settled_iter()
            .map(|(node, weight)| (*node, weight))
            .collect())
    }

    /// Full routes, many-to-many. One augmented forward search per
    /// source settles every target, then each demanded path is rebuilt
    /// individually; the hierarchy is deliberately not involved so the
    /// paths come out ready for the route builder.
    ///
    /// TODO: take weights from the hierarchy when one is attached and
    /// only expand the paths a caller actually reads.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip_all))]
    pub fn routes(
        &self,
        restrictions: Option<&RestrictionIndex>,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
        builder: &dyn BuildRoute,
    ) -> Result<ManyToManyRoutes, SearchError> {
        let complex = restrictions.is_some_and(|r| !r.is_empty());

        let source_paths = self.source_paths(sources);
        let target_paths = self.target_paths(targets);

        let rows: Vec<Vec<Option<(f32, Vec<VertexId>)>>> = if complex {
            source_paths
                .par_iter()
                .map(|paths| {
                    EdgeDijkstra::new(self.network, self.factors, restrictions.unwrap())
                        .budget(self.budget.clone())
                        .run_many(paths, &target_paths)
                })
                .collect::<Result<_, _>>()?
        } else {
            source_paths
                .par_iter()
                .map(|paths| {
                    let settled = Dijkstra::new(self.network, self.factors)
                        .budget(self.budget.clone())
                        .run(paths)?;

                    let row = target_paths
                        .iter()
                        .map(|arrivals| {
                            arrivals
                                .iter()
                                .filter_map(|arrival| {
                                    let (weight, _) = settled.has_settled(arrival.vertex)?;
                                    let path = settled.path(arrival.vertex)?;
                                    Some((weight + arrival.weight, path))
                                })
                                .min_by(|(a, _), (b, _)| a.total_cmp(b))
                        })
                        .collect::<Vec<_>>();

                    Ok(row)
                })
                .collect::<Result<_, _>>()?
        };

        let mut weights = vec![vec![f32::INFINITY; targets.len()]; sources.len()];
        let mut routes = Vec::with_capacity(sources.len());

        for (i, row) in rows.into_iter().enumerate() {
            let mut built_row = Vec::with_capacity(targets.len());

            for (j, slot) in row.into_iter().enumerate() {
                let direct = direct_weight(self.network, &self.factors, &sources[i], &targets[j]);

                // The searched path is kept unless the on-edge trip is
                // strictly cheaper.
                let chosen = match (slot, direct) {
                    (Some((searched, path)), Some(direct)) if direct < searched => {
                        Some((direct, Vec::new()))
                    }
                    (Some(found), _) => Some(found),
                    (None, Some(direct)) => Some((direct, Vec::new())),
                    (None, None) => None,
                };

                let built = chosen.and_then(|(weight, path)| {
                    weights[i][j] = weight;

                    match builder.build(self.network, &self.factors, &sources[i], &targets[j], &path)
                    {
                        Ok(route) => Some(route),
                        Err(err) => {
                            warn!("route building failed for pair ({i}, {j}): {err}");
                            None
                        }
                    }
                });

                built_row.push(built);
            }

            routes.push(built_row);
        }

        let (invalid_sources, invalid_targets) = mark_invalid(&weights);

        Ok(ManyToManyRoutes {
            routes,
            invalid_sources,
            invalid_targets,
        })
    }
}

/// A source is invalid when strictly more than `(|T| - 1) / 2` of its
/// non-self entries are unreachable; targets mirror this over columns.
fn mark_invalid(weights: &[Vec<f32>]) -> (Vec<usize>, Vec<usize>) {
    let source_count = weights.len();
    let target_count = weights.first().map_or(0, Vec::len);

    let invalid_sources = weights
        .iter()
        .enumerate()
        .filter(|(i, row)| {
            let unreachable = row
                .iter()
                .enumerate()
                .filter(|(j, w)| *j != *i && w.is_infinite())
                .count();

            2 * unreachable > target_count.saturating_sub(1)
        })
        .map(|(i, _)| i)
        .collect();

    let invalid_targets = (0..target_count)
        .filter(|j| {
            let unreachable = weights
                .iter()
                .enumerate()
                .filter(|(i, row)| *i != *j && row[*j].is_infinite())
                .count();

            2 * unreachable > source_count.saturating_sub(1)
        })
        .collect();

    (invalid_sources, invalid_targets)
}
