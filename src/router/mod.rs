//! The engine front-end: profile checks, kernel selection and the
//! public `try_*` surface.

mod config;
mod error;


pub use config::{RouterConfig, DEFAULT_MAX_SEARCH_DISTANCE};
pub use error::{ErrorKind, RouterError};

use crate::network::{EdgeData, EdgeId, RoutingNetwork};
use crate::profile::{FactorSource, Profile};
use crate::resolve::{EdgeResolver, Resolve, ResolveQuery, RouterPoint};
use crate::route::{BuildRoute, DefaultRouteBuilder, Route};
use crate::search::{
    direct_weight, BidirectionalDijkstra, ContractedDijkstra, Dijkstra, EdgeContractedDijkstra,
    EdgeDijkstra, EdgePath, ManyToManyRoutes, MatrixEngine, Metric, SearchBudget, SearchError,
    SearchOutcome, WeightMatrix,
};

use geo::point;
use log::warn;
#[cfg(feature = "tracing")]
use tracing::Level;

const DEFAULT_RESOLVER: EdgeResolver = EdgeResolver;
const DEFAULT_BUILDER: DefaultRouteBuilder = DefaultRouteBuilder;

/// The routing engine.
///
/// A router borrows a frozen [`RoutingNetwork`]; any number of routers
/// and queries may share one network concurrently. All per-query state
/// lives on the stack of the call.
pub struct Router<'n> {
    network: &'n RoutingNetwork,
    config: RouterConfig,
}

impl<'n> Router<'n> {
    pub fn new(network: &'n RoutingNetwork) -> Self {
        Router {
            network,
            config: RouterConfig::default(),
        }
    }

    pub fn with_config(network: &'n RoutingNetwork, config: RouterConfig) -> Self {
        Router { network, config }
    }

    pub fn network(&self) -> &'n RoutingNetwork {
        self.network
    }

    pub fn supports(&self, profile: &dyn Profile) -> bool {
        self.network.supports(profile.name())
    }

    pub fn supports_all(&self, profiles: &[&dyn Profile]) -> bool {
        profiles.iter().all(|p| self.supports(*p))
    }

    /// The factor source for a profile: the configured cache when it
    /// fully covers this network, the live profile otherwise.
    fn factors<'a>(&'a self, profile: &'a dyn Profile) -> FactorSource<'a> {
        match self.config.factor_caches.get(profile.name()) {
            Some(cache) if cache.is_complete_for(self.network) => FactorSource::Cached(cache),
            _ => FactorSource::Live(profile),
        }
    }

    fn resolver(&self) -> &dyn Resolve {
        self.config
            .custom_resolver
            .as_deref()
            .unwrap_or(&DEFAULT_RESOLVER)
    }

    fn builder(&self) -> &dyn BuildRoute {
        self.config
            .custom_route_builder
            .as_deref()
            .unwrap_or(&DEFAULT_BUILDER)
    }

    /// Snaps a coordinate onto the network, acceptable to every given
    /// profile.
    pub fn try_resolve(
        &self,
        profiles: &[&dyn Profile],
        lat: f64,
        lon: f64,
    ) -> Result<RouterPoint, RouterError> {
        self.try_resolve_with(profiles, lat, lon, None, None)
    }

    /// [`try_resolve`](Self::try_resolve) with a tie-break preference
    /// and an explicit snap radius.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    pub fn try_resolve_with(
        &self,
        profiles: &[&dyn Profile],
        lat: f64,
        lon: f64,
        is_better: Option<&dyn Fn(EdgeId, &EdgeData) -> bool>,
        max_search_distance: Option<f64>,
    ) -> Result<RouterPoint, RouterError> {
        if !self.supports_all(profiles) {
            return Err(RouterError::ProfilesUnsupported);
        }

        let sources = profiles
            .iter()
            .map(|p| self.factors(*p))
            .collect::<Vec<_>>();
        let verify_stoppable = self.config.verify_all_stoppable;

        let is_acceptable = move |_: EdgeId, data: &EdgeData| {
            sources.iter().all(|factors| {
                factors.factor(data.profile_id).is_traversable()
                    && (!verify_stoppable || factors.can_stop_on(data.profile_id))
            })
        };

        let query = ResolveQuery {
            position: point! { x: lon, y: lat },
            max_distance: max_search_distance
                .or(self.config.max_search_distance)
                .unwrap_or(DEFAULT_MAX_SEARCH_DISTANCE),
            is_acceptable: &is_acceptable,
            is_better,
        };

        self.resolver()
            .resolve(self.network, &query)
            .map_err(Into::into)
    }

    /// Whether a bounded search from `point` can travel at least
    /// `radius` meters, i.e. the point is not trapped in a small
    /// disconnected island.
    pub fn try_check_connectivity(
        &self,
        profile: &dyn Profile,
        point: &RouterPoint,
        radius: f32,
    ) -> Result<bool, RouterError> {
        if !self.supports(profile) {
            return Err(RouterError::ProfileUnsupported);
        }

        let factors = self.factors(profile);
        let sources = EdgePath::for_source_distance(self.network, &factors, point);

        let settled = Dijkstra::new(self.network, factors)
            .metric(Metric::Distance)
            .budget(SearchBudget::default().with_max_weight(radius))
            .run(&sources)?;

        // Reaching the budget means the frontier crossed the radius;
        // exhausting the queue first means the component is smaller.
        Ok(settled.reached_limit())
    }

    pub fn try_calculate_weight(
        &self,
        profile: &dyn Profile,
        source: &RouterPoint,
        target: &RouterPoint,
    ) -> Result<f32, RouterError> {
        self.try_calculate_weight_with(profile, source, target, SearchBudget::default())
    }

    pub fn try_calculate_weight_with(
        &self,
        profile: &dyn Profile,
        source: &RouterPoint,
        target: &RouterPoint,
        budget: SearchBudget,
    ) -> Result<f32, RouterError> {
        self.calculate_path(profile, source, target, budget)
            .map(|outcome| outcome.weight)
    }

    pub fn try_calculate(
        &self,
        profile: &dyn Profile,
        source: &RouterPoint,
        target: &RouterPoint,
    ) -> Result<Route, RouterError> {
        self.try_calculate_with(profile, source, target, SearchBudget::default())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    pub fn try_calculate_with(
        &self,
        profile: &dyn Profile,
        source: &RouterPoint,
        target: &RouterPoint,
        budget: SearchBudget,
    ) -> Result<Route, RouterError> {
        let outcome = self.calculate_path(profile, source, target, budget)?;
        let factors = self.factors(profile);

        self.builder()
            .build(self.network, &factors, source, target, &outcome.path)
            .map_err(Into::into)
    }

    /// Resolves both coordinates and routes between them in one call.
    pub fn try_calculate_from_coordinates(
        &self,
        profile: &dyn Profile,
        source: (f64, f64),
        target: (f64, f64),
    ) -> Result<Route, RouterError> {
        let profiles: [&dyn Profile; 1] = [profile];

        let source = self.try_resolve(&profiles, source.0, source.1)?;
        let target = self.try_resolve(&profiles, target.0, target.1)?;

        self.try_calculate(profile, &source, &target)
    }

    /// Kernel selection and the shared-edge shortcut, common to the
    /// weight and route calculations.
    fn calculate_path(
        &self,
        profile: &dyn Profile,
        source: &RouterPoint,
        target: &RouterPoint,
        budget: SearchBudget,
    ) -> Result<SearchOutcome, RouterError> {
        if !self.supports(profile) {
            return Err(RouterError::ProfileUnsupported);
        }

        let factors = self.factors(profile);
        let sources = EdgePath::for_source(self.network, &factors, source);
        let targets = EdgePath::for_target(self.network, &factors, target);

        let restrictions = self.network.restrictions(profile.name());
        let complex = restrictions.is_some_and(|r| !r.is_empty());
        let contracted = self.network.contracted(profile.name());

        let searched = if complex {
            match contracted.and_then(|set| set.edge_based.as_ref()) {
                Some(hierarchy) => EdgeContractedDijkstra::new(self.network, factors, hierarchy)
                    .budget(budget)
                    .run(&sources, &targets),
                None => {
                    if contracted.is_some_and(|set| set.node_based.is_some()) {
                        warn!(
                            "complex restrictions but no edge-based contracted graph for \
                             profile '{}', falling back to the plain restriction-aware search",
                            profile.name()
                        );
                    }

                    EdgeDijkstra::new(self.network, factors, restrictions.unwrap())
                        .budget(budget)
                        .run(&sources, &targets)
                }
            }
        } else {
            match contracted.and_then(|set| set.node_based.as_ref()) {
                Some(hierarchy) => ContractedDijkstra::new(hierarchy)
                    .budget(budget)
                    .run(&sources, &targets),
                None => BidirectionalDijkstra::new(self.network, factors)
                    .budget(budget)
                    .run(&sources, &targets),
            }
        };

        // When both points share an edge the on-edge trip competes with
        // the searched path; the searched path is kept on ties.
        let direct = direct_weight(self.network, &factors, source, target);

        match (searched, direct) {
            (Ok(outcome), Some(direct)) if direct < outcome.weight => Ok(SearchOutcome {
                weight: direct,
                path: Vec::new(),
            }),
            (Ok(outcome), _) => Ok(outcome),
            (Err(SearchError::Cancelled), _) => Err(SearchError::Cancelled.into()),
            (Err(_), Some(direct)) => Ok(SearchOutcome {
                weight: direct,
                path: Vec::new(),
            }),
            (Err(err), None) => Err(err.into()),
        }
    }

    /// Dense cost matrix between every source and target.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    pub fn try_calculate_weights(
        &self,
        profile: &dyn Profile,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<WeightMatrix, RouterError> {
        if !self.supports(profile) {
            return Err(RouterError::ProfileUnsupported);
        }

        let factors = self.factors(profile);
        let engine = MatrixEngine::new(self.network, factors, SearchBudget::default());

        engine
            .weights(
                self.network.contracted(profile.name()),
                self.network.restrictions(profile.name()),
                sources,
                targets,
            )
            .map_err(Into::into)
    }

    /// Full route grid between every source and target.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    pub fn try_calculate_many(
        &self,
        profile: &dyn Profile,
        sources: &[RouterPoint],
        targets: &[RouterPoint],
    ) -> Result<ManyToManyRoutes, RouterError> {
        if !self.supports(profile) {
            return Err(RouterError::ProfileUnsupported);
        }

        let factors = self.factors(profile);
        let engine = MatrixEngine::new(self.network, factors, SearchBudget::default());

        engine
            .routes(
                self.network.restrictions(profile.name()),
                sources,
                targets,
                self.builder(),
            )
            .map_err(Into::into)
    }
}
