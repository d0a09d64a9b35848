use crate::profile::ProfileFactorCache;
use crate::resolve::Resolve;
use crate::route::BuildRoute;

use rustc_hash::FxHashMap;

/// Default maximum snap distance of the resolver, in meters.
pub const DEFAULT_MAX_SEARCH_DISTANCE: f64 = 50.0;

/// Tuning knobs and hooks of a [`Router`](crate::router::Router).
///
/// Everything here is optional: an empty configuration gives the stock
/// resolver, the stock route builder, live profile evaluation and the
/// default snap radius.
#[derive(Default)]
pub struct RouterConfig {
    /// When set, resolution rejects edges any queried profile cannot
    /// stop on, so every resolved point is a valid trip endpoint for
    /// every profile involved.
    pub verify_all_stoppable: bool,

    /// Maximum resolver snap distance in meters;
    /// [`DEFAULT_MAX_SEARCH_DISTANCE`] when `None`.
    pub max_search_distance: Option<f64>,

    /// Precomputed factor arrays, keyed by profile name. A complete
    /// cache removes every per-call profile evaluation from the resolver
    /// and the kernels.
    pub factor_caches: FxHashMap<String, ProfileFactorCache>,

    /// Replaces the default resolver.
    pub custom_resolver: Option<Box<dyn Resolve>>,

    /// Replaces the default route builder.
    pub custom_route_builder: Option<Box<dyn BuildRoute>>,
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify_all_stoppable(mut self, verify: bool) -> Self {
        self.verify_all_stoppable = verify;
        self
    }

    pub fn max_search_distance(mut self, meters: f64) -> Self {
        self.max_search_distance = Some(meters);
        self
    }

    pub fn factor_cache(mut self, profile: impl Into<String>, cache: ProfileFactorCache) -> Self {
        self.factor_caches.insert(profile.into(), cache);
        self
    }

    pub fn resolver(mut self, resolver: impl Resolve + 'static) -> Self {
        self.custom_resolver = Some(Box::new(resolver));
        self
    }

    pub fn route_builder(mut self, builder: impl BuildRoute + 'static) -> Self {
        self.custom_route_builder = Some(Box::new(builder));
        self
    }
}
