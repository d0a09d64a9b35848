use crate::network::RoutingNetwork;
use crate::profile::{Factor, Profile};

/// Precomputed factor and stoppability arrays for one profile, indexed
/// by edge-profile identifier.
///
/// Profiles are pure over edge profiles, so the whole mapping can be
/// evaluated once per network and replayed from a flat array. When a
/// complete cache is configured, the resolver and the search kernels
/// never call back into the profile.
#[derive(Debug, Clone)]
pub struct ProfileFactorCache {
    factors: Vec<Factor>,
    stoppable: Vec<bool>,
}

impl ProfileFactorCache {
    /// Evaluates `profile` over every edge profile the network uses.
    pub fn build(profile: &dyn Profile, network: &RoutingNetwork) -> Self {
        let count = network.edge_profile_count();

        let factors = (0..count).map(|ep| profile.factor(ep)).collect();
        let stoppable = (0..count).map(|ep| profile.can_stop_on(ep)).collect();

        ProfileFactorCache { factors, stoppable }
    }

    /// Whether the cache covers every edge profile of `network`.
    pub fn is_complete_for(&self, network: &RoutingNetwork) -> bool {
        self.factors.len() >= network.edge_profile_count() as usize
    }

    #[inline]
    pub fn factor(&self, edge_profile: u16) -> Factor {
        self.factors
            .get(edge_profile as usize)
            .copied()
            .unwrap_or_else(Factor::impassable)
    }

    #[inline]
    pub fn can_stop_on(&self, edge_profile: u16) -> bool {
        self.stoppable.get(edge_profile as usize).copied().unwrap_or(false)
    }
}
