//! Travel profiles: the mapping from edge-profile identifiers to
//! traversal factors, directionality and stoppability.

mod cache;

pub use cache::ProfileFactorCache;

/// Which traversal directions an edge permits, relative to its stored
/// `from → to` orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorDirection {
    Both,
    Forward,
    Backward,
}

/// The traversal factor a profile assigns to one edge profile.
///
/// `value` acts as a speed-like divisor: the weight of an edge is
/// `distance / value`, so a factor of `1.0` makes weights read in
/// meters. A zero value marks the edge impassable for the profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor {
    pub value: f32,
    pub direction: FactorDirection,
}

impl Factor {
    pub fn new(value: f32, direction: FactorDirection) -> Self {
        Factor { value, direction }
    }

    pub fn impassable() -> Self {
        Factor {
            value: 0.0,
            direction: FactorDirection::Both,
        }
    }

    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.value > 0.0
    }

    /// Whether this factor permits travelling the edge in the given
    /// stored orientation (`true` = stored `from → to`).
    #[inline]
    pub fn allows(&self, forward: bool) -> bool {
        self.is_traversable()
            && match self.direction {
                FactorDirection::Both => true,
                FactorDirection::Forward => forward,
                FactorDirection::Backward => !forward,
            }
    }
}

/// A travel mode evaluated against edge profiles.
///
/// Implementations must be pure: the factor for a given edge profile may
/// be cached and replayed for the lifetime of the network.
pub trait Profile: Send + Sync {
    fn name(&self) -> &str;

    /// The traversal factor for an edge profile. A zero value means the
    /// edge cannot be traversed by this mode at all.
    fn factor(&self, edge_profile: u16) -> Factor;

    /// Whether this mode may stop on (start from / arrive at) edges of
    /// the given profile. Defaults to stoppable everywhere.
    fn can_stop_on(&self, edge_profile: u16) -> bool {
        let _ = edge_profile;
        true
    }
}

/// Where factor lookups come from during a query: a precomputed cache
/// when one is configured and complete, the live profile otherwise.
#[derive(Clone, Copy)]
pub enum FactorSource<'a> {
    Live(&'a dyn Profile),
    Cached(&'a ProfileFactorCache),
}

impl FactorSource<'_> {
    #[inline]
    pub fn factor(&self, edge_profile: u16) -> Factor {
        match self {
            FactorSource::Live(profile) => profile.factor(edge_profile),
            FactorSource::Cached(cache) => cache.factor(edge_profile),
        }
    }

    #[inline]
    pub fn can_stop_on(&self, edge_profile: u16) -> bool {
        match self {
            FactorSource::Live(profile) => profile.can_stop_on(edge_profile),
            FactorSource::Cached(cache) => cache.can_stop_on(edge_profile),
        }
    }
}
