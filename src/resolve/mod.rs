//! Resolution of raw coordinates onto the network.

mod point;
mod resolver;

#[cfg(test)]
mod test;

pub use point::RouterPoint;
pub use resolver::EdgeResolver;

use crate::network::{EdgeData, EdgeId, RoutingNetwork};

use geo::Point;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no acceptable edge within {radius:.1}m of ({lat:.6}, {lon:.6})")]
    NoEdgeInRange { lat: f64, lon: f64, radius: f64 },
}

/// One resolution request.
///
/// `is_acceptable` must hold for an edge to be considered at all; it is
/// evaluated before any distance comparison. `is_better`, when present,
/// breaks near-ties: among edges within a small tolerance of the
/// closest acceptable candidate, a preferred edge wins.
pub struct ResolveQuery<'a> {
    pub position: Point,
    pub max_distance: f64,
    pub is_acceptable: &'a dyn Fn(EdgeId, &EdgeData) -> bool,
    pub is_better: Option<&'a dyn Fn(EdgeId, &EdgeData) -> bool>,
}

/// Maps a coordinate to a [`RouterPoint`]. The engine ships
/// [`EdgeResolver`]; a custom implementation may be hooked in through
/// the router configuration.
pub trait Resolve: Send + Sync {
    fn resolve(
        &self,
        network: &RoutingNetwork,
        query: &ResolveQuery<'_>,
    ) -> Result<RouterPoint, ResolveError>;
}
