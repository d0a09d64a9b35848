//! `routier` computes shortest-path routes over road networks built
//! from OpenStreetMap-style or shapefile-derived geometry.
//!
//! Coordinates resolve onto a frozen [`RoutingNetwork`] as
//! [`RouterPoint`]s; the [`Router`] then produces full geometric
//! [`Route`]s, scalar weights, or dense many-to-many matrices. Searches
//! run bidirectionally over the plain graph, over directed edges when
//! turn restrictions apply, or over precomputed contracted hierarchies
//! when those are attached.

pub mod contracted;
pub mod network;
pub mod profile;
pub mod resolve;
pub mod restriction;
pub mod route;
pub mod router;
pub mod search;

#[doc(hidden)]
pub mod fixture;

#[doc(inline)]
pub use network::{
    DirectedEdgeId, EdgeData, EdgeId, NetworkBuilder, RoutingNetwork, Vertex, VertexId,
};
#[doc(inline)]
pub use profile::{Factor, FactorDirection, Profile, ProfileFactorCache};
#[doc(inline)]
pub use resolve::{EdgeResolver, Resolve, ResolveError, RouterPoint};
#[doc(inline)]
pub use restriction::RestrictionIndex;
#[doc(inline)]
pub use route::{BuildRoute, DefaultRouteBuilder, Route, RouteSegment};
#[doc(inline)]
pub use router::{ErrorKind, Router, RouterConfig, RouterError};
#[doc(inline)]
pub use search::{CancellationToken, ManyToManyRoutes, SearchBudget, SearchError, WeightMatrix};
