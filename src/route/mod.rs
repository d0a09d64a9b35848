//! Routes and their reconstruction from resolved endpoints and a vertex
//! path.

mod builder;
mod entity;

#[cfg(test)]
mod test;

pub use builder::{BuildRoute, DefaultRouteBuilder};
pub use entity::{Route, RouteSegment};

use crate::network::VertexId;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no traversable edge joins {0:?} and {1:?}")]
    MissingEdge(VertexId, VertexId),

    #[error("the path does not touch the resolved edge it should leave from or arrive at")]
    DetachedPath,

    #[error("an edge referenced by the path is missing from the network")]
    MissingData,
}
