//! The frozen road network: dense-id vertices and edges, typed edge
//! payloads, directed edge identifiers and the edge spatial index.

mod builder;
mod edge;
mod network;
mod primitive;

#[cfg(test)]
mod test;

pub use builder::NetworkBuilder;
pub use edge::{EdgeData, FatEdge, Traversal, Vertex};
pub use network::{ContractedSet, RoutingNetwork};
pub use primitive::{DirectedEdgeId, EdgeId, VertexId};
