//! Shortest-path kernels.
//!
//! Every kernel shares the same shape: seed from [`EdgePath`] starting
//! points so a search may begin inside an edge at a fractional offset,
//! settle nodes in ascending weight, and return a tagged outcome from a
//! single `run` entry point. Per-query scratch stays inside the kernel
//! and is dropped on return.

mod bidirectional;
mod contracted;
mod contracted_edge;
mod dijkstra;
mod edge_based;
mod matrix;
mod path;
mod space;

#[cfg(test)]
mod test;

pub use bidirectional::BidirectionalDijkstra;
pub use contracted::ContractedDijkstra;
pub use contracted_edge::EdgeContractedDijkstra;
pub use dijkstra::{Dijkstra, Metric, SearchDirection, SettledSet};
pub use edge_based::EdgeDijkstra;
pub use matrix::{ManyToManyRoutes, MatrixEngine, WeightMatrix};
pub use path::{direct_weight, EdgePath};

use crate::network::VertexId;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("no route found: the search space was exhausted before the target was reached")]
    Exhausted,

    #[error("no route found: the search budget was spent before the target was reached")]
    BudgetSpent,

    #[error("the query was cancelled")]
    Cancelled,
}

/// Cooperative cancellation flag, consulted between queue operations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-query limits. Exceeding a budget fails the search the same way an
/// exhausted queue does; cancellation is reported separately.
#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    pub max_weight: Option<f32>,
    pub max_settled: Option<usize>,
    pub cancellation: Option<CancellationToken>,
}

impl SearchBudget {
    pub fn with_max_weight(mut self, max_weight: f32) -> Self {
        self.max_weight = Some(max_weight);
        self
    }

    pub fn with_max_settled(mut self, max_settled: usize) -> Self {
        self.max_settled = Some(max_settled);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), SearchError> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(SearchError::Cancelled),
            _ => Ok(()),
        }
    }

    pub(crate) fn allows_weight(&self, weight: f32) -> bool {
        self.max_weight.is_none_or(|max| weight <= max)
    }

    pub(crate) fn allows_settled(&self, settled: usize) -> bool {
        self.max_settled.is_none_or(|max| settled < max)
    }
}

/// The result of a point-to-point search: the path weight and the vertex
/// chain between the two resolved endpoints.
///
/// The path runs from the vertex where the route leaves the source edge
/// to the vertex where it enters the target edge; it is empty when the
/// whole trip stays on a single edge.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub weight: f32,
    pub path: Vec<VertexId>,
}
