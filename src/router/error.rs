use crate::resolve::ResolveError;
use crate::route::RouteError;
use crate::search::SearchError;

use thiserror::Error;

/// Wire-level classification of a failure. Stable across releases;
/// callers branch on this rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ProfileUnsupported,
    ResolveFailed,
    RouteNotFound,
    Cancelled,
}

#[derive(Error, Debug)]
pub enum RouterError {
    /// A multi-profile operation was given at least one profile the
    /// network has no data for.
    #[error("Not all routing profiles are supported.")]
    ProfilesUnsupported,

    /// A single-profile operation was given an unsupported profile.
    #[error("Routing profile is not supported.")]
    ProfileUnsupported,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Route(#[from] RouteError),
}

impl RouterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouterError::ProfilesUnsupported | RouterError::ProfileUnsupported => {
                ErrorKind::ProfileUnsupported
            }
            RouterError::Resolve(_) => ErrorKind::ResolveFailed,
            RouterError::Search(SearchError::Cancelled) => ErrorKind::Cancelled,
            RouterError::Search(_) | RouterError::Route(_) => ErrorKind::RouteNotFound,
        }
    }
}
