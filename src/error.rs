use crate::models::Service;
use thiserror::Error;

/// Failures talking to a single streaming service.
///
/// `NotFound` / `NoMatch` mean the provider answered but had no result;
/// the remaining variants mean we could not get a usable answer at all.
/// The resolution engine treats the two classes differently only when the
/// failure happens on the mandatory source-metadata fetch.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no track with id {0}")]
    NotFound(String),

    #[error("no match for query {0:?}")]
    NoMatch(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("authentication failed: {0}")]
    Auth(String),
}

impl ProviderError {
    /// True when the provider answered successfully but had no result,
    /// as opposed to being unreachable or returning garbage.
    pub fn is_no_result(&self) -> bool {
        matches!(self, ProviderError::NotFound(_) | ProviderError::NoMatch(_))
    }
}

/// Terminal failures of a whole resolution. Target-search failures never
/// surface here; they only thin out the result set.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unsupported link: {0}")]
    UnsupportedLink(String),

    #[error("failed to fetch source track from {service}: {source}")]
    Source {
        service: Service,
        #[source]
        source: ProviderError,
    },
}
