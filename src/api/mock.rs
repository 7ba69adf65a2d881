use super::Provider;
use crate::error::ProviderError;
use crate::models::{Service, TrackLink, TrackMetadata};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// A canned-response provider used in engine tests and when no real
/// credentials are present. Call counts are tracked so tests can assert
/// which operations were actually issued.
pub struct MockProvider {
    service: Service,
    metadata: Option<TrackMetadata>,
    link: Option<TrackLink>,
    unavailable: bool,
    pub fetch_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(service: Service) -> Self {
        Self {
            service,
            metadata: None,
            link: None,
            unavailable: false,
            fetch_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
        }
    }

    /// Canned metadata returned by `track_by_id`.
    pub fn with_track(mut self, title: &str, artist: &str) -> Self {
        self.metadata = Some(TrackMetadata {
            title: title.into(),
            artist: artist.into(),
            source: self.service,
        });
        self
    }

    /// Canned link returned by `search`.
    pub fn with_link(mut self, url: &str) -> Self {
        self.link = Some(TrackLink {
            service: self.service,
            url: url.into(),
        });
        self
    }

    /// Make every call fail as if the provider were unreachable.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn service(&self) -> Service {
        self.service
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    async fn track_by_id(&self, native_id: &str) -> Result<TrackMetadata, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        info!("MockProvider({}): track_by_id {}", self.service, native_id);
        if self.unavailable {
            return Err(ProviderError::UnexpectedResponse("mock provider down".into()));
        }
        self.metadata
            .clone()
            .ok_or_else(|| ProviderError::NotFound(native_id.to_string()))
    }

    async fn search(&self, query: &str) -> Result<TrackLink, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        info!("MockProvider({}): search {}", self.service, query);
        if self.unavailable {
            return Err(ProviderError::UnexpectedResponse("mock provider down".into()));
        }
        self.link
            .clone()
            .ok_or_else(|| ProviderError::NoMatch(query.to_string()))
    }
}
