pub mod spotify;
pub mod apple;
pub mod youtube;
pub mod mock;

use crate::error::ProviderError;
use crate::models::{Service, TrackLink, TrackMetadata};

/// Provider trait: the two operations the resolution engine needs,
/// polymorphic over the concrete streaming services.
/// Implementations: spotify::SpotifyProvider, apple::AppleMusicProvider,
/// youtube::YoutubeMusicProvider, and mock::MockProvider for tests.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Which service this client talks to.
    fn service(&self) -> Service;

    /// True if the client has the credentials it needs to make calls.
    fn is_authenticated(&self) -> bool;

    /// Fetch canonical (title, artist) metadata for a provider-native
    /// track id.
    async fn track_by_id(&self, native_id: &str) -> Result<TrackMetadata, ProviderError>;

    /// Free-text search; returns the first match as a shareable link.
    async fn search(&self, query: &str) -> Result<TrackLink, ProviderError>;
}
