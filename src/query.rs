use crate::models::{Service, TrackMetadata};

/// Build the free-text search query for a target service from canonical
/// metadata. Spotify honours an artist-qualified term; the others take a
/// plain space-joined query. Multi-artist strings (comma/ampersand joined)
/// are passed through verbatim rather than expanded into boolean syntax.
pub fn build_query(meta: &TrackMetadata, target: Service) -> String {
    match target {
        Service::Spotify => format!("{} artist:{}", meta.title, meta.artist),
        Service::Apple | Service::Youtube => format!("{} {}", meta.title, meta.artist),
    }
}
