use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The closed set of streaming services this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Apple,
    Spotify,
    Youtube,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Apple, Service::Spotify, Service::Youtube];

    /// Stable lowercase name used in logs and serialized results.
    pub fn name(&self) -> &'static str {
        match self {
            Service::Apple => "apple",
            Service::Spotify => "spotify",
            Service::Youtube => "youtube",
        }
    }

    /// Every service other than `self`; always exactly two.
    pub fn others(&self) -> Vec<Service> {
        Service::ALL.iter().copied().filter(|s| s != self).collect()
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A provider-native track identifier, meaningful only within its
/// service's namespace. Produced by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub service: Service,
    pub native_id: String,
}

/// Canonical (title, artist) metadata fetched from the source service.
/// This is the pivot used to search the other services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub source: Service,
}

/// A best-guess equivalent track on another service. No identity
/// guarantee beyond "first search result the provider returned".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLink {
    pub service: Service,
    pub url: String,
}

/// Per-resolution output: one link per target service that resolved.
/// Services whose search failed are simply absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionResult {
    links: HashMap<Service, TrackLink>,
}

impl ResolutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link: TrackLink) {
        self.links.insert(link.service, link);
    }

    pub fn get(&self, service: Service) -> Option<&TrackLink> {
        self.links.get(&service)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Service, &TrackLink)> {
        self.links.iter()
    }
}

/// The inbound webhook payload fields the handler cares about. Everything
/// except `url` flows through untouched to the notification layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundLinkEvent {
    pub url: String,
    pub channel: String,
    pub message_ts: String,
    pub user: String,
}
