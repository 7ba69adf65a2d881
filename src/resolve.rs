use crate::api::{
    apple::AppleMusicProvider, spotify::SpotifyProvider, youtube::YoutubeMusicProvider, Provider,
};
use crate::classify::classify;
use crate::config::Config;
use crate::error::ResolveError;
use crate::models::{ResolutionResult, Service};
use crate::query::build_query;
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// The cross-service resolution engine. Holds one client per service and
/// dispatches on the classified service identity; stateless across
/// invocations apart from the clients' own session caching.
pub struct Resolver {
    providers: HashMap<Service, Arc<dyn Provider>>,
}

impl Resolver {
    pub fn new(providers: impl IntoIterator<Item = Arc<dyn Provider>>) -> Self {
        let providers = providers.into_iter().map(|p| (p.service(), p)).collect();
        Self { providers }
    }

    /// Wire the three real provider clients from configuration.
    ///
    /// Provider sessions (Spotify token, Apple developer token) live and
    /// die with the clients built here, so construct a fresh `Resolver`
    /// per inbound event rather than holding one past a token lifetime.
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let pem = match &cfg.apple_private_key_path {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("reading Apple private key from {}", p.display()))?,
            None => anyhow::bail!("apple_private_key_path is not configured"),
        };
        let apple = AppleMusicProvider::new(
            &cfg.apple_key_id,
            &cfg.apple_issuer,
            &pem,
            &cfg.apple_storefront,
        )
        .context("constructing Apple Music client")?;
        let spotify = SpotifyProvider::new(
            cfg.spotify_client_id.clone(),
            cfg.spotify_client_secret.clone(),
        );
        let youtube = YoutubeMusicProvider::new();
        Ok(Self::new(vec![
            Arc::new(apple) as Arc<dyn Provider>,
            Arc::new(spotify),
            Arc::new(youtube),
        ]))
    }

    /// Resolve a shared link into equivalent links on the other services.
    ///
    /// Classification failure and source-metadata failure are terminal;
    /// target-search failures only thin out the result, so the returned
    /// map may hold zero, one, or two entries and all of those are
    /// successful outcomes.
    pub async fn resolve(&self, url: &Url) -> Result<ResolutionResult, ResolveError> {
        let track_ref =
            classify(url).ok_or_else(|| ResolveError::UnsupportedLink(url.to_string()))?;

        let source = self
            .providers
            .get(&track_ref.service)
            .ok_or_else(|| ResolveError::UnsupportedLink(url.to_string()))?;
        let meta = source
            .track_by_id(&track_ref.native_id)
            .await
            .map_err(|e| ResolveError::Source {
                service: track_ref.service,
                source: e,
            })?;
        debug!(
            "Resolved source metadata on {}: {} - {}",
            meta.source, meta.title, meta.artist
        );

        // Fan out to the remaining services concurrently; both outcomes
        // are always observed (a join, not a race).
        let searches = meta
            .source
            .others()
            .into_iter()
            .filter_map(|svc| self.providers.get(&svc).map(|p| (svc, p.clone())))
            .map(|(svc, provider)| {
                let query = build_query(&meta, svc);
                async move { (svc, provider.search(&query).await) }
            });
        let settled = futures::future::join_all(searches).await;

        let mut result = ResolutionResult::new();
        for (svc, outcome) in settled {
            match outcome {
                Ok(link) => result.insert(link),
                Err(e) if e.is_no_result() => {
                    debug!("No match on {} for {} - {}", svc, meta.title, meta.artist)
                }
                Err(e) => warn!("Search on {} failed: {}", svc, e),
            }
        }
        Ok(result)
    }
}
