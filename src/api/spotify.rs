use super::Provider;
use crate::error::ProviderError;
use crate::models::{Service, TrackLink, TrackMetadata};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: i64, // epoch seconds
}

/// Spotify provider backed by the Spotify Web API, authenticated via the
/// client-credentials grant. The token is fetched lazily on first use and
/// cached for the lifetime of this instance; it is **not** refreshed once
/// set, so callers must construct a fresh client per resolution rather
/// than holding one across the token's validity window.
/// Endpoints may be overridden by SPOTIFY_AUTH_BASE and SPOTIFY_API_BASE
/// env vars (useful for tests).
pub struct SpotifyProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    token: tokio::sync::Mutex<Option<StoredToken>>,
}

impl SpotifyProvider {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: Client::new(),
            client_id,
            client_secret,
            token: tokio::sync::Mutex::new(None),
        }
    }

    fn auth_base() -> String {
        env::var("SPOTIFY_AUTH_BASE").unwrap_or_else(|_| "https://accounts.spotify.com".into())
    }
    fn api_base() -> String {
        // include v1 path by default
        env::var("SPOTIFY_API_BASE").unwrap_or_else(|_| "https://api.spotify.com/v1".into())
    }

    async fn fetch_token(&self) -> Result<StoredToken, ProviderError> {
        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
        );
        let url = format!("{}/api/token", Self::auth_base());
        let params = [("grant_type", "client_credentials")];
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, auth_header)
            .form(&params)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!(
                "client credentials grant failed: {} => {}",
                status, body
            )));
        }
        let j: serde_json::Value = resp.json().await?;
        let access_token = j["access_token"]
            .as_str()
            .ok_or_else(|| ProviderError::Auth("no access_token in grant response".into()))?
            .to_string();
        let expires_in = j["expires_in"].as_i64().unwrap_or(3600);
        Ok(StoredToken {
            access_token,
            token_type: "Bearer".into(),
            expires_at: Utc::now().timestamp() + expires_in,
        })
    }

    async fn ensure_token(&self) -> Result<(), ProviderError> {
        let mut lock = self.token.lock().await;
        if lock.is_none() {
            debug!("Fetching Spotify client-credentials token");
            *lock = Some(self.fetch_token().await?);
        }
        Ok(())
    }

    async fn get_bearer(&self) -> Result<String, ProviderError> {
        self.ensure_token().await?;
        let lock = self.token.lock().await;
        let st = lock
            .as_ref()
            .ok_or_else(|| ProviderError::Auth("no token loaded".into()))?;
        Ok(format!("Bearer {}", st.access_token))
    }
}

#[async_trait]
impl Provider for SpotifyProvider {
    fn service(&self) -> Service {
        Service::Spotify
    }

    fn is_authenticated(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    async fn track_by_id(&self, native_id: &str) -> Result<TrackMetadata, ProviderError> {
        let bearer = self.get_bearer().await?;
        let url = format!("{}/tracks/{}", Self::api_base(), native_id);
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &bearer)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(native_id.to_string()));
        }
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedResponse(format!(
                "get track failed: {} => {}",
                status, txt
            )));
        }
        let j: serde_json::Value = resp.json().await?;
        let title = j["name"]
            .as_str()
            .ok_or_else(|| ProviderError::UnexpectedResponse("track has no name".into()))?
            .to_string();
        let artist = j["artists"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(|a| a["name"].as_str())
            .ok_or_else(|| ProviderError::UnexpectedResponse("track has no artist".into()))?
            .to_string();
        Ok(TrackMetadata {
            title,
            artist,
            source: Service::Spotify,
        })
    }

    async fn search(&self, query: &str) -> Result<TrackLink, ProviderError> {
        let bearer = self.get_bearer().await?;
        let url = format!(
            "{}/search?q={}&type=track&limit=1",
            Self::api_base(),
            urlencoding::encode(query)
        );
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &bearer)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedResponse(format!(
                "search failed: {} => {}",
                status, txt
            )));
        }
        let j: serde_json::Value = resp.json().await?;
        let first = j["tracks"]["items"].as_array().and_then(|a| a.first());
        let item = match first {
            Some(item) => item,
            None => return Err(ProviderError::NoMatch(query.to_string())),
        };
        let link_url = item["external_urls"]["spotify"]
            .as_str()
            .ok_or_else(|| ProviderError::UnexpectedResponse("track has no external url".into()))?
            .to_string();
        Ok(TrackLink {
            service: Service::Spotify,
            url: link_url,
        })
    }
}
