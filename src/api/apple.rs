use super::Provider;
use crate::error::ProviderError;
use crate::models::{Service, TrackLink, TrackMetadata};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;
use std::env;

#[derive(Debug, Serialize)]
struct DeveloperClaims {
    iss: String,
    iat: i64,
    exp: i64,
}

/// Apple Music provider backed by the Apple Music catalog API.
///
/// Authentication uses a developer token: an ES256-signed JWT over
/// (issuer, issued-at, expiry) with the team key id in the header, valid
/// for one hour. The token is minted once at construction and never
/// refreshed, so a client instance must not be reused beyond that window;
/// the resolution flow constructs a fresh client per resolution.
/// The API base may be overridden by APPLE_API_BASE (useful for tests).
#[derive(Debug)]
pub struct AppleMusicProvider {
    client: Client,
    developer_token: String,
    storefront: String,
}

impl AppleMusicProvider {
    /// Mint a developer token from the team's ES256 private key and build
    /// a client for the given catalog storefront (e.g. "ca", "us").
    pub fn new(
        key_id: &str,
        issuer: &str,
        private_key_pem: &str,
        storefront: &str,
    ) -> Result<Self, ProviderError> {
        let iat = Utc::now().timestamp();
        let claims = DeveloperClaims {
            iss: issuer.to_string(),
            iat,
            exp: iat + 3600,
        };
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(key_id.to_string());
        let key = EncodingKey::from_ec_pem(private_key_pem.as_bytes())
            .map_err(|e| ProviderError::Auth(format!("bad Apple private key: {}", e)))?;
        let developer_token = jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| ProviderError::Auth(format!("signing developer token: {}", e)))?;
        Ok(Self {
            client: Client::new(),
            developer_token,
            storefront: storefront.to_string(),
        })
    }

    fn api_base() -> String {
        env::var("APPLE_API_BASE").unwrap_or_else(|_| "https://api.music.apple.com/v1".into())
    }

    fn catalog_url(&self, rest: &str) -> String {
        format!("{}/catalog/{}/{}", Self::api_base(), self.storefront, rest)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.developer_token)
    }
}

#[async_trait]
impl Provider for AppleMusicProvider {
    fn service(&self) -> Service {
        Service::Apple
    }

    fn is_authenticated(&self) -> bool {
        !self.developer_token.is_empty()
    }

    async fn track_by_id(&self, native_id: &str) -> Result<TrackMetadata, ProviderError> {
        let url = self.catalog_url(&format!("songs/{}", native_id));
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.bearer())
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
                "get song failed: {} => {}",
                status, txt
            )));
        }
        let j: serde_json::Value = resp.json().await?;
        let attrs = match j["data"].as_array().and_then(|a| a.first()) {
            Some(song) => &song["attributes"],
            None => return Err(ProviderError::NotFound(native_id.to_string())),
        };
        let title = attrs["name"]
            .as_str()
            .ok_or_else(|| ProviderError::UnexpectedResponse("song has no name".into()))?
            .to_string();
        let artist = attrs["artistName"]
            .as_str()
            .ok_or_else(|| ProviderError::UnexpectedResponse("song has no artistName".into()))?
            .to_string();
        Ok(TrackMetadata {
            title,
            artist,
            source: Service::Apple,
        })
    }

    async fn search(&self, query: &str) -> Result<TrackLink, ProviderError> {
        let url = self.catalog_url(&format!(
            "search?term={}&types=songs&limit=1",
            urlencoding::encode(query)
        ));
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.bearer())
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
        // A search with no song hits omits the whole `songs` facet; treat
        // that the same as an empty result list.
        let first = j["results"]["songs"]["data"].as_array().and_then(|a| a.first());
        let song = match first {
            Some(song) => song,
            None => return Err(ProviderError::NoMatch(query.to_string())),
        };
        let link_url = song["attributes"]["url"]
            .as_str()
            .ok_or_else(|| ProviderError::UnexpectedResponse("song has no url".into()))?
            .to_string();
        Ok(TrackLink {
            service: Service::Apple,
            url: link_url,
        })
    }
}
