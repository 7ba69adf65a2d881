use super::Provider;
use crate::error::ProviderError;
use crate::models::{Service, TrackLink, TrackMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::json;
use std::env;

static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).unwrap());
static CLIENT_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_CONTEXT_CLIENT_VERSION"\s*:\s*"([^"]+)""#).unwrap());

/// Search filter param the YouTube Music web client sends to restrict
/// results to the "song" category.
const SONG_SEARCH_PARAMS: &str = "Eg-KAQwIARAAGAAgACgAMABqChAEEAMQCRAFEAo%3D";

/// Per-call API session extracted from the YouTube Music page. Fetched
/// fresh for every request, never cached.
struct InnertubeSession {
    api_key: String,
    client_version: String,
}

struct SongHit {
    video_id: String,
    name: String,
    artist: String,
    #[allow(dead_code)]
    album: Option<String>,
}

/// YouTube Music provider over the music.youtube.com internal search API.
///
/// There is no supported lookup-by-id endpoint in this index, so
/// `track_by_id` searches with the video id as the query term and takes
/// the first hit; this mirrors how the underlying index actually behaves.
/// The base URL may be overridden by YTM_API_BASE (useful for tests).
pub struct YoutubeMusicProvider {
    client: Client,
}

impl YoutubeMusicProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn base_url() -> String {
        env::var("YTM_API_BASE").unwrap_or_else(|_| "https://music.youtube.com".into())
    }

    /// Fetch the page and scrape the innertube API key and client version
    /// out of the embedded config blob. Safe to call repeatedly.
    async fn initialize(&self) -> Result<InnertubeSession, ProviderError> {
        let resp = self.client.get(Self::base_url()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::UnexpectedResponse(format!(
                "initialize failed: {}",
                status
            )));
        }
        let body = resp.text().await?;
        let api_key = API_KEY_RE
            .captures(&body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                ProviderError::UnexpectedResponse("could not locate INNERTUBE_API_KEY".into())
            })?;
        let client_version = CLIENT_VERSION_RE
            .captures(&body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "1.20240101.01.00".into());
        Ok(InnertubeSession {
            api_key,
            client_version,
        })
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<SongHit>, ProviderError> {
        let session = self.initialize().await?;
        let url = format!(
            "{}/youtubei/v1/search?alt=json&key={}",
            Self::base_url(),
            urlencoding::encode(&session.api_key)
        );
        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB_REMIX",
                    "clientVersion": session.client_version,
                    "hl": "en",
                }
            },
            "query": query,
            "params": SONG_SEARCH_PARAMS,
        });
        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedResponse(format!(
                "search failed: {} => {}",
                status, txt
            )));
        }
        let j: serde_json::Value = resp.json().await?;
        Ok(parse_song_hits(&j))
    }
}

impl Default for YoutubeMusicProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk the search response's shelf renderers and pull out the song rows.
/// Innertube responses are deeply nested; anything that does not match the
/// expected shape is skipped rather than treated as an error.
fn parse_song_hits(j: &serde_json::Value) -> Vec<SongHit> {
    let mut hits = Vec::new();
    let sections = j["contents"]["tabbedSearchResultsRenderer"]["tabs"][0]["tabRenderer"]
        ["content"]["sectionListRenderer"]["contents"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    for section in &sections {
        let items = match section["musicShelfRenderer"]["contents"].as_array() {
            Some(items) => items,
            None => continue,
        };
        for item in items {
            let row = &item["musicResponsiveListItemRenderer"];
            let video_id = row["playlistItemData"]["videoId"]
                .as_str()
                .or_else(|| {
                    row["flexColumns"][0]["musicResponsiveListItemFlexColumnRenderer"]["text"]
                        ["runs"][0]["navigationEndpoint"]["watchEndpoint"]["videoId"]
                        .as_str()
                });
            let name = row["flexColumns"][0]["musicResponsiveListItemFlexColumnRenderer"]["text"]
                ["runs"][0]["text"]
                .as_str();
            // The second column holds "Artist • Album • Duration" as
            // alternating text/separator runs.
            let detail_runs = row["flexColumns"][1]["musicResponsiveListItemFlexColumnRenderer"]
                ["text"]["runs"]
                .as_array();
            let artist = detail_runs
                .and_then(|runs| runs.first())
                .and_then(|r| r["text"].as_str());
            let album = detail_runs
                .and_then(|runs| runs.get(2))
                .and_then(|r| r["text"].as_str())
                .map(|s| s.to_string());
            if let (Some(video_id), Some(name), Some(artist)) = (video_id, name, artist) {
                hits.push(SongHit {
                    video_id: video_id.to_string(),
                    name: name.to_string(),
                    artist: artist.to_string(),
                    album,
                });
            }
        }
    }
    hits
}

#[async_trait]
impl Provider for YoutubeMusicProvider {
    fn service(&self) -> Service {
        Service::Youtube
    }

    fn is_authenticated(&self) -> bool {
        // The public search surface needs no credentials.
        true
    }

    async fn track_by_id(&self, native_id: &str) -> Result<TrackMetadata, ProviderError> {
        let hits = self.search_songs(native_id).await?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(native_id.to_string()))?;
        Ok(TrackMetadata {
            title: hit.name,
            artist: hit.artist,
            source: Service::Youtube,
        })
    }

    async fn search(&self, query: &str) -> Result<TrackLink, ProviderError> {
        let hits = self.search_songs(query).await?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NoMatch(query.to_string()))?;
        Ok(TrackLink {
            service: Service::Youtube,
            url: format!("https://music.youtube.com/watch?v={}", hit.video_id),
        })
    }
}
