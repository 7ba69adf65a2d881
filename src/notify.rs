use crate::models::{InboundLinkEvent, ResolutionResult, Service};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::json;
use std::env;
use tracing::warn;

/// Receives a resolved link set and is responsible for delivering it to
/// the originating conversation. The engine knows nothing about chat
/// semantics; this is the seam where they live.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &InboundLinkEvent, result: &ResolutionResult) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SlackUser {
    pub name: String,
    pub avatar: Option<String>,
    pub is_bot: bool,
}

/// Slack Web API client and notification sink. Posts one message per
/// resolved link into the sharing user's thread, impersonating that user
/// (username + avatar) so the links read as part of their share.
/// The API base may be overridden by SLACK_API_BASE (useful for tests).
pub struct SlackNotifier {
    client: Client,
    token: String,
}

impl SlackNotifier {
    pub fn new(token: String) -> Self {
        Self {
            client: Client::new(),
            token,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    fn api_base() -> String {
        env::var("SLACK_API_BASE").unwrap_or_else(|_| "https://slack.com/api".into())
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub async fn user_info(&self, user: &str) -> Result<SlackUser> {
        let url = format!(
            "{}/users.info?user={}",
            Self::api_base(),
            urlencoding::encode(user)
        );
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("users.info failed: {}", status));
        }
        let j: serde_json::Value = resp.json().await?;
        if !j["ok"].as_bool().unwrap_or(false) {
            return Err(anyhow!(
                "users.info error: {}",
                j["error"].as_str().unwrap_or("unknown")
            ));
        }
        let u = &j["user"];
        Ok(SlackUser {
            name: u["name"].as_str().unwrap_or("").to_string(),
            avatar: u["profile"]["image_original"]
                .as_str()
                .map(|s| s.to_string()),
            is_bot: u["is_bot"].as_bool().unwrap_or(false),
        })
    }

    async fn post_message(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
        username: &str,
        icon_url: Option<&str>,
    ) -> Result<()> {
        let url = format!("{}/chat.postMessage", Self::api_base());
        let mut body = json!({
            "channel": channel,
            "text": text,
            "thread_ts": thread_ts,
            "username": username,
        });
        if let Some(icon) = icon_url {
            body["icon_url"] = json!(icon);
        }
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.bearer())
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("chat.postMessage failed: {}", status));
        }
        let j: serde_json::Value = resp.json().await?;
        if !j["ok"].as_bool().unwrap_or(false) {
            return Err(anyhow!(
                "chat.postMessage error: {}",
                j["error"].as_str().unwrap_or("unknown")
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for SlackNotifier {
    /// Best-effort delivery: every post is attempted regardless of the
    /// others, failures are logged and swallowed.
    async fn deliver(&self, event: &InboundLinkEvent, result: &ResolutionResult) -> Result<()> {
        if result.is_empty() {
            return Ok(());
        }
        let user = self.user_info(&event.user).await?;

        // Fixed service order so repeated deliveries post in the same order.
        let posts = Service::ALL.iter().filter_map(|svc| {
            result.get(*svc).map(|link| {
                let user = user.clone();
                async move {
                    (
                        link.service,
                        self.post_message(
                            &event.channel,
                            &event.message_ts,
                            &link.url,
                            &user.name,
                            user.avatar.as_deref(),
                        )
                        .await,
                    )
                }
            })
        });
        for (service, outcome) in futures::future::join_all(posts).await {
            if let Err(e) = outcome {
                warn!("Failed to post {} link to {}: {}", service, event.channel, e);
            }
        }
        Ok(())
    }
}
