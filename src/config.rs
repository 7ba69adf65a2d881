use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub slack_token: String,

    #[serde(default)]
    pub spotify_client_id: String,
    #[serde(default)]
    pub spotify_client_secret: String,

    #[serde(default)]
    pub apple_key_id: String,
    #[serde(default)]
    pub apple_issuer: String,
    /// Path to the ES256 private key PEM used to mint Apple developer tokens.
    #[serde(default)]
    pub apple_private_key_path: Option<PathBuf>,
    #[serde(default = "default_apple_storefront")]
    pub apple_storefront: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_apple_storefront() -> String { "ca".into() }
fn default_log_dir() -> PathBuf { "/var/log/music-link-responder".into() }

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let mut cfg: Config = toml::from_str(&s)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Environment variables take precedence over the config file, so a
    /// deployment can run with no file at all.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SLACK_TOKEN") {
            self.slack_token = v;
        }
        if let Ok(v) = env::var("SPOTIFY_CLIENT_ID") {
            self.spotify_client_id = v;
        }
        if let Ok(v) = env::var("SPOTIFY_CLIENT_SECRET") {
            self.spotify_client_secret = v;
        }
        if let Ok(v) = env::var("APPLE_KEY_ID") {
            self.apple_key_id = v;
        }
        if let Ok(v) = env::var("APPLE_ISSUER") {
            self.apple_issuer = v;
        }
        if let Ok(v) = env::var("APPLE_PRIVATE_KEY_PATH") {
            self.apple_private_key_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("APPLE_STOREFRONT") {
            self.apple_storefront = v;
        }
    }
}
