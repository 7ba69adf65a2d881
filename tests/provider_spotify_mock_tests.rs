use mockito::{Matcher, Server};
use music_link_responder::api::spotify::SpotifyProvider;
use music_link_responder::api::Provider;
use music_link_responder::error::ProviderError;
use serde_json::json;
use std::env;

// Single test body so the env-var base override cannot race between
// parallel tests in this binary.
#[test]
fn spotify_provider_flow() {
    let mut server = Server::new();
    let base = server.url();
    env::set_var("SPOTIFY_AUTH_BASE", &base);
    env::set_var("SPOTIFY_API_BASE", &base);

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        // Token endpoint: expect exactly one grant; the token must be
        // cached for the lifetime of the client instance.
        let m_token = server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "access_token": "test_access_token",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                })
                .to_string(),
            )
            .expect(1)
            .create();

        let _m_track = server
            .mock("GET", "/tracks/abc123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": "Halo",
                    "artists": [{ "name": "Beyonce" }, { "name": "Someone Else" }],
                })
                .to_string(),
            )
            .create();

        let _m_missing = server
            .mock("GET", "/tracks/nope")
            .with_status(404)
            .with_body("{}")
            .create();

        let _m_search = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "Halo artist:Beyonce".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "tracks": {
                        "items": [{
                            "external_urls": { "spotify": "https://open.spotify.com/track/abc123" }
                        }]
                    }
                })
                .to_string(),
            )
            .create();

        let _m_search_empty = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "Nothing artist:Nobody".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "tracks": { "items": [] } }).to_string())
            .create();

        let provider = SpotifyProvider::new("cid".into(), "csecret".into());
        assert!(provider.is_authenticated());

        // First artists entry wins when the track has several.
        let meta = provider.track_by_id("abc123").await.unwrap();
        assert_eq!(meta.title, "Halo");
        assert_eq!(meta.artist, "Beyonce");

        let err = provider.track_by_id("nope").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));

        let link = provider.search("Halo artist:Beyonce").await.unwrap();
        assert_eq!(link.url, "https://open.spotify.com/track/abc123");

        let err = provider.search("Nothing artist:Nobody").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoMatch(_)));

        m_token.assert();
    });

    // Grant failure must surface as an auth error, not a panic or a
    // silent no-match. Fresh server so the 500 cannot shadow the mocks
    // above.
    let mut err_server = Server::new();
    let err_base = err_server.url();
    env::set_var("SPOTIFY_AUTH_BASE", &err_base);
    env::set_var("SPOTIFY_API_BASE", &err_base);

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        let _m_token = err_server
            .mock("POST", "/api/token")
            .with_status(500)
            .with_body(r#"{"error":"server"}"#)
            .create();

        let provider = SpotifyProvider::new("cid".into(), "csecret".into());
        let err = provider.search("anything").await.unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)));
    });
}
