use mockito::{Matcher, Server};
use music_link_responder::api::youtube::YoutubeMusicProvider;
use music_link_responder::api::Provider;
use music_link_responder::error::ProviderError;
use serde_json::json;
use std::env;

fn search_response(video_id: &str, name: &str, artist: &str) -> serde_json::Value {
    json!({
        "contents": {
            "tabbedSearchResultsRenderer": {
                "tabs": [{
                    "tabRenderer": {
                        "content": {
                            "sectionListRenderer": {
                                "contents": [{
                                    "musicShelfRenderer": {
                                        "contents": [{
                                            "musicResponsiveListItemRenderer": {
                                                "playlistItemData": { "videoId": video_id },
                                                "flexColumns": [
                                                    {
                                                        "musicResponsiveListItemFlexColumnRenderer": {
                                                            "text": { "runs": [{ "text": name }] }
                                                        }
                                                    },
                                                    {
                                                        "musicResponsiveListItemFlexColumnRenderer": {
                                                            "text": { "runs": [
                                                                { "text": artist },
                                                                { "text": " \u{2022} " },
                                                                { "text": "Some Album" }
                                                            ] }
                                                        }
                                                    }
                                                ]
                                            }
                                        }]
                                    }
                                }]
                            }
                        }
                    }
                }]
            }
        }
    })
}

fn empty_response() -> serde_json::Value {
    json!({
        "contents": {
            "tabbedSearchResultsRenderer": {
                "tabs": [{
                    "tabRenderer": {
                        "content": { "sectionListRenderer": { "contents": [] } }
                    }
                }]
            }
        }
    })
}

// Single test body so the env-var base override cannot race between
// parallel tests in this binary.
#[test]
fn youtube_provider_flow() {
    let mut server = Server::new();
    let base = server.url();
    env::set_var("YTM_API_BASE", &base);

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        // The initialize step scrapes the api key out of the page; one
        // fetch per provider call.
        let _m_page = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(
                r#"<html>ytcfg.set({"INNERTUBE_API_KEY":"test-key","INNERTUBE_CONTEXT_CLIENT_VERSION":"1.20240101.01.00"});</html>"#,
            )
            .create();

        let _m_search = server
            .mock("POST", "/youtubei/v1/search")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({ "query": "Halo Beyonce" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(search_response("XYZ", "Halo", "Beyonce").to_string())
            .create();

        let _m_lookup = server
            .mock("POST", "/youtubei/v1/search")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({ "query": "XYZ" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(search_response("XYZ", "Halo", "Beyonce").to_string())
            .create();

        let _m_empty = server
            .mock("POST", "/youtubei/v1/search")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({ "query": "Nothing Nobody" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(empty_response().to_string())
            .create();

        let p = YoutubeMusicProvider::new();
        assert!(p.is_authenticated());

        // Lookup-by-id is a search with the id as the query term.
        let meta = p.track_by_id("XYZ").await.unwrap();
        assert_eq!(meta.title, "Halo");
        assert_eq!(meta.artist, "Beyonce");

        let link = p.search("Halo Beyonce").await.unwrap();
        assert_eq!(link.url, "https://music.youtube.com/watch?v=XYZ");

        let err = p.search("Nothing Nobody").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoMatch(_)));
    });

    // A page without the api key blob is an initialize failure, reported
    // as an unavailable-class error.
    let mut bare_server = Server::new();
    let bare_base = bare_server.url();
    env::set_var("YTM_API_BASE", &bare_base);

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        let _m_page = bare_server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html>nothing here</html>")
            .create();

        let p = YoutubeMusicProvider::new();
        let err = p.search("anything").await.unwrap_err();
        assert!(matches!(err, ProviderError::UnexpectedResponse(_)));
    });
}
