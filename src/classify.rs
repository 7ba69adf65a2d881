use crate::models::{Service, TrackRef};
use url::Url;

/// Classify a shared link by host and pull out the provider-native track id.
///
/// Pure function of the URL; returns `None` for unrecognized hosts and for
/// recognized hosts whose link shape cannot name a single track (album-only
/// Apple links, Spotify playlist links, and so on).
pub fn classify(url: &Url) -> Option<TrackRef> {
    let host = url.host_str()?;
    match host {
        "music.apple.com" => {
            // Track links carry the song id in the `i` query parameter;
            // without it this is an album link and cannot be resolved.
            let id = query_param(url, "i")?;
            Some(TrackRef { service: Service::Apple, native_id: id })
        }
        "open.spotify.com" => {
            let mut segments = url.path_segments()?;
            if segments.next() != Some("track") {
                return None;
            }
            let id = segments.next().filter(|s| !s.is_empty())?;
            Some(TrackRef { service: Service::Spotify, native_id: id.to_string() })
        }
        "music.youtube.com" => {
            let id = query_param(url, "v")?;
            Some(TrackRef { service: Service::Youtube, native_id: id })
        }
        _ => None,
    }
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn spotify_track_link() {
        let r = classify(&parse("https://open.spotify.com/track/abc123?x=y")).unwrap();
        assert_eq!(r.service, Service::Spotify);
        assert_eq!(r.native_id, "abc123");
    }

    #[test]
    fn spotify_playlist_link_is_rejected() {
        assert!(classify(&parse("https://open.spotify.com/playlist/37i9dQ")).is_none());
    }

    #[test]
    fn apple_track_link_uses_i_param() {
        let r = classify(&parse("https://music.apple.com/ca/album/x/1?i=42")).unwrap();
        assert_eq!(r.service, Service::Apple);
        assert_eq!(r.native_id, "42");
    }

    #[test]
    fn apple_album_only_link_is_rejected() {
        assert!(classify(&parse("https://music.apple.com/ca/album/x/1")).is_none());
    }

    #[test]
    fn youtube_watch_link() {
        let r = classify(&parse("https://music.youtube.com/watch?v=XYZ")).unwrap();
        assert_eq!(r.service, Service::Youtube);
        assert_eq!(r.native_id, "XYZ");
    }

    #[test]
    fn unknown_host_is_rejected() {
        assert!(classify(&parse("https://example.com/track/abc123")).is_none());
        assert!(classify(&parse("https://www.youtube.com/watch?v=XYZ")).is_none());
    }
}
