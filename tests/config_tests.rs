use music_link_responder::config::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn config_parses_with_defaults() {
    let mut f = NamedTempFile::new().unwrap();
    write!(
        f,
        r#"
slack_token = "xoxb-abc"
spotify_client_id = "cid"
spotify_client_secret = "csecret"
apple_key_id = "KID"
apple_issuer = "ISS"
"#
    )
    .unwrap();

    let cfg = Config::from_path(f.path()).unwrap();
    assert_eq!(cfg.slack_token, "xoxb-abc");
    assert_eq!(cfg.spotify_client_id, "cid");
    assert_eq!(cfg.apple_key_id, "KID");
    // Defaults kick in for everything unspecified.
    assert_eq!(cfg.apple_storefront, "ca");
    assert!(cfg.apple_private_key_path.is_none());
    assert_eq!(
        cfg.log_dir,
        std::path::PathBuf::from("/var/log/music-link-responder")
    );
}

#[test]
fn empty_config_is_valid() {
    let mut f = NamedTempFile::new().unwrap();
    write!(f, "").unwrap();
    let cfg = Config::from_path(f.path()).unwrap();
    assert!(cfg.slack_token.is_empty());
    assert_eq!(cfg.apple_storefront, "ca");
}
