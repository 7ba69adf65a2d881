use crate::models::InboundLinkEvent;
use crate::notify::{NotificationSink, SlackNotifier};
use crate::resolve::Resolver;
use anyhow::Result;
use tracing::info;
use url::Url;

/// Process one inbound link-share event end to end: skip bot users,
/// resolve the link, hand the result to the notification sink.
///
/// An unrecognized link or a failed source lookup posts nothing back into
/// the channel. Only unexpected plumbing failures (the sink itself
/// erroring) propagate.
pub async fn handle_link_event(
    resolver: &Resolver,
    slack: &SlackNotifier,
    event: &InboundLinkEvent,
) -> Result<()> {
    // A bot user sharing a link would include ourselves reposting links;
    // skip them. When users.info itself fails we also skip and answer the
    // webhook quietly.
    match slack.user_info(&event.user).await {
        Ok(user) if user.is_bot => {
            info!("Ignoring link shared by bot user {}", event.user);
            return Ok(());
        }
        Ok(_) => {}
        Err(e) => {
            info!("Could not look up user {}: {}; skipping event", event.user, e);
            return Ok(());
        }
    }

    let url = match Url::parse(&event.url) {
        Ok(u) => u,
        Err(e) => {
            info!("Unparseable link {:?}: {}; skipping event", event.url, e);
            return Ok(());
        }
    };

    match resolver.resolve(&url).await {
        Ok(result) => {
            info!(
                "Resolved {} into {} equivalent link(s)",
                event.url,
                result.len()
            );
            slack.deliver(event, &result).await
        }
        Err(e) => {
            // Don't spam the channel on failure; the thread just stays quiet.
            info!("Could not resolve {}: {}", event.url, e);
            Ok(())
        }
    }
}
