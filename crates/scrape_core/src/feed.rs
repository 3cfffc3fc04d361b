use scrape_logging::{scrape_debug, scrape_info, scrape_warn};
use serde_json::Value;

use crate::{
    messages, normalize_posts_envelope, AppState, Effect, ExchangeResult, FeedStatus, RequestId,
    TransportFailure,
};

pub(crate) fn open(state: &mut AppState, username: &str) -> Vec<Effect> {
    match state.open_feed(username) {
        Some(request_id) => {
            scrape_info!("Loading feed for {} (request {})", username.trim(), request_id);
            vec![Effect::FetchPosts {
                request_id,
                username: username.trim().to_owned(),
            }]
        }
        None => Vec::new(),
    }
}

pub(crate) fn apply_reply(state: &mut AppState, request_id: RequestId, result: ExchangeResult) {
    if !state.claim_feed_reply(request_id) {
        scrape_debug!("Dropping stale posts reply {}", request_id);
        return;
    }

    let status = match result {
        Ok(reply) if (200..300).contains(&reply.status) => {
            let posts = normalize_posts_envelope(&reply.body);
            scrape_info!("Feed request {} loaded {} posts", request_id, posts.len());
            FeedStatus::Loaded(posts)
        }
        Ok(reply) => {
            let message = reply
                .body
                .get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .unwrap_or(messages::FEED_LOAD_FAILED);
            FeedStatus::Error(message.to_owned())
        }
        Err(TransportFailure::Connectivity { detail }) => {
            scrape_warn!("Feed request {} got no response: {}", request_id, detail);
            FeedStatus::Error(messages::CANNOT_CONNECT.to_owned())
        }
        Err(TransportFailure::Unexpected { detail }) => {
            scrape_warn!("Feed request {} could not be sent: {}", request_id, detail);
            if detail.is_empty() {
                FeedStatus::Error(messages::FEED_UNEXPECTED.to_owned())
            } else {
                FeedStatus::Error(detail)
            }
        }
    };
    state.set_feed_status(status);
}
