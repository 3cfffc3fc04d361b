//! Envelope normalizer.
//!
//! The backend wraps the same payload in several different JSON shapes. Each
//! function here walks an ordered rule table and stops at the first match, so
//! the priority order lives in one place and never fails: unknown shapes
//! degrade to an empty list or a generic failure message.

use scrape_logging::{scrape_debug, scrape_warn};
use serde::Deserialize;
use serde_json::Value;

use crate::messages;
use crate::post::Post;

pub type PostList = Vec<Post>;

/// Canonical result of interpreting a scrape or verification envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        posts_scraped: u64,
        username: Option<String>,
    },
    /// The backend wants an emailed one-time code for the credentials in flight.
    VerificationRequired,
    Failure {
        message: String,
    },
}

const HTTP_ACCEPTED: u16 = 202;

/// Where a post list may live, highest priority first. The empty pointer is the root.
const POST_LIST_LOCATIONS: [&str; 4] = ["/data/posts", "/posts", "/data", ""];

const POSTS_SCRAPED_LOCATIONS: [&str; 2] = ["/data/postsScraped", "/postsScraped"];
const USERNAME_LOCATIONS: [&str; 3] = ["/data/username", "/data/user/username", "/username"];

/// Extracts the post list from a feed envelope, newest first.
///
/// Entries that are not post objects are skipped. Posts with a missing or
/// unparseable `createdAt` sort after every dated post, keeping their
/// relative order.
pub fn normalize_posts_envelope(raw: &Value) -> PostList {
    let found = POST_LIST_LOCATIONS.iter().find_map(|pointer| {
        raw.pointer(pointer)
            .and_then(Value::as_array)
            .map(|entries| (*pointer, entries))
    });
    let Some((location, entries)) = found else {
        scrape_warn!("No post list found in envelope; showing an empty feed");
        return PostList::new();
    };
    scrape_debug!(
        "Post list found at {:?} with {} entries",
        if location.is_empty() { "/" } else { location },
        entries.len()
    );

    let mut posts: PostList = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match Post::deserialize(entry) {
            Ok(post) => Some(post),
            Err(err) => {
                scrape_warn!("Skipping malformed post at index {}: {}", index, err);
                None
            }
        })
        .collect();
    posts.sort_by_key(|post| std::cmp::Reverse(post.created_at_utc()));
    posts
}

/// Interprets the reply to `POST /scrape`.
pub fn normalize_scrape_envelope(raw: &Value, status: u16) -> Outcome {
    Envelope {
        raw,
        status,
        exchange: Exchange::Scrape,
    }
    .interpret(SCRAPE_RULES)
}

/// Interprets the reply to `POST /submit-verification`.
///
/// A verification signal is not a valid answer here; such replies fall
/// through to the success/failure rules like any other envelope.
pub fn normalize_verification_envelope(raw: &Value, status: u16) -> Outcome {
    Envelope {
        raw,
        status,
        exchange: Exchange::Verification,
    }
    .interpret(VERIFICATION_RULES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exchange {
    Scrape,
    Verification,
}

struct Envelope<'a> {
    raw: &'a Value,
    status: u16,
    exchange: Exchange,
}

type Rule = fn(&Envelope<'_>) -> Option<Outcome>;

// The verification signal is checked before `success`: the backend sends
// `success: false` together with 202 when it wants a code.
const SCRAPE_RULES: &[Rule] = &[verification_signalled, reported_success];
const VERIFICATION_RULES: &[Rule] = &[reported_success];

impl Envelope<'_> {
    fn interpret(&self, rules: &[Rule]) -> Outcome {
        rules
            .iter()
            .find_map(|rule| rule(self))
            .unwrap_or_else(|| self.failure())
    }

    fn failure(&self) -> Outcome {
        let message = self
            .raw
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| self.fallback_message());
        Outcome::Failure {
            message: message.to_owned(),
        }
    }

    fn fallback_message(&self) -> &'static str {
        let responded_ok = (200..300).contains(&self.status);
        match (self.exchange, responded_ok) {
            (Exchange::Scrape, true) => messages::SCRAPE_REJECTED,
            (Exchange::Scrape, false) => messages::SCRAPE_FAILED,
            (Exchange::Verification, true) => messages::VERIFICATION_REJECTED,
            (Exchange::Verification, false) => messages::INVALID_CODE,
        }
    }

    fn first_at<T>(&self, pointers: &[&str], read: impl Fn(&Value) -> Option<T>) -> Option<T> {
        pointers
            .iter()
            .find_map(|pointer| self.raw.pointer(pointer).and_then(&read))
    }
}

fn verification_signalled(envelope: &Envelope<'_>) -> Option<Outcome> {
    let raw = envelope.raw;
    let signalled = envelope.status == HTTP_ACCEPTED
        || raw.get("statusCode").and_then(Value::as_u64) == Some(u64::from(HTTP_ACCEPTED))
        || raw.pointer("/data/verificationRequired").and_then(Value::as_bool) == Some(true);
    signalled.then_some(Outcome::VerificationRequired)
}

fn reported_success(envelope: &Envelope<'_>) -> Option<Outcome> {
    if envelope.raw.get("success").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    // Zero and empty strings fall through to the next location.
    let posts_scraped = envelope
        .first_at(&POSTS_SCRAPED_LOCATIONS, |value| {
            value.as_u64().filter(|count| *count > 0)
        })
        .unwrap_or(0);
    let username = envelope.first_at(&USERNAME_LOCATIONS, |value| {
        value
            .as_str()
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
    });
    Some(Outcome::Success {
        posts_scraped,
        username,
    })
}
