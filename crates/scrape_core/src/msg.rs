use serde_json::Value;

use crate::{RequestId, TimerTicket};

/// An HTTP response as received, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    /// Parsed JSON body; `Value::Null` when the body was empty or not JSON.
    pub body: Value,
}

/// No response was obtained for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request left but nothing came back (connect error, timeout, dropped body).
    Connectivity { detail: String },
    /// The request could not be built or sent at all.
    Unexpected { detail: String },
}

pub type ExchangeResult = Result<Reply, TransportFailure>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator edited the email field.
    EmailChanged(String),
    /// Operator edited the password field.
    PasswordChanged(String),
    /// Operator submitted the credential form.
    ScrapeSubmitted,
    /// Engine finished a scrape request.
    ScrapeResponded {
        request_id: RequestId,
        result: ExchangeResult,
    },
    /// Operator edited the verification code field.
    CodeChanged(String),
    /// Operator submitted the verification code.
    CodeSubmitted,
    /// Operator dismissed the verification prompt.
    VerificationCancelled,
    /// Engine finished a verification request.
    VerificationResponded {
        request_id: RequestId,
        result: ExchangeResult,
    },
    /// The post-success grace timer fired.
    GraceElapsed { ticket: TimerTicket },
    /// Open the feed for a username directly.
    FeedRequested { username: String },
    /// Engine finished a post list request.
    PostsResponded {
        request_id: RequestId,
        result: ExchangeResult,
    },
    /// Operator left the feed.
    BackToForm,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
