use std::time::Duration;

use crate::{RequestId, ScrapeRequest, TimerTicket, VerificationRequest};

/// How long a success notice stays up before the feed opens.
pub const SUCCESS_GRACE_PERIOD: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendScrape {
        request_id: RequestId,
        request: ScrapeRequest,
    },
    SendVerification {
        request_id: RequestId,
        request: VerificationRequest,
    },
    StartGraceTimer {
        ticket: TimerTicket,
        delay: Duration,
    },
    FetchPosts {
        request_id: RequestId,
        username: String,
    },
}
