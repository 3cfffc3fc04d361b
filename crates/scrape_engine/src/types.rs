use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

pub type RequestId = u64;

/// Request body for `POST /scrape`; also the credential half of a verification body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unexpected, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Sent, but no response came back.
    Connectivity,
    /// Never sent.
    Unexpected,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Connectivity => write!(f, "no response"),
            ApiErrorKind::Unexpected => write!(f, "request not sent"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Scrape {
        request_id: RequestId,
        credentials: Credentials,
    },
    SubmitVerification {
        request_id: RequestId,
        credentials: Credentials,
        code: String,
    },
    FetchPosts {
        request_id: RequestId,
        username: String,
    },
    StartTimer {
        ticket: u64,
        delay: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ScrapeCompleted {
        request_id: RequestId,
        result: Result<ApiReply, ApiError>,
    },
    VerificationCompleted {
        request_id: RequestId,
        result: Result<ApiReply, ApiError>,
    },
    PostsLoaded {
        request_id: RequestId,
        result: Result<ApiReply, ApiError>,
    },
    TimerElapsed {
        ticket: u64,
    },
}
