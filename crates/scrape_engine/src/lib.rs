//! Scrape engine: backend HTTP client and effect execution.
mod client;
mod engine;
mod types;

pub use client::{ApiSettings, ReqwestApi, ScrapeApi};
pub use engine::EngineHandle;
pub use types::{
    ApiError, ApiErrorKind, ApiReply, Credentials, EngineCommand, EngineError, EngineEvent,
    RequestId,
};
