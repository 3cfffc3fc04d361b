use std::time::Duration;

use scrape_core::{Effect, ExchangeResult, Msg, Reply, TransportFailure};
use scrape_engine::{ApiError, ApiErrorKind, ApiReply, Credentials, EngineCommand, EngineEvent, EngineHandle};
use scrape_logging::scrape_info;

/// Turns core effects into engine commands and engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let command = match effect {
                Effect::SendScrape {
                    request_id,
                    request,
                } => {
                    scrape_info!(
                        "SendScrape request_id={} email_len={}",
                        request_id,
                        request.identifier().len()
                    );
                    EngineCommand::Scrape {
                        request_id,
                        credentials: Credentials::new(request.identifier(), request.secret()),
                    }
                }
                Effect::SendVerification {
                    request_id,
                    request,
                } => {
                    scrape_info!(
                        "SendVerification request_id={} code_len={}",
                        request_id,
                        request.code().len()
                    );
                    EngineCommand::SubmitVerification {
                        request_id,
                        credentials: Credentials::new(request.identifier(), request.secret()),
                        code: request.code().to_owned(),
                    }
                }
                Effect::StartGraceTimer { ticket, delay } => {
                    EngineCommand::StartTimer { ticket, delay }
                }
                Effect::FetchPosts {
                    request_id,
                    username,
                } => {
                    scrape_info!("FetchPosts request_id={} username={}", request_id, username);
                    EngineCommand::FetchPosts {
                        request_id,
                        username,
                    }
                }
            };
            self.engine.submit(command);
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ScrapeCompleted { request_id, result } => Msg::ScrapeResponded {
            request_id,
            result: map_result(result),
        },
        EngineEvent::VerificationCompleted { request_id, result } => Msg::VerificationResponded {
            request_id,
            result: map_result(result),
        },
        EngineEvent::PostsLoaded { request_id, result } => Msg::PostsResponded {
            request_id,
            result: map_result(result),
        },
        EngineEvent::TimerElapsed { ticket } => Msg::GraceElapsed { ticket },
    }
}

fn map_result(result: Result<ApiReply, ApiError>) -> ExchangeResult {
    result
        .map(|reply| Reply {
            status: reply.status,
            body: reply.body,
        })
        .map_err(|err| match err.kind {
            ApiErrorKind::Connectivity => TransportFailure::Connectivity {
                detail: err.message,
            },
            ApiErrorKind::Unexpected => TransportFailure::Unexpected {
                detail: err.message,
            },
        })
}
