use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::{
    feed, messages, normalize_scrape_envelope, validate_credentials, verification, AppState,
    Effect, ExchangeResult, Failure, FailureKind, FlowState, Msg, Outcome, RequestId, Screen,
    TransportFailure, SUCCESS_GRACE_PERIOD,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::EmailChanged(email) => {
            state.edit_email(email);
            Vec::new()
        }
        Msg::PasswordChanged(password) => {
            state.edit_password(password);
            Vec::new()
        }
        Msg::ScrapeSubmitted => submit_credentials(&mut state),
        Msg::ScrapeResponded { request_id, result } => {
            apply_scrape_reply(&mut state, request_id, result)
        }
        Msg::CodeChanged(code) => {
            state.edit_code(code);
            Vec::new()
        }
        Msg::CodeSubmitted => verification::submit_code(&mut state),
        Msg::VerificationCancelled => {
            verification::cancel(&mut state);
            Vec::new()
        }
        Msg::VerificationResponded { request_id, result } => {
            verification::apply_reply(&mut state, request_id, result)
        }
        Msg::GraceElapsed { ticket } => match state.claim_grace(ticket) {
            Some(Some(username)) => feed::open(&mut state, &username),
            Some(None) => {
                state.note_scrape_complete();
                Vec::new()
            }
            None => {
                scrape_debug!("Ignoring grace timer {}", ticket);
                Vec::new()
            }
        },
        Msg::FeedRequested { username } => feed::open(&mut state, &username),
        Msg::PostsResponded { request_id, result } => {
            feed::apply_reply(&mut state, request_id, result);
            Vec::new()
        }
        Msg::BackToForm => {
            state.show_form();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_credentials(state: &mut AppState) -> Vec<Effect> {
    if matches!(state.screen(), Screen::Feed { .. }) {
        scrape_debug!("Ignoring credential submit while the feed is showing");
        return Vec::new();
    }
    if state.flow().in_verification() {
        scrape_debug!("Ignoring credential submit while verification is open");
        return Vec::new();
    }

    let (email, password) = state.form_inputs();
    let request = match validate_credentials(email, password) {
        Ok(request) => request,
        Err(err) => {
            scrape_debug!("Credential submit rejected locally: {:?}", err);
            state.reject_credentials(err);
            return Vec::new();
        }
    };

    let superseding = *state.flow() == FlowState::Submitting;
    let request_id = state.begin_submission(request.clone());
    if superseding {
        scrape_info!("Scrape request {} supersedes the one in flight", request_id);
    } else {
        scrape_info!("Scrape request {} submitted", request_id);
    }
    vec![Effect::SendScrape {
        request_id,
        request,
    }]
}

fn apply_scrape_reply(state: &mut AppState, request_id: RequestId, result: ExchangeResult) -> Vec<Effect> {
    if !state.claim_reply(request_id, &FlowState::Submitting) {
        scrape_debug!("Dropping stale scrape reply {}", request_id);
        return Vec::new();
    }

    let reply = match result {
        Ok(reply) => reply,
        Err(failure) => {
            state.fail(transport_failure(request_id, failure));
            return Vec::new();
        }
    };

    match normalize_scrape_envelope(&reply.body, reply.status) {
        Outcome::VerificationRequired => {
            scrape_info!("Scrape request {} needs a verification code", request_id);
            state.await_verification();
            Vec::new()
        }
        Outcome::Success {
            posts_scraped,
            username,
        } => succeed(state, posts_scraped, username),
        Outcome::Failure { message } => {
            scrape_info!(
                "Scrape request {} failed with status {}",
                request_id,
                reply.status
            );
            state.fail(Failure::new(FailureKind::Backend, message));
            Vec::new()
        }
    }
}

/// Shared success path for the scrape and verification replies.
pub(crate) fn succeed(state: &mut AppState, posts_scraped: u64, username: Option<String>) -> Vec<Effect> {
    scrape_info!(
        "Scrape finished: {} posts, username known: {}",
        posts_scraped,
        username.is_some()
    );
    let ticket = state.succeed(posts_scraped, username);
    vec![Effect::StartGraceTimer {
        ticket,
        delay: SUCCESS_GRACE_PERIOD,
    }]
}

fn transport_failure(request_id: RequestId, failure: TransportFailure) -> Failure {
    match failure {
        TransportFailure::Connectivity { detail } => {
            scrape_warn!("Scrape request {} got no response: {}", request_id, detail);
            Failure::new(FailureKind::Connectivity, messages::CANNOT_CONNECT)
        }
        TransportFailure::Unexpected { detail } => {
            scrape_warn!("Scrape request {} could not be sent: {}", request_id, detail);
            Failure::new(FailureKind::Unexpected, messages::UNEXPECTED)
        }
    }
}
