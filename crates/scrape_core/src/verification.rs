//! Verification sub-flow: one-time code entry while the session sits in
//! `AwaitingVerification`. Only one code request counts at a time; a newer
//! submission or a cancel makes the older reply stale.

use scrape_logging::{scrape_debug, scrape_error, scrape_info, scrape_warn};

use crate::update::succeed;
use crate::{
    messages, normalize_verification_envelope, validate_code, AppState, Effect, ExchangeResult,
    Failure, FailureKind, FlowState, Outcome, RequestId, TransportFailure,
};

pub(crate) fn submit_code(state: &mut AppState) -> Vec<Effect> {
    if !state.flow().in_verification() {
        scrape_debug!("Ignoring code submit outside verification");
        return Vec::new();
    }

    let code = match validate_code(state.entered_code()) {
        Ok(code) => code,
        Err(err) => {
            state.reject_code(err);
            return Vec::new();
        }
    };

    let superseding = *state.flow() == FlowState::VerifyingCode;
    let Some((request_id, request)) = state.begin_verification(code) else {
        scrape_error!("Verification open without retained credentials");
        state.fail(Failure::new(FailureKind::Unexpected, messages::UNEXPECTED));
        return Vec::new();
    };
    if superseding {
        scrape_info!("Verification request {} supersedes the one in flight", request_id);
    } else {
        scrape_info!("Verification request {} submitted", request_id);
    }
    vec![Effect::SendVerification {
        request_id,
        request,
    }]
}

pub(crate) fn cancel(state: &mut AppState) {
    if !state.flow().in_verification() {
        return;
    }
    scrape_info!("Verification cancelled by operator");
    state.fail(Failure::new(
        FailureKind::Cancelled,
        messages::VERIFICATION_CANCELLED,
    ));
}

pub(crate) fn apply_reply(state: &mut AppState, request_id: RequestId, result: ExchangeResult) -> Vec<Effect> {
    if !state.claim_reply(request_id, &FlowState::VerifyingCode) {
        scrape_debug!("Dropping stale verification reply {}", request_id);
        return Vec::new();
    }

    let reply = match result {
        Ok(reply) => reply,
        Err(TransportFailure::Connectivity { detail }) => {
            scrape_warn!("Verification request {} got no response: {}", request_id, detail);
            state.verification_failed(messages::VERIFY_CANNOT_CONNECT.to_owned());
            return Vec::new();
        }
        Err(TransportFailure::Unexpected { detail }) => {
            scrape_warn!("Verification request {} could not be sent: {}", request_id, detail);
            state.verification_failed(messages::UNEXPECTED.to_owned());
            return Vec::new();
        }
    };

    match normalize_verification_envelope(&reply.body, reply.status) {
        Outcome::Success {
            posts_scraped,
            username,
        } => succeed(state, posts_scraped, username),
        Outcome::Failure { message } => {
            state.verification_failed(message);
            Vec::new()
        }
        // Not produced by the verification rules; a second challenge is not modelled.
        Outcome::VerificationRequired => {
            state.verification_failed(messages::VERIFICATION_REJECTED.to_owned());
            Vec::new()
        }
    }
}
