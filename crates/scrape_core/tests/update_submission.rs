use std::sync::Once;

use scrape_core::{
    messages, update, AppState, Effect, Failure, FailureKind, FlowState, Msg, Reply, ScreenView,
    TransportFailure, ValidationError, SUCCESS_GRACE_PERIOD,
};
use serde_json::{json, Value};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scrape_logging::initialize_for_tests);
}

fn submit(state: AppState, email: &str, password: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::EmailChanged(email.to_string()));
    let (state, _) = update(state, Msg::PasswordChanged(password.to_string()));
    update(state, Msg::ScrapeSubmitted)
}

fn sent_request_id(effects: &[Effect]) -> u64 {
    match effects {
        [Effect::SendScrape { request_id, .. }] => *request_id,
        other => panic!("expected a single SendScrape, got {other:?}"),
    }
}

fn reply(status: u16, body: Value) -> Result<Reply, TransportFailure> {
    Ok(Reply { status, body })
}

fn error_text(state: &AppState) -> Option<String> {
    match state.view().screen {
        ScreenView::Credentials(view) => view.error,
        ScreenView::Feed(_) => panic!("expected the credential form"),
    }
}

#[test]
fn blank_or_malformed_credentials_never_send() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "", "x");
    assert!(effects.is_empty());
    assert_eq!(*state.flow(), FlowState::Idle);
    assert_eq!(
        error_text(&state),
        Some(ValidationError::MissingCredentials.to_string())
    );

    let (state, effects) = submit(state, "not-an-email", "x");
    assert!(effects.is_empty());
    assert_eq!(*state.flow(), FlowState::Idle);
    assert_eq!(error_text(&state), Some(ValidationError::InvalidEmail.to_string()));
}

#[test]
fn valid_submit_sends_request_and_enters_submitting() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), "alice@example.com", "secret");

    assert_eq!(*state.flow(), FlowState::Submitting);
    assert!(state.consume_dirty());
    match effects.as_slice() {
        [Effect::SendScrape { request, .. }] => {
            assert_eq!(request.identifier(), "alice@example.com");
            assert_eq!(request.secret(), "secret");
        }
        other => panic!("unexpected effects {other:?}"),
    }
    match state.view().screen {
        ScreenView::Credentials(view) => {
            assert!(view.busy);
            assert!(!view.inputs_enabled);
            assert_eq!(view.error, None);
        }
        ScreenView::Feed(_) => panic!("expected the credential form"),
    }
}

#[test]
fn edits_are_ignored_while_submitting() {
    init_logging();
    let (state, _) = submit(AppState::new(), "alice@example.com", "secret");
    let (state, _) = update(state, Msg::EmailChanged("other@example.com".to_string()));
    match state.view().screen {
        ScreenView::Credentials(view) => assert_eq!(view.email, "alice@example.com"),
        ScreenView::Feed(_) => panic!("expected the credential form"),
    }
}

#[test]
fn verification_reply_keeps_credentials() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let request_id = sent_request_id(&effects);

    let (state, effects) = update(
        state,
        Msg::ScrapeResponded {
            request_id,
            result: reply(
                202,
                json!({ "success": false, "statusCode": 202, "data": { "verificationRequired": true } }),
            ),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(*state.flow(), FlowState::AwaitingVerification);
    let retained = state.retained_credentials().expect("credentials retained");
    assert_eq!(retained.identifier(), "alice@example.com");
    assert_eq!(retained.secret(), "secret");
    assert_eq!(error_text(&state), None);
}

#[test]
fn error_status_with_verification_signal_still_opens_prompt() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let request_id = sent_request_id(&effects);

    let (state, _) = update(
        state,
        Msg::ScrapeResponded {
            request_id,
            result: reply(403, json!({ "data": { "verificationRequired": true } })),
        },
    );
    assert_eq!(*state.flow(), FlowState::AwaitingVerification);
}

#[test]
fn success_arms_grace_timer_and_shows_notice() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let request_id = sent_request_id(&effects);

    let (state, effects) = update(
        state,
        Msg::ScrapeResponded {
            request_id,
            result: reply(200, json!({ "success": true, "data": { "postsScraped": 12, "username": "alice" } })),
        },
    );

    assert_eq!(
        *state.flow(),
        FlowState::Succeeded {
            username: Some("alice".to_string())
        }
    );
    assert!(state.retained_credentials().is_none());
    let ticket = match effects.as_slice() {
        [Effect::StartGraceTimer { ticket, delay }] => {
            assert_eq!(*delay, SUCCESS_GRACE_PERIOD);
            *ticket
        }
        other => panic!("unexpected effects {other:?}"),
    };
    match state.view().screen {
        ScreenView::Credentials(view) => {
            assert_eq!(view.success, Some(messages::scraped_posts(12)));
        }
        ScreenView::Feed(_) => panic!("feed must wait for the grace period"),
    }

    let (state, effects) = update(state, Msg::GraceElapsed { ticket });
    assert_eq!(
        effects,
        vec![Effect::FetchPosts {
            request_id: ticket + 1,
            username: "alice".to_string()
        }]
    );
    assert!(matches!(state.view().screen, ScreenView::Feed(_)));
}

#[test]
fn success_without_username_stays_on_form() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let request_id = sent_request_id(&effects);
    let (state, effects) = update(
        state,
        Msg::ScrapeResponded {
            request_id,
            result: reply(200, json!({ "success": true })),
        },
    );
    let ticket = match effects.as_slice() {
        [Effect::StartGraceTimer { ticket, .. }] => *ticket,
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, effects) = update(state, Msg::GraceElapsed { ticket });
    assert!(effects.is_empty());
    assert_eq!(*state.flow(), FlowState::Succeeded { username: None });
    match state.view().screen {
        ScreenView::Credentials(view) => {
            assert_eq!(view.success.as_deref(), Some(messages::SCRAPE_COMPLETE));
        }
        ScreenView::Feed(_) => panic!("no username, no feed"),
    }
}

#[test]
fn backend_failure_surfaces_message() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "wrong");
    let request_id = sent_request_id(&effects);
    let (state, _) = update(
        state,
        Msg::ScrapeResponded {
            request_id,
            result: reply(401, json!({ "success": false, "message": "bad password" })),
        },
    );
    assert_eq!(
        *state.flow(),
        FlowState::Failed(Failure {
            kind: FailureKind::Backend,
            message: "bad password".to_string()
        })
    );
    assert!(state.retained_credentials().is_none());
}

#[test]
fn transport_failures_are_classified() {
    init_logging();
    let cases = [
        (
            TransportFailure::Connectivity {
                detail: "connection refused".to_string(),
            },
            FailureKind::Connectivity,
            messages::CANNOT_CONNECT,
        ),
        (
            TransportFailure::Unexpected {
                detail: "relative URL without a base".to_string(),
            },
            FailureKind::Unexpected,
            messages::UNEXPECTED,
        ),
    ];

    for (failure, kind, message) in cases {
        let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
        let request_id = sent_request_id(&effects);
        let (state, _) = update(
            state,
            Msg::ScrapeResponded {
                request_id,
                result: Err(failure),
            },
        );
        assert_eq!(
            *state.flow(),
            FlowState::Failed(Failure {
                kind,
                message: message.to_string()
            })
        );
    }
}

#[test]
fn failed_session_can_resubmit() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let first = sent_request_id(&effects);
    let (state, _) = update(
        state,
        Msg::ScrapeResponded {
            request_id: first,
            result: Err(TransportFailure::Connectivity {
                detail: "timeout".to_string(),
            }),
        },
    );

    let (state, effects) = update(state, Msg::ScrapeSubmitted);
    let second = sent_request_id(&effects);
    assert!(second > first);
    assert_eq!(*state.flow(), FlowState::Submitting);
    assert_eq!(error_text(&state), None);
}

#[test]
fn superseded_reply_cannot_overwrite_newer_outcome() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let first = sent_request_id(&effects);
    let (state, effects) = update(state, Msg::ScrapeSubmitted);
    let second = sent_request_id(&effects);
    assert_ne!(first, second);

    let (state, _) = update(
        state,
        Msg::ScrapeResponded {
            request_id: second,
            result: reply(200, json!({ "success": true, "data": { "username": "alice" } })),
        },
    );
    let settled = state.clone();

    let (state, effects) = update(
        state,
        Msg::ScrapeResponded {
            request_id: first,
            result: reply(202, json!({ "data": { "verificationRequired": true } })),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, settled);
}

#[test]
fn superseded_reply_is_ignored_while_newer_is_in_flight() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let first = sent_request_id(&effects);
    let (state, _) = update(state, Msg::ScrapeSubmitted);

    let (state, _) = update(
        state,
        Msg::ScrapeResponded {
            request_id: first,
            result: reply(401, json!({ "message": "late" })),
        },
    );
    assert_eq!(*state.flow(), FlowState::Submitting);
}

#[test]
fn resubmitting_after_success_disarms_grace_timer() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "alice@example.com", "secret");
    let request_id = sent_request_id(&effects);
    let (state, effects) = update(
        state,
        Msg::ScrapeResponded {
            request_id,
            result: reply(200, json!({ "success": true, "username": "alice" })),
        },
    );
    let ticket = match effects.as_slice() {
        [Effect::StartGraceTimer { ticket, .. }] => *ticket,
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, _) = update(state, Msg::ScrapeSubmitted);
    let (state, effects) = update(state, Msg::GraceElapsed { ticket });
    assert!(effects.is_empty());
    assert_eq!(*state.flow(), FlowState::Submitting);
}
