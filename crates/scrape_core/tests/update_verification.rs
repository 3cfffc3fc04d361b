use std::sync::Once;

use scrape_core::{
    messages, update, AppState, Effect, Failure, FailureKind, FeedStatus, FlowState, Msg, Reply,
    Screen, ScreenView, TransportFailure, ValidationError, VerificationView,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scrape_logging::initialize_for_tests);
}

/// Drives a fresh session into `AwaitingVerification`.
fn awaiting_verification() -> AppState {
    let (state, _) = update(AppState::new(), Msg::EmailChanged("bob@example.com".to_string()));
    let (state, _) = update(state, Msg::PasswordChanged("hunter2".to_string()));
    let (state, effects) = update(state, Msg::ScrapeSubmitted);
    let request_id = match effects.as_slice() {
        [Effect::SendScrape { request_id, .. }] => *request_id,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::ScrapeResponded {
            request_id,
            result: Ok(Reply {
                status: 202,
                body: json!({ "statusCode": 202, "data": { "verificationRequired": true } }),
            }),
        },
    );
    assert_eq!(*state.flow(), FlowState::AwaitingVerification);
    state
}

fn enter_code(state: AppState, code: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::CodeChanged(code.to_string()));
    update(state, Msg::CodeSubmitted)
}

fn verification_request_id(effects: &[Effect]) -> u64 {
    match effects {
        [Effect::SendVerification { request_id, .. }] => *request_id,
        other => panic!("expected a single SendVerification, got {other:?}"),
    }
}

fn prompt(state: &AppState) -> VerificationView {
    match state.view().screen {
        ScreenView::Credentials(view) => view.verification.expect("verification prompt open"),
        ScreenView::Feed(_) => panic!("expected the credential form"),
    }
}

#[test]
fn blank_code_is_rejected_locally() {
    init_logging();
    let (state, effects) = enter_code(awaiting_verification(), "   ");
    assert!(effects.is_empty());
    assert_eq!(*state.flow(), FlowState::AwaitingVerification);
    assert_eq!(
        prompt(&state).error,
        Some(ValidationError::MissingCode.to_string())
    );
}

#[test]
fn code_request_reuses_retained_credentials() {
    init_logging();
    let (state, effects) = enter_code(awaiting_verification(), " 123456 ");
    assert_eq!(*state.flow(), FlowState::VerifyingCode);
    match effects.as_slice() {
        [Effect::SendVerification { request, .. }] => {
            assert_eq!(request.identifier(), "bob@example.com");
            assert_eq!(request.secret(), "hunter2");
            assert_eq!(request.code(), "123456");
        }
        other => panic!("unexpected effects {other:?}"),
    }
    let view = prompt(&state);
    assert!(view.verifying);
    assert_eq!(view.email, "bob@example.com");
}

#[test]
fn credential_submit_is_ignored_while_prompt_is_open() {
    init_logging();
    let state = awaiting_verification();
    let (next, effects) = update(state.clone(), Msg::ScrapeSubmitted);
    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn failed_code_keeps_prompt_open_for_retry() {
    init_logging();
    let (state, effects) = enter_code(awaiting_verification(), "000000");
    let request_id = verification_request_id(&effects);
    let (state, _) = update(
        state,
        Msg::VerificationResponded {
            request_id,
            result: Ok(Reply {
                status: 400,
                body: json!({ "success": false, "message": "Wrong code" }),
            }),
        },
    );

    assert_eq!(*state.flow(), FlowState::AwaitingVerification);
    assert_eq!(prompt(&state).error.as_deref(), Some("Wrong code"));
    assert!(state.retained_credentials().is_some());

    let (state, effects) = enter_code(state, "123456");
    verification_request_id(&effects);
    assert_eq!(*state.flow(), FlowState::VerifyingCode);
    assert_eq!(prompt(&state).error, None);
}

#[test]
fn transport_failures_keep_prompt_open() {
    init_logging();
    let cases = [
        (
            TransportFailure::Connectivity {
                detail: "timed out".to_string(),
            },
            messages::VERIFY_CANNOT_CONNECT,
        ),
        (
            TransportFailure::Unexpected {
                detail: "builder error".to_string(),
            },
            messages::UNEXPECTED,
        ),
    ];
    for (failure, message) in cases {
        let (state, effects) = enter_code(awaiting_verification(), "123456");
        let request_id = verification_request_id(&effects);
        let (state, _) = update(
            state,
            Msg::VerificationResponded {
                request_id,
                result: Err(failure),
            },
        );
        assert_eq!(*state.flow(), FlowState::AwaitingVerification);
        assert_eq!(prompt(&state).error.as_deref(), Some(message));
    }
}

#[test]
fn cancel_fails_the_session_without_network() {
    init_logging();
    let (state, effects) = update(awaiting_verification(), Msg::VerificationCancelled);
    assert!(effects.is_empty());
    assert_eq!(
        *state.flow(),
        FlowState::Failed(Failure {
            kind: FailureKind::Cancelled,
            message: messages::VERIFICATION_CANCELLED.to_string()
        })
    );
    assert!(state.retained_credentials().is_none());
}

#[test]
fn reply_after_cancel_is_stale() {
    init_logging();
    let (state, effects) = enter_code(awaiting_verification(), "123456");
    let request_id = verification_request_id(&effects);
    let (state, _) = update(state, Msg::VerificationCancelled);
    let cancelled = state.clone();

    let (state, effects) = update(
        state,
        Msg::VerificationResponded {
            request_id,
            result: Ok(Reply {
                status: 200,
                body: json!({ "success": true, "data": { "username": "bob" } }),
            }),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, cancelled);
}

#[test]
fn last_code_submission_wins() {
    init_logging();
    let (state, effects) = enter_code(awaiting_verification(), "111111");
    let first = verification_request_id(&effects);
    // The field is read-only while verifying; resubmitting resends the same code.
    let (state, effects) = update(state, Msg::CodeSubmitted);
    let second = verification_request_id(&effects);
    assert!(second > first);

    let (state, _) = update(
        state,
        Msg::VerificationResponded {
            request_id: first,
            result: Ok(Reply {
                status: 400,
                body: json!({ "message": "expired" }),
            }),
        },
    );
    assert_eq!(*state.flow(), FlowState::VerifyingCode);
    assert_eq!(prompt(&state).error, None);
}

#[test]
fn scrape_with_verification_end_to_end() {
    init_logging();
    let state = awaiting_verification();

    let (state, effects) = enter_code(state, "123456");
    let request_id = verification_request_id(&effects);
    let (state, effects) = update(
        state,
        Msg::VerificationResponded {
            request_id,
            result: Ok(Reply {
                status: 200,
                body: json!({ "success": true, "data": { "postsScraped": 7, "username": "bob" } }),
            }),
        },
    );
    assert_eq!(
        *state.flow(),
        FlowState::Succeeded {
            username: Some("bob".to_string())
        }
    );
    match state.view().screen {
        ScreenView::Credentials(view) => {
            assert_eq!(view.verification, None);
            assert_eq!(view.success, Some(messages::scraped_posts(7)));
        }
        ScreenView::Feed(_) => panic!("feed must wait for the grace period"),
    }

    let ticket = match effects.as_slice() {
        [Effect::StartGraceTimer { ticket, .. }] => *ticket,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, effects) = update(state, Msg::GraceElapsed { ticket });
    let feed_request = match effects.as_slice() {
        [Effect::FetchPosts {
            request_id,
            username,
        }] => {
            assert_eq!(username, "bob");
            *request_id
        }
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(
        *state.screen(),
        Screen::Feed {
            username: "bob".to_string(),
            status: FeedStatus::Loading
        }
    );

    let (state, _) = update(
        state,
        Msg::PostsResponded {
            request_id: feed_request,
            result: Ok(Reply {
                status: 200,
                body: json!({ "data": { "posts": [
                    { "_id": "a", "user": { "username": "bob" }, "createdAt": "2024-01-01T00:00:00Z" },
                    { "_id": "b", "user": { "username": "bob" }, "createdAt": "2024-06-01T00:00:00Z" }
                ] } }),
            }),
        },
    );
    match state.view().screen {
        ScreenView::Feed(view) => {
            assert!(!view.loading);
            assert_eq!(view.post_count, 2);
            assert_eq!(view.posts[0].author, "bob");
        }
        ScreenView::Credentials(_) => panic!("expected the feed"),
    }
    match state.screen() {
        Screen::Feed {
            status: FeedStatus::Loaded(posts),
            ..
        } => assert_eq!(posts[0].id.as_deref(), Some("b")),
        other => panic!("unexpected screen {other:?}"),
    }
}
