//! Scrape core: pure submission state machine, envelope normalizer and view-model helpers.
mod effect;
mod feed;
pub mod messages;
mod msg;
mod normalize;
mod post;
mod state;
mod update;
mod validate;
mod verification;
mod view_model;

pub use effect::{Effect, SUCCESS_GRACE_PERIOD};
pub use msg::{ExchangeResult, Msg, Reply, TransportFailure};
pub use normalize::{
    normalize_posts_envelope, normalize_scrape_envelope, normalize_verification_envelope,
    Outcome, PostList,
};
pub use post::{parse_timestamp, Post, PostAuthor};
pub use state::{
    AppState, Failure, FailureKind, FeedStatus, FlowState, RequestId, ScrapeRequest, Screen,
    TimerTicket, VerificationRequest,
};
pub use update::update;
pub use validate::{is_email_shaped, validate_code, validate_credentials, ValidationError};
pub use view_model::{
    format_count, AppViewModel, CredentialsView, FeedView, PostCardView, ScreenView,
    VerificationView,
};
