use std::fmt;

use crate::messages;
use crate::normalize::PostList;
use crate::validate::ValidationError;
use crate::view_model::{
    AppViewModel, CredentialsView, FeedView, PostCardView, ScreenView, VerificationView,
};

/// Identifies one outgoing request; replies carrying any other id are stale.
pub type RequestId = u64;
pub type TimerTicket = u64;

/// Credentials captured at submission time.
#[derive(Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    identifier: String,
    secret: String,
}

impl ScrapeRequest {
    pub(crate) fn new(identifier: &str, secret: &str) -> Self {
        Self {
            identifier: identifier.to_owned(),
            secret: secret.to_owned(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ScrapeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeRequest")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// The retained credentials plus the code the operator typed.
///
/// The backend issues no challenge id, so the code is matched to the
/// challenge purely by resending the same credential pair.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    credentials: ScrapeRequest,
    code: String,
}

impl VerificationRequest {
    pub fn identifier(&self) -> &str {
        self.credentials.identifier()
    }

    pub fn secret(&self) -> &str {
        self.credentials.secret()
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Debug for VerificationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationRequest")
            .field("credentials", &self.credentials)
            .field("code", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Submitting,
    AwaitingVerification,
    VerifyingCode,
    Succeeded {
        username: Option<String>,
    },
    Failed(Failure),
}

impl FlowState {
    /// A request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, FlowState::Submitting | FlowState::VerifyingCode)
    }

    /// The verification prompt is open.
    pub fn in_verification(&self) -> bool {
        matches!(
            self,
            FlowState::AwaitingVerification | FlowState::VerifyingCode
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend answered with a business-level failure.
    Backend,
    /// No response arrived.
    Connectivity,
    /// The request could not be sent.
    Unexpected,
    /// The operator closed the verification prompt.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Loading,
    Loaded(PostList),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Credentials,
    Feed {
        username: String,
        status: FeedStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CredentialForm {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CodePrompt {
    code: String,
    error: Option<String>,
}

/// One submission session. All transitions go through `update`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    screen: Screen,
    form: CredentialForm,
    flow: FlowState,
    retained: Option<ScrapeRequest>,
    prompt: CodePrompt,
    validation_error: Option<ValidationError>,
    notice: Option<String>,
    awaited_reply: Option<RequestId>,
    feed_request: Option<RequestId>,
    grace_ticket: Option<TimerTicket>,
    last_issued: u64,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Credentials kept for the verification sub-flow.
    pub fn retained_credentials(&self) -> Option<&ScrapeRequest> {
        self.retained.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let screen = match &self.screen {
            Screen::Credentials => ScreenView::Credentials(self.credentials_view()),
            Screen::Feed { username, status } => ScreenView::Feed(feed_view(username, status)),
        };
        AppViewModel {
            screen,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn credentials_view(&self) -> CredentialsView {
        let error = match (&self.validation_error, &self.flow) {
            (Some(err), _) => Some(err.to_string()),
            (None, FlowState::Failed(failure)) => Some(failure.message.clone()),
            _ => None,
        };
        let verification = self.flow.in_verification().then(|| VerificationView {
            email: self
                .retained
                .as_ref()
                .map(|request| request.identifier().to_owned())
                .unwrap_or_default(),
            code: self.prompt.code.clone(),
            verifying: self.flow == FlowState::VerifyingCode,
            error: self.prompt.error.clone(),
        });
        CredentialsView {
            flow: self.flow.clone(),
            email: self.form.email.clone(),
            inputs_enabled: !self.flow.is_busy(),
            busy: self.flow == FlowState::Submitting,
            error,
            success: self.notice.clone(),
            navigating: self.grace_ticket.is_some(),
            verification,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn issue_id(&mut self) -> u64 {
        self.last_issued += 1;
        self.last_issued
    }

    pub(crate) fn edit_email(&mut self, email: String) -> bool {
        if self.flow.is_busy() || self.form.email == email {
            return false;
        }
        self.form.email = email;
        self.mark_dirty();
        true
    }

    pub(crate) fn edit_password(&mut self, password: String) -> bool {
        if self.flow.is_busy() || self.form.password == password {
            return false;
        }
        self.form.password = password;
        self.mark_dirty();
        true
    }

    pub(crate) fn form_inputs(&self) -> (&str, &str) {
        (&self.form.email, &self.form.password)
    }

    pub(crate) fn reject_credentials(&mut self, error: ValidationError) {
        self.clear_attempt();
        self.flow = FlowState::Idle;
        self.retained = None;
        self.validation_error = Some(error);
        self.mark_dirty();
    }

    pub(crate) fn begin_submission(&mut self, request: ScrapeRequest) -> RequestId {
        self.clear_attempt();
        let request_id = self.issue_id();
        self.flow = FlowState::Submitting;
        self.retained = Some(request);
        self.awaited_reply = Some(request_id);
        self.mark_dirty();
        request_id
    }

    /// Claims a reply if it is the one the session waits for in `expected`.
    pub(crate) fn claim_reply(&mut self, request_id: RequestId, expected: &FlowState) -> bool {
        if self.awaited_reply != Some(request_id) || &self.flow != expected {
            return false;
        }
        self.awaited_reply = None;
        true
    }

    pub(crate) fn await_verification(&mut self) {
        self.flow = FlowState::AwaitingVerification;
        self.awaited_reply = None;
        self.prompt = CodePrompt::default();
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, failure: Failure) {
        self.flow = FlowState::Failed(failure);
        self.end_attempt();
    }

    /// Enters `Succeeded` and arms the grace timer.
    pub(crate) fn succeed(&mut self, posts_scraped: u64, username: Option<String>) -> TimerTicket {
        self.flow = FlowState::Succeeded { username };
        self.notice = Some(messages::scraped_posts(posts_scraped));
        self.end_attempt();
        let ticket = self.issue_id();
        self.grace_ticket = Some(ticket);
        ticket
    }

    /// Clears the grace ticket if it matches and the session still sits in `Succeeded`.
    pub(crate) fn claim_grace(&mut self, ticket: TimerTicket) -> Option<Option<String>> {
        if self.grace_ticket != Some(ticket) {
            return None;
        }
        self.grace_ticket = None;
        match &self.flow {
            FlowState::Succeeded { username } => Some(username.clone()),
            _ => None,
        }
    }

    pub(crate) fn note_scrape_complete(&mut self) {
        self.notice = Some(messages::SCRAPE_COMPLETE.to_owned());
        self.mark_dirty();
    }

    pub(crate) fn edit_code(&mut self, code: String) -> bool {
        if self.flow != FlowState::AwaitingVerification || self.prompt.code == code {
            return false;
        }
        self.prompt.code = code;
        self.mark_dirty();
        true
    }

    pub(crate) fn entered_code(&self) -> &str {
        &self.prompt.code
    }

    pub(crate) fn reject_code(&mut self, error: ValidationError) {
        self.flow = FlowState::AwaitingVerification;
        self.awaited_reply = None;
        self.prompt.error = Some(error.to_string());
        self.mark_dirty();
    }

    /// Starts a verification request for `code`; `None` if no credentials are retained.
    pub(crate) fn begin_verification(
        &mut self,
        code: String,
    ) -> Option<(RequestId, VerificationRequest)> {
        let credentials = self.retained.clone()?;
        let request_id = self.issue_id();
        self.flow = FlowState::VerifyingCode;
        self.awaited_reply = Some(request_id);
        self.prompt.error = None;
        self.mark_dirty();
        Some((request_id, VerificationRequest { credentials, code }))
    }

    pub(crate) fn verification_failed(&mut self, message: String) {
        self.flow = FlowState::AwaitingVerification;
        self.awaited_reply = None;
        self.prompt.error = Some(message);
        self.mark_dirty();
    }

    /// Switches to the feed screen. Returns the request id to fetch with, or
    /// `None` when the username is blank and the screen shows an error instead.
    pub(crate) fn open_feed(&mut self, username: &str) -> Option<RequestId> {
        let username = username.trim();
        self.mark_dirty();
        if username.is_empty() {
            self.feed_request = None;
            self.screen = Screen::Feed {
                username: String::new(),
                status: FeedStatus::Error(messages::NO_USERNAME.to_owned()),
            };
            return None;
        }
        let request_id = self.issue_id();
        self.feed_request = Some(request_id);
        self.screen = Screen::Feed {
            username: username.to_owned(),
            status: FeedStatus::Loading,
        };
        Some(request_id)
    }

    pub(crate) fn claim_feed_reply(&mut self, request_id: RequestId) -> bool {
        if self.feed_request != Some(request_id) || !matches!(self.screen, Screen::Feed { .. }) {
            return false;
        }
        self.feed_request = None;
        true
    }

    pub(crate) fn set_feed_status(&mut self, next: FeedStatus) {
        if let Screen::Feed { status, .. } = &mut self.screen {
            *status = next;
            self.mark_dirty();
        }
    }

    /// Back to a fresh credential form. Ids keep counting so replies to
    /// anything issued before stay stale.
    pub(crate) fn show_form(&mut self) {
        *self = Self {
            last_issued: self.last_issued,
            dirty: true,
            ..Self::default()
        };
    }

    fn clear_attempt(&mut self) {
        self.validation_error = None;
        self.notice = None;
        self.grace_ticket = None;
        self.awaited_reply = None;
        self.prompt = CodePrompt::default();
    }

    fn end_attempt(&mut self) {
        self.awaited_reply = None;
        self.retained = None;
        self.prompt = CodePrompt::default();
        self.mark_dirty();
    }
}

fn feed_view(username: &str, status: &FeedStatus) -> FeedView {
    let (loading, error, posts) = match status {
        FeedStatus::Loading => (true, None, Vec::new()),
        FeedStatus::Loaded(posts) => (false, None, posts.iter().map(PostCardView::from_post).collect()),
        FeedStatus::Error(message) => (false, Some(message.clone()), Vec::new()),
    };
    FeedView {
        username: username.to_owned(),
        loading,
        error,
        post_count: posts.len(),
        posts,
    }
}
