use crate::{FlowState, Post};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub screen: ScreenView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenView {
    Credentials(CredentialsView),
    Feed(FeedView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsView {
    pub flow: FlowState,
    pub email: String,
    pub inputs_enabled: bool,
    /// The scrape request is in flight.
    pub busy: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    /// The grace timer is running; the feed opens when it fires.
    pub navigating: bool,
    /// Present while the verification prompt is open.
    pub verification: Option<VerificationView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationView {
    pub email: String,
    pub code: String,
    pub verifying: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    pub username: String,
    pub loading: bool,
    pub error: Option<String>,
    pub post_count: usize,
    pub posts: Vec<PostCardView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCardView {
    pub author: String,
    pub initial: char,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub reactions: String,
    pub comments: String,
}

impl PostCardView {
    pub fn from_post(post: &Post) -> Self {
        let author = post.author();
        Self {
            author: author.unwrap_or("Unknown User").to_owned(),
            initial: author
                .and_then(|name| name.chars().next())
                .map(|first| first.to_uppercase().next().unwrap_or(first))
                .unwrap_or('U'),
            description: post
                .description
                .clone()
                .filter(|text| !text.is_empty()),
            images: post.images.clone(),
            reactions: format_count(post.likes_count),
            comments: format_count(post.comments_count),
        }
    }
}

/// Compact counter text: `950`, `1.2K`, `3.4M`.
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}
