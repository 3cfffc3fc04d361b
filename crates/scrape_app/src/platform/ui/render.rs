use scrape_core::{AppViewModel, CredentialsView, FeedView, PostCardView, ScreenView, VerificationView};

use super::constants::{
    NAVIGATING, NO_POSTS, RULE, SCRAPING, SCRAPING_HINT, VERIFICATION_TITLE, VERIFYING,
};

/// Text lines for the current view. Empty when there is nothing to report.
pub fn render(view: &AppViewModel) -> Vec<String> {
    match &view.screen {
        ScreenView::Credentials(form) => render_form(form),
        ScreenView::Feed(feed) => render_feed(feed),
    }
}

fn render_form(form: &CredentialsView) -> Vec<String> {
    let mut lines = Vec::new();
    if form.busy {
        lines.push(SCRAPING.to_string());
        lines.push(SCRAPING_HINT.to_string());
    }
    if let Some(prompt) = &form.verification {
        lines.extend(render_verification(prompt));
    }
    if let Some(error) = &form.error {
        lines.push(format!("Error: {error}"));
    }
    if let Some(success) = &form.success {
        lines.push(success.clone());
        if form.navigating {
            lines.push(NAVIGATING.to_string());
        }
    }
    lines
}

fn render_verification(prompt: &VerificationView) -> Vec<String> {
    let mut lines = vec![
        VERIFICATION_TITLE.to_string(),
        format!(
            "A verification code was sent to the email for {}.",
            prompt.email
        ),
    ];
    if prompt.verifying {
        lines.push(VERIFYING.to_string());
    }
    if let Some(error) = &prompt.error {
        lines.push(format!("Error: {error}"));
    }
    lines
}

fn render_feed(feed: &FeedView) -> Vec<String> {
    if feed.loading {
        return vec![format!("Loading posts from @{}...", feed.username)];
    }
    if let Some(error) = &feed.error {
        return vec![format!("Error loading posts: {error}")];
    }

    let noun = if feed.post_count == 1 { "post" } else { "posts" };
    let mut lines = vec![format!(
        "Posts from @{} ({} {noun})",
        feed.username, feed.post_count
    )];
    if feed.posts.is_empty() {
        lines.push(NO_POSTS.to_string());
    }
    for post in &feed.posts {
        lines.push(RULE.to_string());
        lines.extend(render_card(post));
    }
    lines
}

fn render_card(card: &PostCardView) -> Vec<String> {
    let mut lines = vec![format!("[{}] {}", card.initial, card.author)];
    if let Some(description) = &card.description {
        lines.push(description.clone());
    }
    match card.images.len() {
        0 => {}
        1 => lines.push("1 image".to_string()),
        count => lines.push(format!("{count} images")),
    }
    lines.push(format!(
        "{} reactions, {} comments",
        card.reactions, card.comments
    ));
    lines
}
