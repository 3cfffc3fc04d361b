//! Operator-facing message texts.

pub const SCRAPE_REJECTED: &str = "Failed to scrape. Please check your credentials.";
pub const SCRAPE_FAILED: &str = "Failed to scrape. Please try again.";
pub const CANNOT_CONNECT: &str =
    "Cannot connect to server. Please check if the backend is running.";
pub const UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

pub const VERIFICATION_REJECTED: &str = "Verification failed. Please try again.";
pub const INVALID_CODE: &str = "Invalid verification code. Please try again.";
pub const VERIFY_CANNOT_CONNECT: &str = "Cannot connect to server. Please check your connection.";
pub const VERIFICATION_CANCELLED: &str = "Verification cancelled. Please try again.";

pub const SCRAPE_COMPLETE: &str = "Scraping complete. Please check your feed.";

pub const NO_USERNAME: &str = "No username provided";
pub const FEED_LOAD_FAILED: &str = "Failed to load posts.";
pub const FEED_UNEXPECTED: &str = "An unexpected error occurred.";

pub fn scraped_posts(count: u64) -> String {
    format!("Successfully scraped {count} posts")
}
