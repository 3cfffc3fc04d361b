pub const EMAIL_PROMPT: &str = "Email";
pub const PASSWORD_PROMPT: &str = "Password";
pub const CODE_PROMPT: &str = "Verification code (or 'cancel')";
pub const RETRY_PROMPT: &str = "Try again? [y/N]";

pub const CANCEL_KEYWORD: &str = "cancel";

pub const SCRAPING: &str = "Scraping posts...";
pub const SCRAPING_HINT: &str = "This may take 30-60 seconds. Please don't close this window.";
pub const VERIFICATION_TITLE: &str = "Security verification required";
pub const VERIFYING: &str = "Verifying code and resuming scraping...";
pub const NAVIGATING: &str = "Opening feed...";
pub const NO_POSTS: &str = "No posts found for this user";
pub const RULE: &str = "----------------------------------------";
