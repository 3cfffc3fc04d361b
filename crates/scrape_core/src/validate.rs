use std::sync::LazyLock;

use regex::Regex;

use crate::state::ScrapeRequest;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Client-side input errors. These never reach the network and are not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter both email and password")]
    MissingCredentials,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter the verification code")]
    MissingCode,
}

pub fn is_email_shaped(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}

/// Gate for a credential submission. Blank checks trim; the email shape check
/// runs on the text as typed, so surrounding whitespace is rejected.
pub fn validate_credentials(identifier: &str, secret: &str) -> Result<ScrapeRequest, ValidationError> {
    if identifier.trim().is_empty() || secret.trim().is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    if !is_email_shaped(identifier) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(ScrapeRequest::new(identifier, secret))
}

/// Returns the trimmed code, or an error if nothing was entered.
pub fn validate_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::MissingCode);
    }
    Ok(code.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_email_shaped("alice@example.com"));
        assert!(is_email_shaped("a.b+c@sub.example.co"));
        assert!(!is_email_shaped("not-an-email"));
        assert!(!is_email_shaped("alice@example"));
        assert!(!is_email_shaped(" alice@example.com"));
        assert!(!is_email_shaped("al ice@example.com"));
    }

    #[test]
    fn blank_fields_win_over_shape() {
        assert_eq!(
            validate_credentials("   ", "x"),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            validate_credentials("alice@example.com", " \t"),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            validate_credentials("not-an-email", "x"),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn secret_is_kept_verbatim() {
        let request = validate_credentials("alice@example.com", " pass ").unwrap();
        assert_eq!(request.identifier(), "alice@example.com");
        assert_eq!(request.secret(), " pass ");
    }

    #[test]
    fn code_is_trimmed() {
        assert_eq!(validate_code(" 123456 "), Ok("123456".to_string()));
        assert_eq!(validate_code(""), Err(ValidationError::MissingCode));
    }
}
