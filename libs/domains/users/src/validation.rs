//! Email and display-name rules shared by user construction and rename.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{UserError, UserResult};

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_NAME_LENGTH: usize = 255;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex compiles")
});

/// Accepts `local@domain.tld` addresses of at most 254 characters.
///
/// On top of the pattern, the address must not contain `..` and neither
/// the local part nor the domain may start or end with a dot.
pub fn validate_email(email: &str) -> UserResult<()> {
    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) || email.contains("..") {
        return Err(UserError::InvalidEmail);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(UserError::InvalidEmail);
    };

    let dotted_edge = |part: &str| part.starts_with('.') || part.ends_with('.');
    if dotted_edge(local) || dotted_edge(domain) {
        return Err(UserError::InvalidEmail);
    }

    Ok(())
}

/// Returns the trimmed name, which must hold 1 to 255 characters.
pub fn validate_name(name: &str) -> UserResult<String> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();

    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(UserError::InvalidName);
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for email in [
            "test@example.com",
            "a@b.co",
            "first.last+tag@sub.example.org",
            "under_score%x@my-domain.io",
        ] {
            assert!(validate_email(email).is_ok(), "{email} should be valid");
        }
    }

    #[test]
    fn test_rejects_consecutive_dots() {
        assert_eq!(
            validate_email("test..user@example.com"),
            Err(UserError::InvalidEmail)
        );
        assert_eq!(
            validate_email("test@example..com"),
            Err(UserError::InvalidEmail)
        );
    }

    #[test]
    fn test_rejects_dots_at_part_edges() {
        for email in [
            ".test@example.com",
            "test.@example.com",
            "test@.example.com",
        ] {
            assert_eq!(validate_email(email), Err(UserError::InvalidEmail), "{email}");
        }
    }

    #[test]
    fn test_rejects_missing_or_repeated_at_sign() {
        for email in ["", "plainaddress", "a@b@example.com", "@example.com", "user@"] {
            assert_eq!(validate_email(email), Err(UserError::InvalidEmail), "{email:?}");
        }
    }

    #[test]
    fn test_rejects_short_tld_and_whitespace() {
        assert!(validate_email("user@example.c").is_err());
        assert!(validate_email(" user@example.com").is_err());
        assert!(validate_email("us er@example.com").is_err());
    }

    #[test]
    fn test_domain_rejects_local_only_characters() {
        for email in [
            "user@exa_mple.com",
            "user@ex%ample.com",
            "user@ex+ample.com",
        ] {
            assert_eq!(validate_email(email), Err(UserError::InvalidEmail), "{email}");
        }
    }

    #[test]
    fn test_tld_must_be_alphabetic() {
        assert_eq!(validate_email("user@example.c0m"), Err(UserError::InvalidEmail));
        assert_eq!(validate_email("user@example.12"), Err(UserError::InvalidEmail));
        assert!(validate_email("user@example.co").is_ok());
    }

    #[test]
    fn test_email_length_limit() {
        let domain = "@example.com";
        let at_limit = format!("{}{domain}", "a".repeat(MAX_EMAIL_LENGTH - domain.len()));
        assert_eq!(at_limit.len(), MAX_EMAIL_LENGTH);
        assert!(validate_email(&at_limit).is_ok());

        let over_limit = format!("a{at_limit}");
        assert_eq!(validate_email(&over_limit), Err(UserError::InvalidEmail));
    }

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(validate_name("  Jane Doe  ").unwrap(), "Jane Doe");
        assert_eq!(validate_name("\tJane\n").unwrap(), "Jane");
    }

    #[test]
    fn test_name_trimming_is_idempotent() {
        for raw in ["  Jane Doe  ", "Jane", " a ", "Zoë  "] {
            let once = validate_name(raw).unwrap();
            assert_eq!(validate_name(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_blank_names_rejected() {
        for raw in ["", " ", "\t\n  "] {
            assert_eq!(validate_name(raw), Err(UserError::InvalidName), "{raw:?}");
        }
    }

    #[test]
    fn test_name_length_counts_characters() {
        let at_limit = "é".repeat(MAX_NAME_LENGTH);
        assert!(at_limit.len() > MAX_NAME_LENGTH);
        assert_eq!(validate_name(&at_limit).unwrap(), at_limit);

        let over_limit = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(validate_name(&over_limit), Err(UserError::InvalidName));

        let padded = format!("  {}  ", "x".repeat(MAX_NAME_LENGTH));
        assert!(validate_name(&padded).is_ok());
    }
}
