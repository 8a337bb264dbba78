//! Email address utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Pragmatic address check: one '@', no whitespace, a dotted domain
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Maximum address length accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Normalize an email address used as a rate-limit or delivery identity
///
/// Surrounding whitespace is removed and the address is lower-cased so that
/// `A@Example.com` and `a@example.com` share one counter.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an email address is syntactically acceptable
pub fn is_valid_email(email: &str) -> bool {
    let normalized = normalize_email(email);
    !normalized.is_empty()
        && normalized.len() <= MAX_EMAIL_LENGTH
        && EMAIL_REGEX.is_match(&normalized)
}

/// Mask an email address for logs (e.g., j***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}
