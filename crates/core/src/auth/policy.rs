//! Signup rules shared by every credential store.
//!
//! Rule violations are collected, not short-circuited: a signup with a weak
//! password and a malformed email reports both.

use validator::ValidateEmail;

/// Password strength rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub required_length: usize,
    /// Minimum number of distinct characters.
    pub required_unique_chars: usize,
    /// Require at least one ASCII digit.
    pub require_digit: bool,
    /// Require at least one lowercase letter.
    pub require_lowercase: bool,
    /// Require at least one uppercase letter.
    pub require_uppercase: bool,
    /// Require at least one character that is neither letter nor digit.
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            required_unique_chars: 1,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Returns every rule the password breaks, in a stable order.
    #[must_use]
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut reasons = Vec::new();

        if password.chars().count() < self.required_length {
            reasons.push(format!(
                "Passwords must be at least {} characters.",
                self.required_length
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            reasons.push("Passwords must have at least one non alphanumeric character.".into());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            reasons.push("Passwords must have at least one digit ('0'-'9').".into());
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            reasons.push("Passwords must have at least one lowercase ('a'-'z').".into());
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            reasons.push("Passwords must have at least one uppercase ('A'-'Z').".into());
        }

        let mut distinct: Vec<char> = password.chars().collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < self.required_unique_chars {
            reasons.push(format!(
                "Passwords must use at least {} different characters.",
                self.required_unique_chars
            ));
        }

        reasons
    }
}

/// Canonical form used for case-insensitive email uniqueness.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns a reason if `email` is not a syntactically valid address.
#[must_use]
pub fn validate_email(email: &str) -> Option<String> {
    if email.trim().is_empty() {
        return Some("Email is required.".to_string());
    }
    if email.validate_email() {
        None
    } else {
        Some(format!("Email '{email}' is invalid."))
    }
}
