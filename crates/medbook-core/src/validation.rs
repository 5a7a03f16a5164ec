// Inline credential validation - failures are reported, never persisted
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

const SPECIAL_CHARS: &str = "!@#$%^&*()-_=+[{]}\\|;:'\",<.>/?";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// A password rule the candidate fails to meet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
}

impl PasswordRule {
    pub fn describe(&self) -> &'static str {
        match self {
            PasswordRule::TooShort => "at least 8 characters",
            PasswordRule::MissingUppercase => "an uppercase letter",
            PasswordRule::MissingLowercase => "a lowercase letter",
            PasswordRule::MissingDigit => "a number",
            PasswordRule::MissingSpecial => "a special character",
        }
    }
}

/// Every rule the candidate password fails, in display order
pub fn password_issues(password: &str) -> Vec<PasswordRule> {
    let mut issues = Vec::new();

    if password.chars().count() < 8 {
        issues.push(PasswordRule::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push(PasswordRule::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        issues.push(PasswordRule::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(PasswordRule::MissingDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        issues.push(PasswordRule::MissingSpecial);
    }

    issues
}

pub fn is_valid_password(password: &str) -> bool {
    password_issues(password).is_empty()
}
