//! Model profile field rules: gender, display name, bio, portfolio link,
//! and Instagram handle.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a profile display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a profile bio.
pub const MAX_BIO_LENGTH: usize = 2000;

/// Maximum length of a portfolio URL.
pub const MAX_PORTFOLIO_LENGTH: usize = 500;

/// Instagram usernames: letters, digits, periods, underscores, at most 30 chars.
pub const INSTAGRAM_HANDLE_PATTERN: &str = r"^[A-Za-z0-9._]{1,30}$";

static INSTAGRAM_HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(INSTAGRAM_HANDLE_PATTERN).expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(CoreError::Validation(format!(
                "Invalid gender '{other}'. Must be one of: male, female, other"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

/// Trim and validate a required display name.
pub fn validate_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional free text; blank becomes `None`.
pub fn normalize_text(
    value: Option<&str>,
    max_len: usize,
    field: &str,
) -> Result<Option<String>, CoreError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Validate an optional portfolio link. Must be an absolute http(s) URL.
pub fn normalize_portfolio(value: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(url) = normalize_text(value, MAX_PORTFOLIO_LENGTH, "Portfolio")? else {
        return Ok(None);
    };
    let lower = url.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(CoreError::Validation(
            "Portfolio must be an http:// or https:// URL".into(),
        ));
    }
    Ok(Some(url))
}

/// Normalise an optional Instagram handle. A leading `@` is stripped.
pub fn normalize_instagram(value: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(handle) = value
        .map(|v| v.trim().trim_start_matches('@'))
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };
    if !INSTAGRAM_HANDLE_RE.is_match(handle) {
        return Err(CoreError::Validation(format!(
            "Invalid Instagram handle '{handle}'"
        )));
    }
    Ok(Some(handle.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parse_is_case_insensitive() {
        assert_eq!(Gender::parse("Female").unwrap(), Gender::Female);
        assert_eq!(Gender::parse(" male ").unwrap(), Gender::Male);
        assert!(Gender::parse("unknown").is_err());
    }

    #[test]
    fn name_is_trimmed_and_required() {
        assert_eq!(validate_name("  Ada Lovelace ").unwrap(), "Ada Lovelace");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(normalize_text(Some("   "), 10, "Bio").unwrap(), None);
        assert_eq!(normalize_text(None, 10, "Bio").unwrap(), None);
        assert_eq!(
            normalize_text(Some(" hi "), 10, "Bio").unwrap().as_deref(),
            Some("hi")
        );
        assert!(normalize_text(Some("elevenchars"), 10, "Bio").is_err());
    }

    #[test]
    fn portfolio_requires_http_scheme() {
        assert!(normalize_portfolio(Some("https://example.com/me")).is_ok());
        assert!(normalize_portfolio(Some("ftp://example.com")).is_err());
        assert!(normalize_portfolio(Some("example.com")).is_err());
        assert_eq!(normalize_portfolio(Some("")).unwrap(), None);
    }

    #[test]
    fn instagram_handle_strips_at_sign() {
        assert_eq!(
            normalize_instagram(Some("@jane.doe_1")).unwrap().as_deref(),
            Some("jane.doe_1")
        );
        assert_eq!(normalize_instagram(Some("@")).unwrap(), None);
        assert!(normalize_instagram(Some("bad handle!")).is_err());
        assert!(normalize_instagram(Some(&"a".repeat(31))).is_err());
    }
}
