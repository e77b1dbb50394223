//! Project key prefixes and human-readable ticket keys.
//!
//! A project owns a short uppercase prefix ("DEMO"); every ticket gets a
//! key of the form `DEMO-7` where the numeric suffix is the ticket's
//! per-project sequence number. Key *allocation* happens inside the
//! storage layer so the counter increment and the key assignment are a
//! single atomic step; this module only knows how to validate, compose,
//! and parse keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minimum project key length.
pub const MIN_KEY_LENGTH: usize = 2;

/// Maximum project key length.
pub const MAX_KEY_LENGTH: usize = 10;

/// Errors produced when validating or parsing keys.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The project key is shorter than [`MIN_KEY_LENGTH`].
    #[error("project key must be at least {MIN_KEY_LENGTH} characters")]
    TooShort,

    /// The project key is longer than [`MAX_KEY_LENGTH`].
    #[error("project key cannot exceed {MAX_KEY_LENGTH} characters")]
    TooLong,

    /// The project key contains something other than uppercase ASCII
    /// letters and digits, or does not start with a letter.
    #[error("project key must be uppercase alphanumeric and start with a letter: '{0}'")]
    InvalidChars(String),

    /// A ticket key did not match the `{PREFIX}-{count}` shape.
    #[error("malformed ticket key: '{0}'")]
    MalformedTicketKey(String),
}

/// A validated project key prefix, e.g. "DEMO".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Validate and wrap a project key.
    ///
    /// Requirements: 2-10 characters, uppercase ASCII alphanumeric,
    /// first character a letter.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        if key.len() < MIN_KEY_LENGTH {
            return Err(KeyError::TooShort);
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(KeyError::TooLong);
        }
        let starts_with_letter = key.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if !starts_with_letter
            || !key
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(KeyError::InvalidChars(key));
        }
        Ok(Self(key))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ticket key, e.g. "DEMO-7".
///
/// Assigned exactly once at ticket creation and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketKey(String);

impl TicketKey {
    /// Compose a ticket key from a project key and a sequence number.
    #[must_use]
    pub fn new(project_key: &ProjectKey, count: u64) -> Self {
        Self(format!("{}-{}", project_key, count))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a ticket key into its project prefix and sequence number.
    pub fn parse(key: &str) -> Result<(ProjectKey, u64), KeyError> {
        let (prefix, count) = key
            .rsplit_once('-')
            .ok_or_else(|| KeyError::MalformedTicketKey(key.to_string()))?;
        let count = count
            .parse::<u64>()
            .map_err(|_| KeyError::MalformedTicketKey(key.to_string()))?;
        let prefix = ProjectKey::new(prefix)
            .map_err(|_| KeyError::MalformedTicketKey(key.to_string()))?;
        Ok((prefix, count))
    }

    /// The numeric suffix of the key.
    pub fn count(&self) -> Result<u64, KeyError> {
        Self::parse(&self.0).map(|(_, count)| count)
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::short("AB")]
    #[case::typical("DEMO")]
    #[case::with_digits("PROJ2")]
    #[case::max_length("ABCDEFGHIJ")]
    fn test_project_key_valid(#[case] key: &str) {
        assert!(ProjectKey::new(key).is_ok());
    }

    #[rstest]
    #[case::too_short("A", KeyError::TooShort)]
    #[case::empty("", KeyError::TooShort)]
    #[case::too_long("ABCDEFGHIJK", KeyError::TooLong)]
    #[case::lowercase("demo", KeyError::InvalidChars("demo".to_string()))]
    #[case::hyphen("DE-MO", KeyError::InvalidChars("DE-MO".to_string()))]
    #[case::leading_digit("1AB", KeyError::InvalidChars("1AB".to_string()))]
    fn test_project_key_invalid(#[case] key: &str, #[case] expected: KeyError) {
        assert_eq!(ProjectKey::new(key).unwrap_err(), expected);
    }

    #[test]
    fn test_ticket_key_compose_and_parse() {
        let project = ProjectKey::new("DEMO").unwrap();
        let key = TicketKey::new(&project, 7);
        assert_eq!(key.as_str(), "DEMO-7");

        let (prefix, count) = TicketKey::parse(key.as_str()).unwrap();
        assert_eq!(prefix, project);
        assert_eq!(count, 7);
        assert_eq!(key.count().unwrap(), 7);
    }

    #[rstest]
    #[case::no_separator("DEMO7")]
    #[case::empty_count("DEMO-")]
    #[case::non_numeric_count("DEMO-x")]
    #[case::bad_prefix("demo-7")]
    fn test_ticket_key_parse_rejects(#[case] key: &str) {
        assert!(TicketKey::parse(key).is_err());
    }
}
