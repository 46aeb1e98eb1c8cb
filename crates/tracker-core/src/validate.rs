//! Client-side input validation.
//!
//! These checks run before any network call is made: the editor widget
//! blocks the action (e.g. disables "add tag") until the input passes,
//! so a category of bad requests never reaches the action layer.

use thiserror::Error;

/// A client-side validation failure. Never fatal; scoped to one input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("key must not be empty")]
    EmptyKey,

    #[error("key must not start or end with whitespace: {key:?}")]
    SurroundingWhitespace { key: String },

    #[error("not a valid ORCID: {value:?}")]
    InvalidOrcid { value: String },

    #[error("not a valid email address: {value:?}")]
    InvalidEmail { value: String },
}

/// Validate a tag key: non-empty, no leading or trailing whitespace.
pub fn tag_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    if key.trim() != key {
        return Err(ValidationError::SurroundingWhitespace {
            key: key.to_owned(),
        });
    }
    Ok(())
}

/// Validate a property key. Same rule as tag keys.
pub fn property_key(key: &str) -> Result<(), ValidationError> {
    tag_key(key)
}

/// Validate an ORCID iD: `dddd-dddd-dddd-dddX` with a correct ISO 7064
/// 11,2 check character.
pub fn orcid(value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidOrcid {
        value: value.to_owned(),
    };

    let groups: Vec<&str> = value.split('-').collect();
    if groups.len() != 4 || groups.iter().any(|g| g.len() != 4) {
        return Err(invalid());
    }

    let digits: Vec<char> = groups.concat().chars().collect();
    if digits.len() != 16 {
        return Err(invalid());
    }
    let (base, check) = digits.split_at(15);
    if !base.iter().all(char::is_ascii_digit) {
        return Err(invalid());
    }

    let mut total: u32 = 0;
    for ch in base {
        let digit = ch.to_digit(10).ok_or_else(invalid)?;
        total = (total + digit) * 2;
    }
    let remainder = total % 11;
    let expected = (12 - remainder) % 11;
    let expected_char = if expected == 10 {
        'X'
    } else {
        char::from_digit(expected, 10).unwrap_or('0')
    };

    if check.first() == Some(&expected_char) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Validate an email address (minimal shape check: `local@domain.tld`).
pub fn email(value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail {
        value: value.to_owned(),
    };

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}
