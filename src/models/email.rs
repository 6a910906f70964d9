use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Owner key shared by every entity. Profiles, allergens, meal plans and
/// food logs are associated only by matching this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Email is required")]
pub struct MissingEmail;

impl Email {
    pub fn parse(raw: &str) -> Result<Self, MissingEmail> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MissingEmail);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = MissingEmail;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let email = Email::parse("  a@b.com \n").unwrap();
        assert_eq!(email.as_str(), "a@b.com");
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(Email::parse(""), Err(MissingEmail));
        assert_eq!(Email::parse("   "), Err(MissingEmail));
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: Result<Email, _> = serde_json::from_str("\"a@b.com\"");
        assert!(ok.is_ok());

        let blank: Result<Email, _> = serde_json::from_str("\"\"");
        assert!(blank.is_err());
    }
}
