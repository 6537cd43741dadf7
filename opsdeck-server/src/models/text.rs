//! Length-checked string newtypes
//!
//! Limits match the column widths in the schema so that a value which passes
//! here never fails on insert for being too wide.

use super::ValidationError;

/// Maximum length of an external identity
const MAX_OPEN_ID_LEN: usize = 64;

/// Maximum length of a model identifier
const MAX_MODEL_NAME_LEN: usize = 64;

/// Maximum length of a chat session title
const MAX_TITLE_LEN: usize = 255;

/// Maximum length for message content (64KB)
const MAX_CONTENT_LEN: usize = 65536;

pub(crate) fn check_len(field: &'static str, s: &str, max: usize) -> Result<(), ValidationError> {
    if s.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// External identity issued by the login provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpenId(String);

impl OpenId {
    /// Whitespace-only identities are rejected along with empty ones.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "openId" });
        }
        check_len("openId", s, MAX_OPEN_ID_LEN)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Model identifier as chosen by the client, e.g. `gpt-4-turbo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName(String);

impl ModelName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "model" });
        }
        check_len("model", trimmed, MAX_MODEL_NAME_LEN)?;
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Chat session title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTitle(String);

impl SessionTitle {
    /// Returns `Ok(None)` for a blank title so the caller can fall back to a
    /// generated one.
    pub fn new(s: &str) -> Result<Option<Self>, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        check_len("title", trimmed, MAX_TITLE_LEN)?;
        Ok(Some(Self(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create new message content.
    ///
    /// # Rules
    /// - Max 64KB (65536 bytes)
    /// - Empty content is allowed
    ///
    /// # Example
    /// ```
    /// use opsdeck_server::models::MessageContent;
    ///
    /// assert!(MessageContent::new("Hello world").is_ok());
    /// assert!(MessageContent::new("").is_ok());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.len() > MAX_CONTENT_LEN {
            return Err(ValidationError::TooLong {
                field: "message",
                max: MAX_CONTENT_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the content as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

}
