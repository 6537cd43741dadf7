//! Rejections for request input
//!
//! Every variant maps to a 400 `validation_error`, and the `Display` text is
//! the message the client sees. `field` uses the wire name (`openId`, not
//! `open_id`).

use std::fmt;

/// Why a request value was refused before reaching the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required value missing or blank
    Empty { field: &'static str },

    /// Longer than the backing column allows
    TooLong { field: &'static str, max: usize },

    /// Path or query value that is not of the expected shape, e.g. a
    /// non-positive id
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Not one of the values a CHECK-constrained column admits
    InvalidVariant { field: &'static str, value: String },

    /// JSON body or query string that could not be decoded at all
    Malformed { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::Malformed { message } => write!(f, "malformed request: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 255 characters"
        );

        let err = ValidationError::InvalidVariant {
            field: "task status",
            value: "done".into(),
        };
        assert_eq!(err.to_string(), "invalid task status value: 'done'");

        let err = ValidationError::InvalidFormat {
            field: "id",
            reason: "must be a positive integer",
        };
        assert_eq!(err.to_string(), "id: must be a positive integer");
    }
}
