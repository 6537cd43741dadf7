//! Closed enumerations stored as TEXT columns
//!
//! Each enum maps to a CHECK-constrained column. Rows are decoded through
//! `TryFrom<String>` so an out-of-range value in the database surfaces as a
//! decode error instead of leaking an unknown string to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All declared values, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Get string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ValidationError::InvalidVariant {
                        field: $field,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(s: String) -> Result<Self, ValidationError> {
                s.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Privilege level of a user account
    UserRole, "user role" {
        User => "user",
        Admin => "admin",
    }
}

text_enum! {
    /// Advisory agent status, set by whatever drives the agent
    AgentStatus, "agent status" {
        Idle => "idle",
        Busy => "busy",
        Error => "error",
        Paused => "paused",
    }
}

text_enum! {
    TaskStatus, "task status" {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    TaskPriority, "task priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

text_enum! {
    /// Author of a chat message
    MessageRole, "message role" {
        User => "user",
        Assistant => "assistant",
        System => "system",
    }
}

/// SQL `IN (...)` list for a CHECK constraint, e.g. `'idle', 'busy'`.
pub(crate) fn check_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declared_values() {
        assert_eq!("busy".parse::<AgentStatus>().unwrap(), AgentStatus::Busy);
        assert_eq!(
            "cancelled".parse::<TaskStatus>().unwrap(),
            TaskStatus::Cancelled
        );
        assert_eq!(
            MessageRole::try_from("assistant".to_string()).unwrap(),
            MessageRole::Assistant
        );
    }

    #[test]
    fn error_variant_decodes_from_column_text() {
        // AgentStatus has its own `Error` variant alongside TryFrom's associated type
        assert_eq!(
            AgentStatus::try_from("error".to_string()).unwrap(),
            AgentStatus::Error
        );
        assert!(AgentStatus::try_from("broken".to_string()).is_err());
    }

    #[test]
    fn rejects_undeclared_values() {
        let err = "done".parse::<TaskStatus>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidVariant {
                field: "task status",
                value: "done".into()
            }
        );

        // Case matters: the column only admits lowercase values
        assert!("Admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&AgentStatus::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn check_list_quotes_values() {
        let values: Vec<&str> = UserRole::ALL.iter().map(|r| r.as_str()).collect();
        assert_eq!(check_list(&values), "'user', 'admin'");
    }
}
