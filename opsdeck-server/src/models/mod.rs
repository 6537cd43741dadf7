//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod status;
pub mod text;
pub mod limit;
pub mod user;

pub use validation::ValidationError;
pub use status::{AgentStatus, MessageRole, TaskPriority, TaskStatus, UserRole};
pub use text::{MessageContent, ModelName, OpenId, SessionTitle};
pub use limit::RowLimit;
pub use user::{ResolvedUpsert, UserAssignment, UserPatch};
