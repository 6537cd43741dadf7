//! Repository implementations for database access
//!
//! Each repository borrows the pool and exposes narrow, parameterized
//! queries with a fixed ORDER BY. Lookups by id return `Option`; callers
//! decide what a missing row means.

pub mod agents;
pub mod catalog;
pub mod chat;
pub mod knowledge;
pub mod metrics;
pub mod skills;
pub mod tasks;
pub mod users;

pub use agents::{Agent, AgentRepo};
pub use catalog::{ModelRecord, ModelRepo};
pub use chat::{ChatMessage, ChatRepo, ChatSession, NewChatMessage};
pub use knowledge::{KnowledgeEntry, KnowledgeRepo};
pub use metrics::{MetricsRepo, SystemMetrics};
pub use skills::{GeneratedSkill, SkillRepo};
pub use tasks::{Task, TaskRepo};
pub use users::{User, UserRepo};
