//! In-memory aggregation for the statistics endpoints
//!
//! Everything here is recomputed per request from rows the handler just
//! fetched. Task statistics only see the newest [`RowLimit::TASK_STATS`] rows,
//! so totals drift from the true table totals once the table grows past that.
//!
//! [`RowLimit::TASK_STATS`]: crate::models::RowLimit::TASK_STATS

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{Agent, ModelRecord, SystemMetrics, Task};
use crate::models::{AgentStatus, TaskStatus};

/// Mean of `values`, or 0 when there are none.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Summary over all agents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub total_agents: usize,
    /// Agents currently `busy`
    pub active_agents: usize,
    pub idle_agents: usize,
    pub error_agents: usize,
    pub total_tasks_completed: i64,
    pub average_success_rate: f64,
}

impl AgentStats {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let count = |status: AgentStatus| agents.iter().filter(|a| a.status == status).count();

        Self {
            total_agents: agents.len(),
            active_agents: count(AgentStatus::Busy),
            idle_agents: count(AgentStatus::Idle),
            error_agents: count(AgentStatus::Error),
            total_tasks_completed: agents.iter().map(|a| i64::from(a.tasks_completed)).sum(),
            average_success_rate: mean(agents.iter().map(|a| a.success_rate)),
        }
    }
}

/// Summary over the most recent tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub total_cost: f64,
    /// Mean over tasks that recorded a positive execution time
    pub average_execution_time: f64,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

        Self {
            total: tasks.len(),
            pending: count(TaskStatus::Pending),
            running: count(TaskStatus::Running),
            completed: count(TaskStatus::Completed),
            failed: count(TaskStatus::Failed),
            cancelled: count(TaskStatus::Cancelled),
            total_cost: tasks.iter().map(|t| t.actual_cost).sum(),
            average_execution_time: mean(
                tasks
                    .iter()
                    .filter_map(|t| t.execution_time_ms)
                    .filter(|ms| *ms > 0)
                    .map(f64::from),
            ),
        }
    }
}

/// Latest metrics as served to the dashboard.
///
/// Before the first snapshot is recorded this is [`MetricsSnapshot::default`]:
/// all counters zero, success rate and system health 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub total_tasks_completed: i32,
    pub total_tasks_failed: i32,
    pub success_rate: f64,
    pub average_response_time_ms: f64,
    pub total_tokens_used: i64,
    #[serde(rename = "totalCostUSD")]
    pub total_cost_usd: f64,
    pub active_agents: i32,
    pub idle_agents: i32,
    pub error_agents: i32,
    pub system_health: f64,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            id: None,
            timestamp: None,
            total_tasks_completed: 0,
            total_tasks_failed: 0,
            success_rate: 100.0,
            average_response_time_ms: 0.0,
            total_tokens_used: 0,
            total_cost_usd: 0.0,
            active_agents: 0,
            idle_agents: 0,
            error_agents: 0,
            system_health: 100.0,
        }
    }
}

impl MetricsSnapshot {
    /// The stored snapshot, or the default when none exists yet.
    pub fn latest_or_default(latest: Option<SystemMetrics>) -> Self {
        latest.map(Self::from).unwrap_or_default()
    }
}

impl From<SystemMetrics> for MetricsSnapshot {
    fn from(m: SystemMetrics) -> Self {
        Self {
            id: Some(m.id),
            timestamp: Some(m.timestamp),
            total_tasks_completed: m.total_tasks_completed,
            total_tasks_failed: m.total_tasks_failed,
            success_rate: m.success_rate,
            average_response_time_ms: m.average_response_time_ms,
            total_tokens_used: m.total_tokens_used,
            total_cost_usd: m.total_cost_usd,
            active_agents: m.active_agents,
            idle_agents: m.idle_agents,
            error_agents: m.error_agents,
            system_health: m.system_health,
        }
    }
}

/// Per-model usage and capability summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub id: i32,
    pub name: String,
    pub provider: String,
    pub usage_count: i64,
    pub total_tokens_used: i64,
    pub total_cost: f64,
    pub average_latency_ms: f64,
    pub context_length: Option<i32>,
    pub supports_vision: bool,
    pub supports_streaming: bool,
}

impl From<&ModelRecord> for ModelMetrics {
    fn from(m: &ModelRecord) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            provider: m.provider.clone(),
            usage_count: m.total_usage_count,
            total_tokens_used: m.total_tokens_used,
            total_cost: m.total_cost,
            average_latency_ms: m.average_latency_ms,
            context_length: m.context_length,
            supports_vision: m.supports_vision,
            supports_streaming: m.supports_streaming,
        }
    }
}

/// One row of the cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostShare {
    pub model: String,
    pub cost: f64,
    pub usage: i64,
}

impl From<&ModelRecord> for CostShare {
    fn from(m: &ModelRecord) -> Self {
        Self {
            model: m.name.clone(),
            cost: m.total_cost,
            usage: m.total_usage_count,
        }
    }
}
