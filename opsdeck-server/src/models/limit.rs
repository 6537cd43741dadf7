//! Row limits for list endpoints

/// Clamped LIMIT value for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLimit(u32);

impl RowLimit {
    /// Most recent tasks considered by the task statistics endpoint
    pub const TASK_STATS: Self = Self(1000);

    /// Default task listing size
    pub const TASKS_DEFAULT: Self = Self(50);
    pub const TASKS_MAX: u32 = 1000;

    /// One metrics snapshot per hour, one day back
    pub const HISTORY_DEFAULT: Self = Self(24);
    /// Thirty days of hourly snapshots
    pub const HISTORY_MAX: u32 = 720;

    pub const KNOWLEDGE_DEFAULT: Self = Self(10);
    pub const KNOWLEDGE_MAX: u32 = 100;

    /// Clamp a requested limit to `1..=max`, using `default` when absent.
    ///
    /// Non-positive requests are raised to 1 rather than rejected.
    pub fn clamped(requested: Option<i64>, default: Self, max: u32) -> Self {
        match requested {
            None => default,
            Some(n) => Self(n.clamp(1, i64::from(max)) as u32),
        }
    }

    /// Value to bind into `LIMIT $n`.
    pub fn get(&self) -> i64 {
        i64::from(self.0)
    }
}
