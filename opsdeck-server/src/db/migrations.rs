//! Schema migrations
//!
//! Every statement is idempotent, so `run` is safe to call on each start.

use sqlx::PgPool;

use crate::models::status::check_list;
use crate::models::{AgentStatus, MessageRole, TaskPriority, TaskStatus, UserRole};

/// Tables whose `updated_at` is refreshed by trigger
const MUTABLE_TABLES: &[&str] = &[
    "users",
    "agents",
    "tasks",
    "chat_sessions",
    "models",
    "knowledge_base",
    "generated_skills",
];

fn values<T: Copy>(all: &[T], as_str: fn(&T) -> &'static str) -> String {
    let names: Vec<&str> = all.iter().map(as_str).collect();
    check_list(&names)
}

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            open_id VARCHAR(64) NOT NULL UNIQUE,
            name TEXT,
            email VARCHAR(320),
            login_method VARCHAR(64),
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ({roles})),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            last_signed_in TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        roles = values(UserRole::ALL, UserRole::as_str),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS agents (
            id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            description TEXT,
            role VARCHAR(64) NOT NULL,
            status TEXT NOT NULL DEFAULT 'idle' CHECK (status IN ({statuses})),
            current_task_id INTEGER,
            capabilities JSONB,
            max_context_length INTEGER DEFAULT 16000,
            tasks_completed INTEGER NOT NULL DEFAULT 0,
            total_tokens_used BIGINT NOT NULL DEFAULT 0,
            average_response_time DOUBLE PRECISION NOT NULL DEFAULT 0,
            success_rate DOUBLE PRECISION NOT NULL DEFAULT 100,
            last_activity_at TIMESTAMPTZ DEFAULT NOW(),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        statuses = values(AgentStatus::ALL, AgentStatus::as_str),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id SERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            agent_id INTEGER,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ({statuses})),
            priority TEXT NOT NULL DEFAULT 'medium' CHECK (priority IN ({priorities})),
            input JSONB,
            output JSONB,
            error TEXT,
            tokens_used BIGINT NOT NULL DEFAULT 0,
            estimated_cost DOUBLE PRECISION NOT NULL DEFAULT 0,
            actual_cost DOUBLE PRECISION NOT NULL DEFAULT 0,
            execution_time_ms INTEGER,
            started_at TIMESTAMPTZ,
            completed_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        statuses = values(TaskStatus::ALL, TaskStatus::as_str),
        priorities = values(TaskPriority::ALL, TaskPriority::as_str),
    ))
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_sessions (
            id SERIAL PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title VARCHAR(255),
            model_used VARCHAR(64) NOT NULL,
            total_tokens_used BIGINT NOT NULL DEFAULT 0,
            total_cost DOUBLE PRECISION NOT NULL DEFAULT 0,
            message_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id SERIAL PRIMARY KEY,
            session_id INTEGER NOT NULL,
            role TEXT NOT NULL CHECK (role IN ({roles})),
            content TEXT NOT NULL,
            model VARCHAR(64),
            tokens_used BIGINT,
            cost DOUBLE PRECISION,
            metadata JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        roles = values(MessageRole::ALL, MessageRole::as_str),
    ))
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS models (
            id SERIAL PRIMARY KEY,
            name VARCHAR(64) NOT NULL UNIQUE,
            provider VARCHAR(64) NOT NULL,
            context_length INTEGER,
            cost_per_1k_input_tokens DOUBLE PRECISION,
            cost_per_1k_output_tokens DOUBLE PRECISION,
            supports_vision BOOLEAN NOT NULL DEFAULT FALSE,
            supports_streaming BOOLEAN NOT NULL DEFAULT TRUE,
            capabilities JSONB,
            is_available BOOLEAN NOT NULL DEFAULT TRUE,
            total_usage_count BIGINT NOT NULL DEFAULT 0,
            total_tokens_used BIGINT NOT NULL DEFAULT 0,
            total_cost DOUBLE PRECISION NOT NULL DEFAULT 0,
            average_latency_ms DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_metrics (
            id SERIAL PRIMARY KEY,
            "timestamp" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            total_tasks_completed INTEGER NOT NULL DEFAULT 0,
            total_tasks_failed INTEGER NOT NULL DEFAULT 0,
            success_rate DOUBLE PRECISION NOT NULL DEFAULT 100,
            average_response_time_ms DOUBLE PRECISION NOT NULL DEFAULT 0,
            total_tokens_used BIGINT NOT NULL DEFAULT 0,
            total_cost_usd DOUBLE PRECISION NOT NULL DEFAULT 0,
            active_agents INTEGER NOT NULL DEFAULT 0,
            idle_agents INTEGER NOT NULL DEFAULT 0,
            error_agents INTEGER NOT NULL DEFAULT 0,
            system_health DOUBLE PRECISION NOT NULL DEFAULT 100,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS knowledge_base (
            id SERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            content TEXT NOT NULL,
            category VARCHAR(64),
            embedding JSONB,
            source VARCHAR(255),
            relevance_score DOUBLE PRECISION,
            access_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generated_skills (
            id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            description TEXT,
            skill_code TEXT,
            generated_from VARCHAR(255),
            success_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
            usage_count INTEGER NOT NULL DEFAULT 0,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            performance_metrics JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the accessor queries
    sqlx::raw_sql(
        r#"
        CREATE INDEX IF NOT EXISTS idx_chat_sessions_user ON chat_sessions(user_id, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id, created_at, id);
        CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_system_metrics_timestamp ON system_metrics("timestamp" DESC);
        "#,
    )
    .execute(pool)
    .await?;

    install_updated_at_triggers(pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

/// `updated_at` refresh on every UPDATE
async fn install_updated_at_triggers(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(
        r#"
        CREATE OR REPLACE FUNCTION touch_updated_at() RETURNS TRIGGER AS $$
        BEGIN
            NEW.updated_at = NOW();
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql;
        "#,
    )
    .execute(pool)
    .await?;

    for table in MUTABLE_TABLES {
        sqlx::raw_sql(&format!(
            r#"
            DROP TRIGGER IF EXISTS {table}_touch_updated_at ON {table};
            CREATE TRIGGER {table}_touch_updated_at
                BEFORE UPDATE ON {table}
                FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
            "#,
        ))
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_values_follow_enums() {
        assert_eq!(
            values(TaskPriority::ALL, TaskPriority::as_str),
            "'low', 'medium', 'high', 'critical'"
        );
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent(pool: PgPool) -> Result<(), sqlx::Error> {
        run(&pool).await?;
        run(&pool).await?;

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'public'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(tables.0, 9);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn check_constraint_rejects_unknown_status(pool: PgPool) -> Result<(), sqlx::Error> {
        run(&pool).await?;
        let result = sqlx::query("INSERT INTO tasks (title, status) VALUES ('t', 'done')")
            .execute(&pool)
            .await;
        assert!(result.is_err());
        Ok(())
    }
}
