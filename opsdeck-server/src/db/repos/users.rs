//! User repository
//!
//! Handles the login upsert:
//! - single INSERT ... ON CONFLICT (open_id) DO UPDATE statement
//! - only the columns resolved from the [`UserPatch`] are written

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::db::DbError;
use crate::models::{ResolvedUpsert, UserAssignment, UserPatch, UserRole};

macro_rules! user_columns {
    () => {
        "id, open_id, name, email, login_method, role, created_at, updated_at, last_signed_in"
    };
}

/// User record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: DateTime<Utc>,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user, or update the supplied fields if the identity exists.
    ///
    /// `owner_open_id` is the identity promoted to admin when no role is given.
    pub async fn upsert(
        &self,
        patch: UserPatch,
        owner_open_id: Option<&str>,
    ) -> Result<User, DbError> {
        let resolved = patch.resolve(owner_open_id, Utc::now())?;
        let mut qb = build_upsert(&resolved);

        let user = qb.build_query_as::<User>().fetch_one(self.pool).await.map_err(|e| {
            tracing::error!(open_id = %resolved.open_id.as_str(), "Failed to upsert user: {}", e);
            DbError::from(e)
        })?;

        Ok(user)
    }

    /// Look up a user by external identity.
    pub async fn get_by_open_id(&self, open_id: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE open_id = $1 LIMIT 1"
        ))
        .bind(open_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}

/// `INSERT ... ON CONFLICT (open_id) DO UPDATE SET ... RETURNING ...`
fn build_upsert(resolved: &ResolvedUpsert) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO users (open_id");
    for assignment in &resolved.insert {
        qb.push(", ").push(assignment.column());
    }
    qb.push(") VALUES (");
    qb.push_bind(resolved.open_id.as_str().to_owned());
    for assignment in &resolved.insert {
        qb.push(", ");
        push_value(&mut qb, assignment);
    }
    qb.push(") ON CONFLICT (open_id) DO UPDATE SET ");
    for (i, assignment) in resolved.update.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(assignment.column()).push(" = ");
        push_value(&mut qb, assignment);
    }
    qb.push(concat!(" RETURNING ", user_columns!()));
    qb
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, assignment: &UserAssignment) {
    match assignment {
        UserAssignment::Name(v) | UserAssignment::Email(v) | UserAssignment::LoginMethod(v) => {
            qb.push_bind(v.clone());
        }
        UserAssignment::Role(role) => {
            qb.push_bind(role.as_str());
        }
        UserAssignment::LastSignedIn(at) => {
            qb.push_bind(*at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;

    #[test]
    fn builds_single_upsert_statement() {
        let mut patch = UserPatch::new("u-1");
        patch.name = Some(Some("Ada".into()));
        let resolved = patch.resolve(None, Utc::now()).unwrap();

        let qb = build_upsert(&resolved);
        assert_eq!(
            qb.sql(),
            concat!(
                "INSERT INTO users (open_id, name, last_signed_in) VALUES ($1, $2, $3) ",
                "ON CONFLICT (open_id) DO UPDATE SET name = $4, last_signed_in = $5 RETURNING ",
                user_columns!()
            )
        );
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn upsert_twice_keeps_one_row(pool: PgPool) -> Result<(), DbError> {
        migrations::run(&pool).await?;
        let repo = UserRepo::new(&pool);

        let first = repo.upsert(UserPatch::new("u-twice"), None).await?;
        let second = repo.upsert(UserPatch::new("u-twice"), None).await?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE open_id = $1")
            .bind("u-twice")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count.0, 1);
        assert_eq!(first.id, second.id);
        assert!(second.last_signed_in >= first.last_signed_in);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn owner_gets_admin_others_keep_role(pool: PgPool) -> Result<(), DbError> {
        migrations::run(&pool).await?;
        let repo = UserRepo::new(&pool);

        let owner = repo.upsert(UserPatch::new("owner"), Some("owner")).await?;
        assert_eq!(owner.role, UserRole::Admin);

        let regular = repo.upsert(UserPatch::new("regular"), Some("owner")).await?;
        assert_eq!(regular.role, UserRole::User);

        let mut promote = UserPatch::new("regular");
        promote.role = Some(UserRole::Admin);
        repo.upsert(promote, Some("owner")).await?;

        // No role supplied: the stored admin role survives
        let again = repo.upsert(UserPatch::new("regular"), Some("owner")).await?;
        assert_eq!(again.role, UserRole::Admin);
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn omitted_fields_are_untouched(pool: PgPool) -> Result<(), DbError> {
        migrations::run(&pool).await?;
        let repo = UserRepo::new(&pool);

        let mut first = UserPatch::new("u-fields");
        first.name = Some(Some("Ada".into()));
        first.email = Some(Some("ada@example.com".into()));
        repo.upsert(first, None).await?;

        let mut second = UserPatch::new("u-fields");
        second.email = Some(None);
        let user = repo.upsert(second, None).await?;

        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.email, None);

        let found = repo.get_by_open_id("u-fields").await?.expect("user exists");
        assert_eq!(found.id, user.id);
        assert!(repo.get_by_open_id("nobody").await?.is_none());
        Ok(())
    }
}
