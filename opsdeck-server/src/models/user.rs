//! User upsert patch
//!
//! A login produces a [`UserPatch`]: the external identity plus whichever
//! profile fields the login provider supplied. [`UserPatch::resolve`] turns it
//! into the column assignments for the INSERT and for the ON CONFLICT UPDATE.
//!
//! Per-field rules:
//! - `name`, `email`, `loginMethod`: written only when supplied. Supplying
//!   `null` clears the column; omitting the field leaves it untouched.
//! - `role`: an explicit role always wins. Without one, the configured owner
//!   identity is promoted to admin; anyone else keeps their stored role
//!   (`user` on first insert, via the column default).
//! - `lastSignedIn`: defaults to now on both paths, so every upsert advances it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::text::check_len;
use super::{OpenId, UserRole, ValidationError};

/// Width of the `email` column
const MAX_EMAIL_LEN: usize = 320;

/// Width of the `login_method` column
const MAX_LOGIN_METHOD_LEN: usize = 64;

/// Candidate user record from a login
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub open_id: String,
    #[serde(default, deserialize_with = "supplied")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub login_method: Option<Option<String>>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub last_signed_in: Option<DateTime<Utc>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn supplied<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// A single column write
#[derive(Debug, Clone, PartialEq)]
pub enum UserAssignment {
    Name(Option<String>),
    Email(Option<String>),
    LoginMethod(Option<String>),
    Role(UserRole),
    LastSignedIn(DateTime<Utc>),
}

impl UserAssignment {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Email(_) => "email",
            Self::LoginMethod(_) => "login_method",
            Self::Role(_) => "role",
            Self::LastSignedIn(_) => "last_signed_in",
        }
    }
}

/// Output of [`UserPatch::resolve`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUpsert {
    pub open_id: OpenId,
    /// Columns written by the INSERT, besides `open_id`
    pub insert: Vec<UserAssignment>,
    /// Columns overwritten when the identity already exists. Never empty.
    pub update: Vec<UserAssignment>,
}

impl UserPatch {
    pub fn new(open_id: impl Into<String>) -> Self {
        Self {
            open_id: open_id.into(),
            ..Default::default()
        }
    }

    /// Check the identity and the width-limited profile fields.
    pub fn validate(&self) -> Result<OpenId, ValidationError> {
        let open_id = OpenId::new(&self.open_id)?;
        if let Some(Some(email)) = &self.email {
            check_len("email", email, MAX_EMAIL_LEN)?;
        }
        if let Some(Some(login_method)) = &self.login_method {
            check_len("loginMethod", login_method, MAX_LOGIN_METHOD_LEN)?;
        }
        Ok(open_id)
    }

    /// Apply the per-field defaulting rules.
    ///
    /// `owner_open_id` is the identity that gets admin by default; `now` is
    /// the fallback sign-in time.
    pub fn resolve(
        self,
        owner_open_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ResolvedUpsert, ValidationError> {
        let open_id = self.validate()?;
        let mut assignments = Vec::with_capacity(5);

        if let Some(name) = self.name {
            assignments.push(UserAssignment::Name(name));
        }
        if let Some(email) = self.email {
            assignments.push(UserAssignment::Email(email));
        }
        if let Some(login_method) = self.login_method {
            assignments.push(UserAssignment::LoginMethod(login_method));
        }

        let is_owner = owner_open_id.is_some_and(|owner| owner == open_id.as_str());
        match self.role {
            Some(role) => assignments.push(UserAssignment::Role(role)),
            None if is_owner => assignments.push(UserAssignment::Role(UserRole::Admin)),
            None => {}
        }

        assignments.push(UserAssignment::LastSignedIn(
            self.last_signed_in.unwrap_or(now),
        ));

        Ok(ResolvedUpsert {
            open_id,
            insert: assignments.clone(),
            update: assignments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn missing_open_id_is_rejected() {
        let err = UserPatch::new("").resolve(None, now()).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "openId" });
    }

    #[test]
    fn overlong_email_is_rejected() {
        let mut patch = UserPatch::new("u-5");
        patch.email = Some(Some("a".repeat(321)));
        let err = patch.resolve(None, now()).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "email", max: 320 });

        let mut patch = UserPatch::new("u-5");
        patch.email = Some(Some("a".repeat(320)));
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn overlong_login_method_is_rejected() {
        let mut patch = UserPatch::new("u-6");
        patch.login_method = Some(Some("x".repeat(65)));
        assert_eq!(
            patch.validate().unwrap_err(),
            ValidationError::TooLong { field: "loginMethod", max: 64 }
        );

        // Clearing is always allowed
        patch.login_method = Some(None);
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn bare_identity_still_touches_sign_in() {
        let resolved = UserPatch::new("u-1").resolve(None, now()).unwrap();
        assert_eq!(resolved.update, vec![UserAssignment::LastSignedIn(now())]);
        assert_eq!(resolved.insert, resolved.update);
    }

    #[test]
    fn owner_defaults_to_admin() {
        let resolved = UserPatch::new("owner-1")
            .resolve(Some("owner-1"), now())
            .unwrap();
        assert!(resolved.update.contains(&UserAssignment::Role(UserRole::Admin)));
        assert!(resolved.insert.contains(&UserAssignment::Role(UserRole::Admin)));
    }

    #[test]
    fn non_owner_role_is_untouched() {
        let resolved = UserPatch::new("u-2").resolve(Some("owner-1"), now()).unwrap();
        assert!(!resolved.update.iter().any(|a| a.column() == "role"));
    }

    #[test]
    fn explicit_role_beats_owner_default() {
        let mut patch = UserPatch::new("owner-1");
        patch.role = Some(UserRole::User);
        let resolved = patch.resolve(Some("owner-1"), now()).unwrap();
        assert!(resolved.update.contains(&UserAssignment::Role(UserRole::User)));
        assert!(!resolved.update.contains(&UserAssignment::Role(UserRole::Admin)));
    }

    #[test]
    fn supplied_sign_in_time_is_kept() {
        let earlier = now() - chrono::Duration::hours(2);
        let mut patch = UserPatch::new("u-3");
        patch.last_signed_in = Some(earlier);
        let resolved = patch.resolve(None, now()).unwrap();
        assert_eq!(resolved.update, vec![UserAssignment::LastSignedIn(earlier)]);
    }

    #[test]
    fn json_null_clears_but_absent_skips() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"openId":"u-4","email":null,"name":"Ada"}"#).unwrap();
        assert_eq!(patch.email, Some(None));
        assert_eq!(patch.name, Some(Some("Ada".to_string())));
        assert_eq!(patch.login_method, None);

        let resolved = patch.resolve(None, now()).unwrap();
        let columns: Vec<_> = resolved.update.iter().map(|a| a.column()).collect();
        assert_eq!(columns, vec!["name", "email", "last_signed_in"]);
        assert!(resolved.update.contains(&UserAssignment::Email(None)));
    }
}
