use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::UserResult;
use crate::validation::{validate_email, validate_name};

/// A registered user.
///
/// Only [`User::new`] creates users, so every instance holds a valid email and
/// a trimmed, non-empty name. `id` and `email` never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Validate `email` (first) and `name`, then allocate a fresh id.
    pub fn new(email: impl Into<String>, name: &str) -> UserResult<Self> {
        let email = email.into();
        validate_email(&email)?;
        let name = validate_name(name)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a user from persisted state without re-validating it.
    pub fn restore(
        id: Uuid,
        email: String,
        name: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            created_at,
            updated_at,
        }
    }

    /// Replace the display name. The user is left untouched when `name` is invalid.
    pub fn rename(&mut self, name: &str) -> UserResult<()> {
        self.name = validate_name(name)?;
        self.updated_at = Utc::now().max(self.updated_at);
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body of `POST /users`.
///
/// The extractor rejects empty or oversized emails up front. Format rules
/// live in [`crate::validation`], and `name` is left to them so that a bad
/// email is still reported before a bad name.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 254))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
}

/// Body of `PUT /users/{id}`. Email cannot be changed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    #[schema(example = "Jane Smith")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub limit: u64,
    pub offset: u64,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Raw `?limit=&offset=` query.
///
/// Values are kept as strings so unparsable input falls back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Page size, 1 to the configured maximum (default 10)
    #[param(value_type = Option<u64>, example = 10)]
    pub limit: Option<String>,
    /// Number of users to skip (default 0)
    #[param(value_type = Option<u64>, example = 0)]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl ListUsersQuery {
    /// Resolve the page, or return the rejected limit when it exceeds `max_page_size`.
    pub fn page(&self, max_page_size: u64) -> Result<Page, u64> {
        let limit = self
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_PAGE_LIMIT, |limit| limit as u64);

        let offset = self
            .offset
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .map_or(0, |offset| offset as u64);

        if limit > max_page_size {
            return Err(limit);
        }

        Ok(Page { limit, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserError;
    use chrono::Duration;

    fn query(limit: Option<&str>, offset: Option<&str>) -> ListUsersQuery {
        ListUsersQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn test_new_trims_name() {
        let user = User::new("test@example.com", "  Jane Doe  ").unwrap();

        assert_eq!(user.email(), "test@example.com");
        assert_eq!(user.name(), "Jane Doe");
        assert_eq!(user.created_at(), user.updated_at());
        assert!(!user.id().is_nil());
    }

    #[test]
    fn test_new_rejects_invalid_email() {
        assert_eq!(
            User::new("test..user@example.com", "Jane"),
            Err(UserError::InvalidEmail)
        );
    }

    #[test]
    fn test_new_rejects_empty_name() {
        assert_eq!(User::new("a@b.com", ""), Err(UserError::InvalidName));
    }

    #[test]
    fn test_new_validates_email_before_name() {
        assert_eq!(User::new("not-an-email", ""), Err(UserError::InvalidEmail));
    }

    #[test]
    fn test_new_allocates_distinct_ids() {
        let a = User::new("a@example.com", "A").unwrap();
        let b = User::new("a@example.com", "A").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_rename_keeps_identity() {
        let mut user = User::new("test@example.com", "Jane").unwrap();
        let before = user.clone();

        user.rename("  Jane Smith ").unwrap();

        assert_eq!(user.name(), "Jane Smith");
        assert_eq!(user.id(), before.id());
        assert_eq!(user.email(), before.email());
        assert_eq!(user.created_at(), before.created_at());
        assert!(user.updated_at() >= before.updated_at());
    }

    #[test]
    fn test_failed_rename_leaves_user_unchanged() {
        let mut user = User::new("test@example.com", "Jane").unwrap();
        let before = user.clone();

        assert_eq!(user.rename("   "), Err(UserError::InvalidName));
        assert_eq!(user, before);
    }

    #[test]
    fn test_rename_never_moves_updated_at_backwards() {
        let future = Utc::now() + Duration::hours(1);
        let mut user = User::restore(
            Uuid::new_v4(),
            "test@example.com".into(),
            "Jane".into(),
            future,
            future,
        );

        user.rename("Janet").unwrap();
        assert_eq!(user.updated_at(), future);
    }

    #[test]
    fn test_response_exposes_all_fields() {
        let user = User::new("test@example.com", "Jane").unwrap();
        let json = serde_json::to_value(UserResponse::from(user.clone())).unwrap();

        assert_eq!(json["id"], user.id().to_string());
        assert_eq!(json["email"], "test@example.com");
        assert_eq!(json["name"], "Jane");
        assert!(json["created_at"].is_string());
        assert!(json["updated_at"].is_string());
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(
            query(None, None).page(100),
            Ok(Page {
                limit: 10,
                offset: 0
            })
        );
    }

    #[test]
    fn test_page_falls_back_on_bad_values() {
        for (limit, offset) in [
            (Some("abc"), Some("xyz")),
            (Some("0"), Some("-1")),
            (Some("-5"), Some("")),
            (Some("2.5"), Some("1e3")),
        ] {
            assert_eq!(
                query(limit, offset).page(100),
                Ok(Page {
                    limit: 10,
                    offset: 0
                }),
                "{limit:?} {offset:?}"
            );
        }
    }

    #[test]
    fn test_page_accepts_explicit_values() {
        assert_eq!(
            query(Some("25"), Some("50")).page(100),
            Ok(Page {
                limit: 25,
                offset: 50
            })
        );
        assert_eq!(query(Some("100"), None).page(100).unwrap().limit, 100);
    }

    #[test]
    fn test_page_rejects_limit_above_max() {
        assert_eq!(query(Some("101"), None).page(100), Err(101));
        assert_eq!(query(Some("30"), None).page(20), Err(30));
    }

    #[test]
    fn test_request_shape_guards() {
        let create = |email: String| CreateUserRequest {
            email,
            name: String::new(),
        };

        assert!(create("jane@example.com".into()).validate().is_ok());
        assert!(create(String::new()).validate().is_err());
        assert!(create("a".repeat(255)).validate().is_err());

        let rename = |name: &str| UpdateUserRequest { name: name.into() };
        assert!(rename("  ").validate().is_ok());
        assert!(rename("").validate().is_err());
    }
}
