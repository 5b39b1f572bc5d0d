use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::User,
    repository::UserRepository,
};

/// Postgres-backed [`UserRepository`].
///
/// Every query is scoped to live rows (`deleted_at IS NULL`); email uniqueness
/// among them is enforced by a partial unique index.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn store_error(err: DbErr) -> UserError {
    UserError::Store(err.to_string())
}

fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    let message = err.to_string();
    message.contains("duplicate key") || message.contains("unique constraint")
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> UserResult<()> {
        let active_model: entity::ActiveModel = user.into();

        entity::Entity::insert(active_model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserError::DuplicateEmail(user.email().to_string())
                } else {
                    store_error(e)
                }
            })?;

        tracing::info!(user_id = %user.id(), "Created user");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<User> {
        entity::Entity::find_by_id(id)
            .filter(entity::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(User::from)
            .ok_or(UserError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> UserResult<User> {
        entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .filter(entity::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(User::from)
            .ok_or(UserError::NotFound)
    }

    async fn update(&self, user: &User) -> UserResult<()> {
        let updated_at: DateTimeWithTimeZone = user.updated_at().into();

        let result = entity::Entity::update_many()
            .col_expr(entity::Column::Name, Expr::value(user.name().to_string()))
            .col_expr(entity::Column::UpdatedAt, Expr::value(updated_at))
            .filter(entity::Column::Id.eq(user.id()))
            .filter(entity::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %user.id(), "Updated user");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let deleted_at: DateTimeWithTimeZone = Utc::now().into();

        let result = entity::Entity::update_many()
            .col_expr(entity::Column::DeletedAt, Expr::value(Some(deleted_at)))
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .filter(entity::Column::DeletedAt.is_null())
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
