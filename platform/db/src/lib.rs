//! Database primitives: pool settings, connection and the user helpers
//! shared by the server and the seed command.

use chrono::Utc;
use entity::users;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use thiserror::Error;
use uuid::Uuid;

/// Shared connection alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL missing")]
    MissingUrl,
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Default)]
pub struct DatabaseSettings {
    url: Option<String>,
}

impl DatabaseSettings {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").ok(),
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    pub fn database_url(&self) -> DbResult<&str> {
        self.url.as_deref().ok_or(DbError::MissingUrl)
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    Ok(Database::connect(url).await?)
}

/// Find-or-create a user by email, refreshing the stored role.
pub async fn upsert_user(pool: &DbPool, email: &str, role: &str) -> DbResult<users::Model> {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(pool)
        .await?;
    match existing {
        Some(user) if user.role == role => Ok(user),
        Some(user) => {
            let mut active: users::ActiveModel = user.into();
            active.role = Set(role.to_string());
            Ok(active.update(pool).await?)
        }
        None => {
            let model = users::ActiveModel {
                id: Set(Uuid::new_v4()),
                email: Set(email.to_string()),
                role: Set(role.to_string()),
                created_at: Set(Utc::now().into()),
            };
            Ok(model.insert(pool).await?)
        }
    }
}

/// Count of known users, used by the seed command to stay idempotent.
pub async fn user_count(pool: &DbPool) -> DbResult<u64> {
    use sea_orm::PaginatorTrait;
    Ok(users::Entity::find().count(pool).await?)
}
