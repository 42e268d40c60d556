//! Profile repository: CRUD for the profiles table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use picvault_core::{AppError, ProfileRecord, UserId};
use sqlx::{PgPool, Postgres};

/// Record persistence used by the picture lifecycle manager.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the record for `user`, if one exists.
    async fn get_by_user(&self, user: &UserId) -> Result<Option<ProfileRecord>, AppError>;

    /// Insert or replace the record, atomically per user.
    async fn upsert(&self, record: &ProfileRecord) -> Result<(), AppError>;

    /// Return the record for `user`, creating an empty one if absent.
    ///
    /// Never overwrites an existing record. The default implementation is
    /// not atomic; backends that can do better override it.
    async fn get_or_create(&self, user: &UserId) -> Result<ProfileRecord, AppError> {
        if let Some(record) = self.get_by_user(user).await? {
            return Ok(record);
        }
        let record = ProfileRecord::empty(user.clone());
        self.upsert(&record).await?;
        Ok(record)
    }
}

/// Row type for profiles table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub picture_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    pub fn to_profile_record(self) -> Result<ProfileRecord, AppError> {
        Ok(ProfileRecord {
            user_id: UserId::parse(self.user_id)?,
            picture_key: self.picture_key,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for profiles table.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    #[tracing::instrument(skip(self), fields(db.table = "profiles", user_id = %user))]
    async fn get_by_user(&self, user: &UserId) -> Result<Option<ProfileRecord>, AppError> {
        let row: Option<ProfileRow> = sqlx::query_as::<Postgres, ProfileRow>(
            "SELECT user_id, picture_key, created_at, updated_at FROM profiles WHERE user_id = $1",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfileRow::to_profile_record).transpose()
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "profiles", user_id = %record.user_id))]
    async fn upsert(&self, record: &ProfileRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, picture_key, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET picture_key = EXCLUDED.picture_key,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(&record.picture_key)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", user_id = %user))]
    async fn get_or_create(&self, user: &UserId) -> Result<ProfileRecord, AppError> {
        let inserted: Option<ProfileRow> = sqlx::query_as::<Postgres, ProfileRow>(
            r#"
            INSERT INTO profiles (user_id, picture_key)
            VALUES ($1, '')
            ON CONFLICT (user_id) DO NOTHING
            RETURNING user_id, picture_key, created_at, updated_at
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            tracing::info!(user_id = %user, "Provisioned profile record");
            return row.to_profile_record();
        }

        self.get_by_user(user)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile for user {}", user)))
    }
}
