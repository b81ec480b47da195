// src/store/mod.rs
//! # Store Module
//!
//! The table store behind users and CTags. One instance is built at startup
//! from [`StoreBackend`](crate::common::config::StoreBackend) and shared as
//! `Arc<dyn TableStore>` by every service and route.

pub mod sqlite;
pub mod supabase;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::common::config::StoreBackend;
use crate::ctags::models::CTag;
use crate::users::models::{NewUser, User};

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("duplicate key: {0}")]
    Conflict(String),

    #[error("store request failed: {0}")]
    Backend(String),

    #[error("unexpected store response: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Backend(e.to_string())
        }
    }
}

/// Queries the service layer issues against the table store
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Single user by (normalized) email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert, or on an email conflict update the non-`None` fields; returns the stored row
    async fn upsert_user(&self, user: &NewUser) -> Result<User, StoreError>;

    /// Insert a CTag; `StoreError::Conflict` when `tag_id` is taken
    async fn insert_ctag(&self, ctag: &CTag) -> Result<CTag, StoreError>;

    async fn find_ctag(&self, tag_id: &str) -> Result<Option<CTag>, StoreError>;

    /// Tag ids owned by `google_id`, oldest first
    async fn list_tag_ids_for_owner(&self, google_id: &str) -> Result<Vec<String>, StoreError>;

    /// Replace the account lists of `current` with those of `next`
    ///
    /// The write only applies while the stored lists still equal `current`'s;
    /// `None` when the tag is missing or was changed since it was read.
    async fn update_ctag_accounts(
        &self,
        current: &CTag,
        next: &CTag,
    ) -> Result<Option<CTag>, StoreError>;
}

/// Build the configured store, running migrations for SQLite
pub async fn connect(
    backend: &StoreBackend,
    reset_db: bool,
    http: reqwest::Client,
) -> anyhow::Result<Arc<dyn TableStore>> {
    let store: Arc<dyn TableStore> = match backend {
        StoreBackend::Sqlite { database_url } => {
            Arc::new(SqliteStore::connect(database_url, reset_db).await?)
        }
        StoreBackend::Supabase { url, access_key } => {
            Arc::new(SupabaseStore::new(http, url, access_key))
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE tags (tag_id TEXT PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO tags (tag_id) VALUES ('ns')")
            .execute(&pool)
            .await
            .unwrap();

        let duplicate = sqlx::query("INSERT INTO tags (tag_id) VALUES ('ns')")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(matches!(StoreError::from(duplicate), StoreError::Conflict(_)));

        let missing_table = sqlx::query("SELECT * FROM nowhere")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(matches!(StoreError::from(missing_table), StoreError::Backend(_)));
    }

    #[test]
    fn test_non_database_errors_are_backend_errors() {
        // Only the driver's constraint classification counts, not message text
        let converted: StoreError =
            sqlx::Error::Protocol("UNIQUE constraint failed: ctags.tag_id".to_string()).into();
        assert!(matches!(converted, StoreError::Backend(_)));

        let converted: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(converted, StoreError::Backend(_)));
    }
}
