// src/store/sqlite.rs
//! SQLite table store through sqlx

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use super::{StoreError, TableStore};
use crate::common::helpers::parse_string_list;
use crate::common::{generate_user_id, migrations, safe_email_log};
use crate::ctags::models::CTag;
use crate::users::models::{NewUser, User};

#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

/// Row shape of `ctags`; list columns are JSON text
#[derive(FromRow)]
struct CTagRow {
    tag_id: String,
    google_id: String,
    web2_accounts: String,
    web3_wallets: String,
    created_at: Option<String>,
}

impl From<CTagRow> for CTag {
    fn from(row: CTagRow) -> Self {
        CTag {
            tag_id: row.tag_id,
            google_id: row.google_id,
            web2_accounts: parse_string_list(&row.web2_accounts),
            web3_wallets: parse_string_list(&row.web3_wallets),
            created_at: row.created_at,
        }
    }
}

fn encode_list(list: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(list).map_err(|e| StoreError::Decode(e.to_string()))
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Open (creating if needed) the database file and run migrations
    pub async fn connect(database_url: &str, reset_db: bool) -> Result<Self, StoreError> {
        if let Some(path_part) = database_url.strip_prefix("sqlite://") {
            let path_without_params = path_part.split('?').next().unwrap_or("");
            if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
                let db_path = PathBuf::from(path_without_params);
                if let Some(parent) = db_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent)
                            .await
                            .map_err(|e| StoreError::Backend(e.to_string()))?;
                    }
                }
            }
        }

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(connect_options)
            .await?;

        migrations::run_migrations(&pool, reset_db).await?;
        info!(database_url = %database_url, "SQLite store ready");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl TableStore for SqliteStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, google_id, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn upsert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let id = generate_user_id();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, google_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                name = COALESCE(excluded.name, users.name),
                google_id = COALESCE(excluded.google_id, users.google_id)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(user.name.as_deref())
        .bind(user.google_id.as_deref())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        debug!(email = %safe_email_log(&user.email), "User row upserted");

        self.find_user_by_email(&user.email)
            .await?
            .ok_or_else(|| StoreError::Decode("upserted user row not readable".to_string()))
    }

    async fn insert_ctag(&self, ctag: &CTag) -> Result<CTag, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ctags (tag_id, google_id, web2_accounts, web3_wallets, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ctag.tag_id)
        .bind(&ctag.google_id)
        .bind(encode_list(&ctag.web2_accounts)?)
        .bind(encode_list(&ctag.web3_wallets)?)
        .bind(ctag.created_at.as_deref())
        .execute(&self.db)
        .await?;

        Ok(ctag.clone())
    }

    async fn find_ctag(&self, tag_id: &str) -> Result<Option<CTag>, StoreError> {
        let row = sqlx::query_as::<_, CTagRow>(
            r#"
            SELECT tag_id, google_id, web2_accounts, web3_wallets, created_at
            FROM ctags
            WHERE tag_id = ?
            "#,
        )
        .bind(tag_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(CTag::from))
    }

    async fn list_tag_ids_for_owner(&self, google_id: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT tag_id FROM ctags WHERE google_id = ? ORDER BY rowid ASC")
                .bind(google_id)
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().map(|(tag_id,)| tag_id).collect())
    }

    async fn update_ctag_accounts(
        &self,
        current: &CTag,
        next: &CTag,
    ) -> Result<Option<CTag>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE ctags SET web2_accounts = ?, web3_wallets = ?
            WHERE tag_id = ? AND web2_accounts = ? AND web3_wallets = ?
            "#,
        )
        .bind(encode_list(&next.web2_accounts)?)
        .bind(encode_list(&next.web3_wallets)?)
        .bind(&current.tag_id)
        .bind(encode_list(&current.web2_accounts)?)
        .bind(encode_list(&current.web3_wallets)?)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_ctag(&current.tag_id).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single-connection in-memory store; each pooled connection would get its own database
    pub(crate) async fn memory_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::run_migrations(&pool, false).await.unwrap();
        SqliteStore::new(pool)
    }

    fn sample_ctag(tag_id: &str, owner: &str) -> CTag {
        CTag::new(tag_id.to_string(), owner, "a@x.com")
    }

    #[tokio::test]
    async fn test_insert_and_find_ctag() {
        let store = memory_store().await;
        let ctag = sample_ctag("ctag_abc123xyz", "g1");
        store.insert_ctag(&ctag).await.unwrap();

        let found = store.find_ctag("ctag_abc123xyz").await.unwrap().unwrap();
        assert_eq!(found, ctag);
        assert_eq!(found.web2_accounts, vec!["a@x.com".to_string()]);
        assert!(found.web3_wallets.is_empty());

        assert!(store.find_ctag("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_tag_id_is_conflict() {
        let store = memory_store().await;
        store.insert_ctag(&sample_ctag("ns", "g1")).await.unwrap();

        let err = store.insert_ctag(&sample_ctag("ns", "g2")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_list_tag_ids_in_insertion_order() {
        let store = memory_store().await;
        store.insert_ctag(&sample_ctag("ctag_zzzzzzzzz", "g1")).await.unwrap();
        store.insert_ctag(&sample_ctag("ctag_aaaaaaaaa", "g1")).await.unwrap();
        store.insert_ctag(&sample_ctag("ctag_other0000", "g2")).await.unwrap();

        let tags = store.list_tag_ids_for_owner("g1").await.unwrap();
        assert_eq!(tags, vec!["ctag_zzzzzzzzz", "ctag_aaaaaaaaa"]);
        assert!(store.list_tag_ids_for_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_user_keeps_single_row() {
        let store = memory_store().await;
        let first = store
            .upsert_user(&NewUser {
                email: "a@x.com".to_string(),
                name: Some("Ada".to_string()),
                google_id: None,
            })
            .await
            .unwrap();

        let second = store
            .upsert_user(&NewUser {
                email: "a@x.com".to_string(),
                name: None,
                google_id: Some("g1".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name.as_deref(), Some("Ada"));
        assert_eq!(second.google_id.as_deref(), Some("g1"));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_ctag_accounts() {
        let store = memory_store().await;
        let ctag = sample_ctag("ctag_wallet0001", "g1");
        store.insert_ctag(&ctag).await.unwrap();

        let mut next = ctag.clone();
        next.web3_wallets.push("0xabc".to_string());
        let updated = store.update_ctag_accounts(&ctag, &next).await.unwrap().unwrap();
        assert_eq!(updated.web3_wallets, vec!["0xabc".to_string()]);

        let missing = sample_ctag("ctag_missing000", "g1");
        assert!(store
            .update_ctag_accounts(&missing, &missing)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_ctag_accounts_rejects_stale_read() {
        let store = memory_store().await;
        let ctag = sample_ctag("ctag_wallet0002", "g1");
        store.insert_ctag(&ctag).await.unwrap();

        let mut first = ctag.clone();
        first.web3_wallets.push("0xaaa".to_string());
        store.update_ctag_accounts(&ctag, &first).await.unwrap().unwrap();

        // Written against the pre-update lists, so it must not apply
        let mut second = ctag.clone();
        second.web3_wallets.push("0xbbb".to_string());
        assert!(store
            .update_ctag_accounts(&ctag, &second)
            .await
            .unwrap()
            .is_none());

        let stored = store.find_ctag("ctag_wallet0002").await.unwrap().unwrap();
        assert_eq!(stored.web3_wallets, vec!["0xaaa".to_string()]);
    }
}
