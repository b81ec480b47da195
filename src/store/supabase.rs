// src/store/supabase.rs
//! Hosted table store over Supabase's PostgREST interface
//!
//! Every table is reachable at `{url}/rest/v1/{table}`; filters are query
//! parameters of the form `column=eq.value`. Requests carry the access key in
//! both the `apikey` and bearer `Authorization` headers.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use super::{StoreError, TableStore};
use crate::common::{generate_user_id, safe_email_log};
use crate::ctags::models::CTag;
use crate::users::models::{NewUser, User};

const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Clone)]
pub struct SupabaseStore {
    http: Client,
    base_url: String,
    access_key: String,
}

impl SupabaseStore {
    pub fn new(http: Client, url: &str, access_key: &str) -> Self {
        Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
        }
    }

    /// `{base}/rest/v1/{table}?{filters}` with url-encoded filter values
    pub(crate) fn table_url(&self, table: &str, filters: &[(&str, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table);
        if !filters.is_empty() {
            let query: Vec<String> = filters
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.access_key)
            .bearer_auth(&self.access_key)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table, filters);
        debug!(table = %table, "Selecting rows from hosted store");
        let response = self.authorize(self.http.get(&url)).send().await?;
        read_rows(table, response).await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn json_list(list: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(list).map_err(|e| StoreError::Decode(e.to_string()))
}

async fn read_rows<T: DeserializeOwned>(
    table: &str,
    response: Response,
) -> Result<Vec<T>, StoreError> {
    let status = response.status();
    if status == StatusCode::CONFLICT {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Conflict(body));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(table = %table, http_status = %status, "Hosted store request failed");
        return Err(StoreError::Backend(format!("{}: {}", status, body)));
    }
    Ok(response.json::<Vec<T>>().await?)
}

fn single<T>(table: &str, rows: Vec<T>) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode(format!("{} write returned no rows", table)))
}

#[derive(serde::Deserialize)]
struct TagIdRow {
    tag_id: String,
}

#[async_trait]
impl TableStore for SupabaseStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows: Vec<User> = self
            .fetch_rows("users", &[("email", eq(email)), ("select", "*".to_string())])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        // PostgREST's merge-duplicates would overwrite the primary key, so
        // existing rows are patched and only new rows are inserted.
        if self.find_user_by_email(&user.email).await?.is_some() {
            let mut patch = serde_json::Map::new();
            if let Some(name) = &user.name {
                patch.insert("name".to_string(), json!(name));
            }
            if let Some(google_id) = &user.google_id {
                patch.insert("google_id".to_string(), json!(google_id));
            }
            if patch.is_empty() {
                return self
                    .find_user_by_email(&user.email)
                    .await?
                    .ok_or_else(|| StoreError::Decode("user vanished during upsert".to_string()));
            }

            let url = self.table_url("users", &[("email", eq(&user.email))]);
            let response = self
                .authorize(self.http.patch(&url))
                .header("Prefer", RETURN_REPRESENTATION)
                .json(&patch)
                .send()
                .await?;
            debug!(email = %safe_email_log(&user.email), "Patched existing user");
            return single("users", read_rows("users", response).await?);
        }

        let row = json!([{
            "id": generate_user_id(),
            "email": user.email,
            "name": user.name,
            "google_id": user.google_id,
            "created_at": chrono::Utc::now().to_rfc3339(),
        }]);
        let response = self
            .authorize(self.http.post(self.table_url("users", &[])))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row)
            .send()
            .await?;

        match read_rows::<User>("users", response).await {
            Ok(rows) => single("users", rows),
            // Lost an insert race on the email constraint; the row exists now
            Err(StoreError::Conflict(_)) => self
                .find_user_by_email(&user.email)
                .await?
                .ok_or_else(|| StoreError::Decode("conflicting user not readable".to_string())),
            Err(e) => Err(e),
        }
    }

    async fn insert_ctag(&self, ctag: &CTag) -> Result<CTag, StoreError> {
        let response = self
            .authorize(self.http.post(self.table_url("ctags", &[])))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[ctag])
            .send()
            .await?;
        single("ctags", read_rows("ctags", response).await?)
    }

    async fn find_ctag(&self, tag_id: &str) -> Result<Option<CTag>, StoreError> {
        let rows: Vec<CTag> = self
            .fetch_rows("ctags", &[("tag_id", eq(tag_id)), ("select", "*".to_string())])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_tag_ids_for_owner(&self, google_id: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<TagIdRow> = self
            .fetch_rows(
                "ctags",
                &[
                    ("google_id", eq(google_id)),
                    ("select", "tag_id".to_string()),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|row| row.tag_id).collect())
    }

    async fn update_ctag_accounts(
        &self,
        current: &CTag,
        next: &CTag,
    ) -> Result<Option<CTag>, StoreError> {
        // jsonb equality on the lists read by the caller makes the PATCH conditional
        let url = self.table_url(
            "ctags",
            &[
                ("tag_id", eq(&current.tag_id)),
                ("web2_accounts", eq(&json_list(&current.web2_accounts)?)),
                ("web3_wallets", eq(&json_list(&current.web3_wallets)?)),
            ],
        );
        let response = self
            .authorize(self.http.patch(&url))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&json!({
                "web2_accounts": next.web2_accounts,
                "web3_wallets": next.web3_wallets,
            }))
            .send()
            .await?;
        let rows: Vec<CTag> = read_rows("ctags", response).await?;
        Ok(rows.into_iter().next())
    }
}
