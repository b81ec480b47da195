//! CTag data models

use serde::{Deserialize, Serialize};

/// A CTag record: one owning identity linked to web2 and web3 accounts
///
/// Serialized with the column names the store uses (`tag_id`, `google_id`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CTag {
    pub tag_id: String,
    pub google_id: String,
    #[serde(default)]
    pub web2_accounts: Vec<String>,
    #[serde(default)]
    pub web3_wallets: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CTag {
    /// A fresh record owned by `google_id` with a single linked web2 account
    pub fn new(tag_id: String, google_id: &str, email: &str) -> Self {
        Self {
            tag_id,
            google_id: google_id.to_string(),
            web2_accounts: vec![email.to_string()],
            web3_wallets: Vec::new(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// How a tag id is chosen when registering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAllocation {
    /// `ctag_` + random base36 suffix, retried on collision
    Random { auto: bool },
    /// Caller supplied id; fails if it already exists
    Named(String),
}

/// Body for `/register`, `/auto-register` and `/auto-create-ns`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCTagRequest {
    pub google_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LinkWalletRequest {
    pub wallet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LinkAccountRequest {
    pub email: Option<String>,
}

/// Response for the registration endpoints
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CTagCreatedResponse {
    pub message: String,
    pub c_tag: CTag,
}

/// Response for `/check/:googleId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStatus {
    pub registered: bool,
    pub tags: Vec<String>,
}

impl RegistrationStatus {
    pub fn from_tags(tags: Vec<String>) -> Self {
        Self {
            registered: !tags.is_empty(),
            tags,
        }
    }
}
