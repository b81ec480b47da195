use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{CTag, RegistrationStatus, TagAllocation};
use super::validators;
use crate::common::helpers::normalize_email;
use crate::common::{generate_ctag_id, safe_email_log, ApiError};
use crate::store::{StoreError, TableStore};

/// Attempts at drawing a free random tag id before giving up
pub const MAX_TAG_ALLOCATION_ATTEMPTS: usize = 5;

/// Read-modify-write rounds for linking an account before reporting a conflict
pub const MAX_ACCOUNT_UPDATE_ATTEMPTS: usize = 5;

/// Fixed id used by the named-tag endpoint
pub const NS_TAG_ID: &str = "ns";

/// CTag lookup and provisioning
pub struct CTagService {
    store: Arc<dyn TableStore>,
    id_source: fn() -> String,
}

impl CTagService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            id_source: generate_ctag_id,
        }
    }

    /// Replace the random id source (collision handling tests)
    #[cfg(test)]
    pub(crate) fn with_id_source(mut self, id_source: fn() -> String) -> Self {
        self.id_source = id_source;
        self
    }

    // ============================================================================
    // Registration
    // ============================================================================

    /// Register a CTag with a random `ctag_` id
    pub async fn register(&self, owner_id: &str, email: &str) -> Result<CTag, ApiError> {
        self.create(owner_id, email, TagAllocation::Random { auto: false })
            .await
    }

    /// Same as [`register`](Self::register); recorded as automatic in the logs
    pub async fn auto_register(&self, owner_id: &str, email: &str) -> Result<CTag, ApiError> {
        self.create(owner_id, email, TagAllocation::Random { auto: true })
            .await
    }

    /// Register a CTag under a fixed id, failing if it is taken
    pub async fn create_named(
        &self,
        owner_id: &str,
        email: &str,
        tag_id: &str,
    ) -> Result<CTag, ApiError> {
        self.create(owner_id, email, TagAllocation::Named(tag_id.to_string()))
            .await
    }

    pub async fn create(
        &self,
        owner_id: &str,
        email: &str,
        allocation: TagAllocation,
    ) -> Result<CTag, ApiError> {
        validators::validate_registration(Some(owner_id), Some(email)).into_result()?;
        let owner_id = owner_id.trim();
        let email = normalize_email(email);
        let email = email.as_str();

        match allocation {
            TagAllocation::Random { auto } => {
                for attempt in 1..=MAX_TAG_ALLOCATION_ATTEMPTS {
                    let candidate = CTag::new((self.id_source)(), owner_id, email);
                    match self.store.insert_ctag(&candidate).await {
                        Ok(ctag) => {
                            info!(
                                tag_id = %ctag.tag_id,
                                owner_id = %owner_id,
                                email = %safe_email_log(email),
                                auto,
                                attempt,
                                "CTag registered"
                            );
                            return Ok(ctag);
                        }
                        Err(StoreError::Conflict(_)) => {
                            warn!(
                                tag_id = %candidate.tag_id,
                                attempt,
                                "CTag id collision, drawing a new candidate"
                            );
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(ApiError::InternalServer(format!(
                    "could not allocate a unique CTag id after {} attempts",
                    MAX_TAG_ALLOCATION_ATTEMPTS
                )))
            }
            TagAllocation::Named(tag_id) => {
                let tag_id = tag_id.trim();
                if tag_id.is_empty() {
                    return Err(ApiError::ValidationError("tag id is required".to_string()));
                }
                if self.store.find_ctag(tag_id).await?.is_some() {
                    return Err(already_exists(tag_id));
                }

                let ctag = CTag::new(tag_id.to_string(), owner_id, email);
                match self.store.insert_ctag(&ctag).await {
                    Ok(ctag) => {
                        info!(tag_id = %ctag.tag_id, owner_id = %owner_id, "Named CTag created");
                        Ok(ctag)
                    }
                    // Lost a race between the existence check and the insert
                    Err(StoreError::Conflict(_)) => Err(already_exists(tag_id)),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    // ============================================================================
    // Lookups
    // ============================================================================

    pub async fn get_by_id(&self, tag_id: &str) -> Result<CTag, ApiError> {
        self.store
            .find_ctag(tag_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("C-Tag not found".to_string()))
    }

    /// Tag ids owned by `owner_id`; empty when there are none
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<String>, ApiError> {
        let tags = self.store.list_tag_ids_for_owner(owner_id).await?;
        debug!(owner_id = %owner_id, count = tags.len(), "Listed CTags for owner");
        Ok(tags)
    }

    pub async fn check_registration(&self, owner_id: &str) -> Result<RegistrationStatus, ApiError> {
        Ok(RegistrationStatus::from_tags(
            self.list_for_owner(owner_id).await?,
        ))
    }

    /// Login-time flow: the owner's tags, provisioning one if there are none
    pub async fn ensure_for_identity(
        &self,
        owner_id: &str,
        email: &str,
    ) -> Result<Vec<String>, ApiError> {
        let existing = self.list_for_owner(owner_id).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        info!(owner_id = %owner_id, "No CTags for identity, auto-provisioning one");
        let ctag = self.auto_register(owner_id, email).await?;
        Ok(vec![ctag.tag_id])
    }

    // ============================================================================
    // Linked accounts
    // ============================================================================

    /// Add a web3 wallet to the tag; already linked wallets are left as is
    pub async fn link_wallet(&self, tag_id: &str, wallet: &str) -> Result<CTag, ApiError> {
        let wallet = validators::normalize_wallet(wallet)?;
        self.append_account(tag_id, |ctag| &mut ctag.web3_wallets, wallet)
            .await
    }

    /// Add a web2 account email to the tag; already linked emails are left as is
    pub async fn link_web2_account(&self, tag_id: &str, email: &str) -> Result<CTag, ApiError> {
        validators::validate_email(email).into_result()?;
        self.append_account(tag_id, |ctag| &mut ctag.web2_accounts, normalize_email(email))
            .await
    }

    async fn append_account<F>(
        &self,
        tag_id: &str,
        list: F,
        entry: String,
    ) -> Result<CTag, ApiError>
    where
        F: Fn(&mut CTag) -> &mut Vec<String>,
    {
        for attempt in 1..=MAX_ACCOUNT_UPDATE_ATTEMPTS {
            let current = self.get_by_id(tag_id).await?;
            let mut next = current.clone();
            let entries = list(&mut next);
            if entries.iter().any(|existing| existing.eq_ignore_ascii_case(&entry)) {
                debug!(tag_id = %tag_id, "Account already linked");
                return Ok(current);
            }
            entries.push(entry.clone());

            // None means another writer got there first (or the tag is gone); re-read
            if let Some(updated) = self.store.update_ctag_accounts(&current, &next).await? {
                info!(tag_id = %tag_id, attempt, "Linked account added to CTag");
                return Ok(updated);
            }
            warn!(tag_id = %tag_id, attempt, "CTag changed while linking, retrying");
        }

        Err(ApiError::Conflict(format!(
            "C-Tag '{}' is being modified concurrently, try again",
            tag_id
        )))
    }
}

fn already_exists(tag_id: &str) -> ApiError {
    ApiError::Conflict(format!("C-Tag '{}' already exists", tag_id))
}
