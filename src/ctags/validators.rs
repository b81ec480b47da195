// src/ctags/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::RegisterCTagRequest;
use crate::common::{ApiError, ValidationResult, Validator};

fn wallet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("wallet pattern compiles"))
}

impl Validator<RegisterCTagRequest> for RegisterCTagRequest {
    fn validate(&self, data: &RegisterCTagRequest) -> ValidationResult {
        validate_registration(data.google_id.as_deref(), data.email.as_deref())
    }
}

/// Both the owner id and the account email must be present
pub fn validate_registration(google_id: Option<&str>, email: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.require("googleId", google_id, "Google ID is required");
    result.require("email", email, "Email is required");
    result
}

pub fn validate_email(email: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    let email = email.trim();
    if email.is_empty() {
        result.add_error("email", "Email is required");
    } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        result.add_error("email", "Email must be a valid address");
    } else if email.len() > 320 {
        result.add_error("email", "Email must not exceed 320 characters");
    }
    result
}

/// Checks an EVM-style wallet address (`0x` + 40 hex digits) and returns it trimmed
pub fn normalize_wallet(wallet: &str) -> Result<String, ApiError> {
    let wallet = wallet.trim();
    if wallet.is_empty() {
        return Err(ApiError::ValidationError("wallet: Wallet address is required".to_string()));
    }
    if !wallet_pattern().is_match(wallet) {
        return Err(ApiError::ValidationError(
            "wallet: Wallet address must be 0x followed by 40 hex characters".to_string(),
        ));
    }
    Ok(wallet.to_string())
}
