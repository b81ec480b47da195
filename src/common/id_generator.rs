// src/common/id_generator.rs
//! Prefixed random ID generation
//!
//! Two alphabets are in use:
//! - Crockford Base32 for internal record ids (`U_K7NP3X`), which avoids the
//!   ambiguous characters I, L, O and U.
//! - Lowercase base36 for CTag handles (`ctag_k7np3x2ab`), which are typed
//!   and shared by people and stay lowercase.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Lowercase base36 alphabet used for CTag handles
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Prefix for randomly allocated CTag handles
pub const CTAG_PREFIX: &str = "ctag_";

/// Number of random characters after [`CTAG_PREFIX`]
pub const CTAG_RANDOM_LEN: usize = 9;

/// Entity type prefixes for internal record ids
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Session (K_) - K for Key
    Session,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Session => "K",
        }
    }
}

fn generate_from_alphabet(alphabet: &[u8], length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// Returns a string in format "PREFIX_XXXXXX" (e.g., "U_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!(
        "{}_{}",
        prefix.as_str(),
        generate_from_alphabet(CROCKFORD_ALPHABET, 6)
    )
}

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a session token id (K_XXXXXXXXXXXX)
///
/// Longer than record ids since session ids are never looked up by hand.
pub fn generate_session_id() -> String {
    format!(
        "{}_{}",
        EntityPrefix::Session.as_str(),
        generate_from_alphabet(CROCKFORD_ALPHABET, 12)
    )
}

/// Generate a CTag handle candidate (`ctag_` + 9 base36 characters)
///
/// Candidates are not guaranteed unique; callers insert against the store's
/// uniqueness constraint and draw a new candidate on conflict.
pub fn generate_ctag_id() -> String {
    format!(
        "{}{}",
        CTAG_PREFIX,
        generate_from_alphabet(BASE36_ALPHABET, CTAG_RANDOM_LEN)
    )
}
