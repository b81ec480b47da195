// src/services/mod.rs
//
// Shared services for the external collaborators the API depends on

pub mod google;
pub mod monitoring;

// Re-export commonly used types for convenience
pub use google::{GoogleTokenVerifier, IdentityVerifier, VerifiedIdentity};
