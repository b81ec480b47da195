//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google ID token sign-in with CTag auto-provisioning
//! - Session token issue, validation and revocation
//! - AuthedSession extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

#[cfg(test)]
mod tests;

pub use extractors::AuthedSession;
pub use routes::auth_routes;
