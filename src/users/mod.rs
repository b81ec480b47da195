//! # Users Module
//!
//! User records keyed by email, created on first Google sign-in or through
//! the standalone registration endpoint.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use models::User;
pub use routes::users_routes;
