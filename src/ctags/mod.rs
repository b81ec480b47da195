//! # CTags Module
//!
//! This module handles all CTag functionality including:
//! - Registration with random, automatic and fixed ids
//! - Lookup by id and by owner
//! - Login-time auto-provisioning
//! - Linking web2 accounts and web3 wallets

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::CTag;
pub use routes::ctags_routes;
