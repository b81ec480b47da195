//! CTag identity tagging service
//!
//! Users sign in with a Google ID token; each Google identity owns one or
//! more CTags linking it to web2 accounts and web3 wallets. The crate holds
//! the HTTP API (`app`, `auth`, `ctags`, `users`), its table store
//! (`store`), and the client-side session flow (`client`).

pub mod app;
pub mod auth;
pub mod client;
pub mod common;
pub mod ctags;
pub mod logging_middleware;
pub mod services;
pub mod store;
pub mod users;
