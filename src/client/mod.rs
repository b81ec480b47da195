//! # Client Module
//!
//! The sign-in flow a frontend drives against the API: log in, resolve or
//! auto-create a CTag, pick one, log out. Used by the `ctag_login` binary.

pub mod api;
pub mod directory;
pub mod flow;


pub use api::{CTagApi, ClientError, HttpCTagApi};
pub use flow::{Session, SessionFlow, SessionState};
