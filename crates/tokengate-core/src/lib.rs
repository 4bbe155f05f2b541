//! Core library for tokengate.
//!
//! A thin client over a token-auth REST API: credentials live in a pluggable
//! key-value store, a shared session flag tracks whether a user is signed in,
//! and the login/signup form controllers validate input before calling the
//! API.

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod models;

pub use api::{ApiError, AuthClient};
pub use auth::{SessionState, TokenStore};
pub use config::Config;
