//! REST client module for the token-auth API.
//!
//! This module provides the `AuthClient` for signing in, registering,
//! validating stored tokens and logging out.
//!
//! The API authenticates requests with three headers (`access-token`, `uid`,
//! `client`) that it also returns, possibly rotated, on every success.

pub mod client;
pub mod error;

pub use client::AuthClient;
pub use error::ApiError;
