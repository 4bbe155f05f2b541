//! Data models for the auth API.
//!
//! - `User`: account record, unknown fields passed through; `UserId` numeric or string
//! - `SignInRequest`, `SignUpInfo`: request bodies

pub mod user;

pub(crate) use user::UserEnvelope;
pub use user::{SignInRequest, SignUpInfo, User, UserId};
