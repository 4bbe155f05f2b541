//! Authentication state: credential persistence and session tracking.
//!
//! This module provides:
//! - `KeyValueStore`: persistence capability with file, keychain, memory and
//!   no-op backends
//! - `TokenStore`: the three credential slots (`access-token`, `uid`, `client`)
//! - `SessionState`: observable "signed in" flag derived from the token store

pub mod persistence;
pub mod session;
pub mod store;

pub use persistence::{open_store, FileStore, KeyValueStore, KeyringStore, MemoryStore, NullStore};
pub use session::SessionState;
pub use store::{CredentialSlot, Credentials, TokenStore};
