use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use super::persistence::KeyValueStore;

/// One of the three credential slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    AccessToken,
    Uid,
    Client,
}

impl CredentialSlot {
    pub const ALL: [CredentialSlot; 3] = [
        CredentialSlot::AccessToken,
        CredentialSlot::Uid,
        CredentialSlot::Client,
    ];

    /// Persistence key, also the HTTP header name
    pub fn key(&self) -> &'static str {
        match self {
            CredentialSlot::AccessToken => "access-token",
            CredentialSlot::Uid => "uid",
            CredentialSlot::Client => "client",
        }
    }
}

/// A complete credential set.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub uid: String,
    pub client: String,
}

impl Credentials {
    /// Build a set only when every value is present and non-empty
    pub fn from_parts(
        access_token: Option<String>,
        uid: Option<String>,
        client: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(Self {
            access_token: non_empty(access_token)?,
            uid: non_empty(uid)?,
            client: non_empty(client)?,
        })
    }

    pub fn get(&self, slot: CredentialSlot) -> &str {
        match slot {
            CredentialSlot::AccessToken => &self.access_token,
            CredentialSlot::Uid => &self.uid,
            CredentialSlot::Client => &self.client,
        }
    }
}

// Keep the token out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("uid", &self.uid)
            .field("client", &self.client)
            .finish()
    }
}

/// The three credential slots over a key-value backend.
/// Clone is cheap - the backend is shared.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read a slot. Backend failures read as empty.
    pub fn get(&self, slot: CredentialSlot) -> Option<String> {
        match self.backend.get(slot.key()) {
            Ok(value) => value,
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "Failed to read credential slot");
                None
            }
        }
    }

    /// Write a slot. Empty values are ignored.
    pub fn set(&self, slot: CredentialSlot, value: &str) -> Result<()> {
        if value.is_empty() {
            debug!(slot = slot.key(), "Ignoring empty credential value");
            return Ok(());
        }
        self.backend.set(slot.key(), value)
    }

    /// Remove all three slots. Every slot is attempted; the first error wins.
    pub fn clear(&self) -> Result<()> {
        let keys = CredentialSlot::ALL.map(|slot| slot.key());
        self.backend.remove_many(&keys)
    }

    /// Write all three slots as one unit. On failure the store still holds
    /// the previous set, or nothing.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let entries = CredentialSlot::ALL.map(|slot| (slot.key(), credentials.get(slot)));
        if entries.iter().any(|(_, value)| value.is_empty()) {
            anyhow::bail!("Refusing to save an incomplete credential set");
        }
        self.backend.set_many(&entries)?;
        debug!(uid = %credentials.uid, "Credentials saved");
        Ok(())
    }

    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(
            self.get(CredentialSlot::AccessToken),
            self.get(CredentialSlot::Uid),
            self.get(CredentialSlot::Client),
        )
    }

    /// True iff all three slots hold a non-empty value
    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}
