use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio::sync::watch;
use tracing::debug;

use super::store::TokenStore;

/// Shared "is a user signed in" flag.
///
/// New subscribers see the latest value immediately, then every later
/// publication. Clone is cheap and every clone observes the same state.
#[derive(Debug, Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<bool>>,
}

impl SessionState {
    pub fn new(initial: bool) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Initial value computed from the store's current contents
    pub fn from_store(store: &TokenStore) -> Self {
        Self::new(store.is_authenticated())
    }

    pub fn is_logged_in(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Stream of states, starting with the current one.
    pub fn changes(&self) -> impl Stream<Item = bool> + Send + 'static {
        let mut rx = self.subscribe();
        let first = *rx.borrow_and_update();
        stream::once(async move { first }).chain(stream::unfold(rx, |mut rx| async move {
            rx.changed().await.ok()?;
            let value = *rx.borrow_and_update();
            Some((value, rx))
        }))
    }

    /// Publishing with no subscribers is fine; the value is kept for later ones.
    pub(crate) fn publish(&self, logged_in: bool) {
        debug!(logged_in, "Publishing session state");
        self.tx.send_replace(logged_in);
    }
}
