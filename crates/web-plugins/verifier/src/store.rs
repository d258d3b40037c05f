use crate::{
    constants::{QR_CODE_KEY_PREFIX, QR_CODE_TTL},
    model::{RequestMessage, SessionState},
};
use cache::Cache;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

/// Sessions keyed by their identifier. Entries live for the configured TTL
/// counted from their last write.
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn Cache<SessionState>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn Cache<SessionState>>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Inserts or overwrites the state of a session.
    pub fn create(&self, session_id: &Uuid, state: SessionState) {
        self.cache.set(&session_id.to_string(), state, self.ttl);
    }

    pub fn get(&self, session_id: &Uuid) -> Option<SessionState> {
        let state = self.cache.get(&session_id.to_string());
        if state.is_none() {
            tracing::debug!(%session_id, "session not found in store");
        }

        state
    }
}

/// Request messages fetched out-of-band by wallets scanning a QR code.
#[derive(Clone)]
pub struct QrCodeStore {
    cache: Arc<dyn Cache<RequestMessage>>,
}

impl QrCodeStore {
    pub fn new(cache: Arc<dyn Cache<RequestMessage>>) -> Self {
        Self { cache }
    }

    /// Stores a message under a fresh random id and returns that id.
    pub fn save(&self, message: RequestMessage) -> Uuid {
        let id = Uuid::new_v4();
        self.cache.set(&Self::key(&id), message, QR_CODE_TTL);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<RequestMessage> {
        self.cache.get(&Self::key(id))
    }

    fn key(id: &Uuid) -> String {
        format!("{QR_CODE_KEY_PREFIX}{id}")
    }
}
