//! Token store: the single source of truth for the current token pair.
//!
//! Values live in memory and are mirrored to a [`KeyValueStorage`]. Memory is
//! hydrated lazily from storage, so a store built over an existing token file
//! resumes the previous session. Token contents are opaque; expiry is only
//! discovered when the backend answers 401.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{ACCESS_TOKEN_KEY, KeyValueStorage, MemoryStorage, REFRESH_TOKEN_KEY};

/// Access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// In-memory copy of one token.
#[derive(Debug, Clone, Default)]
enum Slot {
    /// Not read from storage yet.
    #[default]
    Unloaded,
    /// Authoritative; storage is not consulted again.
    Loaded(Option<String>),
}

#[derive(Debug, Default)]
struct Cached {
    access: Slot,
    refresh: Slot,
}

#[derive(Debug)]
struct TokenStoreInner {
    storage: Arc<dyn KeyValueStorage>,
    cache: RwLock<Cached>,
}

/// Shared handle to the current tokens. Clones see the same state.
#[derive(Debug, Clone)]
pub struct TokenStore {
    inner: Arc<TokenStoreInner>,
}

impl TokenStore {
    /// Create a store over the given storage.
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self::with_shared_storage(Arc::new(storage))
    }

    /// Create a store over already-shared storage.
    pub fn with_shared_storage(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            inner: Arc::new(TokenStoreInner {
                storage,
                cache: RwLock::new(Cached::default()),
            }),
        }
    }

    /// Create a store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Replace both tokens.
    pub fn set_tokens(&self, access: impl Into<String>, refresh: impl Into<String>) -> Result<()> {
        let access = access.into();
        let refresh = refresh.into();
        {
            let mut cache = self.inner.cache.write();
            cache.access = Slot::Loaded(Some(access.clone()));
            cache.refresh = Slot::Loaded(Some(refresh.clone()));
        }
        self.inner.storage.set(ACCESS_TOKEN_KEY, &access)?;
        self.inner.storage.set(REFRESH_TOKEN_KEY, &refresh)?;
        Ok(())
    }

    /// Replace only the access token.
    pub fn set_access_token(&self, access: impl Into<String>) -> Result<()> {
        let access = access.into();
        self.inner.cache.write().access = Slot::Loaded(Some(access.clone()));
        self.inner.storage.set(ACCESS_TOKEN_KEY, &access)
    }

    /// Current access token, hydrating from storage on first use.
    pub fn access_token(&self) -> Option<String> {
        self.hydrated(ACCESS_TOKEN_KEY, |c| &mut c.access)
    }

    /// Current refresh token, hydrating from storage on first use.
    pub fn refresh_token(&self) -> Option<String> {
        self.hydrated(REFRESH_TOKEN_KEY, |c| &mut c.refresh)
    }

    /// Both tokens, if both are present.
    pub fn token_pair(&self) -> Option<TokenPair> {
        Some(TokenPair {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
        })
    }

    /// A session exists only while a refresh token is held.
    pub fn is_authenticated(&self) -> bool {
        self.refresh_token().is_some()
    }

    /// Remove both tokens from memory and storage.
    ///
    /// Memory is cleared even when storage fails, and stays cleared for the
    /// life of this store. Both keys are attempted; the first error is returned.
    pub fn clear_tokens(&self) -> Result<()> {
        {
            let mut cache = self.inner.cache.write();
            cache.access = Slot::Loaded(None);
            cache.refresh = Slot::Loaded(None);
        }
        let access = self.inner.storage.remove(ACCESS_TOKEN_KEY);
        let refresh = self.inner.storage.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)?;
        tracing::debug!("Tokens cleared");
        Ok(())
    }

    fn hydrated(&self, key: &str, slot: fn(&mut Cached) -> &mut Slot) -> Option<String> {
        let mut cache = self.inner.cache.write();
        let slot = slot(&mut *cache);
        if let Slot::Loaded(value) = slot {
            return value.clone();
        }
        match self.inner.storage.get(key) {
            Ok(stored) => {
                *slot = Slot::Loaded(stored.clone());
                stored
            }
            // Left unloaded so a later call can retry.
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to hydrate token from storage");
                None
            }
        }
    }
}
