//! Identity — a stub sign-in holder, persisted locally.
//!
//! Not an auth system: sign-in mints a demo identity for the chosen
//! provider. The current identity gates history saves and is the one piece
//! of state (besides the archive) that survives restarts.

pub mod handlers;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AppError;
use crate::models::identity::{Identity, Provider};
use crate::storage::StateStore;

const IDENTITY_KEY: &str = "identity";

pub struct IdentityStore {
    store: Arc<dyn StateStore>,
    current: Mutex<Option<Identity>>,
}

impl IdentityStore {
    /// Reads the identity slot once; an absent slot means signed out.
    pub fn load(store: Arc<dyn StateStore>) -> anyhow::Result<Self> {
        let current: Option<Identity> = match store.load(IDENTITY_KEY)? {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };
        if let Some(identity) = &current {
            info!("Restored signed-in identity {}", identity.email);
        }
        Ok(Self {
            store,
            current: Mutex::new(current),
        })
    }

    pub async fn current(&self) -> Option<Identity> {
        self.current.lock().await.clone()
    }

    pub async fn sign_in(&self, provider: Provider) -> Result<Identity, AppError> {
        let identity = Identity::demo(provider);
        let mut current = self.current.lock().await;
        self.persist(&identity)?;
        *current = Some(identity.clone());
        info!("Signed in as {}", identity.email);
        Ok(identity)
    }

    pub async fn sign_out(&self) -> Result<(), AppError> {
        let mut current = self.current.lock().await;
        self.store.clear(IDENTITY_KEY).map_err(AppError::Internal)?;
        *current = None;
        info!("Signed out");
        Ok(())
    }

    /// Replaces the avatar with a locally supplied image reference,
    /// independent of any session state.
    pub async fn set_avatar(&self, url: String) -> Result<Identity, AppError> {
        let mut current = self.current.lock().await;
        let Some(identity) = current.as_mut() else {
            return Err(AppError::SignInRequired);
        };
        identity.avatar = Some(url);
        let updated = identity.clone();
        self.persist(&updated)?;
        Ok(updated)
    }

    fn persist(&self, identity: &Identity) -> Result<(), AppError> {
        let value = serde_json::to_value(identity)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
        self.store
            .save(IDENTITY_KEY, &value)
            .map_err(AppError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_sign_in_persists_across_reloads() {
        let store = Arc::new(MemoryStore::default());
        let identities = IdentityStore::load(store.clone()).unwrap();

        let identity = identities.sign_in(Provider::Apple).await.unwrap();
        assert_eq!(identities.current().await.unwrap().id, identity.id);

        let reloaded = IdentityStore::load(store).unwrap();
        assert_eq!(reloaded.current().await.unwrap().id, identity.id);
    }

    #[tokio::test]
    async fn test_sign_out_clears_the_slot() {
        let store = Arc::new(MemoryStore::default());
        let identities = IdentityStore::load(store.clone()).unwrap();

        identities.sign_in(Provider::Google).await.unwrap();
        identities.sign_out().await.unwrap();
        assert!(identities.current().await.is_none());

        let reloaded = IdentityStore::load(store).unwrap();
        assert!(reloaded.current().await.is_none());
    }

    #[tokio::test]
    async fn test_avatar_requires_identity() {
        let store = Arc::new(MemoryStore::default());
        let identities = IdentityStore::load(store).unwrap();

        let result = identities
            .set_avatar("https://img.example.com/me.png".to_string())
            .await;
        assert!(matches!(result, Err(AppError::SignInRequired)));
    }

    #[tokio::test]
    async fn test_avatar_replacement_persists() {
        let store = Arc::new(MemoryStore::default());
        let identities = IdentityStore::load(store.clone()).unwrap();
        identities.sign_in(Provider::Google).await.unwrap();

        let updated = identities
            .set_avatar("https://img.example.com/me.png".to_string())
            .await
            .unwrap();
        assert_eq!(
            updated.avatar.as_deref(),
            Some("https://img.example.com/me.png")
        );

        let reloaded = IdentityStore::load(store).unwrap();
        assert_eq!(
            reloaded.current().await.unwrap().avatar.as_deref(),
            Some("https://img.example.com/me.png")
        );
    }
}
